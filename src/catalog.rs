use crate::error::AppError;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogItem {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub barcode_number: Option<String>,
    pub price: Option<String>,
}

const SKU_COLUMN: &str = "SKU";
const NAME_COLUMN: &str = "Name";
const CATEGORY_COLUMN: &str = "Category";
const BARCODE_COLUMN: &str = "Barcode Number";
const PRICE_COLUMN: &str = "Price";

const DEFAULT_CATEGORY: &str = "Uncategorized";

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn field(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Reads the catalog CSV into items, in file order. A missing file is not an
/// error: the catalog is optional and its absence yields an empty list.
/// Columns are matched by header name; `SKU` and `Name` must be present.
pub fn load_catalog(path: &str) -> Result<Vec<CatalogItem>, AppError> {
    if !Path::new(path).exists() {
        log::warn!("Catalog file {} not found, continuing with an empty catalog", path);
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let sku_col = column_index(&headers, SKU_COLUMN);
    let name_col = column_index(&headers, NAME_COLUMN);
    let category_col = column_index(&headers, CATEGORY_COLUMN);
    let barcode_col = column_index(&headers, BARCODE_COLUMN);
    let price_col = column_index(&headers, PRICE_COLUMN);

    if sku_col.is_none() || name_col.is_none() {
        return Err(AppError::Generic(format!(
            "Catalog {} is missing the {} or {} column",
            path, SKU_COLUMN, NAME_COLUMN
        )));
    }

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;

        let category = {
            let raw = field(&record, category_col);
            if raw.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                raw
            }
        };
        let barcode_number = Some(field(&record, barcode_col)).filter(|v| !v.is_empty());
        let price = Some(field(&record, price_col)).filter(|v| !v.is_empty());

        items.push(CatalogItem {
            sku: field(&record, sku_col),
            name: field(&record, name_col),
            category,
            barcode_number,
            price,
        });
    }

    log::info!("Loaded {} catalog rows from {}", items.len(), path);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_catalog(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("items.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_missing_file_yields_empty_catalog() {
        let items = load_catalog("/definitely/not/here/items.csv").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_loads_rows_by_header_name() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "SKU,Name,Category,Barcode Number,Price\n\
             10000,Baking Soda,Baking Supplies,527341680526,45.50\n\
             10001,Baking Powder,Baking Supplies,527341680533,\n",
        );

        let items = load_catalog(&path).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sku, "10000");
        assert_eq!(items[0].name, "Baking Soda");
        assert_eq!(items[0].barcode_number.as_deref(), Some("527341680526"));
        assert_eq!(items[0].price.as_deref(), Some("45.50"));
        assert_eq!(items[1].price, None);
    }

    #[test]
    fn test_blank_category_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "SKU,Name,Category,Barcode Number,Price\n10002,Dish Soap,,111,\n",
        );

        let items = load_catalog(&path).unwrap();
        assert_eq!(items[0].category, "Uncategorized");
    }

    #[test]
    fn test_short_rows_produce_empty_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "SKU,Name,Category,Barcode Number,Price\n10003,Sponge\n",
        );

        let items = load_catalog(&path).unwrap();
        assert_eq!(items[0].sku, "10003");
        assert_eq!(items[0].category, "Uncategorized");
        assert_eq!(items[0].barcode_number, None);
    }

    #[test]
    fn test_missing_required_columns_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "Code,Label\n1,x\n");
        assert!(load_catalog(&path).is_err());
    }
}
