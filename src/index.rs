use crate::catalog::CatalogItem;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::normalize::normalize_text;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use walkdir::WalkDir;

/// SKU -> image path relative to the barcode root. A SKU is present exactly
/// when a file named `<SKU>-<anything>.<ext>` exists somewhere under the
/// root, outside the excluded directories.
#[derive(Debug, Default, Clone)]
pub struct BarcodeIndex {
    paths: HashMap<String, String>,
}

impl BarcodeIndex {
    pub fn build(root: &str, excluded_dirs: &HashSet<String>, extension: &str) -> Result<Self, AppError> {
        log::info!("Scanning {} for barcode images", root);
        log::debug!("Excluded directories: {:?}", excluded_dirs);

        let mut paths: HashMap<String, String> = HashMap::new();
        let root_path = Path::new(root);

        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !excluded_dirs.contains(name.as_ref()) && !name.starts_with('.')
        });

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                log::trace!("Skipping non-file entry: {:?}", entry.path());
                continue;
            }
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let matches_extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false);
            if !matches_extension {
                log::trace!("Skipping file with unsupported extension: {:?}", path);
                continue;
            }
            let Some((prefix, _)) = file_name.split_once('-') else {
                log::trace!("Skipping file without a SKU prefix: {:?}", path);
                continue;
            };
            let sku = prefix.trim();
            if sku.is_empty() {
                continue;
            }

            let relative = path
                .strip_prefix(root_path)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            log::debug!("Indexed barcode image for SKU {}: {}", sku, relative);

            // Duplicate SKU prefixes resolve to the lexicographically
            // smallest relative path, independent of walk order.
            paths
                .entry(sku.to_string())
                .and_modify(|existing| {
                    if relative < *existing {
                        *existing = relative.clone();
                    }
                })
                .or_insert(relative);
        }

        log::info!("Barcode index holds {} SKUs", paths.len());
        Ok(Self { paths })
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.paths.contains_key(sku)
    }

    pub fn path_for(&self, sku: &str) -> Option<&str> {
        self.paths.get(sku).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// One searchable catalog row, in catalog order.
#[derive(Debug, Clone)]
pub struct NameEntry {
    pub normalized: String,
    pub sku: String,
    pub display: String,
}

/// Normalized name -> SKUs in catalog order, plus the flat entry list the
/// search engine iterates.
#[derive(Debug, Default, Clone)]
pub struct NameIndex {
    by_name: HashMap<String, Vec<String>>,
    entries: Vec<NameEntry>,
}

impl NameIndex {
    pub fn build(items: &[CatalogItem]) -> Self {
        let mut by_name: HashMap<String, Vec<String>> = HashMap::new();
        let mut entries = Vec::new();

        for item in items {
            let sku = item.sku.trim();
            let name = item.name.trim();
            if sku.is_empty() || name.is_empty() {
                log::trace!("Skipping catalog row with blank SKU or name: {:?}", item);
                continue;
            }
            let normalized = normalize_text(name);
            if normalized.is_empty() {
                log::trace!("Skipping catalog row whose name normalizes to nothing: {:?}", item);
                continue;
            }

            by_name
                .entry(normalized.clone())
                .or_default()
                .push(sku.to_string());
            entries.push(NameEntry {
                normalized,
                sku: sku.to_string(),
                display: name.to_string(),
            });
        }

        log::info!("Name index holds {} entries ({} distinct names)", entries.len(), by_name.len());
        Self { by_name, entries }
    }

    pub fn entries(&self) -> &[NameEntry] {
        &self.entries
    }

    pub fn skus_for(&self, normalized_name: &str) -> Option<&[String]> {
        self.by_name.get(normalized_name).map(|v| v.as_slice())
    }
}

/// Both indexes, built once at startup and read-only afterwards. A catalog
/// or image-tree change requires a rebuild (restart).
#[derive(Debug, Default, Clone)]
pub struct CatalogIndex {
    pub barcodes: BarcodeIndex,
    pub names: NameIndex,
}

impl CatalogIndex {
    pub fn build(config: &AppConfig) -> Result<Self, AppError> {
        let barcodes = BarcodeIndex::build(
            &config.barcode_root,
            &config.excluded_dirs,
            &config.image_extension,
        )?;
        let items = crate::catalog::load_catalog(&config.catalog_path)?;
        let names = NameIndex::build(&items);
        Ok(Self { barcodes, names })
    }
}
