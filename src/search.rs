use crate::error::AppError;
use crate::index::CatalogIndex;
use crate::normalize::normalize_text;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_MAX_RESULTS: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NameMatch {
    pub sku: String,
    pub name: String,
}

enum MatchMode {
    Substring(String),
    Wildcard(Regex),
}

impl MatchMode {
    fn matches(&self, normalized_name: &str) -> bool {
        match self {
            MatchMode::Substring(needle) => normalized_name.contains(needle.as_str()),
            MatchMode::Wildcard(pattern) => pattern.is_match(normalized_name),
        }
    }
}

/// A `*` in the raw query switches to wildcard mode: segments between stars
/// are normalized and joined with `.*`, anchored at both ends. Normalized
/// segments contain only lowercase alphanumerics and spaces, so the pattern
/// needs no escaping.
fn build_mode(raw_query: &str, normalized_query: String) -> Result<MatchMode, AppError> {
    if !raw_query.contains('*') {
        return Ok(MatchMode::Substring(normalized_query));
    }
    let segments: Vec<String> = raw_query.split('*').map(normalize_text).collect();
    let pattern = format!("^{}$", segments.join(".*"));
    log::debug!("Wildcard query {:?} compiled to {}", raw_query, pattern);
    Ok(MatchMode::Wildcard(Regex::new(&pattern)?))
}

/// Searches the name index for `query`, returning at most `max_results`
/// matches sorted by display name. Matches are collected in catalog order,
/// restricted to SKUs that have a barcode image, and deduplicated by SKU
/// (first occurrence wins) before the cap and the final sort.
pub fn find_name_matches(
    index: &CatalogIndex,
    query: &str,
    max_results: usize,
) -> Result<Vec<NameMatch>, AppError> {
    let normalized_query = normalize_text(query);
    if normalized_query.is_empty() {
        return Ok(Vec::new());
    }

    let mode = build_mode(query, normalized_query)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut matches = Vec::new();
    for entry in index.names.entries() {
        if !index.barcodes.contains(&entry.sku) {
            log::trace!("Skipping {} ({}): no barcode image", entry.sku, entry.display);
            continue;
        }
        if !mode.matches(&entry.normalized) {
            continue;
        }
        if !seen.insert(&entry.sku) {
            continue;
        }
        matches.push(NameMatch {
            sku: entry.sku.clone(),
            name: entry.display.clone(),
        });
        if matches.len() >= max_results {
            break;
        }
    }

    matches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;
    use crate::index::{BarcodeIndex, NameIndex};
    use std::collections::HashSet as StdHashSet;
    use std::path::Path;
    use tempfile::TempDir;

    fn item(sku: &str, name: &str) -> CatalogItem {
        CatalogItem {
            sku: sku.to_string(),
            name: name.to_string(),
            category: "Uncategorized".to_string(),
            barcode_number: None,
            price: None,
        }
    }

    fn index_with(files: &[&str], items: Vec<CatalogItem>) -> (TempDir, CatalogIndex) {
        let dir = TempDir::new().unwrap();
        for rel in files {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap_or(Path::new("."))).unwrap();
            std::fs::write(&path, b"png").unwrap();
        }
        let barcodes =
            BarcodeIndex::build(&dir.path().to_string_lossy(), &StdHashSet::new(), "png").unwrap();
        let names = NameIndex::build(&items);
        (dir, CatalogIndex { barcodes, names })
    }

    fn baking_index() -> (TempDir, CatalogIndex) {
        index_with(
            &["10000-111.png", "10001-222.png"],
            vec![item("10000", "Baking Soda"), item("10001", "Baking Powder")],
        )
    }

    #[test]
    fn test_substring_match_sorted_by_display_name() {
        let (_dir, index) = baking_index();
        let matches = find_name_matches(&index, "baking", 100).unwrap();
        assert_eq!(
            matches,
            vec![
                NameMatch { sku: "10001".into(), name: "Baking Powder".into() },
                NameMatch { sku: "10000".into(), name: "Baking Soda".into() },
            ]
        );
    }

    #[test]
    fn test_empty_query_yields_no_matches() {
        let (_dir, index) = baking_index();
        assert!(find_name_matches(&index, "", 100).unwrap().is_empty());
        assert!(find_name_matches(&index, "  !! ", 100).unwrap().is_empty());
        assert!(find_name_matches(&index, "*", 100).unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_prefix_and_suffix() {
        let (_dir, index) = baking_index();

        let prefix = find_name_matches(&index, "bak*", 100).unwrap();
        assert_eq!(prefix.len(), 2);

        let suffix = find_name_matches(&index, "*soda", 100).unwrap();
        assert_eq!(suffix.len(), 1);
        assert_eq!(suffix[0].sku, "10000");
    }

    #[test]
    fn test_wildcard_is_anchored() {
        let (_dir, index) = baking_index();
        // Without the trailing star this must match the entire name.
        assert!(find_name_matches(&index, "bak*ing", 100).unwrap().is_empty());
        let full = find_name_matches(&index, "bak*ing soda", 100).unwrap();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].name, "Baking Soda");
    }

    #[test]
    fn test_orphaned_catalog_rows_are_excluded() {
        let (_dir, index) = index_with(
            &["10000-111.png"],
            vec![item("10000", "Baking Soda"), item("99999", "Baking Powder")],
        );
        let matches = find_name_matches(&index, "baking", 100).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].sku, "10000");
    }

    #[test]
    fn test_duplicate_rows_dedup_by_sku() {
        let (_dir, index) = index_with(
            &["10000-111.png"],
            vec![item("10000", "Baking Soda"), item("10000", "Baking Soda (bulk)")],
        );
        let matches = find_name_matches(&index, "baking", 100).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Baking Soda");
    }

    #[test]
    fn test_result_cap_applies_in_catalog_order() {
        let files: Vec<String> = (0..5).map(|i| format!("1000{}-111.png", i)).collect();
        let file_refs: Vec<&str> = files.iter().map(|s| s.as_str()).collect();
        let items: Vec<CatalogItem> = (0..5)
            .map(|i| item(&format!("1000{}", i), &format!("Soap {}", i)))
            .collect();
        let (_dir, index) = index_with(&file_refs, items);

        let matches = find_name_matches(&index, "soap", 3).unwrap();
        assert_eq!(matches.len(), 3);
        // First three catalog rows survive the cap.
        let skus: Vec<&str> = matches.iter().map(|m| m.sku.as_str()).collect();
        assert_eq!(skus, vec!["10000", "10001", "10002"]);
    }
}
