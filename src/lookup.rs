use crate::error::AppError;
use crate::index::CatalogIndex;
use crate::search::{find_name_matches, NameMatch, DEFAULT_MAX_RESULTS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LookupRequest {
    pub mode: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub selected_sku: Option<String>,
}

/// Terminal states of a lookup. `Ambiguous` carries the full match list so
/// the caller can re-query with a `selected_sku` from it.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LookupOutcome {
    Resolved {
        sku: String,
        image_path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        info: Option<String>,
    },
    Ambiguous {
        query: String,
        matches: Vec<NameMatch>,
    },
    NotFound {
        message: String,
    },
    InvalidInput {
        message: String,
    },
}

fn resolved(index: &CatalogIndex, sku: &str, info: Option<String>) -> LookupOutcome {
    // A catalog row can outlive its image; resolving such a SKU is NotFound,
    // not an error.
    match index.barcodes.path_for(sku) {
        Some(path) => LookupOutcome::Resolved {
            sku: sku.to_string(),
            image_path: path.to_string(),
            info,
        },
        None => LookupOutcome::NotFound {
            message: format!("No barcode image found for SKU: {}", sku),
        },
    }
}

fn resolve_by_sku(index: &CatalogIndex, request: &LookupRequest) -> LookupOutcome {
    let sku = request.sku.as_deref().unwrap_or("").trim();
    if sku.is_empty() {
        return LookupOutcome::InvalidInput {
            message: "Please enter a SKU.".to_string(),
        };
    }
    resolved(index, sku, None)
}

fn resolve_by_name(index: &CatalogIndex, request: &LookupRequest) -> Result<LookupOutcome, AppError> {
    let query = request.name.as_deref().unwrap_or("").trim();
    if query.is_empty() {
        return Ok(LookupOutcome::InvalidInput {
            message: "Please enter an item name.".to_string(),
        });
    }

    let matches = find_name_matches(index, query, DEFAULT_MAX_RESULTS)?;
    if matches.is_empty() {
        return Ok(LookupOutcome::NotFound {
            message: format!("No items found matching name: {}", query),
        });
    }

    if let Some(selected) = request.selected_sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if !matches.iter().any(|m| m.sku == selected) {
            return Ok(LookupOutcome::InvalidInput {
                message: "Selection is not in the current results.".to_string(),
            });
        }
        let info = (matches.len() > 1)
            .then(|| format!("{} items matched \"{}\"; showing SKU {}.", matches.len(), query, selected));
        return Ok(resolved(index, selected, info));
    }

    if matches.len() > 1 {
        log::debug!("Name query {:?} is ambiguous with {} matches", query, matches.len());
        return Ok(LookupOutcome::Ambiguous {
            query: query.to_string(),
            matches,
        });
    }

    Ok(resolved(index, &matches[0].sku, None))
}

/// Resolves a lookup request against the indexes. All outcomes, including
/// bad input, are ordinary values; `Err` is reserved for machinery failures.
pub fn resolve(index: &CatalogIndex, request: &LookupRequest) -> Result<LookupOutcome, AppError> {
    match request.mode.as_deref().unwrap_or("sku") {
        "sku" => Ok(resolve_by_sku(index, request)),
        "name" => resolve_by_name(index, request),
        other => Ok(LookupOutcome::InvalidInput {
            message: format!("Unknown lookup mode: {}", other),
        }),
    }
}
