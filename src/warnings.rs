//! Banners shown above list views and the dashboard.
//!
//! Covers partial data after a failed fetch and catalogs that have grown
//! past the point where in-memory list views stay snappy.

use crate::catalog::Catalog;
use crate::content::ContentKind;

/// Catalog file size above which a warning is shown (10 MB).
pub const CATALOG_SIZE_WARNING_THRESHOLD: u64 = 10 * 1024 * 1024;

/// A warning about the data the views are showing.
#[derive(Debug, Clone)]
pub enum Warning {
    /// Some collections failed to load and are shown empty.
    PartialData { kinds: Vec<ContentKind> },
    /// Item count exceeds the configured threshold.
    HighItemCount { count: usize, threshold: usize },
    /// catalog.db file size exceeds recommended threshold.
    LargeCatalogFile { size_mb: f64, threshold_mb: f64 },
}

/// Check a loaded catalog and return any warnings.
///
/// # Arguments
/// * `catalog` - The loaded catalog
/// * `item_threshold` - Item count above which lists may slow down
/// * `file_size` - Size of catalog.db in bytes
pub fn check_catalog(catalog: &Catalog, item_threshold: usize, file_size: u64) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if catalog.is_partial() {
        warnings.push(Warning::PartialData {
            kinds: catalog.failures().iter().map(|f| f.kind).collect(),
        });
    }

    let count = catalog.len();
    if count > item_threshold {
        warnings.push(Warning::HighItemCount {
            count,
            threshold: item_threshold,
        });
    }

    if file_size > CATALOG_SIZE_WARNING_THRESHOLD {
        warnings.push(Warning::LargeCatalogFile {
            size_mb: file_size as f64 / (1024.0 * 1024.0),
            threshold_mb: CATALOG_SIZE_WARNING_THRESHOLD as f64 / (1024.0 * 1024.0),
        });
    }

    warnings
}

/// Format a warning for display.
pub fn format_warning(warning: &Warning) -> String {
    match warning {
        Warning::PartialData { kinds } => {
            let names: Vec<&str> = kinds.iter().map(|k| k.collection()).collect();
            format!(
                "Warning: showing partial data - could not load {}",
                names.join(", ")
            )
        }
        Warning::HighItemCount { count, threshold } => {
            format!(
                "Warning: {} items exceeds recommended {} - list views may slow down",
                count, threshold
            )
        }
        Warning::LargeCatalogFile {
            size_mb,
            threshold_mb,
        } => {
            format!(
                "Warning: catalog.db size ({:.1}MB) exceeds recommended {:.0}MB",
                size_mb, threshold_mb
            )
        }
    }
}
