//! Catalog document checks.
//!
//! # Usage
//!
//! ```bash
//! bf-cli validate-catalog web.json
//! ```
//!
//! Logs the product count, products per category, load warnings, and
//! products with no price. Fails when the document has no usable products.

use std::path::{Path, PathBuf};

use thiserror::Error;

use balloon_fiesta_core::AccountType;
use balloon_fiesta_core::catalog::{Catalog, CatalogError, CatalogLoad};

/// Errors that make a document unusable.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Document could not be read.
    #[error("Cannot read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    /// Document is not JSON.
    #[error(transparent)]
    Parse(#[from] CatalogError),

    /// Document parsed but has no products.
    #[error("{0} contains no usable products")]
    Empty(PathBuf),
}

/// What a document contains.
#[derive(Debug, PartialEq, Eq)]
pub struct CatalogReport {
    pub products: usize,
    pub categories: Vec<(String, usize)>,
    pub warnings: Vec<String>,
    /// Names of products with no retail or no wholesale price.
    pub unpriced: Vec<String>,
}

impl CatalogReport {
    #[must_use]
    pub fn new(load: &CatalogLoad) -> Self {
        let catalog = &load.catalog;
        let categories = catalog
            .storefront_groups(AccountType::Wholesale, None)
            .into_iter()
            .map(|group| (group.category, group.products.len()))
            .collect();

        let retail: Vec<_> = catalog.unpriced(AccountType::Retail).map(|p| p.id).collect();
        let wholesale: Vec<_> = catalog.unpriced(AccountType::Wholesale).map(|p| p.id).collect();
        let unpriced = catalog
            .products()
            .iter()
            .filter(|p| retail.contains(&p.id) || wholesale.contains(&p.id))
            .map(|p| p.name.clone())
            .collect();

        Self {
            products: catalog.products().len(),
            categories,
            warnings: load
                .warnings
                .iter()
                .map(|w| match w.index {
                    Some(index) => format!("product #{index}: {}", w.message),
                    None => w.message.clone(),
                })
                .collect(),
            unpriced,
        }
    }
}

/// Parse a document and build its report.
///
/// # Errors
///
/// Returns an error if the text is not JSON or yields no products.
pub fn check(text: &str, path: &Path) -> Result<CatalogReport, ValidateError> {
    let load = Catalog::from_json(text)?;
    if load.catalog.is_empty() {
        return Err(ValidateError::Empty(path.to_path_buf()));
    }
    Ok(CatalogReport::new(&load))
}

/// Validate the document at `path`, logging the report.
///
/// # Errors
///
/// Returns an error if the document is unreadable or unusable.
pub fn validate(path: &Path) -> Result<(), ValidateError> {
    let text = std::fs::read_to_string(path).map_err(|e| ValidateError::Read(path.to_path_buf(), e))?;
    let report = check(&text, path)?;

    tracing::info!(path = %path.display(), products = report.products, "Catalog parsed");
    for (category, count) in &report.categories {
        tracing::info!(category = %category, count, "Category");
    }
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    for name in &report.unpriced {
        tracing::warn!(product = %name, "Product has no price");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"[{
        "products": [
            {"id": 1, "name": "Red Heart", "category": "18\" foil balloon", "pricing": {"retail": 4, "wholesale": 2}},
            {"id": 2, "name": "Gold Star", "category": "18\" foil balloon", "pricing": {"retail": 5, "wholesale": 3}},
            {"id": 3, "name": "Mystery Bag", "category": "Clearance"}
        ]
    }]"#;

    #[test]
    fn test_report_counts_categories_and_missing_prices() {
        let report = check(DOCUMENT, Path::new("web.json")).unwrap();
        assert_eq!(report.products, 3);
        assert_eq!(
            report.categories,
            vec![
                ("18\" foil balloon".to_string(), 2),
                ("Clearance".to_string(), 1),
            ]
        );
        assert_eq!(report.unpriced, vec!["Mystery Bag".to_string()]);
    }

    #[test]
    fn test_not_json_is_unusable() {
        let result = check("not json", Path::new("web.json"));
        assert!(matches!(result, Err(ValidateError::Parse(_))));
    }

    #[test]
    fn test_no_products_is_unusable() {
        let result = check("[]", Path::new("web.json"));
        assert!(matches!(result, Err(ValidateError::Empty(_))));
    }
}
