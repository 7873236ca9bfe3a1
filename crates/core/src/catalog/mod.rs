//! The product catalog document (`web.json`).
//!
//! The document is a JSON array whose first element holds `products` and
//! `settings`:
//!
//! ```json
//! [{ "products": [{ "id": 1, "name": "Gold 0", ... }], "settings": { ... } }]
//! ```
//!
//! Loading is lenient. A document without a first element or without a
//! `products` array is an empty catalog, and a product that fails to parse is
//! skipped and reported instead of taking the whole shop down.

mod ordered;
mod product;
mod query;

pub use ordered::{OrderedMap, Text};
pub use product::{
    DEFAULT_IMAGE, ImageMap, OptionGroup, OptionKind, Product, ProductOptions, SelectedOptions,
    normalize_option_key,
};
pub use query::{CatalogListing, CatalogQuery, CategoryGroup, SortOrder};

use serde_json::Value;
use thiserror::Error;

use crate::settings::ShopSettings;
use crate::{AccountType, ProductId};

/// Errors that make a catalog document unusable.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A problem found while loading an otherwise usable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Index of the product in the document, if the warning is about one.
    pub index: Option<usize>,
    pub message: String,
}

/// A parsed catalog plus anything that was skipped.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub warnings: Vec<LoadWarning>,
}

/// Products and shop settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    settings: ShopSettings,
}

impl Catalog {
    #[must_use]
    pub const fn new(products: Vec<Product>, settings: ShopSettings) -> Self {
        Self { products, settings }
    }

    /// Parse a `web.json` document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` only when the text is not JSON at all.
    /// Structural problems produce warnings and an empty or partial catalog.
    pub fn from_json(text: &str) -> Result<CatalogLoad, CatalogError> {
        let document: Value = serde_json::from_str(text)?;
        Ok(Self::from_document(&document))
    }

    /// Build a catalog from an already parsed document.
    #[must_use]
    pub fn from_document(document: &Value) -> CatalogLoad {
        let mut warnings = Vec::new();

        let Some(root) = document.as_array().and_then(|entries| entries.first()) else {
            warnings.push(LoadWarning {
                index: None,
                message: "document has no first element".to_string(),
            });
            return CatalogLoad {
                catalog: Self::default(),
                warnings,
            };
        };

        let settings = match root.get("settings") {
            None | Some(Value::Null) => ShopSettings::default(),
            Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
                warnings.push(LoadWarning {
                    index: None,
                    message: format!("settings ignored: {e}"),
                });
                ShopSettings::default()
            }),
        };

        let raw_products = root
            .get("products")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);

        if raw_products.is_empty() {
            warnings.push(LoadWarning {
                index: None,
                message: "document has no products".to_string(),
            });
        }

        let products = raw_products
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                serde_json::from_value::<Product>(raw.clone())
                    .map_err(|e| {
                        let name = raw.get("name").and_then(Value::as_str).unwrap_or("unnamed");
                        warnings.push(LoadWarning {
                            index: Some(index),
                            message: format!("product {name:?} skipped: {e}"),
                        });
                    })
                    .ok()
            })
            .collect();

        CatalogLoad {
            catalog: Self { products, settings },
            warnings,
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn settings(&self) -> &ShopSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products an account may see, in document order.
    pub fn visible_to(&self, account: AccountType) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.visible_to(account))
    }

    /// Visible products matching a search term, grouped by category in order
    /// of first appearance.
    #[must_use]
    pub fn storefront_groups(&self, account: AccountType, search: Option<&str>) -> Vec<CategoryGroup<'_>> {
        let term = search.unwrap_or_default();
        query::group_by_category(self.visible_to(account).filter(|p| p.matches_search(term)))
    }

    /// Distinct categories in order of first appearance, backslashes removed.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for product in &self.products {
            let category = product.clean_category();
            if !category.is_empty() && !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// Products whose price resolves to zero for the given account.
    pub fn unpriced(&self, account: AccountType) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| {
            p.unit_price(account, crate::pricing::Inflation::Uninflated, &self.settings)
                .is_zero()
        })
    }
}
