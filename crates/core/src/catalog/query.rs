//! Listing queries: grouping, filtering, and sorting.

use std::cmp::Ordering;

use super::{Catalog, Product};
use crate::AccountType;
use crate::pricing::Inflation;

/// Products sharing a category, for the storefront's sectioned listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: String,
    pub products: Vec<&'a Product>,
}

/// Group products by category, keeping categories in first-appearance order.
pub fn group_by_category<'a>(products: impl Iterator<Item = &'a Product>) -> Vec<CategoryGroup<'a>> {
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for product in products {
        let category = product.clean_category();
        if let Some(group) = groups.iter_mut().find(|g| g.category == category) {
            group.products.push(product);
        } else {
            groups.push(CategoryGroup {
                category,
                products: vec![product],
            });
        }
    }
    groups
}

/// Sort orders offered by the wholesale catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Name,
    NameDesc,
    Price,
    PriceDesc,
    Category,
}

impl SortOrder {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::NameDesc,
        Self::Price,
        Self::PriceDesc,
        Self::Category,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NameDesc => "name-desc",
            Self::Price => "price",
            Self::PriceDesc => "price-desc",
            Self::Category => "category",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::Price => "Price (Low to High)",
            Self::PriceDesc => "Price (High to Low)",
            Self::Category => "Category",
        }
    }

    /// Parse a query value, falling back to the name sort.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::ALL.into_iter().find(|order| order.as_str() == v))
            .unwrap_or_default()
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Wholesale catalog query (`/catalog?category=..&q=..&sort=..`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Category to show; `None` or `"all"` shows every category.
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

/// Result of a catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogListing<'a> {
    pub products: Vec<&'a Product>,
    /// Number of products before filtering.
    pub total: usize,
}

impl CatalogListing<'_> {
    /// `Showing N of M products`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Showing {} of {} products", self.products.len(), self.total)
    }
}

impl CatalogQuery {
    /// Run the query. Prices for sorting are wholesale prices, since the
    /// catalog is the wholesale price list.
    #[must_use]
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> CatalogListing<'a> {
        let category = self
            .category
            .as_deref()
            .map(|c| c.replace('\\', ""))
            .filter(|c| !c.is_empty() && c != "all");
        let term = self.search.as_deref().unwrap_or_default();

        let mut products: Vec<&Product> = catalog
            .products()
            .iter()
            .filter(|p| category.as_ref().is_none_or(|c| p.clean_category() == *c))
            .filter(|p| p.matches_search(term))
            .collect();

        let settings = catalog.settings();
        let price = |p: &Product| p.unit_price(AccountType::Wholesale, Inflation::Uninflated, settings);

        products.sort_by(|a, b| match self.sort {
            SortOrder::Name => compare_text(&a.name, &b.name),
            SortOrder::NameDesc => compare_text(&b.name, &a.name),
            SortOrder::Price => price(a).cmp(&price(b)),
            SortOrder::PriceDesc => price(b).cmp(&price(a)),
            SortOrder::Category => compare_text(&a.category, &b.category),
        });

        CatalogListing {
            products,
            total: catalog.products().len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[{"products": [
                {"id": 1, "name": "banner", "category": "Standard", "pricing": {"wholesale": 3}},
                {"id": 2, "name": "Arch Kit", "category": "Clearance", "pricing": {"wholesale": 9}},
                {"id": 3, "name": "Confetti", "category": "Standard", "description": "Paper arch filler", "pricing": {"wholesale": 1}},
                {"id": 4, "name": "Digit 7", "category": "18\\\" foil balloon", "pricing": {"wholesale": 2}}
            ]}]"#,
        )
        .unwrap()
        .catalog
    }

    fn ids(listing: &CatalogListing<'_>) -> Vec<i64> {
        listing.products.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_sort_orders() {
        let catalog = catalog();
        let by = |sort| CatalogQuery { sort, ..Default::default() }.apply(&catalog);

        assert_eq!(ids(&by(SortOrder::Name)), [2, 1, 3, 4]);
        assert_eq!(ids(&by(SortOrder::NameDesc)), [4, 3, 1, 2]);
        assert_eq!(ids(&by(SortOrder::Price)), [3, 4, 1, 2]);
        assert_eq!(ids(&by(SortOrder::PriceDesc)), [2, 1, 4, 3]);
        assert_eq!(ids(&by(SortOrder::Category))[0], 4);
    }

    #[test]
    fn test_category_filter_ignores_backslashes() {
        let catalog = catalog();
        let listing = CatalogQuery {
            category: Some("18\\\" foil balloon".to_string()),
            ..Default::default()
        }
        .apply(&catalog);
        assert_eq!(ids(&listing), [4]);
        assert_eq!(listing.summary(), "Showing 1 of 4 products");

        let all = CatalogQuery {
            category: Some("all".to_string()),
            ..Default::default()
        }
        .apply(&catalog);
        assert_eq!(all.products.len(), 4);
    }

    #[test]
    fn test_search_filter() {
        let catalog = catalog();
        let listing = CatalogQuery {
            search: Some("ARCH".to_string()),
            ..Default::default()
        }
        .apply(&catalog);
        assert_eq!(ids(&listing), [2, 3]);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(SortOrder::parse(Some("price-desc")), SortOrder::PriceDesc);
        assert_eq!(SortOrder::parse(Some("bogus")), SortOrder::Name);
        assert_eq!(SortOrder::parse(None), SortOrder::Name);
    }

    #[test]
    fn test_group_by_category_keeps_first_appearance() {
        let catalog = catalog();
        let groups = group_by_category(catalog.products().iter());
        let names: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, ["Standard", "Clearance", "18\" foil balloon"]);
        assert_eq!(groups[0].products.len(), 2);
    }
}
