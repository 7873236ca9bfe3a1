//! Wholesale catalog route handlers.
//!
//! The catalog is the wholesale price list: filterable, sortable and
//! searchable, with quick adds at the minimum quantity and a plain-text
//! download. Only wholesale accounts may use it.

use std::fmt::Write as _;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::catalog::{Catalog, CatalogQuery, SelectedOptions, SortOrder};
use balloon_fiesta_core::pricing::Inflation;
use balloon_fiesta_core::{AccountType, ProductId};

use super::cart::{add_product, added_response};
use super::home::ProductCard;
use super::page::{PageContext, load_catalog};
use crate::error::Result;
use crate::middleware::Visitor;
use crate::middleware::session::{set_highlight, set_notice};
use crate::models::{Notice, Shopper};
use crate::state::AppState;

/// Catalog query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

impl CatalogParams {
    fn to_query(&self) -> CatalogQuery {
        CatalogQuery {
            category: self.category.clone(),
            search: self.q.clone(),
            sort: SortOrder::parse(self.sort.as_deref()),
        }
    }
}

/// A category filter button.
#[derive(Clone)]
pub struct CategoryOption {
    pub value: String,
    pub selected: bool,
}

/// A sort drop-down entry.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Quick add form data.
#[derive(Debug, Deserialize)]
pub struct QuickAddForm {
    pub product_id: i64,
}

/// Wholesale catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCard>,
    pub summary: String,
    pub categories: Vec<CategoryOption>,
    pub all_selected: bool,
    pub sorts: Vec<SortOption>,
    pub search: String,
    pub download_query: String,
}

/// Shown to anyone without a wholesale login.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/restricted.html")]
pub struct CatalogRestrictedTemplate {
    pub page: PageContext,
}

fn has_wholesale_access(visitor: &Visitor) -> bool {
    visitor
        .0
        .as_ref()
        .is_some_and(|shopper| shopper.account_type.is_wholesale())
}

/// Display the wholesale catalog.
#[instrument(skip(state, session, visitor))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    Query(params): Query<CatalogParams>,
) -> Response {
    if !has_wholesale_access(&visitor) {
        let page = PageContext::build(&state, &session, &visitor).await;
        return (StatusCode::FORBIDDEN, CatalogRestrictedTemplate { page }).into_response();
    }

    let catalog = load_catalog(&state, &session).await;
    let query = params.to_query();
    let listing = query.apply(&catalog);
    let selected_category = query
        .category
        .as_deref()
        .map(|c| c.replace('\\', ""))
        .filter(|c| !c.is_empty() && c != "all");

    let categories = catalog
        .categories()
        .into_iter()
        .map(|value| CategoryOption {
            selected: selected_category.as_deref() == Some(value.as_str()),
            value,
        })
        .collect();

    let sorts = SortOrder::ALL
        .iter()
        .map(|sort| SortOption {
            value: sort.as_str(),
            label: sort.label(),
            selected: *sort == query.sort,
        })
        .collect();

    let download_query = download_query(&params);

    CatalogTemplate {
        products: listing
            .products
            .iter()
            .map(|p| ProductCard::new(p, AccountType::Wholesale, &catalog, None))
            .collect(),
        summary: listing.summary(),
        categories,
        all_selected: selected_category.is_none(),
        sorts,
        search: params.q.unwrap_or_default(),
        download_query,
        page: PageContext::build(&state, &session, &visitor).await,
    }
    .into_response()
}

/// Add a product at its minimum order quantity.
#[instrument(skip(state, session, visitor, headers))]
pub async fn quick_add(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<QuickAddForm>,
) -> Result<Response> {
    if !has_wholesale_access(&visitor) {
        return Ok(Redirect::to("/catalog").into_response());
    }

    let catalog = load_catalog(&state, &session).await;
    let Some(product) = catalog.find(ProductId::new(form.product_id)) else {
        set_notice(&session, Notice::error("Product not found")).await;
        return Ok(Redirect::to("/catalog").into_response());
    };

    let quantity = product.minimum_order(AccountType::Wholesale, catalog.settings());
    let count = add_product(
        &session,
        product,
        AccountType::Wholesale,
        &catalog,
        quantity,
        &SelectedOptions::new(),
        Inflation::Uninflated,
    )
    .await?;
    set_notice(&session, Notice::success(format!("{quantity} {} added to cart", product.name))).await;

    Ok(added_response(&headers, count, "/catalog"))
}

/// Open a product in the shop, highlighted.
#[instrument(skip(session))]
pub async fn view_in_shop(session: Session, Path(id): Path<i64>) -> Result<Redirect> {
    set_highlight(&session, ProductId::new(id)).await?;
    Ok(Redirect::to("/"))
}

/// Download the filtered catalog as a plain-text price list.
#[instrument(skip(state, visitor))]
pub async fn download(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(params): Query<CatalogParams>,
) -> Response {
    let Some(shopper) = visitor.0.filter(|s| s.account_type.is_wholesale()) else {
        return Redirect::to("/catalog").into_response();
    };

    let catalog = state.catalog().load().await;
    let now = state.now();
    let body = render_price_list(&catalog, &params.to_query(), &shopper, now);
    let filename = format!("BalloonsFiesta-Wholesale-Catalog-{}.txt", now.format("%Y-%m-%d"));

    tracing::info!(username = %shopper.username, "Catalog downloaded");

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Query string that reproduces the current filters on the download link.
fn download_query(params: &CatalogParams) -> String {
    let mut pairs = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in [
        ("category", &params.category),
        ("q", &params.q),
        ("sort", &params.sort),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            pairs.append_pair(name, value);
        }
    }
    let query = pairs.finish();
    if query.is_empty() {
        query
    } else {
        format!("?{query}")
    }
}

fn render_price_list(
    catalog: &Catalog,
    query: &CatalogQuery,
    shopper: &Shopper,
    now: chrono::NaiveDateTime,
) -> String {
    let listing = query.apply(catalog);
    let settings = catalog.settings();
    let mut out = String::new();

    let _ = writeln!(out, "Balloons Fiesta - Wholesale Product Catalog");
    let _ = writeln!(out, "Generated on: {}", now.format("%-m/%-d/%Y"));
    let _ = writeln!(out, "Total Products: {}", listing.products.len());
    let _ = writeln!(out, "Account: {}", shopper.username);
    let _ = writeln!(out);

    for product in &listing.products {
        let description = if product.description.is_empty() {
            "Premium quality balloon"
        } else {
            product.description.as_str()
        };
        let _ = writeln!(out, "{}", product.name);
        let _ = writeln!(out, "  Category: {}", product.clean_category());
        let _ = writeln!(out, "  {description}");
        let _ = writeln!(
            out,
            "  Wholesale Price: {} per unit",
            product.unit_price(AccountType::Wholesale, Inflation::Uninflated, settings)
        );
        let _ = writeln!(
            out,
            "  Minimum Order: {} units",
            product.minimum_order(AccountType::Wholesale, settings)
        );
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Confidential - For wholesale customers only");
    let _ = writeln!(out, "(c) {} Balloons Fiesta - All rights reserved", now.format("%Y"));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use balloon_fiesta_core::Email;
    use chrono::NaiveDateTime;

    fn shopper() -> Shopper {
        Shopper {
            username: "partyco".to_string(),
            account_type: AccountType::Wholesale,
            email: Email::parse("orders@partyco.test").unwrap(),
            phone: None,
            login_time: now(),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-03-02 10:00", "%Y-%m-%d %H:%M").unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[{"products": [
                {"id": 1, "name": "Gold Number", "category": "NUMBER BALLOONS", "pricing": {"wholesale": 1.5}},
                {"id": 2, "name": "Latex Pack", "category": "Standard", "description": "Pack of 50", "pricing": {"wholesale": 9}}
            ]}]"#,
        )
        .unwrap()
        .catalog
    }

    #[test]
    fn test_price_list_lists_filtered_products() {
        let query = CatalogQuery {
            category: Some("Standard".to_string()),
            ..CatalogQuery::default()
        };
        let text = render_price_list(&catalog(), &query, &shopper(), now());

        assert!(text.contains("Total Products: 1"));
        assert!(text.contains("Account: partyco"));
        assert!(text.contains("Latex Pack"));
        assert!(text.contains("Wholesale Price: $9.00 per unit"));
        assert!(text.contains("Minimum Order: 50 units"));
        assert!(!text.contains("Gold Number"));
    }

    #[test]
    fn test_price_list_defaults_description() {
        let text = render_price_list(&catalog(), &CatalogQuery::default(), &shopper(), now());
        assert!(text.contains("Premium quality balloon"));
        assert!(text.contains("Generated on: 3/2/2026"));
    }

    #[test]
    fn test_download_query_keeps_filters() {
        let params = CatalogParams {
            category: Some("18\" foil balloon".to_string()),
            q: None,
            sort: Some("price".to_string()),
        };
        assert_eq!(download_query(&params), "?category=18%22+foil+balloon&sort=price");
        assert_eq!(download_query(&CatalogParams::default()), "");
    }
}
