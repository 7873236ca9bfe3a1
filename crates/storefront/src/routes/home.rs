//! Home page and store status route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::catalog::{Catalog, Product};
use balloon_fiesta_core::hours::{self, StoreStatus};
use balloon_fiesta_core::pricing::Inflation;
use balloon_fiesta_core::{AccountType, ProductId};

use super::page::{PageContext, load_catalog};
use crate::middleware::Visitor;
use crate::middleware::session::take_highlight;
use crate::state::AppState;

/// Product card display data for listings.
#[derive(Clone)]
pub struct ProductCard {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub min_order: u32,
    pub show_minimum: bool,
    pub button_text: String,
    pub highlighted: bool,
}

impl ProductCard {
    /// A product as the given account sees it.
    #[must_use]
    pub fn new(product: &Product, account: AccountType, catalog: &Catalog, highlight: Option<ProductId>) -> Self {
        let settings = catalog.settings();
        let min_order = product.minimum_order(account, settings);
        let wholesale = account.is_wholesale();
        let price = product.unit_price(account, Inflation::Uninflated, settings);

        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.clean_category(),
            image: product.listing_image().to_string(),
            price: if wholesale {
                format!("{price} /unit")
            } else {
                price.to_string()
            },
            min_order,
            show_minimum: wholesale,
            button_text: if wholesale {
                format!("Add {min_order} to Cart")
            } else {
                "Add to Cart".to_string()
            },
            highlighted: highlight == Some(product.id),
        }
    }
}

/// Products of one category.
pub struct CategorySection {
    pub category: String,
    pub products: Vec<ProductCard>,
}

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub q: Option<String>,
    pub highlight: Option<i64>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub sections: Vec<CategorySection>,
    pub search: String,
    pub free_shipping_threshold: Option<String>,
}

/// Store status fragment template (for HTMX polling).
#[derive(Template, WebTemplate)]
#[template(path = "partials/store_status.html")]
pub struct StoreStatusTemplate {
    pub store: StoreStatus,
}

/// Display the home page.
#[instrument(skip(state, session, visitor))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let catalog = load_catalog(&state, &session).await;
    let account = visitor.account_type();

    let highlight = match query.highlight {
        Some(id) => Some(ProductId::new(id)),
        None => take_highlight(&session).await,
    };

    let search = query.q.unwrap_or_default().trim().to_string();
    let sections = catalog
        .storefront_groups(account, Some(&search))
        .into_iter()
        .map(|group| CategorySection {
            category: group.category,
            products: group
                .products
                .into_iter()
                .map(|p| ProductCard::new(p, account, &catalog, highlight))
                .collect(),
        })
        .collect();

    let free_shipping_threshold = account
        .is_wholesale()
        .then(|| catalog.settings().free_shipping_threshold().to_string());

    HomeTemplate {
        page: PageContext::build(&state, &session, &visitor).await,
        sections,
        search,
        free_shipping_threshold,
    }
}

/// Store status line (HTMX).
#[instrument(skip(state))]
pub async fn store_status(State(state): State<AppState>) -> impl IntoResponse {
    StoreStatusTemplate {
        store: hours::status(state.now()),
    }
}
