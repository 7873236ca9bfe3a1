//! Product route handlers.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::catalog::{Catalog, OptionKind, Product, SelectedOptions};
use balloon_fiesta_core::pricing::{Inflation, has_inflation_choice};
use balloon_fiesta_core::{AccountType, ProductId};

use super::cart::{add_product, added_response};
use super::page::{PageContext, load_catalog};
use crate::error::Result;
use crate::middleware::Visitor;
use crate::middleware::session::set_notice;
use crate::models::Notice;
use crate::state::AppState;

/// Prefix of option fields in the add-to-cart form (`option_color`, ...).
const OPTION_FIELD_PREFIX: &str = "option_";

/// An option group for the product form.
#[derive(Clone)]
pub struct OptionView {
    pub key: String,
    pub label: String,
    pub is_color: bool,
    pub values: Vec<String>,
}

impl OptionView {
    /// Form field name for this group.
    #[must_use]
    pub fn field(&self) -> String {
        format!("{OPTION_FIELD_PREFIX}{}", self.key)
    }
}

/// Uninflated and inflated prices for the inflation selector.
#[derive(Clone)]
pub struct InflationChoice {
    pub uninflated: String,
    pub inflated: String,
}

/// One line of the product details list.
#[derive(Clone)]
pub struct DetailView {
    pub label: String,
    pub value: String,
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: String,
    pub price_note: &'static str,
    pub min_order: u32,
    pub show_minimum: bool,
    pub button_text: String,
    pub options: Vec<OptionView>,
    pub inflation: Option<InflationChoice>,
    pub details: Vec<DetailView>,
    pub stock: Option<u32>,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, account: AccountType, catalog: &Catalog) -> Self {
        let settings = catalog.settings();
        let min_order = product.minimum_order(account, settings);
        let wholesale = account.is_wholesale();

        let inflation = has_inflation_choice(&product.prices, account)
            .then(|| product.prices.inflation_prices(settings))
            .flatten()
            .map(|(uninflated, inflated)| InflationChoice {
                uninflated: uninflated.to_string(),
                inflated: inflated.to_string(),
            });

        let price_note = if wholesale {
            "Wholesale Price"
        } else if inflation.is_some() {
            "Uninflated"
        } else {
            ""
        };

        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: if product.description.is_empty() {
                "No description available".to_string()
            } else {
                product.description.clone()
            },
            image: product.listing_image().to_string(),
            price: product
                .unit_price(account, Inflation::Uninflated, settings)
                .to_string(),
            price_note,
            min_order,
            show_minimum: wholesale && min_order > 1,
            button_text: if wholesale && min_order > 1 {
                format!("Add {min_order} to Cart")
            } else {
                "Add to Cart".to_string()
            },
            options: product
                .option_groups()
                .into_iter()
                .map(|group| OptionView {
                    is_color: group.kind == OptionKind::Color,
                    values: group.values.iter().map(ToString::to_string).collect(),
                    key: group.key,
                    label: group.label,
                })
                .collect(),
            inflation,
            details: product
                .details
                .iter()
                .map(|(label, value)| DetailView {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            stock: product.stock,
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductView,
}

/// Shown to retail shoppers who open a wholesale-only product.
#[derive(Template, WebTemplate)]
#[template(path = "products/wholesale_only.html")]
pub struct WholesaleOnlyTemplate {
    pub page: PageContext,
}

/// Unknown product page.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub page: PageContext,
}

/// Product image fragment template (for HTMX option changes).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_image.html")]
pub struct ProductImageTemplate {
    pub name: String,
    pub image: String,
}

/// Options chosen in a form, keyed without the field prefix.
fn selected_options(fields: &HashMap<String, String>) -> SelectedOptions {
    fields
        .iter()
        .filter_map(|(field, value)| {
            let key = field.strip_prefix(OPTION_FIELD_PREFIX)?;
            let value = value.trim();
            (!value.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Display product detail page.
#[instrument(skip(state, session, visitor))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    Path(id): Path<i64>,
) -> Response {
    let catalog = load_catalog(&state, &session).await;
    let account = visitor.account_type();
    let product = catalog.find(ProductId::new(id));
    let page = PageContext::build(&state, &session, &visitor).await;

    match product {
        None => (StatusCode::NOT_FOUND, ProductNotFoundTemplate { page }).into_response(),
        Some(product) if !product.visible_to(account) => WholesaleOnlyTemplate { page }.into_response(),
        Some(product) => ProductShowTemplate {
            product: ProductView::new(product, account, &catalog),
            page,
        }
        .into_response(),
    }
}

/// Add a product with its chosen options, inflation and quantity.
#[instrument(skip(state, session, visitor, headers, fields))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response> {
    let catalog = load_catalog(&state, &session).await;
    let account = visitor.account_type();
    let back = format!("/products/{id}");

    let Some(product) = catalog
        .find(ProductId::new(id))
        .filter(|p| p.visible_to(account))
    else {
        set_notice(&session, Notice::error("Product not found")).await;
        return Ok(Redirect::to("/").into_response());
    };

    let min_order = product.minimum_order(account, catalog.settings());
    let mut quantity = fields
        .get("quantity")
        .and_then(|q| q.trim().parse::<u32>().ok())
        .filter(|q| *q > 0)
        .unwrap_or(min_order);

    if account.is_wholesale() && quantity < min_order {
        set_notice(
            &session,
            Notice::error(format!("Minimum order for {} is {min_order} units", product.name)),
        )
        .await;
        return Ok(Redirect::to(&back).into_response());
    }

    if let Some(stock) = product.stock {
        if stock == 0 {
            set_notice(&session, Notice::error(format!("{} is out of stock", product.name))).await;
            return Ok(Redirect::to(&back).into_response());
        }
        if quantity > stock {
            tracing::debug!(product_id = id, requested = quantity, stock, "Clamped to stock");
            quantity = stock;
        }
    }

    let inflation = Inflation::from_form(fields.get("inflation").map(String::as_str));
    let count = add_product(
        &session,
        product,
        account,
        &catalog,
        quantity,
        &selected_options(&fields),
        inflation,
    )
    .await?;
    set_notice(&session, Notice::success(format!("{quantity} {} added to cart", product.name))).await;

    Ok(added_response(&headers, count, &back))
}

/// Image for the chosen color and number (HTMX).
#[instrument(skip(state, fields))]
pub async fn image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(fields): Query<HashMap<String, String>>,
) -> Response {
    let catalog = state.catalog().load().await;
    let Some(product) = catalog.find(ProductId::new(id)) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let selected = product.sanitize_options(&selected_options(&fields));
    ProductImageTemplate {
        name: product.name.clone(),
        image: product.option_image(&selected).to_string(),
    }
    .into_response()
}
