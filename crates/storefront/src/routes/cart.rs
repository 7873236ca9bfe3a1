//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Adding from a listing uses HTMX
//! to refresh the count badge; quantity and remove buttons re-render the
//! cart lines in place when HTMX is available and fall back to a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::cart::{Cart, CartError, CartItem, CartTotals, QuantityChange};
use balloon_fiesta_core::catalog::{Catalog, Product, SelectedOptions};
use balloon_fiesta_core::checkout::CheckoutPrefill;
use balloon_fiesta_core::pricing::Inflation;
use balloon_fiesta_core::{AccountType, ProductId};

use super::page::{PageContext, is_htmx, load_catalog};
use crate::error::Result;
use crate::middleware::Visitor;
use crate::middleware::session::{get_cart, set_cart, set_notice, set_prefill};
use crate::models::Notice;
use crate::state::AppState;

/// Notice when a wholesale cart has lines under their minimum.
const BELOW_MINIMUM_MESSAGE: &str =
    "Some items are below minimum order quantity. Please adjust quantities before checkout.";

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub index: usize,
    pub name: String,
    pub image: String,
    pub options: Vec<String>,
    pub unit_price: String,
    pub line_total: String,
    pub quantity: u32,
    pub min_order: u32,
    pub below_minimum: bool,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub free_shipping_remaining: Option<String>,
    pub wholesale: bool,
}

impl CartView {
    /// Build the view for an already repriced cart.
    #[must_use]
    pub fn new(cart: &Cart, account: AccountType, catalog: &Catalog) -> Self {
        let totals = CartTotals::compute(cart, account, catalog.settings());
        let wholesale = account.is_wholesale();

        Self {
            lines: cart
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| CartLineView {
                    index,
                    name: item.name.clone(),
                    image: item.image.clone(),
                    options: item.option_tags(),
                    unit_price: item.unit_price.to_string(),
                    line_total: item.line_total().to_string(),
                    quantity: item.quantity,
                    min_order: item.min_order,
                    below_minimum: wholesale && item.below_minimum(),
                })
                .collect(),
            item_count: totals.item_count,
            subtotal: totals.subtotal.to_string(),
            shipping: totals.shipping_label(),
            total: totals.total.to_string(),
            free_shipping_remaining: totals.free_shipping_remaining.map(|m| m.to_string()),
            wholesale,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn has_below_minimum(&self) -> bool {
        self.lines.iter().any(|line| line.below_minimum)
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
}

/// Quantity change form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub index: usize,
    pub delta: i64,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub index: usize,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart lines and totals fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub notice: Option<Notice>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Add a product line to the session cart.
///
/// Returns the cart's new unit count.
pub(super) async fn add_product(
    session: &Session,
    product: &Product,
    account: AccountType,
    catalog: &Catalog,
    quantity: u32,
    selected: &SelectedOptions,
    inflation: Inflation,
) -> Result<u32> {
    let mut cart = get_cart(session).await;
    cart.add(CartItem::from_product(
        product,
        account,
        catalog.settings(),
        quantity,
        selected,
        inflation,
    ));
    set_cart(session, &cart).await?;

    tracing::info!(
        product_id = %product.id,
        quantity,
        cart_count = cart.count(),
        "Added to cart"
    );

    Ok(cart.count())
}

/// Respond to a quick add: the count badge for HTMX, otherwise a redirect.
pub(super) fn added_response(headers: &HeaderMap, count: u32, redirect_to: &str) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate { count },
        )
            .into_response()
    } else {
        Redirect::to(redirect_to).into_response()
    }
}

/// The session cart repriced for the current shopper, with stock applied.
pub(super) async fn current_cart(session: &Session, account: AccountType, catalog: &Catalog) -> Result<Cart> {
    let mut cart = get_cart(session).await;
    cart.reprice(catalog, account);

    for adjustment in cart.clamp_to_stock() {
        set_notice(
            session,
            Notice::warning(format!(
                "Only {} of {} available. Quantity adjusted.",
                adjustment.stock, adjustment.name
            )),
        )
        .await;
    }
    cart.retain_nonempty();

    set_cart(session, &cart).await?;
    Ok(cart)
}

/// Re-render the lines for HTMX, or send the browser back to the cart page.
async fn after_edit(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    account: AccountType,
    notice: Notice,
) -> Result<Response> {
    if !is_htmx(headers) {
        set_notice(session, notice).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let catalog = state.catalog().load().await;
    let cart = get_cart(session).await;
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::new(&cart, account, &catalog),
            notice: Some(notice),
        },
    )
        .into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, visitor))]
pub async fn show(State(state): State<AppState>, session: Session, visitor: Visitor) -> Result<impl IntoResponse> {
    let account = visitor.account_type();
    let catalog = load_catalog(&state, &session).await;
    let cart = current_cart(&session, account, &catalog).await?;

    Ok(CartShowTemplate {
        cart: CartView::new(&cart, account, &catalog),
        page: PageContext::build(&state, &session, &visitor).await,
    })
}

/// Add a product from a listing.
///
/// Products with options send the shopper to the details page to choose
/// them. Wholesale shoppers add their minimum; everyone else adds one.
#[instrument(skip(state, session, visitor, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let account = visitor.account_type();
    let catalog = load_catalog(&state, &session).await;
    let id = ProductId::new(form.product_id);

    let Some(product) = catalog.find(id).filter(|p| p.visible_to(account)) else {
        set_notice(&session, Notice::error("Product not found")).await;
        return Ok(redirect_or_refresh(&headers, "/"));
    };

    if product.has_options() {
        let location = format!("/products/{id}");
        return Ok(redirect_or_refresh(&headers, &location));
    }

    let quantity = if account.is_wholesale() {
        product.minimum_order(account, catalog.settings())
    } else {
        1
    };

    let count = add_product(
        &session,
        product,
        account,
        &catalog,
        quantity,
        &SelectedOptions::new(),
        Inflation::Uninflated,
    )
    .await?;
    set_notice(&session, Notice::success(format!("{quantity} {} added to cart", product.name))).await;

    Ok(added_response(&headers, count, "/"))
}

/// Change a line's quantity by one step.
#[instrument(skip(state, session, visitor, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let account = visitor.account_type();
    let mut cart = get_cart(&session).await;

    let notice = match cart.change_quantity(form.index, form.delta, account) {
        Ok(QuantityChange::Updated { quantity }) => {
            set_cart(&session, &cart).await?;
            Notice::success(format!("Quantity updated to {quantity}"))
        }
        Ok(QuantityChange::Removed { name }) => {
            set_cart(&session, &cart).await?;
            Notice::success(format!("{name} removed from cart"))
        }
        Err(e @ CartError::BelowMinimum { .. }) => Notice::warning(e.to_string()),
        Err(CartError::NoSuchLine(index)) => {
            tracing::debug!(index, "Quantity change for missing cart line");
            Notice::error("That item is no longer in your cart")
        }
    };

    after_edit(&state, &session, &headers, account, notice).await
}

/// Remove a line.
#[instrument(skip(state, session, visitor, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let account = visitor.account_type();
    let mut cart = get_cart(&session).await;

    let notice = match cart.remove(form.index) {
        Ok(item) => {
            set_cart(&session, &cart).await?;
            Notice::success(format!("{} removed from cart", item.name))
        }
        Err(_) => Notice::error("That item is no longer in your cart"),
    };

    after_edit(&state, &session, &headers, account, notice).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: get_cart(&session).await.count(),
    }
}

/// Start checkout from the cart page.
///
/// Stores the shopper's contact details as the checkout prefill.
#[instrument(skip(state, session, visitor))]
pub async fn checkout(State(state): State<AppState>, session: Session, visitor: Visitor) -> Result<Response> {
    let account = visitor.account_type();
    let catalog = state.catalog().load().await;
    let cart = current_cart(&session, account, &catalog).await?;

    if cart.is_empty() {
        set_notice(&session, Notice::warning("Your cart is empty!")).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    if !cart.items_below_minimum(account).is_empty() {
        set_notice(&session, Notice::error(BELOW_MINIMUM_MESSAGE)).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let Some(shopper) = visitor.0 else {
        set_notice(&session, Notice::warning("Please login to proceed with checkout")).await;
        return Ok(Redirect::to("/login").into_response());
    };

    let prefill = CheckoutPrefill {
        username: shopper.username.clone(),
        email: shopper.email.to_string(),
        phone: shopper.phone.as_ref().map(ToString::to_string).unwrap_or_default(),
        account_type: shopper.account_type,
    };
    set_prefill(&session, &prefill).await?;

    Ok(Redirect::to("/checkout").into_response())
}

/// Full navigation for HTMX (`HX-Redirect`) or a plain redirect.
fn redirect_or_refresh(headers: &HeaderMap, location: &str) -> Response {
    if is_htmx(headers) {
        AppendHeaders([("HX-Redirect", location.to_string())]).into_response()
    } else {
        Redirect::to(location).into_response()
    }
}
