//! Checkout and order confirmation route handlers.
//!
//! Retail and admin shoppers book an in-store pickup; wholesale orders ship.
//! A placed order is appended to the shop's order list and the cart and
//! checkout prefill are cleared.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::OrderId;
use balloon_fiesta_core::cart::CartTotals;
use balloon_fiesta_core::checkout::{CheckoutError, CheckoutForm, FieldError};
use balloon_fiesta_core::hours::{self, pickup_slots, pickup_window};
use balloon_fiesta_core::order::Order;

use super::cart::{CartView, current_cart};
use super::page::{PageContext, load_catalog};
use crate::error::Result;
use crate::middleware::session::{clear_prefill, get_prefill, set_cart, set_notice};
use crate::middleware::{RequireLogin, Visitor};
use crate::models::{Notice, Shopper};
use crate::state::AppState;
use crate::storage::OrderRepository;

// =============================================================================
// View Types
// =============================================================================

/// Field values echoed back into the checkout form.
#[derive(Clone, Default)]
pub struct CheckoutFormView {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub pickup_date: String,
    pub pickup_time: String,
}

impl From<&CheckoutForm> for CheckoutFormView {
    fn from(form: &CheckoutForm) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            address: form.address.clone(),
            phone: form.phone.clone(),
            pickup_date: form.pickup_date.clone().unwrap_or_default(),
            pickup_time: form.pickup_time.clone().unwrap_or_default(),
        }
    }
}

/// Validation messages keyed by field.
#[derive(Clone, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Message for a field, or an empty string.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map_or("", |e| e.message.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A pickup time option.
#[derive(Clone)]
pub struct SlotView {
    pub value: String,
    pub label: String,
    pub available: bool,
    pub selected: bool,
}

fn slot_views(date: Option<NaiveDate>, selected: &str, now: NaiveDateTime) -> Vec<SlotView> {
    date.map(|date| pickup_slots(date, now))
        .unwrap_or_default()
        .into_iter()
        .map(|slot| SlotView {
            selected: slot.value() == selected,
            value: slot.value(),
            label: slot.label(),
            available: slot.available,
        })
        .collect()
}

/// One ordered line for display.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub options: Vec<String>,
    pub quantity: u32,
    pub line_total: String,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub date: String,
    pub account_type: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub lines: Vec<OrderLineView>,
    pub item_count: u32,
    pub items_summary: String,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub pickup: Option<String>,
    pub status: &'static str,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let pickup = order.pickup_date.map(|date| {
            let time = order.pickup_time_label().unwrap_or_default();
            format!("{} at {time}", date.format("%A, %B %-d, %Y"))
        });

        let shipping = if pickup.is_some() {
            "Pickup".to_string()
        } else if order.shipping.is_zero() {
            "FREE".to_string()
        } else {
            order.shipping.to_string()
        };

        Self {
            id: order.order_id.to_string(),
            date: order.display_date(),
            account_type: order.account_type.to_string(),
            name: order.name.clone(),
            email: order.email.to_string(),
            address: order.address.clone(),
            phone: order.phone.to_string(),
            lines: order
                .cart
                .iter()
                .map(|item| OrderLineView {
                    name: item.name.clone(),
                    options: item.option_tags(),
                    quantity: item.quantity,
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            item_count: order.item_count(),
            items_summary: order.items_summary(),
            subtotal: order.subtotal.to_string(),
            shipping,
            total: order.total.to_string(),
            pickup,
            status: order.status.as_str(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Time slot query parameters.
#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub pickup_date: Option<String>,
    pub pickup_time: Option<String>,
}

/// Order confirmation query parameters.
#[derive(Debug, Deserialize)]
pub struct ConfirmationQuery {
    pub order: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub form: CheckoutFormView,
    pub errors: FieldErrors,
    pub pickup_required: bool,
    pub min_date: String,
    pub max_date: String,
    pub slots: Vec<SlotView>,
}

/// Pickup time options fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/pickup_slots.html")]
pub struct PickupSlotsTemplate {
    pub slots: Vec<SlotView>,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub page: PageContext,
    pub order: Option<OrderView>,
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Render the checkout form, with errors when re-rendering a failed submit.
async fn render_checkout(
    state: &AppState,
    session: &Session,
    shopper: Shopper,
    cart: CartView,
    form: &CheckoutForm,
    errors: FieldErrors,
) -> Response {
    let now = state.now();
    let (min_date, max_date) = pickup_window(now);
    let form = CheckoutFormView::from(form);
    let slots = slot_views(parse_date(&form.pickup_date), &form.pickup_time, now);
    let pickup_required = !shopper.account_type.is_wholesale();
    let page = PageContext::build(state, session, &Visitor(Some(shopper))).await;

    CheckoutTemplate {
        page,
        cart,
        form,
        errors,
        pickup_required,
        min_date: min_date.format("%Y-%m-%d").to_string(),
        max_date: max_date.format("%Y-%m-%d").to_string(),
        slots,
    }
    .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout form.
#[instrument(skip(state, session, shopper))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(shopper): RequireLogin,
) -> Result<Response> {
    let account = shopper.account_type;
    let catalog = load_catalog(&state, &session).await;
    let cart = current_cart(&session, account, &catalog).await?;

    if cart.is_empty() {
        set_notice(&session, Notice::warning("Your cart is empty!")).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let mut form = match get_prefill(&session).await {
        Some(prefill) => prefill.to_form(),
        None => CheckoutForm {
            name: shopper.username.clone(),
            email: shopper.email.to_string(),
            phone: shopper.phone.as_ref().map(ToString::to_string).unwrap_or_default(),
            ..CheckoutForm::default()
        },
    };

    if !account.is_wholesale() {
        if let Some((date, time)) = hours::default_pickup(state.now()) {
            form.pickup_date = Some(date.format("%Y-%m-%d").to_string());
            form.pickup_time = Some(time.format("%H:%M").to_string());
        }
    }

    let view = CartView::new(&cart, account, &catalog);
    Ok(render_checkout(&state, &session, shopper, view, &form, FieldErrors::default()).await)
}

/// Place the order.
#[instrument(skip(state, session, shopper, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(shopper): RequireLogin,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let account = shopper.account_type;
    let now = state.now();
    let catalog = load_catalog(&state, &session).await;
    let mut cart = current_cart(&session, account, &catalog).await?;

    if !cart.items_below_minimum(account).is_empty() {
        set_notice(
            &session,
            Notice::error("Some items are below minimum order quantity. Please adjust quantities before checkout."),
        )
        .await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let totals = CartTotals::compute(&cart, account, catalog.settings());
    let placed = form
        .validate(account, now)
        .and_then(|valid| Order::place(valid, &cart, &totals, account, now));

    let order = match placed {
        Ok(order) => order,
        Err(CheckoutError::EmptyCart) => {
            set_notice(&session, Notice::warning("Your cart is empty!")).await;
            return Ok(Redirect::to("/cart").into_response());
        }
        Err(err) => {
            set_notice(&session, Notice::error(err.to_string())).await;
            let errors = match err {
                CheckoutError::Invalid(errors) => errors,
                CheckoutError::Pickup(e) => vec![FieldError {
                    field: "pickup_time",
                    message: e.to_string(),
                }],
                CheckoutError::EmptyCart => Vec::new(),
            };
            let view = CartView::new(&cart, account, &catalog);
            return Ok(render_checkout(&state, &session, shopper, view, &form, FieldErrors(errors)).await);
        }
    };

    let order = OrderRepository::new(state.store()).append(order).await?;

    cart.clear();
    set_cart(&session, &cart).await?;
    clear_prefill(&session).await?;

    tracing::info!(
        order_id = %order.order_id,
        username = %shopper.username,
        account_type = %account,
        items = order.item_count(),
        total = %order.total,
        "Order placed"
    );

    set_notice(&session, Notice::success("Order placed successfully!")).await;
    Ok(Redirect::to(&format!("/order-confirmation?order={}", order.order_id)).into_response())
}

/// Pickup time options for a date (HTMX).
#[instrument(skip(state))]
pub async fn slots(State(state): State<AppState>, Query(query): Query<SlotsQuery>) -> impl IntoResponse {
    let date = query.pickup_date.as_deref().and_then(parse_date);
    PickupSlotsTemplate {
        slots: slot_views(date, query.pickup_time.as_deref().unwrap_or_default(), state.now()),
    }
}

/// Display a placed order.
#[instrument(skip(state, session, visitor))]
pub async fn confirmation(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    Query(query): Query<ConfirmationQuery>,
) -> impl IntoResponse {
    let order = match query.order.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => OrderRepository::new(state.store())
            .find(&OrderId::from_string(id))
            .await
            .as_ref()
            .map(OrderView::from),
        None => None,
    };

    ConfirmationTemplate {
        page: PageContext::build(&state, &session, &visitor).await,
        order,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_field_errors_lookup() {
        let errors = FieldErrors(vec![FieldError {
            field: "email",
            message: "Please enter a valid email address".to_string(),
        }]);
        assert_eq!(errors.get("email"), "Please enter a valid email address");
        assert_eq!(errors.get("name"), "");
        assert!(FieldErrors::default().is_empty());
    }

    #[test]
    fn test_slot_views_mark_selection() {
        // A Monday; the first slots of the morning are already past.
        let now = at("2026-01-05 12:10");
        let date = parse_date("2026-01-05");
        let slots = slot_views(date, "13:00", now);

        assert!(!slots.is_empty());
        assert!(slots.iter().any(|s| s.selected && s.value == "13:00"));
        assert!(slots.iter().any(|s| !s.available));
        assert!(slot_views(None, "", now).is_empty());
    }
}
