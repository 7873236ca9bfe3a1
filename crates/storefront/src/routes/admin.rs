//! Admin route handlers.
//!
//! Shop staff review placed orders and wholesale account requests, export
//! orders as CSV, and reload the catalog document.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::OrderStatus;
use balloon_fiesta_core::order::{WholesaleRequest, filter_by_status, orders_to_csv};

use super::checkout::OrderView;
use super::page::PageContext;
use crate::middleware::session::set_notice;
use crate::middleware::{RequireLogin, Visitor};
use crate::models::{Notice, Shopper};
use crate::state::AppState;
use crate::storage::{OrderRepository, WholesaleRequestRepository};

/// Admin order list query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub status: Option<String>,
}

/// A status filter entry.
#[derive(Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: String,
    pub selected: bool,
}

/// A wholesale account request for review.
#[derive(Clone)]
pub struct RequestView {
    pub id: String,
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub business_type: String,
    pub expected_volume: String,
    pub date: String,
}

impl From<&WholesaleRequest> for RequestView {
    fn from(request: &WholesaleRequest) -> Self {
        Self {
            id: request.id.to_string(),
            business_name: request.business_name.clone(),
            contact_name: request.contact_name.clone(),
            email: request.email.to_string(),
            phone: request.phone.to_string(),
            business_type: request.business_type.clone(),
            expected_volume: request.expected_volume.clone(),
            date: request.request_date.format("%-m/%-d/%Y").to_string(),
        }
    }
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderView>,
    pub statuses: Vec<StatusOption>,
    pub requests: Vec<RequestView>,
    pub has_orders: bool,
}

/// Shown to shoppers who aren't admins.
#[derive(Template, WebTemplate)]
#[template(path = "admin/denied.html")]
pub struct AccessDeniedTemplate {
    pub page: PageContext,
}

/// Parse the status filter. `all`, empty and unknown values show every order.
fn parse_status(value: Option<&str>) -> Option<OrderStatus> {
    value.and_then(|v| OrderStatus::from_str(v.trim()).ok())
}

fn status_label(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

async fn denied(state: &AppState, session: &Session, shopper: Shopper) -> Response {
    tracing::warn!(username = %shopper.username, "Admin page refused");
    let page = PageContext::build(state, session, &Visitor(Some(shopper))).await;
    (StatusCode::FORBIDDEN, AccessDeniedTemplate { page }).into_response()
}

/// Display the order dashboard.
#[instrument(skip(state, session, shopper))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(shopper): RequireLogin,
    Query(query): Query<AdminQuery>,
) -> Response {
    if !shopper.account_type.is_admin() {
        return denied(&state, &session, shopper).await;
    }

    let status = parse_status(query.status.as_deref());
    let all_orders = OrderRepository::new(state.store()).list().await;
    let orders = filter_by_status(&all_orders, status)
        .into_iter()
        .map(OrderView::from)
        .collect();

    let statuses = std::iter::once(StatusOption {
        value: "all",
        label: "All Orders".to_string(),
        selected: status.is_none(),
    })
    .chain(OrderStatus::ALL.iter().map(|s| StatusOption {
        value: s.as_str(),
        label: status_label(s.as_str()),
        selected: status == Some(*s),
    }))
    .collect();

    let requests = WholesaleRequestRepository::new(state.store())
        .list()
        .await
        .iter()
        .rev()
        .map(RequestView::from)
        .collect();

    AdminTemplate {
        page: PageContext::build(&state, &session, &Visitor(Some(shopper))).await,
        orders,
        statuses,
        requests,
        has_orders: !all_orders.is_empty(),
    }
    .into_response()
}

/// Export every order as CSV.
#[instrument(skip(state, session, shopper))]
pub async fn export_csv(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(shopper): RequireLogin,
) -> Response {
    if !shopper.account_type.is_admin() {
        return denied(&state, &session, shopper).await;
    }

    let orders = OrderRepository::new(state.store()).list().await;
    if orders.is_empty() {
        set_notice(&session, Notice::warning("No orders to export.")).await;
        return Redirect::to("/admin").into_response();
    }

    tracing::info!(username = %shopper.username, count = orders.len(), "Orders exported");

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"customer_orders.csv\"",
            ),
        ],
        orders_to_csv(&orders),
    )
        .into_response()
}

/// Drop the cached catalog so the next page reads the document again.
#[instrument(skip(state, session, shopper))]
pub async fn refresh_catalog(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(shopper): RequireLogin,
) -> Response {
    if !shopper.account_type.is_admin() {
        return denied(&state, &session, shopper).await;
    }

    state.catalog().invalidate().await;
    let notice = match state.catalog().try_load().await {
        Ok(catalog) => {
            tracing::info!(products = catalog.products().len(), "Catalog reloaded");
            Notice::success(format!("Catalog reloaded: {} products", catalog.products().len()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Catalog reload failed");
            Notice::error("Catalog could not be loaded. Check the catalog document.")
        }
    };

    set_notice(&session, notice).await;
    Redirect::to("/admin").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(Some("completed")), Some(OrderStatus::Completed));
        assert_eq!(parse_status(Some("all")), None);
        assert_eq!(parse_status(Some("")), None);
        assert_eq!(parse_status(None), None);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label("pending"), "Pending");
        assert_eq!(status_label(""), "");
    }
}
