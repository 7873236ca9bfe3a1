//! Account route handlers.
//!
//! These routes require a logged-in shopper.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::order::orders_for_customer;

use super::checkout::OrderView;
use super::page::PageContext;
use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::{RequireLogin, Visitor, clear_shopper};
use crate::middleware::session::set_notice;
use crate::models::Notice;
use crate::services::auth::{AuthService, PasswordChange};
use crate::state::AppState;
use crate::storage::{AccountRepository, OrderRepository};

/// An order in the shopper's history.
#[derive(Clone)]
pub struct HistoryEntry {
    pub number: String,
    pub order: OrderView,
}

/// Account display data for templates.
#[derive(Clone)]
pub struct AccountView {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub member_since: String,
    pub can_change_password: bool,
}

/// Change password form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub page: PageContext,
    pub account: AccountView,
    pub orders: Vec<HistoryEntry>,
}

/// Display account overview page.
#[instrument(skip(state, session, shopper))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(shopper): RequireLogin,
) -> impl IntoResponse {
    let accounts = AccountRepository::new(state.store(), state.accounts());
    let created = accounts.find_created(&shopper.username).await;
    let member_since = created
        .as_ref()
        .and_then(|account| account.created_at)
        .unwrap_or(shopper.login_time);

    let account = AccountView {
        username: shopper.username.clone(),
        email: shopper.email.to_string(),
        phone: shopper
            .phone
            .as_ref()
            .map_or_else(|| "Not provided".to_string(), ToString::to_string),
        member_since: member_since.format("%B %-d, %Y").to_string(),
        can_change_password: created.is_some(),
    };

    let all_orders = OrderRepository::new(state.store()).list().await;
    let orders = orders_for_customer(&all_orders, shopper.email.as_str())
        .into_iter()
        .map(|entry| HistoryEntry {
            number: entry.number,
            order: OrderView::from(entry.order),
        })
        .collect();

    AccountIndexTemplate {
        page: PageContext::build(&state, &session, &Visitor(Some(shopper))).await,
        account,
        orders,
    }
}

/// Change the password of a registered account.
///
/// On success the shopper is logged out and must sign in again.
#[instrument(skip(state, session, shopper, form))]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(shopper): RequireLogin,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Redirect> {
    let change = PasswordChange {
        current: SecretString::from(form.current_password),
        new: SecretString::from(form.new_password),
        confirm: SecretString::from(form.confirm_password),
    };

    let auth = AuthService::new(state.store(), state.accounts());
    match auth.change_password(&shopper.username, &change).await {
        Ok(()) => {
            tracing::info!(username = %shopper.username, "Password changed");
            clear_shopper(&session).await?;
            clear_sentry_user();
            set_notice(
                &session,
                Notice::success("Password changed successfully! You will be redirected to login page."),
            )
            .await;
            Ok(Redirect::to("/login"))
        }
        Err(e) if e.is_internal() => Err(AppError::Auth(e)),
        Err(e) => {
            tracing::debug!(username = %shopper.username, error = %e, "Password change refused");
            set_notice(&session, Notice::error(e.to_string())).await;
            Ok(Redirect::to("/account"))
        }
    }
}
