//! Authentication route handlers.
//!
//! Handles login, registration, the wholesale account request, the
//! forgotten-password check, and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::order::WholesaleRequestForm;
use balloon_fiesta_core::password::password_strength;

use super::page::PageContext;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::session::set_notice;
use crate::middleware::{Visitor, clear_shopper, set_shopper};
use crate::models::{Notice, Shopper};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;
use crate::storage::WholesaleRequestRepository;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub username: String,
}

/// Password strength query.
#[derive(Deserialize)]
pub struct StrengthQuery {
    pub password: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub username: String,
    pub email: String,
    pub phone: String,
}

/// Wholesale account request page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/wholesale_request.html")]
pub struct WholesaleRequestTemplate {
    pub page: PageContext,
    pub form: WholesaleRequestForm,
}

/// Password strength meter fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/password_strength.html")]
pub struct PasswordStrengthTemplate {
    pub show: bool,
    pub label: &'static str,
    pub percent: u8,
    pub css_class: String,
    pub needs: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(state, session, visitor))]
pub async fn login_page(State(state): State<AppState>, session: Session, visitor: Visitor) -> Response {
    if visitor.0.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        page: PageContext::build(&state, &session, &visitor).await,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let auth = AuthService::new(state.store(), state.accounts());
    let password = SecretString::from(form.password);

    let account = match auth.login(&form.username, &password).await {
        Ok(account) => account,
        Err(e) if e.is_internal() => return Err(AppError::Auth(e)),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            set_notice(&session, Notice::error(e.to_string())).await;
            return Ok(Redirect::to("/login"));
        }
    };

    // Fresh session id for the logged-in session.
    session.cycle_id().await?;

    let shopper = Shopper::from_account(&account, state.now());
    set_shopper(&session, &shopper).await?;
    set_sentry_user(&shopper.username, Some(shopper.email.as_str()));

    tracing::info!(
        username = %shopper.username,
        account_type = %shopper.account_type,
        "Shopper logged in"
    );
    set_notice(&session, Notice::success("Login successful!")).await;

    Ok(Redirect::to("/"))
}

/// Log out, keeping the shop's orders and accounts.
#[instrument(skip(session, visitor))]
pub async fn logout(session: Session, visitor: Visitor) -> Result<Redirect> {
    if let Some(shopper) = &visitor.0 {
        tracing::info!(username = %shopper.username, "Shopper logged out");
    }

    clear_shopper(&session).await?;
    clear_sentry_user();
    set_notice(&session, Notice::info("You have been logged out.")).await;

    Ok(Redirect::to("/"))
}

/// Report whether a username has an account to send reset instructions to.
#[instrument(skip(state, session, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Redirect {
    let auth = AuthService::new(state.store(), state.accounts());
    let notice = if form.username.trim().is_empty() {
        Notice::error("Please enter your username")
    } else if auth.username_exists(&form.username).await {
        Notice::success("Password reset instructions have been sent to your registered email.")
    } else {
        Notice::error("No account found with that username.")
    };

    set_notice(&session, notice).await;
    Redirect::to("/login")
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(state, session, visitor))]
pub async fn register_page(State(state): State<AppState>, session: Session, visitor: Visitor) -> Response {
    if visitor.0.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        page: PageContext::build(&state, &session, &visitor).await,
        username: String::new(),
        email: String::new(),
        phone: String::new(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// Failures re-render the form with what the shopper typed, minus the
/// passwords.
#[instrument(skip(state, session, visitor, form), fields(username = %form.username.trim()))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.store(), state.accounts());
    let registration = Registration {
        username: form.username.clone(),
        password: SecretString::from(form.password),
        confirm_password: SecretString::from(form.confirm_password),
        email: form.email.clone(),
        phone: form.phone.clone(),
    };

    match auth.register(registration, state.now()).await {
        Ok(account) => {
            tracing::info!(
                username = %account.username,
                email = %account.email,
                "Account registered"
            );
            set_notice(&session, Notice::success("Account created successfully! You can now login.")).await;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) if e.is_internal() => Err(AppError::Auth(e)),
        Err(e) => {
            set_notice(&session, Notice::error(e.to_string())).await;
            Ok(RegisterTemplate {
                page: PageContext::build(&state, &session, &visitor).await,
                username: form.username,
                email: form.email,
                phone: form.phone,
            }
            .into_response())
        }
    }
}

/// Password strength meter (HTMX).
#[instrument(skip_all)]
pub async fn password_strength_meter(Query(query): Query<StrengthQuery>) -> impl IntoResponse {
    let password = query.password.unwrap_or_default();
    let strength = password_strength(&password);

    PasswordStrengthTemplate {
        show: !password.is_empty(),
        label: strength.label(),
        percent: strength.meter_percent(),
        css_class: strength.css_class(),
        needs: strength.needs.join(", "),
    }
}

// =============================================================================
// Wholesale Request Routes
// =============================================================================

/// Display the wholesale account request form.
#[instrument(skip(state, session, visitor))]
pub async fn wholesale_request_page(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
) -> impl IntoResponse {
    WholesaleRequestTemplate {
        page: PageContext::build(&state, &session, &visitor).await,
        form: WholesaleRequestForm::default(),
    }
}

/// Handle a wholesale account request.
#[instrument(skip(state, session, visitor, form))]
pub async fn wholesale_request(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    Form(form): Form<WholesaleRequestForm>,
) -> Result<Response> {
    match form.validate(state.now()) {
        Ok(request) => {
            let request = WholesaleRequestRepository::new(state.store())
                .append(request)
                .await?;
            tracing::info!(
                request_id = %request.id,
                business_name = %request.business_name,
                email = %request.email,
                "Wholesale account requested"
            );
            set_notice(
                &session,
                Notice::success(
                    "Wholesale account request submitted successfully! We will contact you within 2 business days.",
                ),
            )
            .await;
            Ok(Redirect::to("/wholesale-request").into_response())
        }
        Err(e) => {
            set_notice(&session, Notice::error(e.to_string())).await;
            Ok(WholesaleRequestTemplate {
                page: PageContext::build(&state, &session, &visitor).await,
                form,
            }
            .into_response())
        }
    }
}
