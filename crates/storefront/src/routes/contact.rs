//! Contact form route handlers.
//!
//! Messages are logged for shop staff; nothing is sent from here.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use balloon_fiesta_core::Email;

use super::page::PageContext;
use crate::middleware::Visitor;
use crate::middleware::session::set_notice;
use crate::models::Notice;
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Check the form, returning the parsed email address.
    fn validate(&self) -> Result<Email, &'static str> {
        let required = [&self.name, &self.email, &self.subject, &self.message];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err("Please fill in all required fields");
        }
        Email::parse(self.email.trim()).map_err(|_| "Please enter a valid email address")
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
    pub form: ContactForm,
}

/// Display the contact page.
#[instrument(skip(state, session, visitor))]
pub async fn show(State(state): State<AppState>, session: Session, visitor: Visitor) -> impl IntoResponse {
    ContactTemplate {
        page: PageContext::build(&state, &session, &visitor).await,
        form: ContactForm::default(),
    }
}

/// Handle a contact form submission.
#[instrument(skip(state, session, visitor, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    visitor: Visitor,
    Form(form): Form<ContactForm>,
) -> Response {
    match form.validate() {
        Ok(email) => {
            tracing::info!(
                name = %form.name.trim(),
                email = %email,
                phone = %form.phone.trim(),
                subject = %form.subject.trim(),
                message = %form.message.trim(),
                "Contact message received"
            );
            set_notice(
                &session,
                Notice::success("Thank you! Your message has been sent. We'll respond within 24 hours."),
            )
            .await;
            Redirect::to("/contact").into_response()
        }
        Err(message) => {
            set_notice(&session, Notice::error(message)).await;
            ContactTemplate {
                page: PageContext::build(&state, &session, &visitor).await,
                form,
            }
            .into_response()
        }
    }
}
