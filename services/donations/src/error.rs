use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Field-keyed validation messages, e.g. `{"password2": ["Passwords do not match."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Records a length error when `value` has more than `max` characters.
    pub fn check_max_chars(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("Ensure this value has at most {max} characters."));
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), DonationsServiceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DonationsServiceError::Validation(self))
        }
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> DonationsServiceError {
        let mut errors = Self::new();
        errors.add(field, message);
        DonationsServiceError::Validation(errors)
    }
}

/// Donations service error variants.
#[derive(Debug, thiserror::Error)]
pub enum DonationsServiceError {
    #[error("invalid form data")]
    Validation(FieldErrors),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("the link is invalid or has already been used")]
    InvalidLink,
    #[error("email not found")]
    EmailNotFound,
    #[error("institution not found")]
    InstitutionNotFound,
    #[error("donation not found")]
    DonationNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("unknown admin resource")]
    UnknownResource,
    #[error("donation belongs to another account")]
    NotOwner,
    #[error("login required")]
    SessionExpired,
    #[error("superuser required")]
    NotSuperuser,
    #[error("email delivery failed")]
    MailDelivery(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DonationsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::MalformedBody(_) => "BAD_REQUEST",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidLink => "INVALID_LINK",
            Self::EmailNotFound => "EMAIL_NOT_FOUND",
            Self::InstitutionNotFound => "INSTITUTION_NOT_FOUND",
            Self::DonationNotFound => "DONATION_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UnknownResource => "UNKNOWN_RESOURCE",
            Self::NotOwner => "NOT_OWNER",
            Self::SessionExpired => "UNAUTHENTICATED",
            Self::NotSuperuser => "FORBIDDEN",
            Self::MailDelivery(_) => "MAIL_DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials | Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::MalformedBody(_) | Self::InvalidLink => StatusCode::BAD_REQUEST,
            Self::EmailNotFound
            | Self::InstitutionNotFound
            | Self::DonationNotFound
            | Self::UserNotFound
            | Self::UnknownResource => StatusCode::NOT_FOUND,
            Self::NotOwner | Self::NotSuperuser => StatusCode::FORBIDDEN,
            Self::MailDelivery(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for DonationsServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for DonationsServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are already visible through TraceLayer. Server-side failures carry
        // an anyhow chain that must reach the log but never the client.
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::MailDelivery(e) => {
                tracing::error!(error = ?e, kind = "MAIL_DELIVERY_FAILED", "email delivery failed")
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "status": "error",
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(errors) = &self {
            body["errors"] = serde_json::to_value(errors).unwrap_or_default();
        }
        (status, axum::Json(body)).into_response()
    }
}
