pub mod account;
pub mod admin;
pub mod contact;
pub mod donation;
pub mod home;
pub mod password_reset;
pub mod profile;
pub mod report;
pub mod staff;

use axum::Json;
use serde::Serialize;

/// `{status: "success", message}` body for form posts that do not redirect.
#[derive(Debug, Serialize)]
pub struct Notice {
    pub status: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
        })
    }
}
