use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::error::DonationsServiceError;
use crate::handlers::Notice;
use crate::handlers::account::EmailForm;
use crate::state::AppState;
use crate::usecase::password_reset::{
    ConfirmPasswordResetInput, ConfirmPasswordResetUseCase, RESET_LINK_SENT,
    RequestPasswordResetUseCase,
};

// ── POST /password_reset/ ────────────────────────────────────────────────────

pub async fn request_password_reset(
    State(state): State<AppState>,
    Form(form): Form<EmailForm>,
) -> Result<Json<Notice>, DonationsServiceError> {
    let usecase = RequestPasswordResetUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        mailer: state.mailer(),
        links: state.links.clone(),
    };
    usecase.execute(&form.email).await?;
    Ok(Notice::success(RESET_LINK_SENT))
}

// ── POST /password_reset_confirm/{uidb64}/{token}/ ───────────────────────────

#[derive(Deserialize)]
pub struct ConfirmPasswordResetForm {
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Path((uidb64, token)): Path<(String, String)>,
    Form(form): Form<ConfirmPasswordResetForm>,
) -> Result<Json<Notice>, DonationsServiceError> {
    let usecase = ConfirmPasswordResetUseCase {
        tokens: state.token_repo(),
    };
    usecase
        .execute(
            &uidb64,
            &token,
            ConfirmPasswordResetInput {
                password1: form.password1,
                password2: form.password2,
            },
        )
        .await?;
    Ok(Notice::success(
        "Your password has been set. You may go ahead and log in now.",
    ))
}
