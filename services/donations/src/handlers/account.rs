use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::{CookieJar, Form};
use serde::Deserialize;

use charity_auth_types::{
    cookie::{clear_session_cookie, set_session_cookie},
    identity::SessionUser,
    token::issue_session_token,
};

use crate::error::DonationsServiceError;
use crate::handlers::Notice;
use crate::state::AppState;
use crate::usecase::account::{
    ActivateAccountUseCase, ChangePasswordInput, ChangePasswordUseCase, EditProfileInput,
    EditProfileUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    ResendActivationUseCase, landing_path,
};

// ── POST /register/ ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<impl IntoResponse, DonationsServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        mailer: state.mailer(),
        links: state.links.clone(),
    };
    usecase
        .execute(RegisterInput {
            name: form.name,
            surname: form.surname,
            email: form.email,
            password: form.password,
            password2: form.password2,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Notice::success("Check your email to activate your account."),
    ))
}

// ── POST /login/ ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, DonationsServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(LoginInput {
            email: form.email,
            password: form.password,
        })
        .await?;

    let (token, _exp) = issue_session_token(user.id, user.is_superuser, &state.session_key.0)
        .map_err(|e| DonationsServiceError::Internal(e.into()))?;
    let jar = set_session_cookie(jar, token, state.cookie_domain.clone());
    Ok((jar, Redirect::to(landing_path(&user))))
}

// ── GET|POST /logout/ ────────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_session_cookie(jar, state.cookie_domain.clone());
    (jar, Redirect::to("/"))
}

// ── GET /activate/{uidb64}/{token}/ ──────────────────────────────────────────

pub async fn activate(
    State(state): State<AppState>,
    Path((uidb64, token)): Path<(String, String)>,
) -> Result<Json<Notice>, DonationsServiceError> {
    let usecase = ActivateAccountUseCase {
        tokens: state.token_repo(),
    };
    usecase.execute(&uidb64, &token).await?;
    Ok(Notice::success(
        "Your account has been activated. You can now log in.",
    ))
}

// ── POST /activation/resend/ ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: String,
}

pub async fn resend_activation(
    State(state): State<AppState>,
    Form(form): Form<EmailForm>,
) -> Result<Json<Notice>, DonationsServiceError> {
    let usecase = ResendActivationUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        mailer: state.mailer(),
        links: state.links.clone(),
    };
    usecase.execute(&form.email).await?;
    Ok(Notice::success("A new activation link has been sent to your email."))
}

// ── POST /edit_profile/ ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EditProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn edit_profile(
    session: SessionUser,
    State(state): State<AppState>,
    Form(form): Form<EditProfileForm>,
) -> Result<Redirect, DonationsServiceError> {
    let usecase = EditProfileUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            session.user_id,
            EditProfileInput {
                first_name: form.first_name,
                last_name: form.last_name,
                email: form.email,
                password: form.password,
            },
        )
        .await?;
    Ok(Redirect::to("/user_profile/"))
}

// ── POST /change_password/ ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

pub async fn change_password(
    session: SessionUser,
    State(state): State<AppState>,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Redirect, DonationsServiceError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            session.user_id,
            ChangePasswordInput {
                old_password: form.old_password,
                new_password1: form.new_password1,
                new_password2: form.new_password2,
            },
        )
        .await?;
    Ok(Redirect::to("/user_profile/"))
}
