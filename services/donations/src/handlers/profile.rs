use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use charity_auth_types::identity::SessionUser;
use charity_domain::pagination::Page;

use crate::error::DonationsServiceError;
use crate::handlers::donation::DonationResponse;
use crate::state::AppState;
use crate::usecase::donation::{GetProfileUseCase, ProfileQuery, ToggleTakenByUserUseCase};

// ── GET /user_profile/ ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProfileParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct ProfileUserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "charity_core::serde::to_rfc3339_ms")]
    pub date_joined: DateTime<Utc>,
    #[serde(serialize_with = "charity_core::serde::to_rfc3339_ms_opt")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUserResponse,
    pub donations: Page<DonationResponse>,
    pub search: String,
    pub status: Option<&'static str>,
}

pub async fn get_profile(
    session: SessionUser,
    State(state): State<AppState>,
    Query(params): Query<ProfileParams>,
) -> Result<Json<ProfileResponse>, DonationsServiceError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
        donations: state.donation_repo(),
    };
    let view = usecase
        .execute(
            session.user_id,
            ProfileQuery {
                search: params.search,
                status: params.status,
                page: params.page,
            },
        )
        .await?;
    Ok(Json(ProfileResponse {
        user: ProfileUserResponse {
            id: view.user.id,
            email: view.user.email,
            first_name: view.user.first_name,
            last_name: view.user.last_name,
            date_joined: view.user.date_joined,
            last_login: view.user.last_login,
        },
        donations: view.donations.map(DonationResponse::from),
        search: view.search,
        status: view.status.map(|s| s.as_str()),
    }))
}

// ── POST /user_profile/ ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub donation_id: i32,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub status: &'static str,
    pub is_taken_by_user: bool,
}

pub async fn toggle_taken_by_user(
    session: SessionUser,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ToggleRequest>, DonationsServiceError>,
) -> Result<Json<ToggleResponse>, DonationsServiceError> {
    let usecase = ToggleTakenByUserUseCase {
        donations: state.donation_repo(),
    };
    let is_taken_by_user = usecase.execute(session.user_id, body.donation_id).await?;
    Ok(Json(ToggleResponse {
        status: "success",
        is_taken_by_user,
    }))
}
