use axum::{
    Json,
    extract::State,
    response::Redirect,
};
use axum_extra::extract::Form;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use charity_auth_types::identity::SessionUser;

use crate::domain::types::{Category, Donation};
use crate::error::DonationsServiceError;
use crate::handlers::Notice;
use crate::handlers::home::InstitutionResponse;
use crate::state::AppState;
use crate::usecase::donation::{CreateDonationInput, CreateDonationUseCase, GetDonationFormUseCase};

#[derive(Serialize)]
pub struct DonationResponse {
    pub id: i32,
    pub quantity: i32,
    pub institution_id: i32,
    pub institution: String,
    pub categories: Vec<Category>,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub phone_number: String,
    pub pick_up_date: NaiveDate,
    #[serde(serialize_with = "serialize_time")]
    pub pick_up_time: NaiveTime,
    pub pick_up_comment: Option<String>,
    pub is_taken_by_user: bool,
    pub is_taken_by_courier: bool,
    pub courier_id: Option<Uuid>,
    pub status: &'static str,
    #[serde(serialize_with = "charity_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "charity_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

fn serialize_time<S: serde::Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.format("%H:%M").to_string())
}

impl From<Donation> for DonationResponse {
    fn from(d: Donation) -> Self {
        Self {
            id: d.id,
            quantity: d.quantity,
            institution_id: d.institution_id,
            institution: d.institution_name,
            categories: d.categories,
            address: d.address,
            city: d.city,
            zip_code: d.zip_code,
            phone_number: d.phone_number,
            pick_up_date: d.pick_up_date,
            pick_up_time: d.pick_up_time,
            pick_up_comment: d.pick_up_comment,
            is_taken_by_user: d.is_taken_by_user,
            is_taken_by_courier: d.is_taken_by_courier,
            courier_id: d.courier_id,
            status: d.status.as_str(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

// ── GET /add_donation/ ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DonationFormResponse {
    pub categories: Vec<Category>,
    pub institutions: Vec<InstitutionResponse>,
}

pub async fn donation_form(
    _session: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<DonationFormResponse>, DonationsServiceError> {
    let usecase = GetDonationFormUseCase {
        categories: state.category_repo(),
        institutions: state.institution_repo(),
    };
    let data = usecase.execute().await?;
    Ok(Json(DonationFormResponse {
        categories: data.categories,
        institutions: data
            .institutions
            .into_iter()
            .map(InstitutionResponse::from)
            .collect(),
    }))
}

// ── POST /add_donation/ ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DonationForm {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub bags: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub more_info: Option<String>,
}

pub async fn create_donation(
    session: SessionUser,
    State(state): State<AppState>,
    Form(form): Form<DonationForm>,
) -> Result<Redirect, DonationsServiceError> {
    let usecase = CreateDonationUseCase {
        categories: state.category_repo(),
        institutions: state.institution_repo(),
        donations: state.donation_repo(),
    };
    usecase
        .execute(
            session.user_id,
            CreateDonationInput {
                categories: form.categories,
                bags: form.bags,
                organization: form.organization,
                address: form.address,
                city: form.city,
                postcode: form.postcode,
                phone: form.phone,
                date: form.date,
                time: form.time,
                more_info: form.more_info,
            },
        )
        .await?;
    Ok(Redirect::to("/form_success/"))
}

// ── GET /form_success/ ───────────────────────────────────────────────────────

pub async fn form_success() -> Json<Notice> {
    Notice::success("Thank you for your donation. A courier will contact you about the pick-up.")
}
