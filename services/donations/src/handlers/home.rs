use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use charity_domain::pagination::Page;

use crate::domain::types::{Category, Institution};
use crate::error::DonationsServiceError;
use crate::state::AppState;
use crate::usecase::home::{GetHomeUseCase, HomeQuery};

#[derive(Serialize)]
pub struct InstitutionResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub institution_type: &'static str,
    pub type_label: &'static str,
    pub categories: Vec<Category>,
}

impl From<Institution> for InstitutionResponse {
    fn from(institution: Institution) -> Self {
        Self {
            id: institution.id,
            name: institution.name,
            description: institution.description,
            institution_type: institution.institution_type.as_str(),
            type_label: institution.institution_type.label(),
            categories: institution.categories,
        }
    }
}

// ── GET / ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct HomeParams {
    pub page_foundations: Option<String>,
    pub page_ngos: Option<String>,
    pub page_local_collections: Option<String>,
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub total_bags: i64,
    pub supported_institutions: u64,
    pub foundations: Page<InstitutionResponse>,
    pub ngos: Page<InstitutionResponse>,
    pub local_collections: Page<InstitutionResponse>,
}

pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<HomeParams>,
) -> Result<Json<HomeResponse>, DonationsServiceError> {
    let usecase = GetHomeUseCase {
        institutions: state.institution_repo(),
        donations: state.donation_repo(),
    };
    let view = usecase
        .execute(HomeQuery {
            page_foundations: params.page_foundations,
            page_ngos: params.page_ngos,
            page_local_collections: params.page_local_collections,
        })
        .await?;
    Ok(Json(HomeResponse {
        total_bags: view.total_bags,
        supported_institutions: view.supported_institutions,
        foundations: view.foundations.map(InstitutionResponse::from),
        ngos: view.ngos.map(InstitutionResponse::from),
        local_collections: view.local_collections.map(InstitutionResponse::from),
    }))
}
