use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use charity_domain::pagination::Page;

use crate::domain::types::{AdminResourceKind, Category};
use crate::error::DonationsServiceError;
use crate::handlers::home::InstitutionResponse;
use crate::handlers::staff::Staff;
use crate::state::AppState;
use crate::usecase::admin::{
    AdminDeleteUseCase, AdminExportUseCase, AdminListUseCase, AdminResource, AssignCourierInput,
    AssignCourierUseCase, CreateCategoryUseCase, CreateInstitutionInput, CreateInstitutionUseCase,
    SetDonationStatusUseCase,
};

#[derive(Serialize)]
pub struct ResourceResponse {
    pub slug: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub filters: &'static [&'static str],
}

impl From<&AdminResource> for ResourceResponse {
    fn from(resource: &AdminResource) -> Self {
        Self {
            slug: resource.slug(),
            title: resource.title,
            columns: resource.columns(),
            search_fields: resource.search_fields,
            filters: resource.filters,
        }
    }
}

// ── GET /admin/ ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AdminIndexResponse {
    pub resources: Vec<ResourceResponse>,
}

pub async fn admin_index(
    _staff: Staff,
    State(state): State<AppState>,
) -> Json<AdminIndexResponse> {
    Json(AdminIndexResponse {
        resources: state.admin.resources().map(ResourceResponse::from).collect(),
    })
}

// ── GET /admin/{resource}/ ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AdminRowResponse {
    pub id: i32,
    pub cells: Vec<String>,
}

#[derive(Serialize)]
pub struct AdminListResponse {
    pub resource: ResourceResponse,
    pub search: Option<String>,
    pub rows: Page<AdminRowResponse>,
}

pub async fn list_rows(
    _staff: Staff,
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<AdminListResponse>, DonationsServiceError> {
    let usecase = AdminListUseCase {
        repo: state.admin_repo(),
        registry: state.admin.clone(),
    };
    let listing = usecase.execute(&resource, &params).await?;
    Ok(Json(AdminListResponse {
        resource: ResourceResponse::from(&listing.resource),
        search: listing.search,
        rows: listing.rows.map(|row| AdminRowResponse {
            id: row.id,
            cells: row.cells,
        }),
    }))
}

// ── GET /admin/{resource}/export/ ────────────────────────────────────────────

pub async fn export_csv(
    _staff: Staff,
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, DonationsServiceError> {
    let usecase = AdminExportUseCase {
        repo: state.admin_repo(),
        registry: state.admin.clone(),
    };
    let export = usecase.execute(&resource, &params).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    ))
}

// ── POST /admin/{resource}/delete/ ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
    pub deleted: u64,
}

pub async fn delete_rows(
    _staff: Staff,
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Json<DeleteResponse>, DonationsServiceError> {
    let usecase = AdminDeleteUseCase {
        repo: state.admin_repo(),
        registry: state.admin.clone(),
    };
    let deleted = usecase.execute(&resource, &form.ids).await?;
    Ok(Json(DeleteResponse {
        status: "success",
        deleted,
    }))
}

// ── POST /admin/{resource}/ ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateEntryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub institution_type: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum CreatedEntry {
    Category(Category),
    Institution(InstitutionResponse),
}

/// Categories and institutions can be created from the console; other
/// resources only arrive through the public site.
pub async fn create_entry(
    _staff: Staff,
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Form(form): Form<CreateEntryForm>,
) -> Result<impl IntoResponse, DonationsServiceError> {
    let kind = state
        .admin
        .get(&resource)
        .map(|r| r.kind)
        .ok_or(DonationsServiceError::UnknownResource)?;
    let created = match kind {
        AdminResourceKind::Categories => {
            let usecase = CreateCategoryUseCase {
                categories: state.category_repo(),
            };
            CreatedEntry::Category(usecase.execute(&form.name).await?)
        }
        AdminResourceKind::Institutions => {
            let usecase = CreateInstitutionUseCase {
                institutions: state.institution_repo(),
                categories: state.category_repo(),
            };
            let institution = usecase
                .execute(CreateInstitutionInput {
                    name: form.name,
                    description: form.description,
                    institution_type: form.institution_type,
                    categories: form.categories,
                })
                .await?;
            CreatedEntry::Institution(institution.into())
        }
        _ => return Err(DonationsServiceError::UnknownResource),
    };
    Ok((StatusCode::CREATED, Json(created)))
}

fn ensure_donations(resource: &str) -> Result<(), DonationsServiceError> {
    if resource == AdminResourceKind::Donations.slug() {
        Ok(())
    } else {
        Err(DonationsServiceError::UnknownResource)
    }
}

// ── POST /admin/donations/{id}/status/ ───────────────────────────────────────

#[derive(Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub donation_id: i32,
    pub donation_status: &'static str,
}

pub async fn set_donation_status(
    _staff: Staff,
    State(state): State<AppState>,
    Path((resource, donation_id)): Path<(String, i32)>,
    Form(form): Form<StatusForm>,
) -> Result<Json<StatusResponse>, DonationsServiceError> {
    ensure_donations(&resource)?;
    let usecase = SetDonationStatusUseCase {
        donations: state.donation_repo(),
    };
    let status = usecase.execute(donation_id, &form.status).await?;
    Ok(Json(StatusResponse {
        status: "success",
        donation_id,
        donation_status: status.as_str(),
    }))
}

// ── POST /admin/donations/{id}/courier/ ──────────────────────────────────────

#[derive(Deserialize)]
pub struct CourierForm {
    pub courier_id: Option<String>,
    pub is_taken_by_courier: Option<String>,
}

#[derive(Serialize)]
pub struct CourierResponse {
    pub status: &'static str,
    pub donation_id: i32,
    pub courier_id: Option<Uuid>,
    pub is_taken_by_courier: bool,
}

pub async fn assign_courier(
    _staff: Staff,
    State(state): State<AppState>,
    Path((resource, donation_id)): Path<(String, i32)>,
    Form(form): Form<CourierForm>,
) -> Result<Json<CourierResponse>, DonationsServiceError> {
    ensure_donations(&resource)?;
    let usecase = AssignCourierUseCase {
        donations: state.donation_repo(),
        users: state.user_repo(),
    };
    let assignment = usecase
        .execute(
            donation_id,
            AssignCourierInput {
                courier_id: form.courier_id,
                is_taken_by_courier: form.is_taken_by_courier,
            },
        )
        .await?;
    Ok(Json(CourierResponse {
        status: "success",
        donation_id,
        courier_id: assignment.courier_id,
        is_taken_by_courier: assignment.is_taken_by_courier,
    }))
}
