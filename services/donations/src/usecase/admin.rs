//! Administrative console operations, all behind a superuser check in the handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use charity_domain::donation::DonationStatus;
use charity_domain::institution::InstitutionType;
use charity_domain::pagination::{ADMIN_ROWS_PER_PAGE, Page, PageRequest};

use crate::domain::repository::{
    AdminRepository, CategoryRepository, DonationRepository, InstitutionRepository,
    UserRepository,
};
use crate::domain::types::{
    AdminFilter, AdminQuery, AdminResourceKind, AdminRow, Category, Institution, NewInstitution,
};
use crate::error::{DonationsServiceError, FieldErrors};

/// How one entity type is exposed in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminResource {
    pub kind: AdminResourceKind,
    pub title: &'static str,
    /// Fields matched by the `q` search parameter (informational for clients).
    pub search_fields: &'static [&'static str],
    /// Query parameters accepted as exact-match filters.
    pub filters: &'static [&'static str],
}

impl AdminResource {
    pub fn slug(&self) -> &'static str {
        self.kind.slug()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.kind.columns()
    }
}

/// Slug → resource table, filled by explicit `register` calls at startup.
#[derive(Debug, Clone, Default)]
pub struct AdminRegistry {
    resources: BTreeMap<&'static str, AdminResource>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under its slug, replacing any earlier registration.
    /// Returns the replaced entry.
    pub fn register(&mut self, resource: AdminResource) -> Option<AdminResource> {
        self.resources.insert(resource.slug(), resource)
    }

    pub fn get(&self, slug: &str) -> Option<&AdminResource> {
        self.resources.get(slug)
    }

    pub fn resources(&self) -> impl Iterator<Item = &AdminResource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The standard console: categories, institutions, donations, contact
    /// messages and problem reports.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(AdminResource {
            kind: AdminResourceKind::Categories,
            title: "Categories",
            search_fields: &["name"],
            filters: &[],
        });
        registry.register(AdminResource {
            kind: AdminResourceKind::Institutions,
            title: "Institutions",
            search_fields: &["name", "description", "type"],
            filters: &["type"],
        });
        registry.register(AdminResource {
            kind: AdminResourceKind::Donations,
            title: "Donations",
            search_fields: &["institution", "address", "city", "zip_code", "user"],
            filters: &[
                "status",
                "institution",
                "category",
                "pick_up_date",
                "is_taken_by_courier",
            ],
        });
        registry.register(AdminResource {
            kind: AdminResourceKind::ContactMessages,
            title: "Contact messages",
            search_fields: &["name", "surname", "email", "message"],
            filters: &[],
        });
        registry.register(AdminResource {
            kind: AdminResourceKind::ProblemReports,
            title: "Problem reports",
            search_fields: &["subject", "description"],
            filters: &[],
        });
        registry
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_filter(name: &str, raw: &str) -> Option<AdminFilter> {
    match name {
        "type" => InstitutionType::parse(raw).map(AdminFilter::InstitutionType),
        "status" => DonationStatus::parse(raw).map(AdminFilter::Status),
        "institution" => raw.parse().ok().map(AdminFilter::InstitutionId),
        "category" => raw.parse().ok().map(AdminFilter::CategoryId),
        "pick_up_date" => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(AdminFilter::PickUpDate),
        "is_taken_by_courier" => parse_bool(raw).map(AdminFilter::TakenByCourier),
        _ => None,
    }
}

/// Build a query from raw parameters. Parameters the resource does not register
/// as filters are ignored; registered ones must parse.
pub fn parse_admin_query(
    resource: &AdminResource,
    params: &HashMap<String, String>,
) -> Result<AdminQuery, DonationsServiceError> {
    let mut errors = FieldErrors::new();
    let mut filters = Vec::new();
    for &name in resource.filters {
        let Some(raw) = params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };
        match parse_filter(name, raw) {
            Some(filter) => filters.push(filter),
            None => errors.add(name, format!("Select a valid choice. {raw} is not one of the available choices.")),
        }
    }
    errors.into_result()?;

    let search = params
        .get("q")
        .map(|q| q.trim().to_owned())
        .filter(|q| !q.is_empty());
    Ok(AdminQuery { search, filters })
}

fn lookup(registry: &AdminRegistry, slug: &str) -> Result<AdminResource, DonationsServiceError> {
    registry
        .get(slug)
        .copied()
        .ok_or(DonationsServiceError::UnknownResource)
}

// ── List ─────────────────────────────────────────────────────────────────────

pub struct AdminListing {
    pub resource: AdminResource,
    pub search: Option<String>,
    pub rows: Page<AdminRow>,
}

pub struct AdminListUseCase<A: AdminRepository> {
    pub repo: A,
    pub registry: Arc<AdminRegistry>,
}

impl<A: AdminRepository> AdminListUseCase<A> {
    pub async fn execute(
        &self,
        slug: &str,
        params: &HashMap<String, String>,
    ) -> Result<AdminListing, DonationsServiceError> {
        let resource = lookup(&self.registry, slug)?;
        let query = parse_admin_query(&resource, params)?;
        let page = PageRequest::from_query(
            params.get("page").map(String::as_str),
            ADMIN_ROWS_PER_PAGE,
        );
        let rows = self.repo.page(resource.kind, &query, page).await?;
        Ok(AdminListing {
            resource,
            search: query.search,
            rows,
        })
    }
}

// ── CSV export ───────────────────────────────────────────────────────────────

/// Quote a CSV field when it contains a separator, quote or line break.
pub fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_owned()
    }
}

/// Header row first, then one line per row.
pub fn render_csv(columns: &[&str], rows: &[AdminRow]) -> String {
    let mut out = String::new();
    out.push_str(
        &columns
            .iter()
            .map(|c| csv_escape(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');
    for row in rows {
        out.push_str(
            &row.cells
                .iter()
                .map(|c| csv_escape(c))
                .collect::<Vec<_>>()
                .join(","),
        );
        out.push('\n');
    }
    out
}

pub struct AdminExport {
    pub filename: String,
    pub body: String,
}

pub struct AdminExportUseCase<A: AdminRepository> {
    pub repo: A,
    pub registry: Arc<AdminRegistry>,
}

impl<A: AdminRepository> AdminExportUseCase<A> {
    /// Every row matching the current search and filters as CSV.
    pub async fn execute(
        &self,
        slug: &str,
        params: &HashMap<String, String>,
    ) -> Result<AdminExport, DonationsServiceError> {
        let resource = lookup(&self.registry, slug)?;
        let query = parse_admin_query(&resource, params)?;
        let rows = self.repo.all(resource.kind, &query).await?;
        tracing::info!(resource = %resource.kind, rows = rows.len(), "exported csv");
        Ok(AdminExport {
            filename: format!("{}.csv", resource.slug()),
            body: render_csv(resource.columns(), &rows),
        })
    }
}

// ── Bulk delete ──────────────────────────────────────────────────────────────

pub struct AdminDeleteUseCase<A: AdminRepository> {
    pub repo: A,
    pub registry: Arc<AdminRegistry>,
}

impl<A: AdminRepository> AdminDeleteUseCase<A> {
    /// Delete the selected rows. Cascades follow the schema's foreign keys.
    pub async fn execute(&self, slug: &str, ids: &[String]) -> Result<u64, DonationsServiceError> {
        let resource = lookup(&self.registry, slug)?;
        let mut parsed = Vec::with_capacity(ids.len());
        for raw in ids {
            match raw.trim().parse::<i32>() {
                Ok(id) => parsed.push(id),
                Err(_) => return Err(FieldErrors::single("ids", format!("\"{raw}\" is not a valid id."))),
            }
        }
        if parsed.is_empty() {
            return Err(FieldErrors::single("ids", "Select at least one row."));
        }
        parsed.sort_unstable();
        parsed.dedup();

        let deleted = self.repo.delete(resource.kind, &parsed).await?;
        tracing::info!(resource = %resource.kind, requested = parsed.len(), deleted, "bulk delete");
        Ok(deleted)
    }
}

// ── Create category / institution ────────────────────────────────────────────

const MAX_NAME_LEN: usize = 255;

fn check_name(errors: &mut FieldErrors, name: &str) {
    if name.is_empty() {
        errors.add("name", "This field is required.");
    } else {
        errors.check_max_chars("name", name, MAX_NAME_LEN);
    }
}

pub struct CreateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> CreateCategoryUseCase<C> {
    pub async fn execute(&self, name: &str) -> Result<Category, DonationsServiceError> {
        let name = name.trim();
        let mut errors = FieldErrors::new();
        check_name(&mut errors, name);
        if errors.is_empty() && self.categories.name_taken(name).await? {
            errors.add("name", "Category with this name already exists.");
        }
        errors.into_result()?;
        self.categories.create(name).await
    }
}

#[derive(Debug, Default)]
pub struct CreateInstitutionInput {
    pub name: String,
    pub description: String,
    pub institution_type: String,
    pub categories: Vec<String>,
}

pub struct CreateInstitutionUseCase<I, C>
where
    I: InstitutionRepository,
    C: CategoryRepository,
{
    pub institutions: I,
    pub categories: C,
}

impl<I, C> CreateInstitutionUseCase<I, C>
where
    I: InstitutionRepository,
    C: CategoryRepository,
{
    pub async fn execute(
        &self,
        input: CreateInstitutionInput,
    ) -> Result<Institution, DonationsServiceError> {
        let name = input.name.trim();
        let description = input.description.trim();
        let mut errors = FieldErrors::new();

        check_name(&mut errors, name);
        if description.is_empty() {
            errors.add("description", "This field is required.");
        }
        let institution_type = match input.institution_type.trim() {
            "" => Some(InstitutionType::Foundation),
            raw => InstitutionType::parse(raw),
        };
        if institution_type.is_none() {
            errors.add("type", "Select a valid institution type.");
        }

        let mut category_ids = Vec::new();
        for raw in input.categories.iter().filter(|c| !c.trim().is_empty()) {
            match raw.trim().parse::<i32>() {
                Ok(id) => category_ids.push(id),
                Err(_) => errors.add("categories", format!("\"{raw}\" is not a valid category.")),
            }
        }
        category_ids.sort_unstable();
        category_ids.dedup();
        if !category_ids.is_empty() {
            let existing = self.categories.existing_ids(&category_ids).await?;
            for id in category_ids.iter().filter(|id| !existing.contains(id)) {
                errors.add(
                    "categories",
                    format!("Select a valid choice. {id} is not one of the available choices."),
                );
            }
        }
        if !errors.contains("name") && self.institutions.name_taken(name).await? {
            errors.add("name", "Institution with this name already exists.");
        }
        errors.into_result()?;

        let institution = self
            .institutions
            .create(&NewInstitution {
                name: name.to_owned(),
                description: description.to_owned(),
                institution_type: institution_type.unwrap_or(InstitutionType::Foundation),
                category_ids,
            })
            .await?;
        tracing::info!(institution_id = institution.id, "created institution");
        Ok(institution)
    }
}

// ── Donation lifecycle ───────────────────────────────────────────────────────

pub struct SetDonationStatusUseCase<D: DonationRepository> {
    pub donations: D,
}

impl<D: DonationRepository> SetDonationStatusUseCase<D> {
    pub async fn execute(
        &self,
        donation_id: i32,
        status: &str,
    ) -> Result<DonationStatus, DonationsServiceError> {
        let status = DonationStatus::parse(status.trim())
            .ok_or_else(|| FieldErrors::single("status", "Select a valid status."))?;
        if !self.donations.set_status(donation_id, status).await? {
            return Err(DonationsServiceError::DonationNotFound);
        }
        tracing::info!(donation_id, status = status.as_str(), "donation status changed");
        Ok(status)
    }
}

#[derive(Debug, Default)]
pub struct AssignCourierInput {
    /// Empty or absent clears the courier.
    pub courier_id: Option<String>,
    /// Absent toggles the current flag.
    pub is_taken_by_courier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierAssignment {
    pub courier_id: Option<Uuid>,
    pub is_taken_by_courier: bool,
}

pub struct AssignCourierUseCase<D, U>
where
    D: DonationRepository,
    U: UserRepository,
{
    pub donations: D,
    pub users: U,
}

impl<D, U> AssignCourierUseCase<D, U>
where
    D: DonationRepository,
    U: UserRepository,
{
    pub async fn execute(
        &self,
        donation_id: i32,
        input: AssignCourierInput,
    ) -> Result<CourierAssignment, DonationsServiceError> {
        let donation = self
            .donations
            .find_by_id(donation_id)
            .await?
            .ok_or(DonationsServiceError::DonationNotFound)?;

        let courier_id = match input.courier_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let id = Uuid::parse_str(raw)
                    .map_err(|_| FieldErrors::single("courier_id", "Enter a valid user id."))?;
                if self.users.find_by_id(id).await?.is_none() {
                    return Err(FieldErrors::single("courier_id", "Unknown user."));
                }
                Some(id)
            }
        };
        let is_taken_by_courier = match input.is_taken_by_courier.as_deref().map(str::trim) {
            None | Some("") => !donation.is_taken_by_courier,
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                FieldErrors::single("is_taken_by_courier", "Enter true or false.")
            })?,
        };

        if !self
            .donations
            .set_courier(donation.id, courier_id, is_taken_by_courier)
            .await?
        {
            return Err(DonationsServiceError::DonationNotFound);
        }
        Ok(CourierAssignment {
            courier_id,
            is_taken_by_courier,
        })
    }
}
