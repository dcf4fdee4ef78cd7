use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use charity_domain::donation::{
    ADDRESS_MAX_LEN, CITY_MAX_LEN, DonationStatus, MIN_QUANTITY, ZIP_CODE_MAX_LEN,
    is_valid_phone_number, is_valid_quantity,
};
use charity_domain::pagination::{DONATIONS_PER_PAGE, Page, PageRequest};

use crate::domain::repository::{
    CategoryRepository, DonationRepository, InstitutionRepository, UserRepository,
};
use crate::domain::types::{Category, Donation, DonationFilter, Institution, NewDonation, User};
use crate::error::{DonationsServiceError, FieldErrors};

const REQUIRED: &str = "This field is required.";

// ── Form data ────────────────────────────────────────────────────────────────

pub struct DonationFormData {
    pub categories: Vec<Category>,
    pub institutions: Vec<Institution>,
}

pub struct GetDonationFormUseCase<C, I>
where
    C: CategoryRepository,
    I: InstitutionRepository,
{
    pub categories: C,
    pub institutions: I,
}

impl<C, I> GetDonationFormUseCase<C, I>
where
    C: CategoryRepository,
    I: InstitutionRepository,
{
    pub async fn execute(&self) -> Result<DonationFormData, DonationsServiceError> {
        Ok(DonationFormData {
            categories: self.categories.list_all().await?,
            institutions: self.institutions.list_with_categories().await?,
        })
    }
}

// ── Create ───────────────────────────────────────────────────────────────────

/// Raw donation form fields, named as the form posts them.
#[derive(Debug, Default, Clone)]
pub struct CreateDonationInput {
    pub categories: Vec<String>,
    pub bags: String,
    pub organization: String,
    pub address: String,
    pub city: String,
    pub postcode: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub more_info: Option<String>,
}

pub struct CreateDonationUseCase<C, I, D>
where
    C: CategoryRepository,
    I: InstitutionRepository,
    D: DonationRepository,
{
    pub categories: C,
    pub institutions: I,
    pub donations: D,
}

impl<C, I, D> CreateDonationUseCase<C, I, D>
where
    C: CategoryRepository,
    I: InstitutionRepository,
    D: DonationRepository,
{
    /// Validate every field, then insert the donation with its categories.
    ///
    /// Nothing is written unless all checks pass.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreateDonationInput,
    ) -> Result<i32, DonationsServiceError> {
        let today = Utc::now().date_naive();
        let (mut donation, errors) = parse_donation(user_id, input, today);
        errors.into_result()?;

        if !self.institutions.exists(donation.institution_id).await? {
            return Err(DonationsServiceError::InstitutionNotFound);
        }

        let existing = self.categories.existing_ids(&donation.category_ids).await?;
        if let Some(missing) = donation
            .category_ids
            .iter()
            .find(|id| !existing.contains(id))
        {
            return Err(FieldErrors::single(
                "categories",
                format!("Select a valid choice. {missing} is not one of the available choices."),
            ));
        }
        donation.category_ids.sort_unstable();
        donation.category_ids.dedup();

        let id = self.donations.create(&donation).await?;
        tracing::info!(donation_id = id, %user_id, quantity = donation.quantity, "created donation");
        Ok(id)
    }
}

fn bounded_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        errors.check_max_chars(field, value, max);
    }
    value.to_owned()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Field-level checks. The returned donation is meaningful only when no errors were recorded.
fn parse_donation(
    user_id: Uuid,
    input: CreateDonationInput,
    today: NaiveDate,
) -> (NewDonation, FieldErrors) {
    let mut errors = FieldErrors::new();

    let mut category_ids = Vec::with_capacity(input.categories.len());
    for raw in input.categories.iter().filter(|c| !c.trim().is_empty()) {
        match raw.trim().parse::<i32>() {
            Ok(id) => category_ids.push(id),
            Err(_) => errors.add("categories", format!("\"{raw}\" is not a valid category.")),
        }
    }
    if category_ids.is_empty() && !errors.contains("categories") {
        errors.add("categories", "Select at least one category.");
    }

    let quantity = match input.bags.trim() {
        "" => {
            errors.add("bags", REQUIRED);
            0
        }
        raw => match raw.parse::<i32>() {
            Ok(q) if is_valid_quantity(q) => q,
            Ok(_) => {
                errors.add(
                    "bags",
                    format!("Ensure this value is greater than or equal to {MIN_QUANTITY}."),
                );
                0
            }
            Err(_) => {
                errors.add("bags", "Enter a whole number.");
                0
            }
        },
    };

    let institution_id = match input.organization.trim() {
        "" => {
            errors.add("organization", REQUIRED);
            0
        }
        raw => raw.parse::<i32>().unwrap_or_else(|_| {
            errors.add("organization", "Select a valid institution.");
            0
        }),
    };

    let address = bounded_text(&mut errors, "address", &input.address, ADDRESS_MAX_LEN);
    let city = bounded_text(&mut errors, "city", &input.city, CITY_MAX_LEN);
    let zip_code = bounded_text(&mut errors, "postcode", &input.postcode, ZIP_CODE_MAX_LEN);

    let phone_number = input.phone.trim().to_owned();
    if phone_number.is_empty() {
        errors.add("phone", REQUIRED);
    } else if !is_valid_phone_number(&phone_number) {
        errors.add("phone", "Enter a valid phone number.");
    }

    let pick_up_date = if input.date.trim().is_empty() {
        errors.add("date", REQUIRED);
        today
    } else {
        match parse_date(&input.date) {
            Some(date) if date < today => {
                errors.add("date", "Pick-up date cannot be in the past.");
                date
            }
            Some(date) => date,
            None => {
                errors.add("date", "Enter a valid date.");
                today
            }
        }
    };

    let pick_up_time = if input.time.trim().is_empty() {
        errors.add("time", REQUIRED);
        NaiveTime::MIN
    } else {
        parse_time(&input.time).unwrap_or_else(|| {
            errors.add("time", "Enter a valid time.");
            NaiveTime::MIN
        })
    };

    let pick_up_comment = input
        .more_info
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty());

    let donation = NewDonation {
        quantity,
        institution_id,
        category_ids,
        address,
        city,
        zip_code,
        phone_number,
        pick_up_date,
        pick_up_time,
        pick_up_comment,
        user_id,
    };
    (donation, errors)
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ProfileQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
}

pub struct ProfileView {
    pub user: User,
    pub donations: Page<Donation>,
    pub search: String,
    pub status: Option<DonationStatus>,
}

pub struct GetProfileUseCase<U, D>
where
    U: UserRepository,
    D: DonationRepository,
{
    pub users: U,
    pub donations: D,
}

impl<U, D> GetProfileUseCase<U, D>
where
    U: UserRepository,
    D: DonationRepository,
{
    /// The user's account data plus one page of their donations.
    ///
    /// An unknown `status` value is ignored rather than rejected.
    pub async fn execute(
        &self,
        user_id: Uuid,
        query: ProfileQuery,
    ) -> Result<ProfileView, DonationsServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DonationsServiceError::UserNotFound)?;

        let search = query.search.unwrap_or_default().trim().to_owned();
        let status = query.status.as_deref().and_then(DonationStatus::parse);
        let filter = DonationFilter {
            search: (!search.is_empty()).then(|| search.clone()),
            status,
        };
        let page = PageRequest::from_query(query.page.as_deref(), DONATIONS_PER_PAGE);
        let donations = self.donations.page_for_user(user.id, &filter, page).await?;

        Ok(ProfileView {
            user,
            donations,
            search,
            status,
        })
    }
}

// ── Toggle pickup flag ───────────────────────────────────────────────────────

pub struct ToggleTakenByUserUseCase<D: DonationRepository> {
    pub donations: D,
}

impl<D: DonationRepository> ToggleTakenByUserUseCase<D> {
    /// Flip `is_taken_by_user` on a donation owned by `user_id`. Returns the new value.
    pub async fn execute(&self, user_id: Uuid, donation_id: i32) -> Result<bool, DonationsServiceError> {
        let donation = self
            .donations
            .find_by_id(donation_id)
            .await?
            .ok_or(DonationsServiceError::DonationNotFound)?;
        if donation.user_id != Some(user_id) {
            return Err(DonationsServiceError::NotOwner);
        }
        self.donations.toggle_taken_by_user(donation.id).await
    }
}
