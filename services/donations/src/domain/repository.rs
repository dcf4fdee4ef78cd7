#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use charity_domain::donation::DonationStatus;
use charity_domain::institution::InstitutionType;
use charity_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    AccountToken, AdminQuery, AdminResourceKind, AdminRow, Category, ContactMessage, DailyCount,
    Donation, DonationFilter, Institution, LabeledCount, NewContactMessage, NewDonation,
    NewInstitution, NewProblemReport, OutgoingMail, ProblemReport, ReportFilter, TokenKind, User,
};
use crate::error::DonationsServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DonationsServiceError>;

    /// Exact match on the stored (normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DonationsServiceError>;

    /// Insert an inactive user and its email verification token in one transaction.
    async fn create_with_verification(
        &self,
        user: &User,
        token: &AccountToken,
    ) -> Result<(), DonationsServiceError>;

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<(), DonationsServiceError>;

    async fn set_password(&self, id: Uuid, password_hash: &str)
    -> Result<(), DonationsServiceError>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DonationsServiceError>;

    /// Emails of every superuser, used as contact form recipients.
    async fn superuser_emails(&self) -> Result<Vec<String>, DonationsServiceError>;
}

/// Repository for single-use email verification and password reset tokens.
pub trait TokenRepository: Send + Sync {
    /// Store a token. For [`TokenKind::EmailVerification`] any previous token of
    /// the user is replaced so at most one stays live.
    async fn issue(&self, token: &AccountToken) -> Result<(), DonationsServiceError>;

    /// Atomically delete the matching verification token; on a match activate the
    /// user and sweep the user's remaining verification tokens.
    ///
    /// Returns `false` (and changes nothing) when no row matched.
    async fn consume_verification(
        &self,
        user_id: Uuid,
        token: Uuid,
    ) -> Result<bool, DonationsServiceError>;

    /// Atomically delete the matching reset token; on a match store the new
    /// password hash and sweep every outstanding reset token of the user.
    async fn consume_password_reset(
        &self,
        user_id: Uuid,
        token: Uuid,
        new_password_hash: &str,
    ) -> Result<bool, DonationsServiceError>;

    async fn count_for_user(
        &self,
        kind: TokenKind,
        user_id: Uuid,
    ) -> Result<u64, DonationsServiceError>;
}

/// Port for outbound email.
pub trait Mailer: Send + Sync {
    /// Hand a message over for delivery. Any failure is a delivery error.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DonationsServiceError>;
}

pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list_all(&self) -> Result<Vec<Category>, DonationsServiceError>;

    /// The subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, DonationsServiceError>;

    async fn name_taken(&self, name: &str) -> Result<bool, DonationsServiceError>;

    async fn create(&self, name: &str) -> Result<Category, DonationsServiceError>;
}

pub trait InstitutionRepository: Send + Sync {
    async fn count(&self) -> Result<u64, DonationsServiceError>;

    async fn exists(&self, id: i32) -> Result<bool, DonationsServiceError>;

    /// One page of institutions of a type, ordered by name, with categories.
    async fn page_by_type(
        &self,
        institution_type: InstitutionType,
        page: PageRequest,
    ) -> Result<Page<Institution>, DonationsServiceError>;

    /// Every institution ordered by name, with categories.
    async fn list_with_categories(&self) -> Result<Vec<Institution>, DonationsServiceError>;

    async fn name_taken(&self, name: &str) -> Result<bool, DonationsServiceError>;

    /// Insert the institution and its category links in one transaction.
    async fn create(
        &self,
        institution: &NewInstitution,
    ) -> Result<Institution, DonationsServiceError>;
}

pub trait DonationRepository: Send + Sync {
    /// Sum of all donation quantities; 0 when there are none.
    async fn total_quantity(&self) -> Result<i64, DonationsServiceError>;

    /// Insert the donation and its category links in one transaction.
    async fn create(&self, donation: &NewDonation) -> Result<i32, DonationsServiceError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Donation>, DonationsServiceError>;

    /// A user's donations ordered by `is_taken_by_user`, `pick_up_date`, `pick_up_time`.
    async fn page_for_user(
        &self,
        user_id: Uuid,
        filter: &DonationFilter,
        page: PageRequest,
    ) -> Result<Page<Donation>, DonationsServiceError>;

    /// Flip `is_taken_by_user` and return the new value.
    async fn toggle_taken_by_user(&self, id: i32) -> Result<bool, DonationsServiceError>;

    /// Returns `false` when the donation does not exist.
    async fn set_status(
        &self,
        id: i32,
        status: DonationStatus,
    ) -> Result<bool, DonationsServiceError>;

    /// Returns `false` when the donation does not exist.
    async fn set_courier(
        &self,
        id: i32,
        courier_id: Option<Uuid>,
        is_taken_by_courier: bool,
    ) -> Result<bool, DonationsServiceError>;
}

pub trait ContactMessageRepository: Send + Sync {
    async fn create(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessage, DonationsServiceError>;
}

pub trait ProblemReportRepository: Send + Sync {
    async fn create(
        &self,
        report: &NewProblemReport,
    ) -> Result<ProblemReport, DonationsServiceError>;
}

/// Generic row access for the admin console.
pub trait AdminRepository: Send + Sync {
    async fn page(
        &self,
        kind: AdminResourceKind,
        query: &AdminQuery,
        page: PageRequest,
    ) -> Result<Page<AdminRow>, DonationsServiceError>;

    /// Every matching row, for CSV export.
    async fn all(
        &self,
        kind: AdminResourceKind,
        query: &AdminQuery,
    ) -> Result<Vec<AdminRow>, DonationsServiceError>;

    /// Delete rows by primary key. Returns the number of rows removed.
    async fn delete(
        &self,
        kind: AdminResourceKind,
        ids: &[i32],
    ) -> Result<u64, DonationsServiceError>;
}

/// Aggregate donation counts for the reporting view.
pub trait ReportRepository: Send + Sync {
    async fn count_by_institution(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError>;

    async fn count_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError>;

    async fn count_by_user(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError>;

    /// Donations per `created_at` day, ascending.
    async fn count_per_day(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<DailyCount>, DonationsServiceError>;
}

/// Short-lived cache of rendered charts (Redis, 15 minute TTL).
pub trait ChartCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DonationsServiceError>;

    async fn set(&self, key: &str, data_uri: &str) -> Result<(), DonationsServiceError>;
}

/// Draws aggregate counts as SVG documents.
pub trait ChartRenderer: Send + Sync {
    fn bar_chart(&self, title: &str, data: &[LabeledCount]) -> Result<String, DonationsServiceError>;

    fn line_chart(&self, title: &str, data: &[DailyCount]) -> Result<String, DonationsServiceError>;
}
