use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use charity_domain::donation::DonationStatus;
use charity_domain::institution::InstitutionType;

/// Account as stored; `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Institution {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub institution_type: InstitutionType,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInstitution {
    pub name: String,
    pub description: String,
    pub institution_type: InstitutionType,
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct Donation {
    pub id: i32,
    pub quantity: i32,
    pub institution_id: i32,
    pub institution_name: String,
    pub categories: Vec<Category>,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub phone_number: String,
    pub pick_up_date: NaiveDate,
    pub pick_up_time: NaiveTime,
    pub pick_up_comment: Option<String>,
    pub user_id: Option<Uuid>,
    pub is_taken_by_user: bool,
    pub is_taken_by_courier: bool,
    pub courier_id: Option<Uuid>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated donation ready to be inserted with its category links.
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub quantity: i32,
    pub institution_id: i32,
    pub category_ids: Vec<i32>,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub phone_number: String,
    pub pick_up_date: NaiveDate,
    pub pick_up_time: NaiveTime,
    pub pick_up_comment: Option<String>,
    pub user_id: Uuid,
}

/// Profile listing filter. Empty search and `None` status match everything.
#[derive(Debug, Clone, Default)]
pub struct DonationFilter {
    pub search: Option<String>,
    pub status: Option<DonationStatus>,
}

/// Which single-use token table a token lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    EmailVerification,
    PasswordReset,
}

/// Single-use account token. `token` is a random UUID v4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountToken {
    pub id: Uuid,
    pub kind: TokenKind,
    pub user_id: Uuid,
    pub token: Uuid,
    pub created_at: DateTime<Utc>,
}

impl AccountToken {
    pub fn issue(kind: TokenKind, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            user_id,
            token: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProblemReport {
    pub user_id: Uuid,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ProblemReport {
    pub id: i32,
    pub user_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Kind of outbound email, stored as the outbox `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    AccountActivation,
    PasswordReset,
    ContactMessage,
}

impl MailKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountActivation => "account_activation",
            Self::PasswordReset => "password_reset",
            Self::ContactMessage => "contact_message",
        }
    }
}

/// A rendered email waiting to be handed to the mail relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub kind: MailKind,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    /// Deduplicates retries of the same logical message.
    pub idempotency_key: String,
}

/// An [`OutgoingMail`] as it is queued for the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMail {
    pub id: Uuid,
    pub kind: MailKind,
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub idempotency_key: String,
}

impl QueuedMail {
    pub fn new(mail: &OutgoingMail, sender: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: mail.kind,
            sender: sender.to_owned(),
            recipients: mail.to.clone(),
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            idempotency_key: mail.idempotency_key.clone(),
        }
    }
}

// ── Admin console ────────────────────────────────────────────────────────────

/// Entity types exposed through the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdminResourceKind {
    Categories,
    Institutions,
    Donations,
    ContactMessages,
    ProblemReports,
}

impl AdminResourceKind {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Institutions => "institutions",
            Self::Donations => "donations",
            Self::ContactMessages => "contact_messages",
            Self::ProblemReports => "problem_reports",
        }
    }

    /// Scalar columns, in the order rows render their cells and CSV writes them.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Categories => &["id", "name"],
            Self::Institutions => &["id", "name", "description", "type", "created_at"],
            Self::Donations => &[
                "id",
                "quantity",
                "institution",
                "address",
                "city",
                "zip_code",
                "phone_number",
                "pick_up_date",
                "pick_up_time",
                "pick_up_comment",
                "user",
                "is_taken_by_user",
                "is_taken_by_courier",
                "courier",
                "status",
                "created_at",
                "updated_at",
            ],
            Self::ContactMessages => &["id", "name", "surname", "email", "message", "created_at"],
            Self::ProblemReports => &["id", "user", "subject", "description", "created_at"],
        }
    }
}

impl fmt::Display for AdminResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A parsed, resource-specific list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminFilter {
    InstitutionType(InstitutionType),
    Status(DonationStatus),
    InstitutionId(i32),
    CategoryId(i32),
    PickUpDate(NaiveDate),
    TakenByCourier(bool),
}

#[derive(Debug, Clone, Default)]
pub struct AdminQuery {
    pub search: Option<String>,
    pub filters: Vec<AdminFilter>,
}

/// One admin row: primary key plus one rendered cell per registered column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    pub id: i32,
    pub cells: Vec<String>,
}

// ── Reporting ────────────────────────────────────────────────────────────────

/// Report filters; every `None` widens the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i32>,
    pub institution_id: Option<i32>,
    pub user_id: Option<Uuid>,
}

impl ReportFilter {
    /// Stable string identifying this exact filter combination.
    pub fn signature(&self) -> String {
        fn part<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }
        format!(
            "start={}|end={}|category={}|institution={}|user={}",
            part(&self.start_date),
            part(&self.end_date),
            part(&self.category_id),
            part(&self.institution_id),
            part(&self.user_id),
        )
    }
}

/// A labelled donation count (institution, category or donor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    ByInstitution,
    ByCategory,
    ByUser,
    PerDay,
}

impl ChartKind {
    pub const ALL: [Self; 4] = [
        Self::ByInstitution,
        Self::ByCategory,
        Self::ByUser,
        Self::PerDay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByInstitution => "donations_by_institution",
            Self::ByCategory => "donations_by_category",
            Self::ByUser => "donations_by_user",
            Self::PerDay => "donations_per_day",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ByInstitution => "Donations per institution",
            Self::ByCategory => "Donations per category",
            Self::ByUser => "Donations per user",
            Self::PerDay => "Donations per day",
        }
    }
}

/// Chart cache entry lifetime.
pub const CHART_CACHE_TTL_SECS: u64 = 15 * 60;
