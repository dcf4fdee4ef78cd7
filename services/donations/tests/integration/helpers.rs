#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use charity_domain::donation::DonationStatus;
use charity_domain::institution::InstitutionType;
use charity_domain::pagination::{Page, PageInfo, PageRequest};

use charity_donations::domain::repository::{
    AdminRepository, CategoryRepository, ChartCache, ChartRenderer, ContactMessageRepository,
    DonationRepository, InstitutionRepository, Mailer, ProblemReportRepository, ReportRepository,
    TokenRepository, UserRepository,
};
use charity_donations::domain::types::{
    AccountToken, AdminQuery, AdminResourceKind, AdminRow, Category, ContactMessage, DailyCount,
    Donation, DonationFilter, Institution, LabeledCount, NewContactMessage, NewDonation,
    NewInstitution, NewProblemReport, OutgoingMail, ProblemReport, ReportFilter, TokenKind, User,
};
use charity_donations::error::DonationsServiceError;
use charity_donations::usecase::credentials::hash_password;
use charity_donations::usecase::mail::SiteLinks;

pub const PASSWORD: &str = "Zaq1@wsxCde3";

pub fn links() -> SiteLinks {
    SiteLinks::new("charity.test")
}

pub fn test_user(email: &str) -> User {
    User {
        id: Uuid::now_v7(),
        email: email.to_owned(),
        first_name: "Anna".to_owned(),
        last_name: "Kowalska".to_owned(),
        password_hash: hash_password(PASSWORD).unwrap(),
        is_active: true,
        is_superuser: false,
        date_joined: Utc::now(),
        last_login: None,
    }
}

pub fn superuser(email: &str) -> User {
    User {
        is_superuser: true,
        ..test_user(email)
    }
}

/// Pull `(uidb64, token)` out of an emailed link ending in `/{uidb64}/{token}/`.
pub fn link_parts(body: &str) -> (String, String) {
    let url = body
        .split_whitespace()
        .find(|w| w.starts_with("https://"))
        .expect("mail contains a link");
    let mut parts = url.trim_end_matches('/').rsplit('/');
    let token = parts.next().unwrap().to_owned();
    let uid = parts.next().unwrap().to_owned();
    (uid, token)
}

// ── MockStore ────────────────────────────────────────────────────────────────

/// In-memory tables shared by the mock repositories of one test.
#[derive(Clone, Default)]
pub struct MockStore {
    pub users: Arc<Mutex<Vec<User>>>,
    pub tokens: Arc<Mutex<Vec<AccountToken>>>,
    pub mails: Arc<Mutex<Vec<OutgoingMail>>>,
    pub categories: Arc<Mutex<Vec<Category>>>,
    pub institutions: Arc<Mutex<Vec<Institution>>>,
    pub donations: Arc<Mutex<Vec<Donation>>>,
    pub contact_messages: Arc<Mutex<Vec<ContactMessage>>>,
    pub problem_reports: Arc<Mutex<Vec<ProblemReport>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        *store.users.lock().unwrap() = users;
        store
    }

    pub fn user_repo(&self) -> MockUserRepo {
        MockUserRepo {
            store: self.clone(),
        }
    }

    pub fn token_repo(&self) -> MockTokenRepo {
        MockTokenRepo {
            store: self.clone(),
        }
    }

    pub fn mailer(&self) -> MockMailer {
        MockMailer {
            store: self.clone(),
            fail: false,
        }
    }

    pub fn failing_mailer(&self) -> MockMailer {
        MockMailer {
            store: self.clone(),
            fail: true,
        }
    }

    pub fn category_repo(&self) -> MockCategoryRepo {
        MockCategoryRepo {
            store: self.clone(),
        }
    }

    pub fn institution_repo(&self) -> MockInstitutionRepo {
        MockInstitutionRepo {
            store: self.clone(),
        }
    }

    pub fn donation_repo(&self) -> MockDonationRepo {
        MockDonationRepo {
            store: self.clone(),
        }
    }

    pub fn contact_message_repo(&self) -> MockContactMessageRepo {
        MockContactMessageRepo {
            store: self.clone(),
        }
    }

    pub fn problem_report_repo(&self) -> MockProblemReportRepo {
        MockProblemReportRepo {
            store: self.clone(),
        }
    }

    pub fn admin_repo(&self) -> MockAdminRepo {
        MockAdminRepo {
            store: self.clone(),
        }
    }

    pub fn add_category(&self, name: &str) -> Category {
        let mut categories = self.categories.lock().unwrap();
        let category = Category {
            id: categories.len() as i32 + 1,
            name: name.to_owned(),
        };
        categories.push(category.clone());
        category
    }

    pub fn add_institution(
        &self,
        name: &str,
        institution_type: InstitutionType,
        categories: Vec<Category>,
    ) -> Institution {
        let mut institutions = self.institutions.lock().unwrap();
        let institution = Institution {
            id: institutions.len() as i32 + 1,
            name: name.to_owned(),
            description: format!("{name} description"),
            institution_type,
            categories,
            created_at: Utc::now(),
        };
        institutions.push(institution.clone());
        institution
    }

    pub fn tokens_of(&self, kind: TokenKind, user_id: Uuid) -> Vec<AccountToken> {
        self.tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind == kind && t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub store: MockStore,
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DonationsServiceError> {
        Ok(self.store.user(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DonationsServiceError> {
        Ok(self
            .store
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_with_verification(
        &self,
        user: &User,
        token: &AccountToken,
    ) -> Result<(), DonationsServiceError> {
        self.store.users.lock().unwrap().push(user.clone());
        self.store.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<(), DonationsServiceError> {
        let mut users = self.store.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DonationsServiceError::UserNotFound)?;
        user.first_name = first_name.to_owned();
        user.last_name = last_name.to_owned();
        user.email = email.to_owned();
        Ok(())
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), DonationsServiceError> {
        if let Some(user) = self.store.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DonationsServiceError> {
        if let Some(user) = self.store.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn superuser_emails(&self) -> Result<Vec<String>, DonationsServiceError> {
        Ok(self
            .store
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.is_superuser && u.is_active)
            .map(|u| u.email.clone())
            .collect())
    }
}

// ── MockTokenRepo ────────────────────────────────────────────────────────────

pub struct MockTokenRepo {
    pub store: MockStore,
}

impl TokenRepository for MockTokenRepo {
    async fn issue(&self, token: &AccountToken) -> Result<(), DonationsServiceError> {
        let mut tokens = self.store.tokens.lock().unwrap();
        if token.kind == TokenKind::EmailVerification {
            tokens.retain(|t| !(t.kind == token.kind && t.user_id == token.user_id));
        }
        tokens.push(token.clone());
        Ok(())
    }

    async fn consume_verification(
        &self,
        user_id: Uuid,
        token: Uuid,
    ) -> Result<bool, DonationsServiceError> {
        let mut tokens = self.store.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| {
            !(t.kind == TokenKind::EmailVerification && t.user_id == user_id && t.token == token)
        });
        if tokens.len() == before {
            return Ok(false);
        }
        tokens.retain(|t| !(t.kind == TokenKind::EmailVerification && t.user_id == user_id));
        if let Some(user) = self.store.users.lock().unwrap().iter_mut().find(|u| u.id == user_id) {
            user.is_active = true;
        }
        Ok(true)
    }

    async fn consume_password_reset(
        &self,
        user_id: Uuid,
        token: Uuid,
        new_password_hash: &str,
    ) -> Result<bool, DonationsServiceError> {
        let mut tokens = self.store.tokens.lock().unwrap();
        let matched = tokens.iter().any(|t| {
            t.kind == TokenKind::PasswordReset && t.user_id == user_id && t.token == token
        });
        if !matched {
            return Ok(false);
        }
        tokens.retain(|t| !(t.kind == TokenKind::PasswordReset && t.user_id == user_id));
        if let Some(user) = self.store.users.lock().unwrap().iter_mut().find(|u| u.id == user_id) {
            user.password_hash = new_password_hash.to_owned();
        }
        Ok(true)
    }

    async fn count_for_user(
        &self,
        kind: TokenKind,
        user_id: Uuid,
    ) -> Result<u64, DonationsServiceError> {
        Ok(self.store.tokens_of(kind, user_id).len() as u64)
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

pub struct MockMailer {
    pub store: MockStore,
    pub fail: bool,
}

impl Mailer for MockMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DonationsServiceError> {
        if self.fail {
            return Err(DonationsServiceError::MailDelivery(anyhow::anyhow!(
                "relay unavailable"
            )));
        }
        self.store.mails.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

// ── MockCategoryRepo ─────────────────────────────────────────────────────────

pub struct MockCategoryRepo {
    pub store: MockStore,
}

impl CategoryRepository for MockCategoryRepo {
    async fn list_all(&self) -> Result<Vec<Category>, DonationsServiceError> {
        let mut categories = self.store.categories.lock().unwrap().clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, DonationsServiceError> {
        Ok(self
            .store
            .categories
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn name_taken(&self, name: &str) -> Result<bool, DonationsServiceError> {
        Ok(self
            .store
            .categories
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.name == name))
    }

    async fn create(&self, name: &str) -> Result<Category, DonationsServiceError> {
        Ok(self.store.add_category(name))
    }
}

// ── MockInstitutionRepo ──────────────────────────────────────────────────────

pub struct MockInstitutionRepo {
    pub store: MockStore,
}

fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let info = PageInfo::resolve(request, items.len() as u64);
    let start = info.offset() as usize;
    let end = start + info.len() as usize;
    Page {
        items: items[start..end].to_vec(),
        info,
    }
}

impl InstitutionRepository for MockInstitutionRepo {
    async fn count(&self) -> Result<u64, DonationsServiceError> {
        Ok(self.store.institutions.lock().unwrap().len() as u64)
    }

    async fn exists(&self, id: i32) -> Result<bool, DonationsServiceError> {
        Ok(self
            .store
            .institutions
            .lock()
            .unwrap()
            .iter()
            .any(|i| i.id == id))
    }

    async fn page_by_type(
        &self,
        institution_type: InstitutionType,
        page: PageRequest,
    ) -> Result<Page<Institution>, DonationsServiceError> {
        let mut matching: Vec<Institution> = self
            .store
            .institutions
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.institution_type == institution_type)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(&matching, page))
    }

    async fn list_with_categories(&self) -> Result<Vec<Institution>, DonationsServiceError> {
        let mut all = self.store.institutions.lock().unwrap().clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn name_taken(&self, name: &str) -> Result<bool, DonationsServiceError> {
        Ok(self
            .store
            .institutions
            .lock()
            .unwrap()
            .iter()
            .any(|i| i.name == name))
    }

    async fn create(
        &self,
        institution: &NewInstitution,
    ) -> Result<Institution, DonationsServiceError> {
        let categories: Vec<Category> = self
            .store
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| institution.category_ids.contains(&c.id))
            .cloned()
            .collect();
        Ok(self.store.add_institution(
            &institution.name,
            institution.institution_type,
            categories,
        ))
    }
}

// ── MockDonationRepo ─────────────────────────────────────────────────────────

pub struct MockDonationRepo {
    pub store: MockStore,
}

impl MockDonationRepo {
    /// Insert a donation directly, bypassing validation.
    pub fn seed(&self, user_id: Uuid, institution: &Institution, quantity: i32, day: NaiveDate) -> i32 {
        let mut donations = self.store.donations.lock().unwrap();
        let id = donations.len() as i32 + 1;
        let now = Utc::now();
        donations.push(Donation {
            id,
            quantity,
            institution_id: institution.id,
            institution_name: institution.name.clone(),
            categories: institution.categories.clone(),
            address: "ul. Długa 5".to_owned(),
            city: "Kraków".to_owned(),
            zip_code: "30-001".to_owned(),
            phone_number: "+48123456789".to_owned(),
            pick_up_date: day,
            pick_up_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            pick_up_comment: None,
            user_id: Some(user_id),
            is_taken_by_user: false,
            is_taken_by_courier: false,
            courier_id: None,
            status: DonationStatus::Pending,
            created_at: now,
            updated_at: now,
        });
        id
    }
}

impl DonationRepository for MockDonationRepo {
    async fn total_quantity(&self) -> Result<i64, DonationsServiceError> {
        Ok(self
            .store
            .donations
            .lock()
            .unwrap()
            .iter()
            .map(|d| i64::from(d.quantity))
            .sum())
    }

    async fn create(&self, donation: &NewDonation) -> Result<i32, DonationsServiceError> {
        let institution_name = self
            .store
            .institutions
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == donation.institution_id)
            .map(|i| i.name.clone())
            .unwrap_or_default();
        let categories: Vec<Category> = self
            .store
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| donation.category_ids.contains(&c.id))
            .cloned()
            .collect();
        let mut donations = self.store.donations.lock().unwrap();
        let id = donations.len() as i32 + 1;
        let now = Utc::now();
        donations.push(Donation {
            id,
            quantity: donation.quantity,
            institution_id: donation.institution_id,
            institution_name,
            categories,
            address: donation.address.clone(),
            city: donation.city.clone(),
            zip_code: donation.zip_code.clone(),
            phone_number: donation.phone_number.clone(),
            pick_up_date: donation.pick_up_date,
            pick_up_time: donation.pick_up_time,
            pick_up_comment: donation.pick_up_comment.clone(),
            user_id: Some(donation.user_id),
            is_taken_by_user: false,
            is_taken_by_courier: false,
            courier_id: None,
            status: DonationStatus::Pending,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Donation>, DonationsServiceError> {
        Ok(self
            .store
            .donations
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn page_for_user(
        &self,
        user_id: Uuid,
        filter: &DonationFilter,
        page: PageRequest,
    ) -> Result<Page<Donation>, DonationsServiceError> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<Donation> = self
            .store
            .donations
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.user_id == Some(user_id))
            .filter(|d| filter.status.is_none_or(|s| d.status == s))
            .filter(|d| match &needle {
                None => true,
                Some(n) => {
                    d.institution_name.to_lowercase().contains(n)
                        || d.address.to_lowercase().contains(n)
                        || d.city.to_lowercase().contains(n)
                        || d.categories.iter().any(|c| c.name.to_lowercase().contains(n))
                }
            })
            .cloned()
            .collect();
        matching.sort_by_key(|d| (d.is_taken_by_user, d.pick_up_date, d.pick_up_time, d.id));
        Ok(paginate(&matching, page))
    }

    async fn toggle_taken_by_user(&self, id: i32) -> Result<bool, DonationsServiceError> {
        let mut donations = self.store.donations.lock().unwrap();
        let donation = donations
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(DonationsServiceError::DonationNotFound)?;
        donation.is_taken_by_user = !donation.is_taken_by_user;
        Ok(donation.is_taken_by_user)
    }

    async fn set_status(
        &self,
        id: i32,
        status: DonationStatus,
    ) -> Result<bool, DonationsServiceError> {
        let mut donations = self.store.donations.lock().unwrap();
        Ok(match donations.iter_mut().find(|d| d.id == id) {
            Some(d) => {
                d.status = status;
                true
            }
            None => false,
        })
    }

    async fn set_courier(
        &self,
        id: i32,
        courier_id: Option<Uuid>,
        is_taken_by_courier: bool,
    ) -> Result<bool, DonationsServiceError> {
        let mut donations = self.store.donations.lock().unwrap();
        Ok(match donations.iter_mut().find(|d| d.id == id) {
            Some(d) => {
                d.courier_id = courier_id;
                d.is_taken_by_courier = is_taken_by_courier;
                true
            }
            None => false,
        })
    }
}

// ── Contact messages / problem reports ───────────────────────────────────────

pub struct MockContactMessageRepo {
    pub store: MockStore,
}

impl ContactMessageRepository for MockContactMessageRepo {
    async fn create(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessage, DonationsServiceError> {
        let mut messages = self.store.contact_messages.lock().unwrap();
        let stored = ContactMessage {
            id: messages.len() as i32 + 1,
            name: message.name.clone(),
            surname: message.surname.clone(),
            email: message.email.clone(),
            message: message.message.clone(),
            created_at: Utc::now(),
        };
        messages.push(stored.clone());
        Ok(stored)
    }
}

pub struct MockProblemReportRepo {
    pub store: MockStore,
}

impl ProblemReportRepository for MockProblemReportRepo {
    async fn create(
        &self,
        report: &NewProblemReport,
    ) -> Result<ProblemReport, DonationsServiceError> {
        let mut reports = self.store.problem_reports.lock().unwrap();
        let stored = ProblemReport {
            id: reports.len() as i32 + 1,
            user_id: Some(report.user_id),
            subject: report.subject.clone(),
            description: report.description.clone(),
            created_at: Utc::now(),
        };
        reports.push(stored.clone());
        Ok(stored)
    }
}

// ── MockAdminRepo ────────────────────────────────────────────────────────────

/// Serves categories and contact messages from the store; other kinds are empty.
pub struct MockAdminRepo {
    pub store: MockStore,
}

impl MockAdminRepo {
    fn matching(&self, kind: AdminResourceKind, query: &AdminQuery) -> Vec<AdminRow> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let hit = |fields: &[&str]| match &needle {
            None => true,
            Some(n) => fields.iter().any(|f| f.to_lowercase().contains(n)),
        };
        match kind {
            AdminResourceKind::Categories => {
                let mut categories = self.store.categories.lock().unwrap().clone();
                categories.sort_by(|a, b| a.name.cmp(&b.name));
                categories
                    .into_iter()
                    .filter(|c| hit(&[&c.name]))
                    .map(|c| AdminRow {
                        id: c.id,
                        cells: vec![c.id.to_string(), c.name],
                    })
                    .collect()
            }
            AdminResourceKind::ContactMessages => self
                .store
                .contact_messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| hit(&[&m.name, &m.surname, &m.email, &m.message]))
                .map(|m| AdminRow {
                    id: m.id,
                    cells: vec![
                        m.id.to_string(),
                        m.name.clone(),
                        m.surname.clone(),
                        m.email.clone(),
                        m.message.clone(),
                        m.created_at.to_rfc3339(),
                    ],
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl AdminRepository for MockAdminRepo {
    async fn page(
        &self,
        kind: AdminResourceKind,
        query: &AdminQuery,
        page: PageRequest,
    ) -> Result<Page<AdminRow>, DonationsServiceError> {
        Ok(paginate(&self.matching(kind, query), page))
    }

    async fn all(
        &self,
        kind: AdminResourceKind,
        query: &AdminQuery,
    ) -> Result<Vec<AdminRow>, DonationsServiceError> {
        Ok(self.matching(kind, query))
    }

    async fn delete(
        &self,
        kind: AdminResourceKind,
        ids: &[i32],
    ) -> Result<u64, DonationsServiceError> {
        let removed = match kind {
            AdminResourceKind::Categories => {
                let mut categories = self.store.categories.lock().unwrap();
                let before = categories.len();
                categories.retain(|c| !ids.contains(&c.id));
                before - categories.len()
            }
            AdminResourceKind::ContactMessages => {
                let mut messages = self.store.contact_messages.lock().unwrap();
                let before = messages.len();
                messages.retain(|m| !ids.contains(&m.id));
                before - messages.len()
            }
            _ => 0,
        };
        Ok(removed as u64)
    }
}

// ── Reporting mocks ──────────────────────────────────────────────────────────

pub struct MockReportRepo {
    pub by_label: Vec<LabeledCount>,
    pub per_day: Vec<DailyCount>,
    pub filters_seen: Arc<Mutex<Vec<ReportFilter>>>,
}

impl MockReportRepo {
    pub fn new(by_label: Vec<LabeledCount>, per_day: Vec<DailyCount>) -> Self {
        Self {
            by_label,
            per_day,
            filters_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn seen(&self, filter: &ReportFilter) {
        self.filters_seen.lock().unwrap().push(filter.clone());
    }
}

impl ReportRepository for MockReportRepo {
    async fn count_by_institution(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError> {
        self.seen(filter);
        Ok(self.by_label.clone())
    }

    async fn count_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError> {
        self.seen(filter);
        Ok(self.by_label.clone())
    }

    async fn count_by_user(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError> {
        self.seen(filter);
        Ok(self.by_label.clone())
    }

    async fn count_per_day(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<DailyCount>, DonationsServiceError> {
        self.seen(filter);
        Ok(self.per_day.clone())
    }
}

#[derive(Clone, Default)]
pub struct MockChartCache {
    pub entries: Arc<Mutex<HashMap<String, String>>>,
    pub broken: bool,
}

impl MockChartCache {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
}

impl ChartCache for MockChartCache {
    async fn get(&self, key: &str) -> Result<Option<String>, DonationsServiceError> {
        if self.broken {
            return Err(DonationsServiceError::Internal(anyhow::anyhow!(
                "redis unreachable"
            )));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, data_uri: &str) -> Result<(), DonationsServiceError> {
        if self.broken {
            return Err(DonationsServiceError::Internal(anyhow::anyhow!(
                "redis unreachable"
            )));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), data_uri.to_owned());
        Ok(())
    }
}

/// Emits a tiny SVG naming the chart and counts how often it was asked to draw.
#[derive(Clone, Default)]
pub struct CountingRenderer {
    pub renders: Arc<AtomicUsize>,
}

impl CountingRenderer {
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl ChartRenderer for CountingRenderer {
    fn bar_chart(&self, title: &str, data: &[LabeledCount]) -> Result<String, DonationsServiceError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(format!("<svg><title>{title}</title><g>{}</g></svg>", data.len()))
    }

    fn line_chart(&self, title: &str, data: &[DailyCount]) -> Result<String, DonationsServiceError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(format!("<svg><title>{title}</title><g>{}</g></svg>", data.len()))
    }
}
