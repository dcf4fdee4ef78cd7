use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sea_orm::sea_query::{Expr, OnConflict, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, SqlErr, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use charity_core::sea_ext::icontains;
use charity_domain::donation::DonationStatus;
use charity_domain::institution::InstitutionType;
use charity_domain::pagination::{Page, PageInfo, PageRequest};
use charity_donations_schema::{
    categories, contact_messages, donation_categories, donations, email_verification_tokens,
    institution_categories, institutions, password_reset_tokens, problem_reports, users,
};

use crate::domain::repository::{
    AdminRepository, CategoryRepository, ContactMessageRepository, DonationRepository,
    InstitutionRepository, ProblemReportRepository, ReportRepository, TokenRepository,
    UserRepository,
};
use crate::domain::types::{
    AccountToken, AdminFilter, AdminQuery, AdminResourceKind, AdminRow, Category, ContactMessage,
    DailyCount, Donation, DonationFilter, Institution, LabeledCount, NewContactMessage,
    NewDonation, NewInstitution, NewProblemReport, ProblemReport, ReportFilter, TokenKind, User,
};
use crate::error::{DonationsServiceError, FieldErrors};
use crate::usecase::account::EMAIL_TAKEN;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DonationsServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DonationsServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create_with_verification(
        &self,
        user: &User,
        token: &AccountToken,
    ) -> Result<(), DonationsServiceError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let user = user.clone();
                let token = token.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id),
                        email: Set(user.email),
                        first_name: Set(user.first_name),
                        last_name: Set(user.last_name),
                        password_hash: Set(user.password_hash),
                        is_active: Set(user.is_active),
                        is_superuser: Set(user.is_superuser),
                        date_joined: Set(user.date_joined),
                        last_login: Set(user.last_login),
                    }
                    .insert(txn)
                    .await?;
                    email_verification_tokens::ActiveModel {
                        id: Set(token.id),
                        user_id: Set(token.user_id),
                        token: Set(token.token),
                        created_at: Set(token.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            // Lost a race with a concurrent registration for the same email.
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                Err(FieldErrors::single("email", EMAIL_TAKEN))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("create user with verification token")
                .into()),
        }
    }

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<(), DonationsServiceError> {
        let result = users::ActiveModel {
            id: Set(id),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            email: Set(email.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(FieldErrors::single("email", EMAIL_TAKEN)),
            Err(DbErr::RecordNotUpdated) => Err(DonationsServiceError::UserNotFound),
            Err(e) => Err(anyhow::Error::new(e).context("update user profile").into()),
        }
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), DonationsServiceError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user password")?;
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DonationsServiceError> {
        users::ActiveModel {
            id: Set(id),
            last_login: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record user login")?;
        Ok(())
    }

    async fn superuser_emails(&self) -> Result<Vec<String>, DonationsServiceError> {
        let emails = users::Entity::find()
            .select_only()
            .column(users::Column::Email)
            .filter(users::Column::IsSuperuser.eq(true))
            .filter(users::Column::IsActive.eq(true))
            .order_by_asc(users::Column::Email)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .context("list superuser emails")?;
        Ok(emails)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        is_active: model.is_active,
        is_superuser: model.is_superuser,
        date_joined: model.date_joined,
        last_login: model.last_login,
    }
}

// ── Token repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

impl TokenRepository for DbTokenRepository {
    async fn issue(&self, token: &AccountToken) -> Result<(), DonationsServiceError> {
        match token.kind {
            TokenKind::EmailVerification => {
                email_verification_tokens::Entity::insert(email_verification_tokens::ActiveModel {
                    id: Set(token.id),
                    user_id: Set(token.user_id),
                    token: Set(token.token),
                    created_at: Set(token.created_at),
                })
                .on_conflict(
                    OnConflict::column(email_verification_tokens::Column::UserId)
                        .update_columns([
                            email_verification_tokens::Column::Id,
                            email_verification_tokens::Column::Token,
                            email_verification_tokens::Column::CreatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
                .context("issue email verification token")?;
            }
            TokenKind::PasswordReset => {
                password_reset_tokens::ActiveModel {
                    id: Set(token.id),
                    user_id: Set(token.user_id),
                    token: Set(token.token),
                    created_at: Set(token.created_at),
                }
                .insert(&self.db)
                .await
                .context("issue password reset token")?;
            }
        }
        Ok(())
    }

    async fn consume_verification(
        &self,
        user_id: Uuid,
        token: Uuid,
    ) -> Result<bool, DonationsServiceError> {
        let consumed = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let deleted = email_verification_tokens::Entity::delete_many()
                        .filter(email_verification_tokens::Column::UserId.eq(user_id))
                        .filter(email_verification_tokens::Column::Token.eq(token))
                        .exec(txn)
                        .await?;
                    if deleted.rows_affected == 0 {
                        return Ok(false);
                    }
                    users::Entity::update_many()
                        .col_expr(users::Column::IsActive, Expr::value(true))
                        .filter(users::Column::Id.eq(user_id))
                        .exec(txn)
                        .await?;
                    email_verification_tokens::Entity::delete_many()
                        .filter(email_verification_tokens::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    Ok(true)
                })
            })
            .await
            .context("consume email verification token")?;
        Ok(consumed)
    }

    async fn consume_password_reset(
        &self,
        user_id: Uuid,
        token: Uuid,
        new_password_hash: &str,
    ) -> Result<bool, DonationsServiceError> {
        let consumed = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let new_password_hash = new_password_hash.to_owned();
                Box::pin(async move {
                    let deleted = password_reset_tokens::Entity::delete_many()
                        .filter(password_reset_tokens::Column::UserId.eq(user_id))
                        .filter(password_reset_tokens::Column::Token.eq(token))
                        .exec(txn)
                        .await?;
                    if deleted.rows_affected == 0 {
                        return Ok(false);
                    }
                    users::Entity::update_many()
                        .col_expr(users::Column::PasswordHash, Expr::value(new_password_hash))
                        .filter(users::Column::Id.eq(user_id))
                        .exec(txn)
                        .await?;
                    password_reset_tokens::Entity::delete_many()
                        .filter(password_reset_tokens::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    Ok(true)
                })
            })
            .await
            .context("consume password reset token")?;
        Ok(consumed)
    }

    async fn count_for_user(
        &self,
        kind: TokenKind,
        user_id: Uuid,
    ) -> Result<u64, DonationsServiceError> {
        let count = match kind {
            TokenKind::EmailVerification => email_verification_tokens::Entity::find()
                .filter(email_verification_tokens::Column::UserId.eq(user_id))
                .count(&self.db)
                .await,
            TokenKind::PasswordReset => password_reset_tokens::Entity::find()
                .filter(password_reset_tokens::Column::UserId.eq(user_id))
                .count(&self.db)
                .await,
        }
        .context("count account tokens")?;
        Ok(count)
    }
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, DonationsServiceError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, DonationsServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = categories::Entity::find()
            .select_only()
            .column(categories::Column::Id)
            .filter(categories::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .context("find existing category ids")?;
        Ok(found)
    }

    async fn name_taken(&self, name: &str) -> Result<bool, DonationsServiceError> {
        let count = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .count(&self.db)
            .await
            .context("check category name")?;
        Ok(count > 0)
    }

    async fn create(&self, name: &str) -> Result<Category, DonationsServiceError> {
        let result = categories::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(category_from_model(model)),
            Err(e) if is_unique_violation(&e) => Err(FieldErrors::single(
                "name",
                "Category with this name already exists.",
            )),
            Err(e) => Err(anyhow::Error::new(e).context("create category").into()),
        }
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
    }
}

// ── Institution repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbInstitutionRepository {
    pub db: DatabaseConnection,
}

/// Categories of each institution, ordered by name.
async fn institution_categories_of<C: ConnectionTrait>(
    db: &C,
    institution_ids: &[i32],
) -> Result<HashMap<i32, Vec<Category>>, DbErr> {
    let mut by_institution: HashMap<i32, Vec<Category>> = HashMap::new();
    if institution_ids.is_empty() {
        return Ok(by_institution);
    }
    let links = institution_categories::Entity::find()
        .filter(institution_categories::Column::InstitutionId.is_in(institution_ids.iter().copied()))
        .find_also_related(categories::Entity)
        .all(db)
        .await?;
    for (link, category) in links {
        if let Some(category) = category {
            by_institution
                .entry(link.institution_id)
                .or_default()
                .push(category_from_model(category));
        }
    }
    for list in by_institution.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(by_institution)
}

async fn institutions_with_categories<C: ConnectionTrait>(
    db: &C,
    models: Vec<institutions::Model>,
) -> Result<Vec<Institution>, DbErr> {
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut categories = institution_categories_of(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let cats = categories.remove(&m.id).unwrap_or_default();
            institution_from_model(m, cats)
        })
        .collect())
}

fn institution_from_model(model: institutions::Model, categories: Vec<Category>) -> Institution {
    Institution {
        id: model.id,
        name: model.name,
        description: model.description,
        institution_type: InstitutionType::parse(&model.institution_type)
            .unwrap_or(InstitutionType::Foundation),
        categories,
        created_at: model.created_at,
    }
}

impl InstitutionRepository for DbInstitutionRepository {
    async fn count(&self) -> Result<u64, DonationsServiceError> {
        let count = institutions::Entity::find()
            .count(&self.db)
            .await
            .context("count institutions")?;
        Ok(count)
    }

    async fn exists(&self, id: i32) -> Result<bool, DonationsServiceError> {
        let count = institutions::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .context("check institution exists")?;
        Ok(count > 0)
    }

    async fn page_by_type(
        &self,
        institution_type: InstitutionType,
        page: PageRequest,
    ) -> Result<Page<Institution>, DonationsServiceError> {
        let query = institutions::Entity::find()
            .filter(institutions::Column::InstitutionType.eq(institution_type.as_str()));
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count institutions by type")?;
        let info = PageInfo::resolve(page, total);
        let models = query
            .order_by_asc(institutions::Column::Name)
            .order_by_asc(institutions::Column::Id)
            .offset(info.offset())
            .limit(info.per_page)
            .all(&self.db)
            .await
            .context("list institutions by type")?;
        let items = institutions_with_categories(&self.db, models)
            .await
            .context("load institution categories")?;
        Ok(Page { items, info })
    }

    async fn list_with_categories(&self) -> Result<Vec<Institution>, DonationsServiceError> {
        let models = institutions::Entity::find()
            .order_by_asc(institutions::Column::Name)
            .all(&self.db)
            .await
            .context("list institutions")?;
        let items = institutions_with_categories(&self.db, models)
            .await
            .context("load institution categories")?;
        Ok(items)
    }

    async fn name_taken(&self, name: &str) -> Result<bool, DonationsServiceError> {
        let count = institutions::Entity::find()
            .filter(institutions::Column::Name.eq(name))
            .count(&self.db)
            .await
            .context("check institution name")?;
        Ok(count > 0)
    }

    async fn create(
        &self,
        institution: &NewInstitution,
    ) -> Result<Institution, DonationsServiceError> {
        let result = self
            .db
            .transaction::<_, Institution, DbErr>(|txn| {
                let institution = institution.clone();
                Box::pin(async move {
                    let model = institutions::ActiveModel {
                        name: Set(institution.name),
                        description: Set(institution.description),
                        institution_type: Set(institution.institution_type.as_str().to_owned()),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    if !institution.category_ids.is_empty() {
                        institution_categories::Entity::insert_many(
                            institution.category_ids.iter().map(|&category_id| {
                                institution_categories::ActiveModel {
                                    institution_id: Set(model.id),
                                    category_id: Set(category_id),
                                }
                            }),
                        )
                        .exec(txn)
                        .await?;
                    }
                    let mut created = institutions_with_categories(txn, vec![model]).await?;
                    created
                        .pop()
                        .ok_or_else(|| DbErr::Custom("created institution vanished".to_owned()))
                })
            })
            .await;

        match result {
            Ok(institution) => Ok(institution),
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => Err(
                FieldErrors::single("name", "Institution with this name already exists."),
            ),
            Err(e) => Err(anyhow::Error::new(e).context("create institution").into()),
        }
    }
}

// ── Donation repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDonationRepository {
    pub db: DatabaseConnection,
}

async fn donation_categories_of<C: ConnectionTrait>(
    db: &C,
    donation_ids: &[i32],
) -> Result<HashMap<i32, Vec<Category>>, DbErr> {
    let mut by_donation: HashMap<i32, Vec<Category>> = HashMap::new();
    if donation_ids.is_empty() {
        return Ok(by_donation);
    }
    let links = donation_categories::Entity::find()
        .filter(donation_categories::Column::DonationId.is_in(donation_ids.iter().copied()))
        .find_also_related(categories::Entity)
        .all(db)
        .await?;
    for (link, category) in links {
        if let Some(category) = category {
            by_donation
                .entry(link.donation_id)
                .or_default()
                .push(category_from_model(category));
        }
    }
    for list in by_donation.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(by_donation)
}

async fn donations_with_relations<C: ConnectionTrait>(
    db: &C,
    rows: Vec<(donations::Model, Option<institutions::Model>)>,
) -> Result<Vec<Donation>, DbErr> {
    let ids: Vec<i32> = rows.iter().map(|(d, _)| d.id).collect();
    let mut categories = donation_categories_of(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|(model, institution)| {
            let cats = categories.remove(&model.id).unwrap_or_default();
            donation_from_model(model, institution.map(|i| i.name).unwrap_or_default(), cats)
        })
        .collect())
}

fn donation_from_model(
    model: donations::Model,
    institution_name: String,
    categories: Vec<Category>,
) -> Donation {
    Donation {
        id: model.id,
        quantity: model.quantity,
        institution_id: model.institution_id,
        institution_name,
        categories,
        address: model.address,
        city: model.city,
        zip_code: model.zip_code,
        phone_number: model.phone_number,
        pick_up_date: model.pick_up_date,
        pick_up_time: model.pick_up_time,
        pick_up_comment: model.pick_up_comment,
        user_id: model.user_id,
        is_taken_by_user: model.is_taken_by_user,
        is_taken_by_courier: model.is_taken_by_courier,
        courier_id: model.courier_id,
        status: DonationStatus::parse(&model.status).unwrap_or_default(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// `SELECT donation_id FROM donation_categories JOIN categories ... WHERE <cond>`.
fn donation_ids_by_category(cond: SimpleExpr) -> SelectStatement {
    Query::select()
        .column((donation_categories::Entity, donation_categories::Column::DonationId))
        .from(donation_categories::Entity)
        .inner_join(
            categories::Entity,
            Expr::col((categories::Entity, categories::Column::Id))
                .equals((donation_categories::Entity, donation_categories::Column::CategoryId)),
        )
        .and_where(cond)
        .to_owned()
}

fn institution_ids_matching(needle: &str) -> SelectStatement {
    Query::select()
        .column(institutions::Column::Id)
        .from(institutions::Entity)
        .and_where(icontains((institutions::Entity, institutions::Column::Name), needle))
        .to_owned()
}

fn user_ids_matching(needle: &str) -> SelectStatement {
    Query::select()
        .column(users::Column::Id)
        .from(users::Entity)
        .and_where(icontains((users::Entity, users::Column::Email), needle))
        .to_owned()
}

impl DonationRepository for DbDonationRepository {
    async fn total_quantity(&self) -> Result<i64, DonationsServiceError> {
        let total = donations::Entity::find()
            .select_only()
            .column_as(Expr::col(donations::Column::Quantity).sum(), "total")
            .into_tuple::<Option<i64>>()
            .one(&self.db)
            .await
            .context("sum donation quantities")?;
        Ok(total.flatten().unwrap_or(0))
    }

    async fn create(&self, donation: &NewDonation) -> Result<i32, DonationsServiceError> {
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                let donation = donation.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let model = donations::ActiveModel {
                        quantity: Set(donation.quantity),
                        institution_id: Set(donation.institution_id),
                        address: Set(donation.address),
                        city: Set(donation.city),
                        zip_code: Set(donation.zip_code),
                        phone_number: Set(donation.phone_number),
                        pick_up_date: Set(donation.pick_up_date),
                        pick_up_time: Set(donation.pick_up_time),
                        pick_up_comment: Set(donation.pick_up_comment),
                        user_id: Set(Some(donation.user_id)),
                        is_taken_by_user: Set(false),
                        is_taken_by_courier: Set(false),
                        courier_id: Set(None),
                        status: Set(DonationStatus::Pending.as_str().to_owned()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    if !donation.category_ids.is_empty() {
                        donation_categories::Entity::insert_many(donation.category_ids.iter().map(
                            |&category_id| donation_categories::ActiveModel {
                                donation_id: Set(model.id),
                                category_id: Set(category_id),
                            },
                        ))
                        .exec(txn)
                        .await?;
                    }
                    Ok(model.id)
                })
            })
            .await
            .context("create donation with categories")?;
        Ok(id)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Donation>, DonationsServiceError> {
        let row = donations::Entity::find_by_id(id)
            .find_also_related(institutions::Entity)
            .one(&self.db)
            .await
            .context("find donation by id")?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut found = donations_with_relations(&self.db, vec![row])
            .await
            .context("load donation categories")?;
        Ok(found.pop())
    }

    async fn page_for_user(
        &self,
        user_id: Uuid,
        filter: &DonationFilter,
        page: PageRequest,
    ) -> Result<Page<Donation>, DonationsServiceError> {
        let mut query = donations::Entity::find().filter(donations::Column::UserId.eq(user_id));
        if let Some(status) = filter.status {
            query = query.filter(donations::Column::Status.eq(status.as_str()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(donations::Column::InstitutionId.in_subquery(institution_ids_matching(search)))
                    .add(donations::Column::Id.in_subquery(donation_ids_by_category(icontains(
                        (categories::Entity, categories::Column::Name),
                        search,
                    ))))
                    .add(icontains((donations::Entity, donations::Column::Address), search))
                    .add(icontains((donations::Entity, donations::Column::City), search)),
            );
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count user donations")?;
        let info = PageInfo::resolve(page, total);
        let rows = query
            .find_also_related(institutions::Entity)
            .order_by_asc(donations::Column::IsTakenByUser)
            .order_by_asc(donations::Column::PickUpDate)
            .order_by_asc(donations::Column::PickUpTime)
            .order_by_asc(donations::Column::Id)
            .offset(info.offset())
            .limit(info.per_page)
            .all(&self.db)
            .await
            .context("list user donations")?;
        let items = donations_with_relations(&self.db, rows)
            .await
            .context("load donation categories")?;
        Ok(Page { items, info })
    }

    async fn toggle_taken_by_user(&self, id: i32) -> Result<bool, DonationsServiceError> {
        let updated = donations::Entity::update_many()
            .col_expr(
                donations::Column::IsTakenByUser,
                Expr::col(donations::Column::IsTakenByUser).not(),
            )
            .col_expr(donations::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(donations::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .context("toggle donation is_taken_by_user")?;
        updated
            .first()
            .map(|m| m.is_taken_by_user)
            .ok_or(DonationsServiceError::DonationNotFound)
    }

    async fn set_status(
        &self,
        id: i32,
        status: DonationStatus,
    ) -> Result<bool, DonationsServiceError> {
        let result = donations::Entity::update_many()
            .col_expr(donations::Column::Status, Expr::value(status.as_str()))
            .col_expr(donations::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(donations::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set donation status")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_courier(
        &self,
        id: i32,
        courier_id: Option<Uuid>,
        is_taken_by_courier: bool,
    ) -> Result<bool, DonationsServiceError> {
        let result = donations::Entity::update_many()
            .col_expr(donations::Column::CourierId, Expr::value(courier_id))
            .col_expr(
                donations::Column::IsTakenByCourier,
                Expr::value(is_taken_by_courier),
            )
            .col_expr(donations::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(donations::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set donation courier")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Contact messages / problem reports ───────────────────────────────────────

#[derive(Clone)]
pub struct DbContactMessageRepository {
    pub db: DatabaseConnection,
}

impl ContactMessageRepository for DbContactMessageRepository {
    async fn create(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessage, DonationsServiceError> {
        let model = contact_messages::ActiveModel {
            name: Set(message.name.clone()),
            surname: Set(message.surname.clone()),
            email: Set(message.email.clone()),
            message: Set(message.message.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create contact message")?;
        Ok(ContactMessage {
            id: model.id,
            name: model.name,
            surname: model.surname,
            email: model.email,
            message: model.message,
            created_at: model.created_at,
        })
    }
}

#[derive(Clone)]
pub struct DbProblemReportRepository {
    pub db: DatabaseConnection,
}

impl ProblemReportRepository for DbProblemReportRepository {
    async fn create(
        &self,
        report: &NewProblemReport,
    ) -> Result<ProblemReport, DonationsServiceError> {
        let model = problem_reports::ActiveModel {
            user_id: Set(Some(report.user_id)),
            subject: Set(report.subject.clone()),
            description: Set(report.description.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create problem report")?;
        Ok(ProblemReport {
            id: model.id,
            user_id: model.user_id,
            subject: model.subject,
            description: model.description,
            created_at: model.created_at,
        })
    }
}

// ── Admin repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAdminRepository {
    pub db: DatabaseConnection,
}

fn fmt_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn search_any<C>(columns: impl IntoIterator<Item = C>, needle: &str) -> Condition
where
    C: ColumnTrait,
{
    columns.into_iter().fold(Condition::any(), |cond, col| {
        cond.add(icontains((C::EntityName::default(), col), needle))
    })
}

fn windowed<E: EntityTrait>(select: Select<E>, window: Option<PageInfo>) -> Select<E> {
    match window {
        Some(info) => select.offset(info.offset()).limit(info.per_page),
        None => select,
    }
}

fn category_select(query: &AdminQuery) -> Select<categories::Entity> {
    let mut select = categories::Entity::find();
    if let Some(q) = &query.search {
        select = select.filter(search_any([categories::Column::Name], q));
    }
    select.order_by_asc(categories::Column::Name)
}

fn institution_select(query: &AdminQuery) -> Select<institutions::Entity> {
    let mut select = institutions::Entity::find();
    if let Some(q) = &query.search {
        select = select.filter(search_any(
            [
                institutions::Column::Name,
                institutions::Column::Description,
                institutions::Column::InstitutionType,
            ],
            q,
        ));
    }
    for filter in &query.filters {
        if let AdminFilter::InstitutionType(t) = filter {
            select = select.filter(institutions::Column::InstitutionType.eq(t.as_str()));
        }
    }
    select.order_by_asc(institutions::Column::Name)
}

fn donation_select(query: &AdminQuery) -> Select<donations::Entity> {
    let mut select = donations::Entity::find();
    if let Some(q) = &query.search {
        select = select.filter(
            search_any(
                [
                    donations::Column::Address,
                    donations::Column::City,
                    donations::Column::ZipCode,
                ],
                q,
            )
            .add(donations::Column::InstitutionId.in_subquery(institution_ids_matching(q)))
            .add(donations::Column::UserId.in_subquery(user_ids_matching(q))),
        );
    }
    for filter in &query.filters {
        select = match filter {
            AdminFilter::Status(s) => select.filter(donations::Column::Status.eq(s.as_str())),
            AdminFilter::InstitutionId(id) => {
                select.filter(donations::Column::InstitutionId.eq(*id))
            }
            AdminFilter::CategoryId(id) => select.filter(donations::Column::Id.in_subquery(
                donation_ids_by_category(
                    Expr::col((donation_categories::Entity, donation_categories::Column::CategoryId))
                        .eq(*id),
                ),
            )),
            AdminFilter::PickUpDate(day) => select.filter(donations::Column::PickUpDate.eq(*day)),
            AdminFilter::TakenByCourier(v) => {
                select.filter(donations::Column::IsTakenByCourier.eq(*v))
            }
            AdminFilter::InstitutionType(_) => select,
        };
    }
    select
        .order_by_desc(donations::Column::CreatedAt)
        .order_by_desc(donations::Column::Id)
}

fn contact_message_select(query: &AdminQuery) -> Select<contact_messages::Entity> {
    let mut select = contact_messages::Entity::find();
    if let Some(q) = &query.search {
        select = select.filter(search_any(
            [
                contact_messages::Column::Name,
                contact_messages::Column::Surname,
                contact_messages::Column::Email,
                contact_messages::Column::Message,
            ],
            q,
        ));
    }
    select
        .order_by_desc(contact_messages::Column::CreatedAt)
        .order_by_desc(contact_messages::Column::Id)
}

fn problem_report_select(query: &AdminQuery) -> Select<problem_reports::Entity> {
    let mut select = problem_reports::Entity::find();
    if let Some(q) = &query.search {
        select = select.filter(search_any(
            [
                problem_reports::Column::Subject,
                problem_reports::Column::Description,
            ],
            q,
        ));
    }
    select
        .order_by_desc(problem_reports::Column::CreatedAt)
        .order_by_desc(problem_reports::Column::Id)
}

async fn user_emails<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, String>, DbErr> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Email)
        .filter(users::Column::Id.is_in(ids))
        .into_tuple::<(Uuid, String)>()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

fn email_cell(emails: &HashMap<Uuid, String>, id: Option<Uuid>) -> String {
    id.and_then(|id| emails.get(&id).cloned()).unwrap_or_default()
}

impl DbAdminRepository {
    async fn count_rows(&self, kind: AdminResourceKind, query: &AdminQuery) -> Result<u64, DbErr> {
        match kind {
            AdminResourceKind::Categories => category_select(query).count(&self.db).await,
            AdminResourceKind::Institutions => institution_select(query).count(&self.db).await,
            AdminResourceKind::Donations => donation_select(query).count(&self.db).await,
            AdminResourceKind::ContactMessages => {
                contact_message_select(query).count(&self.db).await
            }
            AdminResourceKind::ProblemReports => {
                problem_report_select(query).count(&self.db).await
            }
        }
    }

    async fn rows(
        &self,
        kind: AdminResourceKind,
        query: &AdminQuery,
        window: Option<PageInfo>,
    ) -> Result<Vec<AdminRow>, DbErr> {
        let rows = match kind {
            AdminResourceKind::Categories => windowed(category_select(query), window)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| AdminRow {
                    id: m.id,
                    cells: vec![m.id.to_string(), m.name],
                })
                .collect(),
            AdminResourceKind::Institutions => windowed(institution_select(query), window)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| AdminRow {
                    id: m.id,
                    cells: vec![
                        m.id.to_string(),
                        m.name,
                        m.description,
                        m.institution_type,
                        fmt_datetime(m.created_at),
                    ],
                })
                .collect(),
            AdminResourceKind::Donations => {
                let rows = windowed(donation_select(query), window)
                    .find_also_related(institutions::Entity)
                    .all(&self.db)
                    .await?;
                let user_ids: Vec<Uuid> = rows
                    .iter()
                    .flat_map(|(d, _)| [d.user_id, d.courier_id])
                    .flatten()
                    .collect();
                let emails = user_emails(&self.db, user_ids).await?;
                rows.into_iter()
                    .map(|(d, institution)| AdminRow {
                        id: d.id,
                        cells: vec![
                            d.id.to_string(),
                            d.quantity.to_string(),
                            institution.map(|i| i.name).unwrap_or_default(),
                            d.address,
                            d.city,
                            d.zip_code,
                            d.phone_number,
                            d.pick_up_date.format("%Y-%m-%d").to_string(),
                            d.pick_up_time.format("%H:%M").to_string(),
                            d.pick_up_comment.unwrap_or_default(),
                            email_cell(&emails, d.user_id),
                            d.is_taken_by_user.to_string(),
                            d.is_taken_by_courier.to_string(),
                            email_cell(&emails, d.courier_id),
                            d.status,
                            fmt_datetime(d.created_at),
                            fmt_datetime(d.updated_at),
                        ],
                    })
                    .collect()
            }
            AdminResourceKind::ContactMessages => windowed(contact_message_select(query), window)
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| AdminRow {
                    id: m.id,
                    cells: vec![
                        m.id.to_string(),
                        m.name,
                        m.surname,
                        m.email,
                        m.message,
                        fmt_datetime(m.created_at),
                    ],
                })
                .collect(),
            AdminResourceKind::ProblemReports => {
                let models = windowed(problem_report_select(query), window)
                    .all(&self.db)
                    .await?;
                let user_ids: Vec<Uuid> = models.iter().filter_map(|m| m.user_id).collect();
                let emails = user_emails(&self.db, user_ids).await?;
                models
                    .into_iter()
                    .map(|m| AdminRow {
                        id: m.id,
                        cells: vec![
                            m.id.to_string(),
                            email_cell(&emails, m.user_id),
                            m.subject,
                            m.description,
                            fmt_datetime(m.created_at),
                        ],
                    })
                    .collect()
            }
        };
        Ok(rows)
    }
}

impl AdminRepository for DbAdminRepository {
    async fn page(
        &self,
        kind: AdminResourceKind,
        query: &AdminQuery,
        page: PageRequest,
    ) -> Result<Page<AdminRow>, DonationsServiceError> {
        let total = self
            .count_rows(kind, query)
            .await
            .with_context(|| format!("count admin rows for {kind}"))?;
        let info = PageInfo::resolve(page, total);
        let items = self
            .rows(kind, query, Some(info))
            .await
            .with_context(|| format!("list admin rows for {kind}"))?;
        Ok(Page { items, info })
    }

    async fn all(
        &self,
        kind: AdminResourceKind,
        query: &AdminQuery,
    ) -> Result<Vec<AdminRow>, DonationsServiceError> {
        let rows = self
            .rows(kind, query, None)
            .await
            .with_context(|| format!("export admin rows for {kind}"))?;
        Ok(rows)
    }

    async fn delete(
        &self,
        kind: AdminResourceKind,
        ids: &[i32],
    ) -> Result<u64, DonationsServiceError> {
        let ids = ids.iter().copied();
        let result = match kind {
            AdminResourceKind::Categories => {
                categories::Entity::delete_many()
                    .filter(categories::Column::Id.is_in(ids))
                    .exec(&self.db)
                    .await
            }
            AdminResourceKind::Institutions => {
                institutions::Entity::delete_many()
                    .filter(institutions::Column::Id.is_in(ids))
                    .exec(&self.db)
                    .await
            }
            AdminResourceKind::Donations => {
                donations::Entity::delete_many()
                    .filter(donations::Column::Id.is_in(ids))
                    .exec(&self.db)
                    .await
            }
            AdminResourceKind::ContactMessages => {
                contact_messages::Entity::delete_many()
                    .filter(contact_messages::Column::Id.is_in(ids))
                    .exec(&self.db)
                    .await
            }
            AdminResourceKind::ProblemReports => {
                problem_reports::Entity::delete_many()
                    .filter(problem_reports::Column::Id.is_in(ids))
                    .exec(&self.db)
                    .await
            }
        }
        .with_context(|| format!("bulk delete {kind}"))?;
        Ok(result.rows_affected)
    }
}

// ── Report repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReportRepository {
    pub db: DatabaseConnection,
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn report_condition(filter: &ReportFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(start) = filter.start_date {
        cond = cond.add(donations::Column::CreatedAt.gte(start_of_day(start)));
    }
    if let Some(end) = filter.end_date.and_then(|d| d.succ_opt()) {
        cond = cond.add(donations::Column::CreatedAt.lt(start_of_day(end)));
    }
    if let Some(category_id) = filter.category_id {
        cond = cond.add(donations::Column::Id.in_subquery(donation_ids_by_category(
            Expr::col((donation_categories::Entity, donation_categories::Column::CategoryId))
                .eq(category_id),
        )));
    }
    if let Some(institution_id) = filter.institution_id {
        cond = cond.add(donations::Column::InstitutionId.eq(institution_id));
    }
    if let Some(user_id) = filter.user_id {
        cond = cond.add(donations::Column::UserId.eq(user_id));
    }
    cond
}

/// Calendar day of `created_at` in UTC, matching the bounds of [`report_condition`].
fn utc_day() -> SimpleExpr {
    Expr::cust(r#"CAST(("donations"."created_at" AT TIME ZONE 'UTC') AS date)"#)
}

fn donation_count() -> SimpleExpr {
    Expr::col((donations::Entity, donations::Column::Id)).count()
}

fn labeled(rows: Vec<(String, i64)>) -> Vec<LabeledCount> {
    rows.into_iter()
        .map(|(label, count)| LabeledCount {
            label,
            count: u64::try_from(count).unwrap_or(0),
        })
        .collect()
}

impl ReportRepository for DbReportRepository {
    async fn count_by_institution(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError> {
        let rows = donations::Entity::find()
            .select_only()
            .column(institutions::Column::Name)
            .column_as(donation_count(), "count")
            .join(JoinType::InnerJoin, donations::Relation::Institution.def())
            .filter(report_condition(filter))
            .group_by(institutions::Column::Id)
            .group_by(institutions::Column::Name)
            .order_by_asc(institutions::Column::Name)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .context("count donations by institution")?;
        Ok(labeled(rows))
    }

    async fn count_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError> {
        let rows = donations::Entity::find()
            .select_only()
            .column(categories::Column::Name)
            .column_as(donation_count(), "count")
            .join(JoinType::InnerJoin, donations::Relation::DonationCategories.def())
            .join(JoinType::InnerJoin, donation_categories::Relation::Category.def())
            .filter(report_condition(filter))
            .group_by(categories::Column::Id)
            .group_by(categories::Column::Name)
            .order_by_asc(categories::Column::Name)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .context("count donations by category")?;
        Ok(labeled(rows))
    }

    async fn count_by_user(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<LabeledCount>, DonationsServiceError> {
        let rows = donations::Entity::find()
            .select_only()
            .column(users::Column::Email)
            .column_as(donation_count(), "count")
            .join(JoinType::InnerJoin, donations::Relation::User.def())
            .filter(report_condition(filter))
            .group_by(users::Column::Id)
            .group_by(users::Column::Email)
            .order_by_asc(users::Column::Email)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .context("count donations by user")?;
        Ok(labeled(rows))
    }

    async fn count_per_day(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<DailyCount>, DonationsServiceError> {
        let rows = donations::Entity::find()
            .select_only()
            .column_as(utc_day(), "day")
            .column_as(donation_count(), "count")
            .filter(report_condition(filter))
            .group_by(utc_day())
            .order_by_asc(utc_day())
            .into_tuple::<(NaiveDate, i64)>()
            .all(&self.db)
            .await
            .context("count donations per day")?;
        Ok(rows
            .into_iter()
            .map(|(day, count)| DailyCount {
                day,
                count: u64::try_from(count).unwrap_or(0),
            })
            .collect())
    }
}
