//! Development data loader for the donations database.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations, then load the demo catalogue and accounts
//! cargo run -p charity-seed -- --migrate
//!
//! # Also create a superuser for the admin console
//! cargo run -p charity-seed -- --superuser-email admin@charity.local --superuser-password 'S3cret!Pass'
//! ```
//!
//! Every step skips rows that already exist, so the tool can be rerun.

use anyhow::{Context, Result};
use chrono::{Days, NaiveTime, Utc};
use clap::Parser;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use charity_core::tracing::init_tracing;
use charity_domain::institution::InstitutionType;
use charity_donations::domain::repository::{
    CategoryRepository, DonationRepository, InstitutionRepository, UserRepository,
};
use charity_donations::domain::types::{NewDonation, NewInstitution};
use charity_donations::infra::db::{
    DbCategoryRepository, DbDonationRepository, DbInstitutionRepository, DbUserRepository,
};
use charity_donations::usecase::credentials::hash_password;
use charity_donations_migration::Migrator;
use charity_donations_schema::users;

const CATEGORIES: &[&str] = &["Clothes", "Toys", "Books", "Household goods", "Food"];

/// Name, type, accepted category names.
const INSTITUTIONS: &[(&str, InstitutionType, &[&str])] = &[
    (
        "Foundation \"Warm Heart\"",
        InstitutionType::Foundation,
        &["Clothes", "Food"],
    ),
    (
        "Foundation \"Open Doors\"",
        InstitutionType::Foundation,
        &["Clothes", "Household goods"],
    ),
    (
        "Foundation \"Reading Corner\"",
        InstitutionType::Foundation,
        &["Books", "Toys"],
    ),
    (
        "Association \"Neighbours\"",
        InstitutionType::Ngo,
        &["Food", "Household goods"],
    ),
    (
        "Association \"Second Life\"",
        InstitutionType::Ngo,
        &["Clothes", "Toys", "Books"],
    ),
    (
        "Parish collection",
        InstitutionType::LocalCollection,
        &["Food", "Clothes"],
    ),
    (
        "School book drive",
        InstitutionType::LocalCollection,
        &["Books"],
    ),
];

const DEMO_PASSWORD: &str = "Demo!Pass2024";

#[derive(Parser)]
#[command(about = "Load development data into the donations database")]
struct Args {
    /// Database to seed. Falls back to `DATABASE_URL`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Apply pending migrations first.
    #[arg(long)]
    migrate: bool,

    /// Number of active donor accounts to create.
    #[arg(long, default_value_t = 3)]
    donors: usize,

    /// Donations created per donor.
    #[arg(long, default_value_t = 4)]
    donations_per_donor: usize,

    /// Create (or keep) a superuser with this email.
    #[arg(long, requires = "superuser_password")]
    superuser_email: Option<String>,

    #[arg(long)]
    superuser_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(true);

    let db = Database::connect(&args.database_url)
        .await
        .context("connect to database")?;

    if args.migrate {
        Migrator::up(&db, None).await.context("apply migrations")?;
        info!("migrations applied");
    }

    let category_ids = seed_categories(&db).await?;
    let institution_ids = seed_institutions(&db, &category_ids).await?;

    if let (Some(email), Some(password)) = (&args.superuser_email, &args.superuser_password) {
        ensure_user(&db, email, "Site", "Admin", password, true).await?;
    }

    let mut donors = Vec::with_capacity(args.donors);
    for n in 1..=args.donors {
        let email = format!("donor{n}@charity.local");
        donors.push(ensure_user(&db, &email, "Donor", &format!("No. {n}"), DEMO_PASSWORD, false).await?);
    }

    let created = seed_donations(&db, &donors, &institution_ids, args.donations_per_donor).await?;
    info!(
        categories = category_ids.len(),
        institutions = institution_ids.len(),
        donors = donors.len(),
        donations = created,
        "seed complete"
    );
    Ok(())
}

/// Returns `(name, id)` for every seeded category.
async fn seed_categories(db: &DatabaseConnection) -> Result<Vec<(&'static str, i32)>> {
    let repo = DbCategoryRepository { db: db.clone() };
    for name in CATEGORIES {
        if !repo.name_taken(name).await? {
            repo.create(name).await?;
            info!(name, "created category");
        }
    }
    let all = repo.list_all().await?;
    Ok(CATEGORIES
        .iter()
        .filter_map(|name| {
            all.iter()
                .find(|c| c.name == *name)
                .map(|c| (*name, c.id))
        })
        .collect())
}

/// Returns `(id, category ids)` for every seeded institution.
async fn seed_institutions(
    db: &DatabaseConnection,
    categories: &[(&str, i32)],
) -> Result<Vec<(i32, Vec<i32>)>> {
    let repo = DbInstitutionRepository { db: db.clone() };
    for (name, institution_type, accepted) in INSTITUTIONS {
        if repo.name_taken(name).await? {
            continue;
        }
        let category_ids = categories
            .iter()
            .filter(|(category, _)| accepted.contains(category))
            .map(|(_, id)| *id)
            .collect();
        repo.create(&NewInstitution {
            name: (*name).to_owned(),
            description: format!("{name} collects donations from the local community."),
            institution_type: *institution_type,
            category_ids,
        })
        .await?;
        info!(name, "created institution");
    }
    Ok(repo
        .list_with_categories()
        .await?
        .into_iter()
        .map(|i| (i.id, i.categories.iter().map(|c| c.id).collect()))
        .collect())
}

/// Insert an active account unless the email is already registered.
async fn ensure_user(
    db: &DatabaseConnection,
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
    is_superuser: bool,
) -> Result<Uuid> {
    let repo = DbUserRepository { db: db.clone() };
    if let Some(existing) = repo.find_by_email(email).await? {
        return Ok(existing.id);
    }

    let id = Uuid::now_v7();
    users::ActiveModel {
        id: Set(id),
        email: Set(email.to_owned()),
        first_name: Set(first_name.to_owned()),
        last_name: Set(last_name.to_owned()),
        password_hash: Set(hash_password(password)?),
        is_active: Set(true),
        is_superuser: Set(is_superuser),
        date_joined: Set(Utc::now()),
        last_login: Set(None),
    }
    .insert(db)
    .await
    .with_context(|| format!("insert user {email}"))?;
    info!(email, is_superuser, "created user");
    Ok(id)
}

async fn seed_donations(
    db: &DatabaseConnection,
    donors: &[Uuid],
    institutions: &[(i32, Vec<i32>)],
    per_donor: usize,
) -> Result<usize> {
    if institutions.is_empty() {
        return Ok(0);
    }
    let repo = DbDonationRepository { db: db.clone() };
    let today = Utc::now().date_naive();
    let mut created = 0;

    for (d, user_id) in donors.iter().enumerate() {
        for n in 0..per_donor {
            let (institution_id, category_ids) = &institutions[(d + n) % institutions.len()];
            let offset = (d * per_donor + n) as u64;
            let pick_up_date = today
                .checked_add_days(Days::new(offset % 14 + 1))
                .context("pick-up date out of range")?;
            let hour = 9 + (offset % 8) as u32;
            repo.create(&NewDonation {
                quantity: (offset % 5) as i32 + 1,
                institution_id: *institution_id,
                category_ids: category_ids.clone(),
                address: format!("Main Street {}", offset + 1),
                city: "Warsaw".to_owned(),
                zip_code: "00-001".to_owned(),
                phone_number: format!("+48600{:06}", offset),
                pick_up_date,
                pick_up_time: NaiveTime::from_hms_opt(hour, 0, 0).context("pick-up time")?,
                pick_up_comment: (n == 0).then(|| "Please call before arriving.".to_owned()),
                user_id: *user_id,
            })
            .await?;
            created += 1;
        }
    }
    Ok(created)
}
