use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_categories;
mod m20260301_000003_create_institutions;
mod m20260301_000004_create_donations;
mod m20260301_000005_create_account_tokens;
mod m20260301_000006_create_contact_messages;
mod m20260301_000007_create_problem_reports;
mod m20260301_000008_create_mail_outbox;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_categories::Migration),
            Box::new(m20260301_000003_create_institutions::Migration),
            Box::new(m20260301_000004_create_donations::Migration),
            Box::new(m20260301_000005_create_account_tokens::Migration),
            Box::new(m20260301_000006_create_contact_messages::Migration),
            Box::new(m20260301_000007_create_problem_reports::Migration),
            Box::new(m20260301_000008_create_mail_outbox::Migration),
        ]
    }
}
