//! sea-orm entities for the donations service.

pub mod categories;
pub mod contact_messages;
pub mod donation_categories;
pub mod donations;
pub mod email_verification_tokens;
pub mod institution_categories;
pub mod institutions;
pub mod mail_outbox;
pub mod password_reset_tokens;
pub mod problem_reports;
pub mod users;
