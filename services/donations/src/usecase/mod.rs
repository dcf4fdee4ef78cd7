pub mod account;
pub mod admin;
pub mod contact;
pub mod credentials;
pub mod donation;
pub mod home;
pub mod mail;
pub mod password_reset;
pub mod problem_report;
pub mod report;
