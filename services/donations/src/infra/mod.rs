pub mod cache;
pub mod chart;
pub mod db;
pub mod mailer;
