//! Session and account-link types shared by the charity platform crates.
//!
//! Provides session JWT issuing/validation, the session cookie builders,
//! the `SessionUser` / `Superuser` extractors and the opaque user-id encoding
//! used in activation and password-reset links.

pub mod cookie;
pub mod identity;
pub mod token;
pub mod uid;
