//! Mock session helpers for integration tests.
//!
//! Handlers authenticate through the `charity_session` cookie. `MockSession` signs
//! a real session token with a test secret so extractor code runs unchanged.

use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

use charity_auth_types::cookie::SESSION_COOKIE;
use charity_auth_types::token::issue_session_token;

/// Secret shared by tests that build state and sign cookies.
pub const TEST_SESSION_SECRET: &str = "test-session-secret-for-unit-tests-only";

/// Configurable identity signed into test requests.
pub struct MockSession {
    pub user_id: Uuid,
    pub is_superuser: bool,
}

impl MockSession {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_superuser: false,
        }
    }

    pub fn superuser(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_superuser: true,
        }
    }

    /// `Cookie` header value signed with `secret`.
    pub fn cookie_value(&self, secret: &str) -> String {
        let (token, _) = issue_session_token(self.user_id, self.is_superuser, secret)
            .expect("signing a test session token");
        format!("{SESSION_COOKIE}={token}")
    }

    /// Headers as a browser holding this session would send them.
    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::COOKIE,
            HeaderValue::from_str(&self.cookie_value(secret)).unwrap(),
        );
        map
    }
}
