//! Session extractors.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::cookie::SESSION_COOKIE;
use crate::token::validate_session_token;

/// HMAC secret used to sign session cookies. Provide it from the app state via `FromRef`.
#[derive(Clone)]
pub struct SessionKey(pub Arc<str>);

impl SessionKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Why a session extractor refused the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    /// No cookie, or one that is expired or signed with another key.
    Unauthenticated,
    /// Valid session without superuser rights.
    Forbidden,
}

impl SessionRejection {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let (kind, message) = match self {
            Self::Unauthenticated => ("UNAUTHENTICATED", "login required"),
            Self::Forbidden => ("FORBIDDEN", "superuser required"),
        };
        let body = serde_json::json!({
            "status": "error",
            "kind": kind,
            "message": message,
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Authenticated account read from the `charity_session` cookie.
///
/// Returns 401 if the cookie is absent, expired or not signed with the session key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub is_superuser: bool,
}

impl<S> FromRequestParts<S> for SessionUser
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    // Values are extracted synchronously; the returned future owns everything it needs.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let result = match jar.get(SESSION_COOKIE) {
            Some(cookie) => validate_session_token(cookie.value(), &key.0).map_err(|e| {
                tracing::debug!(error = %e, "rejected session cookie");
                SessionRejection::Unauthenticated
            }),
            None => Err(SessionRejection::Unauthenticated),
        };

        async move {
            let info = result?;
            Ok(Self {
                user_id: info.user_id,
                is_superuser: info.is_superuser,
            })
        }
    }
}

/// A [`SessionUser`] whose account is a superuser. Returns 403 for everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superuser(pub SessionUser);

impl<S> FromRequestParts<S> for Superuser
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = SessionUser::from_request_parts(parts, state);
        async move {
            let user = session.await?;
            if !user.is_superuser {
                return Err(SessionRejection::Forbidden);
            }
            Ok(Self(user))
        }
    }
}
