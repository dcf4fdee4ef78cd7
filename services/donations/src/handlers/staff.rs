use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use charity_auth_types::identity::Superuser;

use crate::domain::types::User;
use crate::state::AppState;
use crate::usecase::account::AuthorizeStaffUseCase;

/// Superuser session whose stored account is still active and still a superuser.
///
/// The cookie claim is checked first, so plain users never reach the database.
pub struct Staff(pub User);

impl FromRequestParts<AppState> for Staff {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Superuser(session) = Superuser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let usecase = AuthorizeStaffUseCase {
            users: state.user_repo(),
        };
        usecase
            .execute(session.user_id)
            .await
            .map(Self)
            .map_err(IntoResponse::into_response)
    }
}
