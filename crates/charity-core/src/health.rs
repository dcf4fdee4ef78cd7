use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use sea_orm::DatabaseConnection;

/// `GET /healthz`: the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz`: 200 once the database answers a ping, 503 otherwise.
pub async fn readyz<S>(State(state): State<S>) -> StatusCode
where
    DatabaseConnection: FromRef<S>,
{
    let db = DatabaseConnection::from_ref(&state);
    match db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
