use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::Form;
use serde::Deserialize;

use charity_auth_types::identity::SessionUser;

use crate::error::DonationsServiceError;
use crate::handlers::Notice;
use crate::state::AppState;
use crate::usecase::contact::{CONTACT_THANKS, ContactInput, SendContactMessageUseCase};
use crate::usecase::problem_report::{ProblemReportInput, ReportProblemUseCase};

// ── POST /contact/ ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

pub async fn contact(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Json<Notice>, DonationsServiceError> {
    let usecase = SendContactMessageUseCase {
        messages: state.contact_message_repo(),
        users: state.user_repo(),
        mailer: state.mailer(),
    };
    usecase
        .execute(ContactInput {
            name: form.name,
            surname: form.surname,
            email: form.email,
            message: form.message,
        })
        .await?;
    Ok(Notice::success(CONTACT_THANKS))
}

// ── POST /report_problem/ ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProblemReportForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

pub async fn report_problem(
    session: SessionUser,
    State(state): State<AppState>,
    Form(form): Form<ProblemReportForm>,
) -> Result<impl IntoResponse, DonationsServiceError> {
    let usecase = ReportProblemUseCase {
        reports: state.problem_report_repo(),
    };
    usecase
        .execute(
            session.user_id,
            ProblemReportInput {
                subject: form.subject,
                description: form.description,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Notice::success("Thank you. Your report has been received."),
    ))
}
