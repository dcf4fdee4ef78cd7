use uuid::Uuid;

use crate::domain::repository::ProblemReportRepository;
use crate::domain::types::{NewProblemReport, ProblemReport};
use crate::error::{DonationsServiceError, FieldErrors};

const MAX_SUBJECT_LEN: usize = 255;

#[derive(Debug, Default)]
pub struct ProblemReportInput {
    pub subject: String,
    pub description: String,
}

pub struct ReportProblemUseCase<R: ProblemReportRepository> {
    pub reports: R,
}

impl<R: ProblemReportRepository> ReportProblemUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ProblemReportInput,
    ) -> Result<ProblemReport, DonationsServiceError> {
        let subject = input.subject.trim();
        let description = input.description.trim();

        let mut errors = FieldErrors::new();
        if subject.is_empty() {
            errors.add("subject", "This field is required.");
        } else {
            errors.check_max_chars("subject", subject, MAX_SUBJECT_LEN);
        }
        if description.is_empty() {
            errors.add("description", "This field is required.");
        }
        errors.into_result()?;

        let report = self
            .reports
            .create(&NewProblemReport {
                user_id,
                subject: subject.to_owned(),
                description: description.to_owned(),
            })
            .await?;
        tracing::info!(problem_report_id = report.id, %user_id, "problem reported");
        Ok(report)
    }
}
