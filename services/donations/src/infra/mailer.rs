use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};

use charity_donations_schema::mail_outbox;

use crate::domain::repository::Mailer;
use crate::domain::types::{OutgoingMail, QueuedMail};
use crate::error::DonationsServiceError;

/// Queues mail in `mail_outbox`; an external relay performs SMTP delivery.
#[derive(Clone)]
pub struct OutboxMailer {
    pub db: DatabaseConnection,
    pub from_email: String,
}

fn outbox_row(mail: &QueuedMail) -> mail_outbox::ActiveModel {
    let now = Utc::now();
    mail_outbox::ActiveModel {
        id: Set(mail.id),
        kind: Set(mail.kind.as_str().to_owned()),
        sender: Set(mail.sender.clone()),
        recipients: Set(serde_json::json!(mail.recipients)),
        subject: Set(mail.subject.clone()),
        body: Set(mail.body.clone()),
        idempotency_key: Set(mail.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        queued_at: Set(now),
        send_after: Set(now),
        sent_at: Set(None),
        abandoned_at: Set(None),
    }
}

impl Mailer for OutboxMailer {
    /// A retry with an idempotency key that is already queued is a no-op.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DonationsServiceError> {
        let queued = QueuedMail::new(mail, &self.from_email);
        let inserted = mail_outbox::Entity::insert(outbox_row(&queued))
            .on_conflict(
                OnConflict::column(mail_outbox::Column::IdempotencyKey)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                DonationsServiceError::MailDelivery(anyhow::Error::new(e).context("queue outbox mail"))
            })?;

        if inserted == 0 {
            tracing::debug!(idempotency_key = %queued.idempotency_key, "mail already queued");
        } else {
            tracing::info!(kind = mail.kind.as_str(), recipients = mail.to.len(), "mail queued");
        }
        Ok(())
    }
}
