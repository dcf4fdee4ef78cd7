use charity_domain::account::{is_plausible_email, normalize_email};

use crate::domain::repository::{ContactMessageRepository, Mailer, UserRepository};
use crate::domain::types::{ContactMessage, NewContactMessage};
use crate::error::{DonationsServiceError, FieldErrors};
use crate::usecase::mail::contact_mail;

const MAX_NAME_LEN: usize = 100;

pub const CONTACT_THANKS: &str = "Your message has been sent. Thank you for getting in touch!";

#[derive(Debug, Default)]
pub struct ContactInput {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub message: String,
}

pub struct SendContactMessageUseCase<R, U, M>
where
    R: ContactMessageRepository,
    U: UserRepository,
    M: Mailer,
{
    pub messages: R,
    pub users: U,
    pub mailer: M,
}

impl<R, U, M> SendContactMessageUseCase<R, U, M>
where
    R: ContactMessageRepository,
    U: UserRepository,
    M: Mailer,
{
    /// Store the message and forward it to every superuser.
    pub async fn execute(&self, input: ContactInput) -> Result<ContactMessage, DonationsServiceError> {
        let mut errors = FieldErrors::new();
        let name = input.name.trim();
        let surname = input.surname.trim();
        let email = normalize_email(&input.email);
        let message = input.message.trim();

        if name.is_empty() {
            errors.add("name", "Please enter your first name.");
        } else {
            errors.check_max_chars("name", name, MAX_NAME_LEN);
        }
        if surname.is_empty() {
            errors.add("surname", "Please enter your last name.");
        } else {
            errors.check_max_chars("surname", surname, MAX_NAME_LEN);
        }
        if email.is_empty() {
            errors.add("email", "Please enter your email.");
        } else if !is_plausible_email(&email) {
            errors.add("email", "Please enter a valid email.");
        }
        if message.is_empty() {
            errors.add("message", "Please enter a message.");
        }
        errors.into_result()?;

        let stored = self
            .messages
            .create(&NewContactMessage {
                name: name.to_owned(),
                surname: surname.to_owned(),
                email,
                message: message.to_owned(),
            })
            .await?;

        let recipients = self.users.superuser_emails().await?;
        if recipients.is_empty() {
            tracing::warn!(contact_message_id = stored.id, "no superuser to notify");
            return Ok(stored);
        }
        self.mailer.send(&contact_mail(&stored, recipients)).await?;
        Ok(stored)
    }
}
