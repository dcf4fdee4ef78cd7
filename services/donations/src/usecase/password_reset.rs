use uuid::Uuid;

use charity_auth_types::uid::decode_uid;
use charity_domain::account::{PasswordContext, normalize_email};

use crate::domain::repository::{Mailer, TokenRepository, UserRepository};
use crate::domain::types::{AccountToken, TokenKind};
use crate::error::{DonationsServiceError, FieldErrors};
use crate::usecase::credentials::{check_password_policy, hash_password};
use crate::usecase::mail::{SiteLinks, password_reset_mail};

pub const RESET_LINK_SENT: &str = "A password reset link has been sent to your email.";

// ── Request ──────────────────────────────────────────────────────────────────

pub struct RequestPasswordResetUseCase<U, T, M>
where
    U: UserRepository,
    T: TokenRepository,
    M: Mailer,
{
    pub users: U,
    pub tokens: T,
    pub mailer: M,
    pub links: SiteLinks,
}

impl<U, T, M> RequestPasswordResetUseCase<U, T, M>
where
    U: UserRepository,
    T: TokenRepository,
    M: Mailer,
{
    /// Issue a reset token for a known email and mail the link.
    ///
    /// Earlier reset tokens stay valid until one of them is used.
    pub async fn execute(&self, email: &str) -> Result<(), DonationsServiceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(DonationsServiceError::EmailNotFound)?;

        let token = AccountToken::issue(TokenKind::PasswordReset, user.id);
        self.tokens.issue(&token).await?;
        tracing::info!(user_id = %user.id, "issued password reset token");

        self.mailer
            .send(&password_reset_mail(&user, &token, &self.links))
            .await
    }
}

// ── Confirm ──────────────────────────────────────────────────────────────────

pub struct ConfirmPasswordResetInput {
    pub password1: String,
    pub password2: String,
}

pub struct ConfirmPasswordResetUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> ConfirmPasswordResetUseCase<T> {
    /// Validate the new password, then consume the link and store the hash.
    pub async fn execute(
        &self,
        uidb64: &str,
        token: &str,
        input: ConfirmPasswordResetInput,
    ) -> Result<Uuid, DonationsServiceError> {
        let mut errors = FieldErrors::new();
        if input.password1 != input.password2 {
            errors.add("password2", "Passwords do not match.");
        } else {
            check_password_policy(
                &mut errors,
                "password1",
                &input.password1,
                PasswordContext::default(),
            );
        }
        errors.into_result()?;

        let user_id = decode_uid(uidb64).ok_or(DonationsServiceError::InvalidLink)?;
        let token = Uuid::parse_str(token).map_err(|_| DonationsServiceError::InvalidLink)?;

        let hash = hash_password(&input.password1)?;
        if !self
            .tokens
            .consume_password_reset(user_id, token, &hash)
            .await?
        {
            return Err(DonationsServiceError::InvalidLink);
        }
        tracing::info!(%user_id, "password reset completed");
        Ok(user_id)
    }
}
