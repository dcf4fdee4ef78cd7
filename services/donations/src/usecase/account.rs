use chrono::Utc;
use uuid::Uuid;

use charity_auth_types::uid::decode_uid;
use charity_domain::account::{PasswordContext, is_plausible_email, normalize_email};

use crate::domain::repository::{Mailer, TokenRepository, UserRepository};
use crate::domain::types::{AccountToken, TokenKind, User};
use crate::error::{DonationsServiceError, FieldErrors};
use crate::usecase::credentials::{check_password_policy, hash_password, verify_password};
use crate::usecase::mail::{SiteLinks, activation_mail};

pub const EMAIL_TAKEN: &str = "Email already exists.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

fn required(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RegisterInput {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

pub struct RegisterUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    pub users: U,
    pub mailer: M,
    pub links: SiteLinks,
}

impl<U, M> RegisterUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    /// Create an inactive account and email its activation link.
    ///
    /// The account and token survive a delivery failure; the caller sees
    /// `MailDelivery` and the user can ask for a resend.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, DonationsServiceError> {
        let email = normalize_email(&input.email);
        let mut errors = FieldErrors::new();

        required(&mut errors, "name", &input.name, "First name is required.");
        required(&mut errors, "surname", &input.surname, "Last name is required.");
        if email.is_empty() {
            errors.add("email", "Email is required.");
        } else if !is_plausible_email(&email) {
            errors.add("email", INVALID_EMAIL);
        }
        if input.password.is_empty() {
            errors.add("password", "Password is required.");
        } else {
            check_password_policy(
                &mut errors,
                "password",
                &input.password,
                PasswordContext {
                    email: &email,
                    first_name: input.name.trim(),
                    last_name: input.surname.trim(),
                },
            );
        }
        if input.password != input.password2 {
            errors.add("password2", "Passwords do not match.");
        }
        if !email.is_empty() && self.users.find_by_email(&email).await?.is_some() {
            errors.add("email", EMAIL_TAKEN);
        }
        errors.into_result()?;

        let user = User {
            id: Uuid::now_v7(),
            email,
            first_name: input.name.trim().to_owned(),
            last_name: input.surname.trim().to_owned(),
            password_hash: hash_password(&input.password)?,
            is_active: false,
            is_superuser: false,
            date_joined: Utc::now(),
            last_login: None,
        };
        let token = AccountToken::issue(TokenKind::EmailVerification, user.id);

        self.users.create_with_verification(&user, &token).await?;
        tracing::info!(user_id = %user.id, "registered inactive account");

        self.mailer
            .send(&activation_mail(&user, &token, &self.links))
            .await?;
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> LoginUseCase<U> {
    /// Inactive accounts are indistinguishable from unknown ones.
    pub async fn execute(&self, input: LoginInput) -> Result<User, DonationsServiceError> {
        let email = normalize_email(&input.email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|u| u.is_active)
            .ok_or(DonationsServiceError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash) {
            return Err(DonationsServiceError::InvalidCredentials);
        }

        self.users.record_login(user.id, Utc::now()).await?;
        Ok(user)
    }
}

/// Where a freshly logged-in user lands.
pub fn landing_path(user: &User) -> &'static str {
    if user.is_superuser { "/admin/" } else { "/" }
}

// ── Staff check ──────────────────────────────────────────────────────────────

/// Confirms that the account behind a superuser session still holds the role.
pub struct AuthorizeStaffUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> AuthorizeStaffUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, DonationsServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(DonationsServiceError::SessionExpired)?;
        if !user.is_superuser {
            tracing::warn!(%user_id, "superuser session for an account without the role");
            return Err(DonationsServiceError::NotSuperuser);
        }
        Ok(user)
    }
}

// ── Activate ─────────────────────────────────────────────────────────────────

pub struct ActivateAccountUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> ActivateAccountUseCase<T> {
    pub async fn execute(&self, uidb64: &str, token: &str) -> Result<Uuid, DonationsServiceError> {
        let user_id = decode_uid(uidb64).ok_or(DonationsServiceError::InvalidLink)?;
        let token = Uuid::parse_str(token).map_err(|_| DonationsServiceError::InvalidLink)?;

        if !self.tokens.consume_verification(user_id, token).await? {
            return Err(DonationsServiceError::InvalidLink);
        }
        tracing::info!(%user_id, "activated account");
        Ok(user_id)
    }
}

// ── Resend activation ────────────────────────────────────────────────────────

pub struct ResendActivationUseCase<U, T, M>
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

impl<U, T, M> ResendActivationUseCase<U, T, M>
where
    U: UserRepository,
    T: TokenRepository,
    M: Mailer,
{
    /// Replace the user's verification token and send a fresh link.
    pub async fn execute(&self, email: &str) -> Result<(), DonationsServiceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(DonationsServiceError::EmailNotFound)?;
        if user.is_active {
            return Err(FieldErrors::single("email", "This account is already active."));
        }

        let token = AccountToken::issue(TokenKind::EmailVerification, user.id);
        self.tokens.issue(&token).await?;
        self.mailer
            .send(&activation_mail(&user, &token, &self.links))
            .await
    }
}

// ── Edit profile ─────────────────────────────────────────────────────────────

pub struct EditProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub struct EditProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> EditProfileUseCase<U> {
    /// Update names and email after re-checking the current password.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: EditProfileInput,
    ) -> Result<(), DonationsServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DonationsServiceError::UserNotFound)?;

        if !verify_password(&input.password, &user.password_hash) {
            return Err(FieldErrors::single("password", "Incorrect password."));
        }

        let email = normalize_email(&input.email);
        let mut errors = FieldErrors::new();
        required(&mut errors, "first_name", &input.first_name, "First name is required.");
        required(&mut errors, "last_name", &input.last_name, "Last name is required.");
        if !is_plausible_email(&email) {
            errors.add("email", INVALID_EMAIL);
        } else if email != user.email
            && self
                .users
                .find_by_email(&email)
                .await?
                .is_some_and(|other| other.id != user.id)
        {
            errors.add("email", EMAIL_TAKEN);
        }
        errors.into_result()?;

        self.users
            .update_profile(
                user.id,
                input.first_name.trim(),
                input.last_name.trim(),
                &email,
            )
            .await
    }
}

// ── Change password ──────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> Result<(), DonationsServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DonationsServiceError::UserNotFound)?;

        let mut errors = FieldErrors::new();
        if !verify_password(&input.old_password, &user.password_hash) {
            errors.add(
                "old_password",
                "Your old password was entered incorrectly. Please enter it again.",
            );
        }
        if input.new_password1 != input.new_password2 {
            errors.add("new_password2", "The two password fields didn't match.");
        } else {
            check_password_policy(
                &mut errors,
                "new_password2",
                &input.new_password2,
                PasswordContext {
                    email: &user.email,
                    first_name: &user.first_name,
                    last_name: &user.last_name,
                },
            );
        }
        errors.into_result()?;

        let hash = hash_password(&input.new_password1)?;
        self.users.set_password(user.id, &hash).await?;
        tracing::info!(%user_id, "changed password");
        Ok(())
    }
}
