use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand_core::OsRng;

use charity_domain::account::{PasswordContext, validate_password};

use crate::error::{DonationsServiceError, FieldErrors};

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, DonationsServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DonationsServiceError::Internal(anyhow::anyhow!("hash password: {e}")))
}

/// `false` for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Run the password policy and record every violation under `field`.
pub fn check_password_policy(
    errors: &mut FieldErrors,
    field: &'static str,
    password: &str,
    context: PasswordContext<'_>,
) {
    if let Err(violations) = validate_password(password, context) {
        for violation in violations {
            errors.add(field, violation.to_string());
        }
    }
}
