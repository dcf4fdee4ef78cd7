//! Account credential rules: password policy and email shape.

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Attributes shorter than this are ignored by the similarity rule.
const MIN_ATTRIBUTE_LEN: usize = 3;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "admin123",
    "letmein1",
    "trustno1",
    "abc12345",
    "zaq12wsx",
    "haslo123",
];

/// Account attributes a password must not resemble.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordContext<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// A single failed password rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordRuleViolation {
    #[error("This password is too short. It must contain at least 8 characters.")]
    TooShort,
    #[error("This password is entirely numeric.")]
    EntirelyNumeric,
    #[error("This password is too common.")]
    TooCommon,
    #[error("The password is too similar to the {0}.")]
    TooSimilar(&'static str),
}

/// Check a candidate password against every rule, collecting all violations.
pub fn validate_password(
    password: &str,
    context: PasswordContext<'_>,
) -> Result<(), Vec<PasswordRuleViolation>> {
    let mut violations = Vec::new();
    let lowered = password.to_lowercase();

    if let Some(field) = similar_attribute(&lowered, context) {
        violations.push(PasswordRuleViolation::TooSimilar(field));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        violations.push(PasswordRuleViolation::TooShort);
    }
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        violations.push(PasswordRuleViolation::TooCommon);
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        violations.push(PasswordRuleViolation::EntirelyNumeric);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn similar_attribute(lowered: &str, context: PasswordContext<'_>) -> Option<&'static str> {
    let local_part = context.email.split('@').next().unwrap_or_default();
    let candidates = [
        ("email address", local_part),
        ("first name", context.first_name),
        ("last name", context.last_name),
    ];
    candidates.into_iter().find_map(|(field, value)| {
        let value = value.trim().to_lowercase();
        if value.chars().count() < MIN_ATTRIBUTE_LEN {
            return None;
        }
        (lowered.contains(&value) || value.contains(lowered)).then_some(field)
    })
}

/// Loose structural check: one `@`, non-empty local part, dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Lowercase the domain part, keep the local part as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_owned(),
    }
}
