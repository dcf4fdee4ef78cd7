//! Outbound email composition.

use charity_auth_types::uid::encode_uid;

use crate::domain::types::{AccountToken, ContactMessage, MailKind, OutgoingMail, User};

/// Builds absolute links for emails.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    pub domain: String,
}

impl SiteLinks {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn activation_url(&self, token: &AccountToken) -> String {
        format!(
            "https://{}/activate/{}/{}/",
            self.domain,
            encode_uid(token.user_id),
            token.token
        )
    }

    pub fn password_reset_url(&self, token: &AccountToken) -> String {
        format!(
            "https://{}/password_reset_confirm/{}/{}/",
            self.domain,
            encode_uid(token.user_id),
            token.token
        )
    }
}

pub fn activation_mail(user: &User, token: &AccountToken, links: &SiteLinks) -> OutgoingMail {
    let body = format!(
        "Hi {},\n\nThank you for registering. Please click the link below to activate your account:\n\n{}\n\nIf you did not register on our site, ignore this message.",
        user.first_name,
        links.activation_url(token)
    );
    OutgoingMail {
        kind: MailKind::AccountActivation,
        to: vec![user.email.clone()],
        subject: "Activate your account".to_owned(),
        body,
        idempotency_key: format!("{}:{}", MailKind::AccountActivation.as_str(), token.id),
    }
}

pub fn password_reset_mail(user: &User, token: &AccountToken, links: &SiteLinks) -> OutgoingMail {
    let body = format!(
        "Hi {},\n\nPlease click the link below to reset your password:\n\n{}\n\nIf you did not ask for a password reset, ignore this message.",
        user.first_name,
        links.password_reset_url(token)
    );
    OutgoingMail {
        kind: MailKind::PasswordReset,
        to: vec![user.email.clone()],
        subject: "Reset your password".to_owned(),
        body,
        idempotency_key: format!("{}:{}", MailKind::PasswordReset.as_str(), token.id),
    }
}

pub fn contact_mail(message: &ContactMessage, recipients: Vec<String>) -> OutgoingMail {
    let body = format!(
        "First name: {}\nLast name: {}\nEmail: {}\n\nMessage:\n{}",
        message.name, message.surname, message.email, message.message
    );
    OutgoingMail {
        kind: MailKind::ContactMessage,
        to: recipients,
        subject: format!(
            "New contact message from {} {}",
            message.name, message.surname
        ),
        body,
        idempotency_key: format!("{}:{}", MailKind::ContactMessage.as_str(), message.id),
    }
}
