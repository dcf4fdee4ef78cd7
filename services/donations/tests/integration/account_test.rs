use uuid::Uuid;

use charity_donations::domain::types::{MailKind, TokenKind};
use charity_donations::error::DonationsServiceError;
use charity_donations::usecase::account::{
    ActivateAccountUseCase, AuthorizeStaffUseCase, ChangePasswordInput, ChangePasswordUseCase, EMAIL_TAKEN,
    EditProfileInput, EditProfileUseCase, LoginInput, LoginUseCase, RegisterInput,
    RegisterUseCase, ResendActivationUseCase, landing_path,
};
use charity_donations::usecase::credentials::verify_password;

use crate::helpers::{
    MockMailer, MockStore, MockUserRepo, PASSWORD, link_parts, links, superuser, test_user,
};

fn anna() -> RegisterInput {
    RegisterInput {
        name: "Anna".to_owned(),
        surname: "Kowalska".to_owned(),
        email: "anna@example.com".to_owned(),
        password: PASSWORD.to_owned(),
        password2: PASSWORD.to_owned(),
    }
}

fn register(store: &MockStore) -> RegisterUseCase<MockUserRepo, MockMailer> {
    RegisterUseCase {
        users: store.user_repo(),
        mailer: store.mailer(),
        links: links(),
    }
}

#[tokio::test]
async fn should_register_inactive_user_and_mail_activation_link() {
    let store = MockStore::new();

    let user = register(&store).execute(anna()).await.unwrap();

    assert!(!user.is_active);
    assert_eq!(store.users.lock().unwrap().len(), 1);
    let tokens = store.tokens_of(TokenKind::EmailVerification, user.id);
    assert_eq!(tokens.len(), 1);

    let mails = store.mails.lock().unwrap();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].kind, MailKind::AccountActivation);
    assert_eq!(mails[0].to, vec!["anna@example.com".to_owned()]);
    assert!(mails[0].body.contains(&tokens[0].token.to_string()));
}

#[tokio::test]
async fn should_not_create_user_when_passwords_differ() {
    let store = MockStore::new();
    let input = RegisterInput {
        password2: "Different1!x".to_owned(),
        ..anna()
    };

    let result = register(&store).execute(input).await;

    assert!(
        matches!(result, Err(DonationsServiceError::Validation(ref e)) if e.contains("password2")),
        "expected password2 error, got {result:?}"
    );
    assert!(store.users.lock().unwrap().is_empty());
    assert!(store.mails.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let store = MockStore::with_users(vec![test_user("anna@example.com")]);

    let result = register(&store).execute(anna()).await;

    match result {
        Err(DonationsServiceError::Validation(errors)) => {
            assert_eq!(errors.get("email"), Some(&[EMAIL_TAKEN.to_owned()][..]));
        }
        other => panic!("expected email taken, got {other:?}"),
    }
    assert_eq!(store.users.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_keep_account_when_mail_delivery_fails() {
    let store = MockStore::new();
    let usecase = RegisterUseCase {
        users: store.user_repo(),
        mailer: store.failing_mailer(),
        links: links(),
    };

    let result = usecase.execute(anna()).await;

    assert!(
        matches!(result, Err(DonationsServiceError::MailDelivery(_))),
        "expected MailDelivery, got {result:?}"
    );
    assert_eq!(store.users.lock().unwrap().len(), 1);
    assert_eq!(store.tokens.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_activate_once_with_emailed_link() {
    let store = MockStore::new();
    let user = register(&store).execute(anna()).await.unwrap();
    let (uid, token) = link_parts(&store.mails.lock().unwrap()[0].body);
    let activate = ActivateAccountUseCase {
        tokens: store.token_repo(),
    };

    let activated = activate.execute(&uid, &token).await.unwrap();
    assert_eq!(activated, user.id);
    assert!(store.user(user.id).unwrap().is_active);
    assert!(store.tokens_of(TokenKind::EmailVerification, user.id).is_empty());

    let again = activate.execute(&uid, &token).await;
    assert!(
        matches!(again, Err(DonationsServiceError::InvalidLink)),
        "expected InvalidLink on reuse, got {again:?}"
    );
}

#[tokio::test]
async fn should_reject_malformed_activation_link() {
    let store = MockStore::new();
    let activate = ActivateAccountUseCase {
        tokens: store.token_repo(),
    };

    let result = activate.execute("not-base64!", "not-a-uuid").await;

    assert!(
        matches!(result, Err(DonationsServiceError::InvalidLink)),
        "expected InvalidLink, got {result:?}"
    );
}

#[tokio::test]
async fn should_replace_verification_token_on_resend() {
    let store = MockStore::new();
    let user = register(&store).execute(anna()).await.unwrap();
    let (uid, stale) = link_parts(&store.mails.lock().unwrap()[0].body);
    let resend = ResendActivationUseCase {
        users: store.user_repo(),
        tokens: store.token_repo(),
        mailer: store.mailer(),
        links: links(),
    };

    resend.execute("anna@example.com").await.unwrap();

    assert_eq!(store.tokens_of(TokenKind::EmailVerification, user.id).len(), 1);
    let activate = ActivateAccountUseCase {
        tokens: store.token_repo(),
    };
    let result = activate.execute(&uid, &stale).await;
    assert!(
        matches!(result, Err(DonationsServiceError::InvalidLink)),
        "expected stale link to fail, got {result:?}"
    );
    let (uid, fresh) = link_parts(&store.mails.lock().unwrap()[1].body);
    activate.execute(&uid, &fresh).await.unwrap();
}

#[tokio::test]
async fn should_report_unknown_email_on_resend() {
    let store = MockStore::new();
    let resend = ResendActivationUseCase {
        users: store.user_repo(),
        tokens: store.token_repo(),
        mailer: store.mailer(),
        links: links(),
    };

    let result = resend.execute("ghost@example.com").await;

    assert!(
        matches!(result, Err(DonationsServiceError::EmailNotFound)),
        "expected EmailNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_refuse_login_for_inactive_account() {
    let store = MockStore::new();
    register(&store).execute(anna()).await.unwrap();
    let login = LoginUseCase {
        users: store.user_repo(),
    };

    let result = login
        .execute(LoginInput {
            email: "anna@example.com".to_owned(),
            password: PASSWORD.to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(DonationsServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_login_active_user_and_record_last_login() {
    let user = test_user("anna@example.com");
    let store = MockStore::with_users(vec![user.clone()]);
    let login = LoginUseCase {
        users: store.user_repo(),
    };

    let logged_in = login
        .execute(LoginInput {
            email: "anna@EXAMPLE.com".to_owned(),
            password: PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(logged_in.id, user.id);
    assert!(store.user(user.id).unwrap().last_login.is_some());
    assert_eq!(landing_path(&logged_in), "/");
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let store = MockStore::with_users(vec![test_user("anna@example.com")]);
    let login = LoginUseCase {
        users: store.user_repo(),
    };

    let result = login
        .execute(LoginInput {
            email: "anna@example.com".to_owned(),
            password: "wrong-password".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(DonationsServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_send_superusers_to_admin() {
    assert_eq!(landing_path(&superuser("root@example.com")), "/admin/");
}

#[tokio::test]
async fn should_require_current_password_to_edit_profile() {
    let user = test_user("anna@example.com");
    let store = MockStore::with_users(vec![user.clone()]);
    let edit = EditProfileUseCase {
        users: store.user_repo(),
    };

    let result = edit
        .execute(
            user.id,
            EditProfileInput {
                first_name: "Anna".to_owned(),
                last_name: "Nowak".to_owned(),
                email: "anna@example.com".to_owned(),
                password: "not-my-password".to_owned(),
            },
        )
        .await;

    assert!(
        matches!(result, Err(DonationsServiceError::Validation(ref e)) if e.contains("password")),
        "expected password error, got {result:?}"
    );
    assert_eq!(store.user(user.id).unwrap().last_name, "Kowalska");
}

#[tokio::test]
async fn should_update_profile_and_reject_taken_email() {
    let user = test_user("anna@example.com");
    let other = test_user("jan@example.com");
    let store = MockStore::with_users(vec![user.clone(), other]);
    let edit = EditProfileUseCase {
        users: store.user_repo(),
    };

    let taken = edit
        .execute(
            user.id,
            EditProfileInput {
                first_name: "Anna".to_owned(),
                last_name: "Kowalska".to_owned(),
                email: "jan@example.com".to_owned(),
                password: PASSWORD.to_owned(),
            },
        )
        .await;
    assert!(
        matches!(taken, Err(DonationsServiceError::Validation(ref e)) if e.contains("email")),
        "expected email error, got {taken:?}"
    );

    edit.execute(
        user.id,
        EditProfileInput {
            first_name: "Anna".to_owned(),
            last_name: "Nowak".to_owned(),
            email: "anna.nowak@example.com".to_owned(),
            password: PASSWORD.to_owned(),
        },
    )
    .await
    .unwrap();
    let stored = store.user(user.id).unwrap();
    assert_eq!(stored.last_name, "Nowak");
    assert_eq!(stored.email, "anna.nowak@example.com");
}

#[tokio::test]
async fn should_change_password_after_checking_old_one() {
    let user = test_user("anna@example.com");
    let store = MockStore::with_users(vec![user.clone()]);
    let change = ChangePasswordUseCase {
        users: store.user_repo(),
    };

    let wrong_old = change
        .execute(
            user.id,
            ChangePasswordInput {
                old_password: "nope".to_owned(),
                new_password1: "N3w!Secret#".to_owned(),
                new_password2: "N3w!Secret#".to_owned(),
            },
        )
        .await;
    assert!(
        matches!(wrong_old, Err(DonationsServiceError::Validation(ref e)) if e.contains("old_password")),
        "expected old_password error, got {wrong_old:?}"
    );

    change
        .execute(
            user.id,
            ChangePasswordInput {
                old_password: PASSWORD.to_owned(),
                new_password1: "N3w!Secret#".to_owned(),
                new_password2: "N3w!Secret#".to_owned(),
            },
        )
        .await
        .unwrap();
    let stored = store.user(user.id).unwrap();
    assert!(verify_password("N3w!Secret#", &stored.password_hash));
    assert!(!verify_password(PASSWORD, &stored.password_hash));
}

#[tokio::test]
async fn should_authorize_active_superuser() {
    let root = superuser("root@example.com");
    let store = MockStore::with_users(vec![root.clone()]);
    let usecase = AuthorizeStaffUseCase {
        users: store.user_repo(),
    };

    let user = usecase.execute(root.id).await.unwrap();

    assert_eq!(user.email, "root@example.com");
}

#[tokio::test]
async fn should_forbid_staff_access_after_demotion() {
    // The session still claims superuser; the stored account no longer does.
    let demoted = test_user("former-admin@example.com");
    let store = MockStore::with_users(vec![demoted.clone()]);
    let usecase = AuthorizeStaffUseCase {
        users: store.user_repo(),
    };

    let result = usecase.execute(demoted.id).await;

    assert!(
        matches!(result, Err(DonationsServiceError::NotSuperuser)),
        "expected NotSuperuser, got {result:?}"
    );
}

#[tokio::test]
async fn should_end_staff_session_of_deactivated_or_deleted_account() {
    let mut deactivated = superuser("root@example.com");
    deactivated.is_active = false;
    let store = MockStore::with_users(vec![deactivated.clone()]);
    let usecase = AuthorizeStaffUseCase {
        users: store.user_repo(),
    };

    for user_id in [deactivated.id, Uuid::now_v7()] {
        let result = usecase.execute(user_id).await;
        assert!(
            matches!(result, Err(DonationsServiceError::SessionExpired)),
            "expected SessionExpired, got {result:?}"
        );
    }
}
