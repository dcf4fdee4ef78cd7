use chrono::{Days, Utc};
use uuid::Uuid;

use charity_domain::donation::DonationStatus;
use charity_domain::institution::InstitutionType;

use charity_donations::error::DonationsServiceError;
use charity_donations::usecase::donation::{
    CreateDonationInput, CreateDonationUseCase, GetDonationFormUseCase, GetProfileUseCase,
    ProfileQuery, ToggleTakenByUserUseCase,
};

use crate::helpers::{
    MockCategoryRepo, MockDonationRepo, MockInstitutionRepo, MockStore, test_user,
};

fn create(store: &MockStore) -> CreateDonationUseCase<MockCategoryRepo, MockInstitutionRepo, MockDonationRepo> {
    CreateDonationUseCase {
        categories: store.category_repo(),
        institutions: store.institution_repo(),
        donations: store.donation_repo(),
    }
}

/// A store holding two categories and one foundation accepting both.
fn seeded() -> MockStore {
    let store = MockStore::new();
    let clothes = store.add_category("Ubrania");
    let toys = store.add_category("Zabawki");
    store.add_institution("Fundacja Dbam o Zdrowie", InstitutionType::Foundation, vec![clothes, toys]);
    store
}

fn form() -> CreateDonationInput {
    CreateDonationInput {
        categories: vec!["1".to_owned(), "2".to_owned()],
        bags: "3".to_owned(),
        organization: "1".to_owned(),
        address: "ul. Długa 5".to_owned(),
        city: "Kraków".to_owned(),
        postcode: "30-001".to_owned(),
        phone: "+48123456789".to_owned(),
        date: Utc::now()
            .date_naive()
            .checked_add_days(Days::new(2))
            .unwrap()
            .format("%Y-%m-%d")
            .to_string(),
        time: "10:30".to_owned(),
        more_info: Some("  Ring twice  ".to_owned()),
    }
}

#[tokio::test]
async fn should_create_donation_with_categories() {
    let store = seeded();
    let user_id = Uuid::now_v7();

    let id = create(&store).execute(user_id, form()).await.unwrap();

    let donations = store.donations.lock().unwrap();
    assert_eq!(donations.len(), 1);
    let donation = &donations[0];
    assert_eq!(donation.id, id);
    assert_eq!(donation.quantity, 3);
    assert_eq!(donation.user_id, Some(user_id));
    assert_eq!(donation.categories.len(), 2);
    assert_eq!(donation.status, DonationStatus::Pending);
    assert!(!donation.is_taken_by_user);
    assert_eq!(donation.pick_up_comment.as_deref(), Some("Ring twice"));
}

#[tokio::test]
async fn should_persist_nothing_when_quantity_is_zero() {
    let store = seeded();
    let input = CreateDonationInput {
        bags: "0".to_owned(),
        ..form()
    };

    let result = create(&store).execute(Uuid::now_v7(), input).await;

    assert!(
        matches!(result, Err(DonationsServiceError::Validation(ref e)) if e.contains("bags")),
        "expected bags error, got {result:?}"
    );
    assert!(store.donations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_malformed_phone_number() {
    let store = seeded();
    let input = CreateDonationInput {
        phone: "12-34".to_owned(),
        ..form()
    };

    let result = create(&store).execute(Uuid::now_v7(), input).await;

    assert!(
        matches!(result, Err(DonationsServiceError::Validation(ref e)) if e.contains("phone")),
        "expected phone error, got {result:?}"
    );
    assert!(store.donations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_past_pick_up_date_but_accept_today() {
    let store = seeded();
    let today = Utc::now().date_naive();
    let yesterday = CreateDonationInput {
        date: today.pred_opt().unwrap().format("%Y-%m-%d").to_string(),
        ..form()
    };

    let result = create(&store).execute(Uuid::now_v7(), yesterday).await;
    assert!(
        matches!(result, Err(DonationsServiceError::Validation(ref e)) if e.contains("date")),
        "expected date error, got {result:?}"
    );

    let same_day = CreateDonationInput {
        date: today.format("%Y-%m-%d").to_string(),
        ..form()
    };
    create(&store).execute(Uuid::now_v7(), same_day).await.unwrap();
}

#[tokio::test]
async fn should_report_missing_institution() {
    let store = seeded();
    let input = CreateDonationInput {
        organization: "42".to_owned(),
        ..form()
    };

    let result = create(&store).execute(Uuid::now_v7(), input).await;

    assert!(
        matches!(result, Err(DonationsServiceError::InstitutionNotFound)),
        "expected InstitutionNotFound, got {result:?}"
    );
    assert!(store.donations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_unknown_category() {
    let store = seeded();
    let input = CreateDonationInput {
        categories: vec!["1".to_owned(), "9".to_owned()],
        ..form()
    };

    let result = create(&store).execute(Uuid::now_v7(), input).await;

    assert!(
        matches!(result, Err(DonationsServiceError::Validation(ref e)) if e.contains("categories")),
        "expected categories error, got {result:?}"
    );
}

#[tokio::test]
async fn should_load_form_choices_sorted_by_name() {
    let store = MockStore::new();
    store.add_category("Zabawki");
    store.add_category("Książki");
    store.add_institution("Zbiórka", InstitutionType::LocalCollection, vec![]);
    store.add_institution("Arka", InstitutionType::Ngo, vec![]);
    let usecase = GetDonationFormUseCase {
        categories: store.category_repo(),
        institutions: store.institution_repo(),
    };

    let data = usecase.execute().await.unwrap();

    let categories: Vec<_> = data.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(categories, vec!["Książki", "Zabawki"]);
    assert_eq!(data.institutions[0].name, "Arka");
}

#[tokio::test]
async fn should_restore_flag_after_toggling_twice() {
    let store = seeded();
    let user_id = Uuid::now_v7();
    let id = create(&store).execute(user_id, form()).await.unwrap();
    let toggle = ToggleTakenByUserUseCase {
        donations: store.donation_repo(),
    };

    assert!(toggle.execute(user_id, id).await.unwrap());
    assert!(!toggle.execute(user_id, id).await.unwrap());
    assert!(!store.donations.lock().unwrap()[0].is_taken_by_user);
}

#[tokio::test]
async fn should_forbid_toggling_someone_elses_donation() {
    let store = seeded();
    let id = create(&store).execute(Uuid::now_v7(), form()).await.unwrap();
    let toggle = ToggleTakenByUserUseCase {
        donations: store.donation_repo(),
    };

    let result = toggle.execute(Uuid::now_v7(), id).await;

    assert!(
        matches!(result, Err(DonationsServiceError::NotOwner)),
        "expected NotOwner, got {result:?}"
    );
    assert!(!store.donations.lock().unwrap()[0].is_taken_by_user);

    let missing = toggle.execute(Uuid::now_v7(), 404).await;
    assert!(
        matches!(missing, Err(DonationsServiceError::DonationNotFound)),
        "expected DonationNotFound, got {missing:?}"
    );
}

#[tokio::test]
async fn should_list_only_own_donations_filtered_by_search_and_status() {
    let user = test_user("anna@example.com");
    let store = MockStore::with_users(vec![user.clone()]);
    let clothes = store.add_category("Ubrania");
    let shelter = store.add_institution("Schronisko", InstitutionType::Ngo, vec![clothes.clone()]);
    let school = store.add_institution("Szkoła", InstitutionType::LocalCollection, vec![clothes]);
    let donations = store.donation_repo();
    let day = Utc::now().date_naive();
    donations.seed(user.id, &shelter, 1, day);
    let done = donations.seed(user.id, &school, 2, day);
    donations.seed(Uuid::now_v7(), &shelter, 3, day);
    store.donations.lock().unwrap()[done as usize - 1].status = DonationStatus::Completed;
    let profile = GetProfileUseCase {
        users: store.user_repo(),
        donations: store.donation_repo(),
    };

    let all = profile.execute(user.id, ProfileQuery::default()).await.unwrap();
    assert_eq!(all.donations.info.total, 2);

    let searched = profile
        .execute(
            user.id,
            ProfileQuery {
                search: Some("schron".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(searched.donations.items.len(), 1);
    assert_eq!(searched.search, "schron");

    let completed = profile
        .execute(
            user.id,
            ProfileQuery {
                status: Some("completed".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.donations.items.len(), 1);
    assert_eq!(completed.donations.items[0].id, done);

    let bogus_status = profile
        .execute(
            user.id,
            ProfileQuery {
                status: Some("lost".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(bogus_status.status, None);
    assert_eq!(bogus_status.donations.info.total, 2);
}

#[tokio::test]
async fn should_sort_taken_donations_last() {
    let user = test_user("anna@example.com");
    let store = MockStore::with_users(vec![user.clone()]);
    let shelter = store.add_institution("Schronisko", InstitutionType::Ngo, vec![]);
    let donations = store.donation_repo();
    let day = Utc::now().date_naive();
    let first = donations.seed(user.id, &shelter, 1, day);
    let second = donations.seed(user.id, &shelter, 1, day);
    ToggleTakenByUserUseCase {
        donations: store.donation_repo(),
    }
    .execute(user.id, first)
    .await
    .unwrap();
    let profile = GetProfileUseCase {
        users: store.user_repo(),
        donations: store.donation_repo(),
    };

    let view = profile.execute(user.id, ProfileQuery::default()).await.unwrap();

    let order: Vec<i32> = view.donations.items.iter().map(|d| d.id).collect();
    assert_eq!(order, vec![second, first]);
}
