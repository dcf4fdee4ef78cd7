use chrono::Utc;
use uuid::Uuid;

use charity_domain::institution::InstitutionType;

use charity_donations::usecase::home::{GetHomeUseCase, HomeQuery};

use crate::helpers::{MockDonationRepo, MockInstitutionRepo, MockStore};

fn home(store: &MockStore) -> GetHomeUseCase<MockInstitutionRepo, MockDonationRepo> {
    GetHomeUseCase {
        institutions: store.institution_repo(),
        donations: store.donation_repo(),
    }
}

#[tokio::test]
async fn should_report_zero_bags_without_donations() {
    let store = MockStore::new();

    let view = home(&store).execute(HomeQuery::default()).await.unwrap();

    assert_eq!(view.total_bags, 0);
    assert_eq!(view.supported_institutions, 0);
    assert!(view.foundations.items.is_empty());
    assert_eq!(view.foundations.info.num_pages, 1);
}

#[tokio::test]
async fn should_sum_quantities_across_donations() {
    let store = MockStore::new();
    let institution = store.add_institution("Dobra Fundacja", InstitutionType::Foundation, vec![]);
    let donations = store.donation_repo();
    let today = Utc::now().date_naive();
    for quantity in [3, 4, 5] {
        donations.seed(Uuid::now_v7(), &institution, quantity, today);
    }

    let view = home(&store).execute(HomeQuery::default()).await.unwrap();

    assert_eq!(view.total_bags, 12);
    assert_eq!(view.supported_institutions, 1);
}

#[tokio::test]
async fn should_paginate_each_institution_type_independently() {
    let store = MockStore::new();
    for n in 0..12 {
        store.add_institution(&format!("Fundacja {n:02}"), InstitutionType::Foundation, vec![]);
    }
    store.add_institution("Zbiórka Osiedlowa", InstitutionType::LocalCollection, vec![]);

    let mut sizes = Vec::new();
    for page in ["1", "2", "3"] {
        let view = home(&store)
            .execute(HomeQuery {
                page_foundations: Some(page.to_owned()),
                ..Default::default()
            })
            .await
            .unwrap();
        sizes.push(view.foundations.items.len());
        assert_eq!(view.local_collections.items.len(), 1);
        assert!(view.ngos.items.is_empty());
    }
    assert_eq!(sizes, vec![5, 5, 2]);
}

#[tokio::test]
async fn should_clamp_out_of_range_page() {
    let store = MockStore::new();
    for n in 0..12 {
        store.add_institution(&format!("Fundacja {n:02}"), InstitutionType::Foundation, vec![]);
    }

    let view = home(&store)
        .execute(HomeQuery {
            page_foundations: Some("99".to_owned()),
            page_ngos: Some("abc".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(view.foundations.info.number, 3);
    assert_eq!(view.foundations.items.len(), 2);
    assert_eq!(view.ngos.info.number, 1);
}
