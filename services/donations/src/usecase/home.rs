use charity_domain::institution::InstitutionType;
use charity_domain::pagination::{INSTITUTIONS_PER_PAGE, Page, PageRequest};

use crate::domain::repository::{DonationRepository, InstitutionRepository};
use crate::domain::types::Institution;
use crate::error::DonationsServiceError;

/// Raw `?page_foundations=&page_ngos=&page_local_collections=` values.
#[derive(Debug, Default)]
pub struct HomeQuery {
    pub page_foundations: Option<String>,
    pub page_ngos: Option<String>,
    pub page_local_collections: Option<String>,
}

pub struct HomeView {
    pub total_bags: i64,
    pub supported_institutions: u64,
    pub foundations: Page<Institution>,
    pub ngos: Page<Institution>,
    pub local_collections: Page<Institution>,
}

pub struct GetHomeUseCase<I, D>
where
    I: InstitutionRepository,
    D: DonationRepository,
{
    pub institutions: I,
    pub donations: D,
}

impl<I, D> GetHomeUseCase<I, D>
where
    I: InstitutionRepository,
    D: DonationRepository,
{
    /// Headline totals plus one independently paginated list per institution type.
    pub async fn execute(&self, query: HomeQuery) -> Result<HomeView, DonationsServiceError> {
        let page = |raw: &Option<String>| PageRequest::from_query(raw.as_deref(), INSTITUTIONS_PER_PAGE);

        Ok(HomeView {
            total_bags: self.donations.total_quantity().await?,
            supported_institutions: self.institutions.count().await?,
            foundations: self
                .institutions
                .page_by_type(InstitutionType::Foundation, page(&query.page_foundations))
                .await?,
            ngos: self
                .institutions
                .page_by_type(InstitutionType::Ngo, page(&query.page_ngos))
                .await?,
            local_collections: self
                .institutions
                .page_by_type(
                    InstitutionType::LocalCollection,
                    page(&query.page_local_collections),
                )
                .await?,
        })
    }
}
