use std::sync::Arc;

use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use charity_auth_types::identity::SessionKey;

use crate::infra::cache::RedisChartCache;
use crate::infra::chart::PlottersChartRenderer;
use crate::infra::db::{
    DbAdminRepository, DbCategoryRepository, DbContactMessageRepository, DbDonationRepository,
    DbInstitutionRepository, DbProblemReportRepository, DbReportRepository, DbTokenRepository,
    DbUserRepository,
};
use crate::infra::mailer::OutboxMailer;
use crate::usecase::admin::AdminRegistry;
use crate::usecase::mail::SiteLinks;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub session_key: SessionKey,
    pub cookie_domain: String,
    pub links: SiteLinks,
    pub from_email: String,
    pub admin: Arc<AdminRegistry>,
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn institution_repo(&self) -> DbInstitutionRepository {
        DbInstitutionRepository {
            db: self.db.clone(),
        }
    }

    pub fn donation_repo(&self) -> DbDonationRepository {
        DbDonationRepository {
            db: self.db.clone(),
        }
    }

    pub fn contact_message_repo(&self) -> DbContactMessageRepository {
        DbContactMessageRepository {
            db: self.db.clone(),
        }
    }

    pub fn problem_report_repo(&self) -> DbProblemReportRepository {
        DbProblemReportRepository {
            db: self.db.clone(),
        }
    }

    pub fn admin_repo(&self) -> DbAdminRepository {
        DbAdminRepository {
            db: self.db.clone(),
        }
    }

    pub fn report_repo(&self) -> DbReportRepository {
        DbReportRepository {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> OutboxMailer {
        OutboxMailer {
            db: self.db.clone(),
            from_email: self.from_email.clone(),
        }
    }

    pub fn chart_cache(&self) -> RedisChartCache {
        RedisChartCache {
            pool: self.redis.clone(),
        }
    }

    pub fn chart_renderer(&self) -> PlottersChartRenderer {
        PlottersChartRenderer
    }
}
