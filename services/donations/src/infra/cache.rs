use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::ChartCache;
use crate::domain::types::CHART_CACHE_TTL_SECS;
use crate::error::DonationsServiceError;

#[derive(Clone)]
pub struct RedisChartCache {
    pub pool: Pool,
}

impl ChartCache for RedisChartCache {
    async fn get(&self, key: &str) -> Result<Option<String>, DonationsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DonationsServiceError::Internal(e.into()))?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| DonationsServiceError::Internal(e.into()))?;
        Ok(value)
    }

    async fn set(&self, key: &str, data_uri: &str) -> Result<(), DonationsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DonationsServiceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(key, data_uri, CHART_CACHE_TTL_SECS)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| DonationsServiceError::Internal(e.into()))?;
        Ok(())
    }
}
