//! [`FunnelStore`] over PostgreSQL.

use async_trait::async_trait;
use rally_core::page::{CampaignRef, PageRecord};
use rally_core::store::{CampaignSource, FunnelStore, PageSource, StoreError};
use rally_core::types::DbId;

use crate::repositories::{CampaignRepo, PageRepo, UserRepo};
use crate::DbPool;

/// Data-source implementation backed by a connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CampaignSource for PgStore {
    async fn find_campaign_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<CampaignRef>, StoreError> {
        let campaign = CampaignRepo::find_by_domain(&self.pool, domain).await?;
        Ok(campaign.map(CampaignRef::from))
    }
}

#[async_trait]
impl PageSource for PgStore {
    async fn find_page(
        &self,
        code: &str,
        campaign_id: DbId,
    ) -> Result<Option<PageRecord>, StoreError> {
        let page = PageRepo::find_by_code(&self.pool, code, campaign_id).await?;
        Ok(page.map(PageRecord::from))
    }

    async fn find_user_first_name(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        Ok(UserRepo::find_first_name(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl FunnelStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
