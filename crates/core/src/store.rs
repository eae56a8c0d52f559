//! Read-only data-source seams used by the resolver and the HTTP layer.
//!
//! The PostgreSQL implementation lives in `rally-db`; tests use an in-memory
//! implementation.

use async_trait::async_trait;

use crate::page::{CampaignRef, PageRecord};
use crate::types::DbId;

/// Failure reported by a data source. The concrete cause stays attached as
/// the error source.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Looks up campaigns.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    /// Find the campaign that serves `domain` (a `host[:port]` string).
    async fn find_campaign_by_domain(&self, domain: &str)
        -> Result<Option<CampaignRef>, StoreError>;
}

/// Looks up pages and the users that created them.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Find a page by its normalized code within a campaign.
    async fn find_page(
        &self,
        code: &str,
        campaign_id: DbId,
    ) -> Result<Option<PageRecord>, StoreError>;

    /// First name of the user with `user_id`, if that user exists.
    async fn find_user_first_name(&self, user_id: DbId) -> Result<Option<String>, StoreError>;
}

/// Everything the HTTP layer reads from.
#[async_trait]
pub trait FunnelStore: CampaignSource + PageSource {
    /// Cheap round-trip used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
