//! Repository for the `campaigns` table.

use sqlx::PgPool;

use crate::models::campaign::{Campaign, CreateCampaign};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, domains, created_at";

/// Provides read and insert operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new campaign, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCampaign) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (name, domains)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.name)
            .bind(&input.domains)
            .fetch_one(pool)
            .await
    }

    /// Find the campaign serving `domain` (exact `host[:port]` match).
    ///
    /// If several campaigns list the same domain, the oldest wins.
    pub async fn find_by_domain(
        pool: &PgPool,
        domain: &str,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns WHERE $1 = ANY(domains) ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(domain)
            .fetch_optional(pool)
            .await
    }
}
