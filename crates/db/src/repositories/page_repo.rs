//! Repository for the `pages` table.

use rally_core::page_code::normalize_page_code;
use rally_core::types::DbId;
use sqlx::PgPool;

use crate::models::page::{CreatePage, Page};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, code, campaign_id, title, subtitle, background, created_by, created_at";

/// Provides read and insert operations for pages.
pub struct PageRepo;

impl PageRepo {
    /// Insert a new page with its code normalized, returning the created row.
    ///
    /// A second page with the same code in the same campaign violates
    /// `uq_pages_code_campaign`.
    pub async fn create(pool: &PgPool, input: &CreatePage) -> Result<Page, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages (code, campaign_id, title, subtitle, background, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(normalize_page_code(&input.code))
            .bind(input.campaign_id)
            .bind(&input.title)
            .bind(&input.subtitle)
            .bind(&input.background)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a page by its normalized code within a campaign.
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
        campaign_id: DbId,
    ) -> Result<Option<Page>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE code = $1 AND campaign_id = $2");
        sqlx::query_as::<_, Page>(&query)
            .bind(code)
            .bind(campaign_id)
            .fetch_optional(pool)
            .await
    }
}
