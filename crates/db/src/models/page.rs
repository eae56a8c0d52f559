//! Page entity model and DTOs.

use rally_core::page::PageRecord;
use rally_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full row from the `pages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Page {
    pub id: DbId,
    /// Normalized page code, unique per campaign.
    pub code: String,
    pub campaign_id: DbId,
    pub title: String,
    pub subtitle: String,
    pub background: String,
    /// User id of the creator. Not enforced by a foreign key.
    pub created_by: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a new page. `code` is normalized by the repository.
#[derive(Debug, Deserialize)]
pub struct CreatePage {
    pub code: String,
    pub campaign_id: DbId,
    pub title: String,
    pub subtitle: String,
    pub background: String,
    pub created_by: DbId,
}

impl From<Page> for PageRecord {
    fn from(p: Page) -> Self {
        PageRecord {
            id: p.id,
            code: p.code,
            campaign_id: p.campaign_id,
            title: p.title,
            subtitle: p.subtitle,
            background: p.background,
            created_by: p.created_by,
        }
    }
}
