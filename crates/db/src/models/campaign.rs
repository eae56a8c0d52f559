//! Campaign entity model and DTOs.

use rally_core::page::CampaignRef;
use rally_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub name: String,
    /// `host[:port]` strings this campaign is served on.
    pub domains: Vec<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new campaign.
#[derive(Debug, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub domains: Vec<String>,
}

impl From<Campaign> for CampaignRef {
    fn from(c: Campaign) -> Self {
        CampaignRef {
            id: c.id,
            name: c.name,
            domains: c.domains,
        }
    }
}
