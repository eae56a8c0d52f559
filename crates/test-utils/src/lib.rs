//! Testing utilities for the rally workspace.
//!
//! [`MemoryStore`] implements the core data-source traits over plain maps,
//! and the `Fake*` builders mirror the defaults the database factories use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use rally_core::page::{CampaignRef, PageRecord};
use rally_core::page_code::normalize_page_code;
use rally_core::store::{CampaignSource, FunnelStore, PageSource, StoreError};
use rally_core::types::DbId;
use tokio::sync::RwLock;

/// Error every [`MemoryStore`] call returns while the store is marked
/// unavailable.
#[derive(Debug, thiserror::Error)]
#[error("memory store unavailable")]
pub struct StoreUnavailable;

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FakeCampaign {
    pub name: String,
    pub domains: Vec<String>,
}

impl Default for FakeCampaign {
    fn default() -> Self {
        Self {
            name: "Team Markey".to_string(),
            domains: vec!["api:5000".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub campaign_id: Option<DbId>,
    pub email: String,
    pub first_name: String,
    pub zip: String,
    pub email_frequency: String,
}

impl Default for FakeUser {
    fn default() -> Self {
        Self {
            campaign_id: None,
            email: "ed@edmarkey.com".to_string(),
            first_name: "Ed".to_string(),
            zip: "00000".to_string(),
            email_frequency: "WEEKLY_EMAIL".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: DbId,
    pub campaign_id: Option<DbId>,
    pub email: String,
    pub first_name: String,
    pub zip: String,
    pub email_frequency: String,
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub code: String,
    pub title: String,
    pub subtitle: String,
    pub background: String,
    pub campaign_id: DbId,
    pub created_by: DbId,
}

impl FakePage {
    /// A page with the scenario defaults (`ed`, "Help Ed", "Join now", `bg1`).
    pub fn new(campaign_id: DbId, created_by: DbId) -> Self {
        Self {
            code: "ed".to_string(),
            title: "Help Ed".to_string(),
            subtitle: "Join now".to_string(),
            background: "bg1".to_string(),
            campaign_id,
            created_by,
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    campaigns: HashMap<DbId, CampaignRef>,
    users: HashMap<DbId, StoredUser>,
    pages: HashMap<DbId, PageRecord>,
}

/// In-memory [`FunnelStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
    queries: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn begin_query(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Box::new(StoreUnavailable));
        }
        Ok(())
    }

    /// Make every subsequent query fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of read queries served so far, failed ones included.
    pub fn query_count(&self) -> i64 {
        self.queries.load(Ordering::SeqCst)
    }

    pub async fn insert_campaign(&self, fake: FakeCampaign) -> CampaignRef {
        let campaign = CampaignRef {
            id: self.allocate_id(),
            name: fake.name,
            domains: fake.domains,
        };
        self.tables
            .write()
            .await
            .campaigns
            .insert(campaign.id, campaign.clone());
        campaign
    }

    pub async fn insert_user(&self, fake: FakeUser) -> StoredUser {
        let user = StoredUser {
            id: self.allocate_id(),
            campaign_id: fake.campaign_id,
            email: fake.email,
            first_name: fake.first_name,
            zip: fake.zip,
            email_frequency: fake.email_frequency,
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        user
    }

    /// Insert a page. The code is stored normalized, as the page builder does.
    pub async fn insert_page(&self, fake: FakePage) -> PageRecord {
        let page = PageRecord {
            id: self.allocate_id(),
            code: normalize_page_code(&fake.code),
            campaign_id: fake.campaign_id,
            title: fake.title,
            subtitle: fake.subtitle,
            background: fake.background,
            created_by: fake.created_by,
        };
        self.tables.write().await.pages.insert(page.id, page.clone());
        page
    }

    pub async fn delete_user(&self, id: DbId) -> bool {
        self.tables.write().await.users.remove(&id).is_some()
    }
}

#[async_trait]
impl CampaignSource for MemoryStore {
    async fn find_campaign_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<CampaignRef>, StoreError> {
        self.begin_query()?;
        let tables = self.tables.read().await;
        Ok(tables
            .campaigns
            .values()
            .find(|c| c.domains.iter().any(|d| d == domain))
            .cloned())
    }
}

#[async_trait]
impl PageSource for MemoryStore {
    async fn find_page(
        &self,
        code: &str,
        campaign_id: DbId,
    ) -> Result<Option<PageRecord>, StoreError> {
        self.begin_query()?;
        let tables = self.tables.read().await;
        Ok(tables
            .pages
            .values()
            .find(|p| p.code == code && p.campaign_id == campaign_id)
            .cloned())
    }

    async fn find_user_first_name(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        self.begin_query()?;
        let tables = self.tables.read().await;
        Ok(tables.users.get(&user_id).map(|u| u.first_name.clone()))
    }
}

#[async_trait]
impl FunnelStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Box::new(StoreUnavailable));
        }
        Ok(())
    }
}

/// Seed the reference scenario: one campaign, its creator, and the `ed` page.
pub async fn seed_scenario(store: &MemoryStore) -> (CampaignRef, StoredUser, PageRecord) {
    let campaign = store.insert_campaign(FakeCampaign::default()).await;
    let user = store
        .insert_user(FakeUser {
            campaign_id: Some(campaign.id),
            ..FakeUser::default()
        })
        .await;
    let page = store.insert_page(FakePage::new(campaign.id, user.id)).await;
    (campaign, user, page)
}
