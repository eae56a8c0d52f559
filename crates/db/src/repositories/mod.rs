//! Repository structs with static query methods over `&PgPool`.

mod campaign_repo;
mod page_repo;
mod user_repo;

pub use campaign_repo::CampaignRepo;
pub use page_repo::PageRepo;
pub use user_repo::UserRepo;
