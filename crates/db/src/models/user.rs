//! User entity model and DTOs.

use rally_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub campaign_id: Option<DbId>,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub zip: String,
    pub email_frequency: String,
    pub last_authentication_update: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user. The password must already be hashed.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub campaign_id: Option<DbId>,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub zip: String,
    pub email_frequency: String,
}
