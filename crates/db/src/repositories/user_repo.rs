//! Repository for the `users` table.

use rally_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, campaign_id, email, password_hash, first_name, zip, \
                        email_frequency, last_authentication_update, created_at, updated_at";

/// Provides read and insert operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (campaign_id, email, password_hash, first_name, zip, email_frequency)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.campaign_id)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.zip)
            .bind(&input.email_frequency)
            .fetch_one(pool)
            .await
    }

    /// Fetch only the first name of a user.
    pub async fn find_first_name(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT first_name FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
