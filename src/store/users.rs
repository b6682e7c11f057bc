use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use super::StoreError;
use crate::{
    auth::hash_password,
    models::user::{User, UserId},
};

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        CredentialStore { pool }
    }

    /// Hashes `password` and inserts a new user.
    pub async fn create(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let plaintext = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&plaintext))
            .await
            .map_err(|e| StoreError::Hashing(e.to_string()))?
            .map_err(|e| StoreError::Hashing(e.to_string()))?;

        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(&password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
