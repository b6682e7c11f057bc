use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use super::{user::UserId, version::Version};

pub type ServiceId = i64;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub versions: Json<Vec<String>>,
    #[serde(rename = "userID")]
    pub user_id: UserId,
}

/// A service with its version rows in place of the denormalized list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWithVersions {
    pub id: ServiceId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub versions: Vec<Version>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    pub fn column(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }
}

/// Query parameters accepted by `GET /services`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesFilter {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    pub sort_key: Option<SortKey>,
    #[serde(default)]
    pub descending: bool,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetServiceQuery {
    pub versions: Option<String>,
}

impl GetServiceQuery {
    /// Only the literal `true` asks for version rows.
    pub fn with_versions(&self) -> bool {
        self.versions.as_deref() == Some("true")
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateServicePayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateServicePayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl UpdateServicePayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }
}
