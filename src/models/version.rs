use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::ServiceId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: String,
    #[serde(rename = "serviceID")]
    pub service_id: ServiceId,
    pub changelog: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateVersionPayload {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub changelog: String,
}
