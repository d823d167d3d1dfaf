use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A keyed business setting. The default set is seeded once at first
/// initialization; thereafter rows are only ever updated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SettingUpdateRequest {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SettingListResponse {
    pub data: Vec<Setting>,
}
