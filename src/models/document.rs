use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DocumentStatus;

/// A logical document: a stable identity that groups one or more
/// `DocumentVersion`s sharing the same `source_url`/title lineage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub source_url: Option<String>,
    pub tags: Vec<String>,
    pub status: DocumentStatus,
    pub latest_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: impl Into<String>, source_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            source_url,
            tags: Vec::new(),
            status: DocumentStatus::Active,
            latest_version_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
