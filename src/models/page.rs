use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One page's worth of extracted (and possibly OCR'd) text. For formats
/// with no native pagination the extract stage synthesizes pages by
/// re-paginating the flat text (see `pipeline::stages::extract`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPage {
    pub id: Uuid,
    pub version_id: Uuid,
    pub page_num: i32,
    pub text: String,
    pub ocr_used: bool,
    pub ocr_confidence: Option<f32>,
    pub created_at: DateTime<Utc>,
}

impl DocumentPage {
    pub fn new(version_id: Uuid, page_num: i32, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            version_id,
            page_num,
            text,
            ocr_used: false,
            ocr_confidence: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_ocr(mut self, confidence: Option<f32>) -> Self {
        self.ocr_used = true;
        self.ocr_confidence = confidence;
        self
    }
}
