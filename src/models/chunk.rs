use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Language;

/// Embedding dimensionality produced by the embedder service.
pub const EMBEDDING_DIM: usize = 384;

/// A retrieval unit: ~1000 characters of a version's text with 150-char
/// overlap to its neighbors, language-tagged for FTS routing and carrying
/// its own embedding once the embed stage has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub version_id: Uuid,
    pub document_id: Uuid,
    pub chunk_num: i32,
    pub text: String,
    pub language: Language,
    pub page_start: i32,
    pub page_end: i32,
    pub ocr_used: bool,
    pub ocr_confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version_id: Uuid,
        document_id: Uuid,
        chunk_num: i32,
        text: String,
        language: Language,
        page_start: i32,
        page_end: i32,
        ocr_used: bool,
        ocr_confidence: Option<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            version_id,
            document_id,
            chunk_num,
            text,
            language,
            page_start,
            page_end,
            ocr_used,
            ocr_confidence,
            embedding: None,
            created_at: Utc::now(),
        }
    }
}

/// Encode an embedding vector as a little-endian `f32` blob, the storage
/// representation for the `chunks.embedding` column.
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a little-endian `f32` blob back into an embedding vector.
pub fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity between two equal-length vectors. Returns 0.0 if
/// either vector has zero magnitude, matching the original's defensive
/// handling of all-zero embeddings rather than propagating a NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_roundtrips_through_blob_encoding() {
        let vector: Vec<f32> = (0..EMBEDDING_DIM).map(|i| i as f32 * 0.001).collect();
        let bytes = encode_embedding(&vector);
        assert_eq!(bytes.len(), EMBEDDING_DIM * 4);
        let decoded = decode_embedding(&bytes);
        assert_eq!(vector, decoded);
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_handles_zero_vector() {
        let zero = vec![0.0, 0.0, 0.0];
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
    }
}
