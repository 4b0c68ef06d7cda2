//! Diesel table definitions for the SQLite-backed relational store.
//!
//! Hand-written rather than `diesel print-schema`-generated, matching the
//! teacher's committed `schema.rs`. Timestamps are stored as RFC 3339
//! text columns (teacher convention) rather than native SQLite datetimes.

diesel::table! {
    documents (id) {
        id -> Text,
        title -> Text,
        source_url -> Nullable<Text>,
        tags -> Text,
        status -> Text,
        latest_version_id -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    document_versions (id) {
        id -> Text,
        document_id -> Text,
        original_sha256 -> Text,
        storage_key -> Text,
        mime_type -> Text,
        original_filename -> Text,
        size_bytes -> BigInt,
        status -> Text,
        has_text_layer -> Bool,
        needs_ocr -> Bool,
        extracted_chars -> Integer,
        error -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    document_pages (id) {
        id -> Text,
        version_id -> Text,
        page_num -> Integer,
        text -> Text,
        ocr_used -> Bool,
        ocr_confidence -> Nullable<Float>,
        created_at -> Text,
    }
}

diesel::table! {
    chunks (id) {
        id -> Text,
        version_id -> Text,
        document_id -> Text,
        chunk_num -> Integer,
        text -> Text,
        language -> Text,
        page_start -> Integer,
        page_end -> Integer,
        ocr_used -> Bool,
        ocr_confidence -> Nullable<Float>,
        embedding -> Nullable<Binary>,
        created_at -> Text,
    }
}

diesel::table! {
    ingestion_jobs (id) {
        id -> Text,
        version_id -> Text,
        stage -> Text,
        status -> Text,
        queue -> Text,
        attempts -> Integer,
        progress_current -> Nullable<Integer>,
        progress_total -> Nullable<Integer>,
        metrics -> Nullable<Text>,
        error -> Nullable<Text>,
        enqueued_at -> Text,
        started_at -> Nullable<Text>,
        finished_at -> Nullable<Text>,
    }
}

diesel::table! {
    uploads (id) {
        id -> Text,
        original_filename -> Text,
        mime_type -> Text,
        size_bytes -> BigInt,
        sha256 -> Text,
        staging_key -> Text,
        status -> Text,
        document_id -> Nullable<Text>,
        version_id -> Nullable<Text>,
        error -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    documents,
    document_versions,
    document_pages,
    chunks,
    ingestion_jobs,
    uploads,
);
