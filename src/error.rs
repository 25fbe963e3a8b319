//! Error type shared by the resolver, the extractor and the uploader.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ---------------------------
    // Configuration
    // ---------------------------
    #[error("SUPABASE_SERVICE_KEY is not set\n  export SUPABASE_SERVICE_KEY='your-service-role-key'")]
    MissingCredential,

    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Transport
    // ---------------------------
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // User lookup
    // ---------------------------
    #[error("Cannot look up a user without an email address")]
    EmptyEmail,

    #[error("User lookup failed: {status} {body}")]
    Lookup { status: u16, body: String },

    #[error("User {0} not found")]
    UserNotFound(String),

    // ---------------------------
    // Spreadsheet
    // ---------------------------
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("Row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}: invalid temperature {value:?}")]
    InvalidTemperature { row: usize, value: String },

    // ---------------------------
    // Upload
    // ---------------------------
    #[error("Upload to {table} failed at batch {batch}: {status} {body}")]
    Upload {
        table: String,
        batch: usize,
        status: u16,
        body: String,
    },
}
