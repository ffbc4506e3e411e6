use thiserror::Error;

/// Failures while turning an uploaded file into groups, or groups into a file.
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("Unsupported file type: {filename}")]
    UnsupportedFormat { filename: String },

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("File is not valid UTF-8 text")]
    NotText(#[from] std::str::Utf8Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unreadable workbook: {0}")]
    WorkbookRead(#[from] calamine::Error),

    #[error("Failed to write workbook: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures reading or writing a durable slot.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {name}")]
    Missing { name: &'static str },

    #[error("Invalid configuration: {field} = {value}")]
    Invalid { field: &'static str, value: String },
}
