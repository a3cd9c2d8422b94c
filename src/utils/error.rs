// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Missing or unreadable document

    #[error("Not a readable DOCX package: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Document part missing from package: {0}")]
    MissingPart(String),

    #[error("Malformed document XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Unexpected document structure: {0}")]
    Structure(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output formatting failed: {0}")]
    Format(#[from] serde_json::Error),
}
