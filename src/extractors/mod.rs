// src/extractors/mod.rs
pub mod docx;

// Re-export key extraction types for convenience
pub use docx::{DocxExtractor, ExtractedText};
