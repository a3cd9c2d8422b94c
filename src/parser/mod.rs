// src/parser/mod.rs
pub mod records;

pub use records::{ExamItem, RecordParser};
