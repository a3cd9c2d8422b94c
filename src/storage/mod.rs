// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::parser::ExamItem;
use crate::utils::error::StorageError;

pub const RECORDS_FILE: &str = "parsed_kisi_kisi.json";
pub const LINES_FILE: &str = "extracted_content.json";
pub const METADATA_FILE: &str = "parsed_kisi_kisi_meta.json";

/// Counts describing one extraction + parsing run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub source: String,
    pub line_count: usize,
    pub paragraph_count: usize,
    pub table_cell_count: usize,
    pub header_lines: usize,
    pub record_count: usize,
    pub complete_record_count: usize,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self {
            base_dir: base_path,
        })
    }

    /// Saves the parsed exam items as a pretty-printed JSON array
    pub fn save_records(&self, records: &[ExamItem]) -> Result<PathBuf, StorageError> {
        let path = self.write_json(RECORDS_FILE, records)?;
        tracing::info!("Saved {} records to {}", records.len(), path.display());
        Ok(path)
    }

    /// Saves the raw extracted lines for inspection
    pub fn save_extracted_lines(&self, lines: &[String]) -> Result<PathBuf, StorageError> {
        let path = self.write_json(LINES_FILE, lines)?;
        tracing::info!("Saved {} extracted lines to {}", lines.len(), path.display());
        Ok(path)
    }

    /// Saves metadata about the run in JSON format
    pub fn save_run_metadata(&self, summary: &RunSummary) -> Result<PathBuf, StorageError> {
        let metadata = serde_json::json!({
            "source": summary.source,
            "line_count": summary.line_count,
            "paragraph_count": summary.paragraph_count,
            "table_cell_count": summary.table_cell_count,
            "header_lines": summary.header_lines,
            "record_count": summary.record_count,
            "complete_record_count": summary.complete_record_count,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let path = self.write_json(METADATA_FILE, &metadata)?;
        tracing::info!("Saved metadata to {}", path.display());
        Ok(path)
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        filename: &str,
        value: &T,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(filename);

        // serde_json leaves non-ASCII text unescaped
        let contents = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, contents).map_err(StorageError::IoError)?;

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ExamItem {
        ExamItem {
            number: 1,
            answer_key: "C".to_string(),
            element: "Bilangan".to_string(),
            sub_element: "Bilangan Bulat".to_string(),
            cognitive_level: "Penerapan".to_string(),
            context: "Sosial Budaya".to_string(),
            competency: "Menyelesaikan masalah".to_string(),
            indicator: "Siswa menghitung selisih suhu −5°C".to_string(),
        }
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("run");

        StorageManager::new(&nested).unwrap();

        assert!(nested.is_dir());
    }

    #[test]
    fn test_save_records_round_trips_and_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let second = ExamItem {
            number: 2,
            answer_key: "A".to_string(),
            ..ExamItem::default()
        };
        let records = vec![sample_item(), second];

        let path = storage.save_records(&records).unwrap();

        assert_eq!(path, dir.path().join(RECORDS_FILE));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("−5°C"));
        assert!(written.starts_with("[\n  {\n    \"number\": 1,\n    \"answer_key\": \"C\","));
        let parsed: Vec<ExamItem> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_save_empty_records() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let path = storage.save_records(&[]).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn test_save_extracted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let lines = vec!["KISI-KISI".to_string(), "Tipe B".to_string()];

        let path = storage.save_extracted_lines(&lines).unwrap();

        let written: Vec<String> =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, lines);
    }

    #[test]
    fn test_save_run_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let summary = RunSummary {
            source: "blueprint.docx".to_string(),
            line_count: 200,
            paragraph_count: 8,
            table_cell_count: 192,
            header_lines: 11,
            record_count: 30,
            complete_record_count: 29,
        };

        let path = storage.save_run_metadata(&summary).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["source"], "blueprint.docx");
        assert_eq!(value["record_count"], 30);
        assert_eq!(value["complete_record_count"], 29);
        let timestamp = value["extraction_timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_unwritable_target_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        // A directory squatting on the output name makes the write fail
        fs::create_dir(dir.path().join(RECORDS_FILE)).unwrap();

        let result = storage.save_records(&[sample_item()]);

        assert!(matches!(result, Err(StorageError::IoError(_))));
    }
}
