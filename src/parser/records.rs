// src/parser/records.rs

// --- Imports ---
use serde::{Deserialize, Serialize};

// --- Constants ---
/// Leading lines of the blueprint template (title block and column headings).
/// Their content is never inspected.
pub const DEFAULT_HEADER_LINES: usize = 11;
pub const MIN_ITEM_NUMBER: u32 = 1;
pub const MAX_ITEM_NUMBER: u32 = 30;
/// Lines following the answer key that map onto the metadata fields.
pub const METADATA_FIELD_COUNT: usize = 6;

// --- Data Structures ---
/// One exam item recovered from the blueprint table.
///
/// Field order here is the field order of the JSON output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamItem {
    pub number: u32,
    pub answer_key: String,
    pub element: String,
    pub sub_element: String,
    pub cognitive_level: String,
    pub context: String,
    pub competency: String,
    pub indicator: String,
}

impl ExamItem {
    fn open(number: u32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Assigns a collected metadata block positionally. Blocks shorter than
    /// `METADATA_FIELD_COUNT` leave every metadata field untouched.
    fn assign_metadata(&mut self, block: Vec<String>) -> bool {
        if block.len() < METADATA_FIELD_COUNT {
            return false;
        }

        let mut entries = block.into_iter();
        for field in [
            &mut self.element,
            &mut self.sub_element,
            &mut self.cognitive_level,
            &mut self.context,
            &mut self.competency,
            &mut self.indicator,
        ] {
            *field = entries.next().unwrap_or_default();
        }
        true
    }

    /// True when all six metadata fields carry text.
    pub fn has_metadata(&self) -> bool {
        [
            &self.element,
            &self.sub_element,
            &self.cognitive_level,
            &self.context,
            &self.competency,
            &self.indicator,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }
}

/// Returns the item number when `line` starts a new record: ASCII digits
/// only, value within `MIN_ITEM_NUMBER..=MAX_ITEM_NUMBER`.
pub fn boundary_number(line: &str) -> Option<u32> {
    if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Overflow means the value is far outside the item range anyway
    line.parse::<u32>()
        .ok()
        .filter(|number| (MIN_ITEM_NUMBER..=MAX_ITEM_NUMBER).contains(number))
}

// --- Parser ---
/// Regroups a flat line sequence into exam items.
///
/// Single forward pass with an explicit cursor. A boundary line opens an item,
/// the next line is its answer key and up to six further lines form its
/// metadata block. Structural mismatches never fail the pass; they leave
/// fields empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordParser {
    header_lines: usize,
}

impl RecordParser {
    pub fn new() -> Self {
        Self::with_header_lines(DEFAULT_HEADER_LINES)
    }

    pub fn with_header_lines(header_lines: usize) -> Self {
        Self { header_lines }
    }

    pub fn header_lines(&self) -> usize {
        self.header_lines
    }

    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Vec<ExamItem> {
        let content = lines.get(self.header_lines..).unwrap_or(&[]);
        tracing::debug!(
            "Parsing {} lines after skipping {} header lines",
            content.len(),
            self.header_lines
        );

        let mut items = Vec::new();
        let mut current: Option<ExamItem> = None;
        let mut i = 0;

        while i < content.len() {
            let number = match boundary_number(content[i].as_ref()) {
                Some(number) => number,
                None => {
                    i += 1;
                    continue;
                }
            };

            if let Some(finished) = current.take() {
                items.push(finished);
            }
            let mut item = ExamItem::open(number);
            tracing::trace!("Opened item {} at line {}", number, i + self.header_lines);

            if i + 1 < content.len() {
                item.answer_key = content[i + 1].as_ref().to_string();
                i += 2;

                let mut block = Vec::with_capacity(METADATA_FIELD_COUNT);
                while i < content.len() && boundary_number(content[i].as_ref()).is_none() {
                    block.push(content[i].as_ref().to_string());
                    i += 1;
                    if block.len() >= METADATA_FIELD_COUNT {
                        break;
                    }
                }

                let collected = block.len();
                if !item.assign_metadata(block) {
                    tracing::debug!(
                        "Item {} has {} of {} metadata lines; metadata left empty",
                        number, collected, METADATA_FIELD_COUNT
                    );
                }

                current = Some(item);
                continue;
            }

            // Boundary on the final line: no answer key, no metadata
            current = Some(item);
            i += 1;
        }

        if let Some(finished) = current {
            items.push(finished);
        }

        tracing::debug!("Parsed {} items", items.len());
        items
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}
