// src/extractors/docx.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use roxmltree::{Document, Node};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

// --- Constants ---
/// WordprocessingML main namespace; every body element we read lives in it.
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Package part holding the document body.
const DOCUMENT_PART: &str = "word/document.xml";

// --- Data Structures ---
/// Ordered text lines pulled out of a document, body paragraphs first and
/// table cells after them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub lines: Vec<String>,
    pub paragraph_count: usize,  // Non-empty body paragraphs kept
    pub table_cell_count: usize, // Non-empty table cells kept (merged cells counted per grid slot)
}

// --- Main Extractor Structure ---
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Opens a DOCX file and extracts its trimmed, non-empty text lines.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractedText, ExtractError> {
        let path = path.as_ref();
        tracing::info!("Reading document: {}", path.display());

        let file = File::open(path)?;
        self.extract_reader(BufReader::new(file))
    }

    /// Extracts text lines from any seekable DOCX byte source.
    pub fn extract_reader<R: Read + Seek>(&self, reader: R) -> Result<ExtractedText, ExtractError> {
        let xml = read_document_part(reader)?;
        tracing::debug!("Loaded {} ({} bytes)", DOCUMENT_PART, xml.len());
        self.extract_xml(&xml)
    }

    /// Walks the body of a `word/document.xml` payload.
    ///
    /// Paragraph and table positions are not interleaved: every kept body
    /// paragraph comes first, then every kept table cell in
    /// table → row → cell order.
    pub fn extract_xml(&self, xml: &str) -> Result<ExtractedText, ExtractError> {
        let document = Document::parse(xml)?;
        let body = document
            .root_element()
            .children()
            .find(|node| is_w(*node, "body"))
            .ok_or_else(|| ExtractError::Structure("document has no w:body element".to_string()))?;

        let paragraphs: Vec<String> = body
            .children()
            .filter(|node| is_w(*node, "p"))
            .filter_map(|paragraph| non_empty_trimmed(&paragraph_text(paragraph)))
            .collect();

        let mut cells: Vec<String> = Vec::new();
        for table in body.children().filter(|node| is_w(*node, "tbl")) {
            let texts = table_cell_texts(table)?;
            cells.extend(texts.iter().filter_map(|text| non_empty_trimmed(text)));
        }

        tracing::info!(
            "Extracted {} paragraph lines and {} table cell lines",
            paragraphs.len(),
            cells.len()
        );

        let paragraph_count = paragraphs.len();
        let table_cell_count = cells.len();
        let mut lines = paragraphs;
        lines.extend(cells);

        Ok(ExtractedText {
            lines,
            paragraph_count,
            table_cell_count,
        })
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// --- Package Access ---
fn read_document_part<R: Read + Seek>(reader: R) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
        ZipError::FileNotFound => ExtractError::MissingPart(DOCUMENT_PART.to_string()),
        other => ExtractError::Archive(other),
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

// --- XML Helpers ---
fn is_w(node: Node, name: &str) -> bool {
    node.is_element() && node.has_tag_name((W_NS, name))
}

fn w_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_w(*child, name))
}

fn w_val<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((W_NS, "val"))
}

fn non_empty_trimmed(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Text of a paragraph: its direct runs plus runs nested in hyperlinks.
fn paragraph_text(paragraph: Node) -> String {
    let mut text = String::new();
    for child in paragraph.children() {
        if is_w(child, "r") {
            push_run_text(child, &mut text);
        } else if is_w(child, "hyperlink") {
            for run in child.children().filter(|node| is_w(*node, "r")) {
                push_run_text(run, &mut text);
            }
        }
    }
    text
}

fn push_run_text(run: Node, out: &mut String) {
    for item in run.children().filter(|node| node.is_element()) {
        if item.tag_name().namespace() != Some(W_NS) {
            continue;
        }
        match item.tag_name().name() {
            "t" => out.push_str(item.text().unwrap_or_default()),
            "tab" | "ptab" => out.push('\t'),
            "br" => match item.attribute((W_NS, "type")) {
                None | Some("textWrapping") => out.push('\n'),
                _ => {} // Page and column breaks carry no text
            },
            "cr" => out.push('\n'),
            "noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
}

// --- Table Traversal ---
/// Cell texts of one table, one entry per layout-grid slot.
///
/// A cell spanning several grid columns is repeated once per column, and a
/// cell continuing a vertical merge repeats the text of the cell that opened
/// the merge in that column. Skipped leading slots (`w:gridBefore`) produce
/// nothing. A row whose offset or spans run past the table grid is a
/// structure error.
fn table_cell_texts(table: Node) -> Result<Vec<String>, ExtractError> {
    let width = grid_width(table);
    let mut texts = Vec::new();
    // Text owning each grid column in the previous rows
    let mut column_owner: Vec<Option<String>> = vec![None; width];

    for (row_index, row) in table.children().filter(|node| is_w(*node, "tr")).enumerate() {
        let mut column = grid_before(row);
        if column > width {
            return Err(ExtractError::Structure(format!(
                "row {} skips {} grid columns of a {}-column table",
                row_index, column, width
            )));
        }

        for cell in row.children().filter(|node| is_w(*node, "tc")) {
            let span = grid_span(cell);
            let end = column
                .checked_add(span)
                .filter(|end| *end <= width)
                .ok_or_else(|| {
                    ExtractError::Structure(format!(
                        "cell in row {} spans {} columns from column {} of a {}-column table",
                        row_index, span, column, width
                    ))
                })?;

            let text = if continues_vertical_merge(cell) {
                column_owner[column].clone().unwrap_or_default()
            } else {
                cell_text(cell)
            };

            for owner in &mut column_owner[column..end] {
                *owner = Some(text.clone());
            }
            texts.extend(std::iter::repeat(text).take(span));
            column = end;
        }
    }

    Ok(texts)
}

/// Column count of the table grid: the `w:tblGrid/w:gridCol` entries, or the
/// widest row counted in cells when the grid is not declared.
fn grid_width(table: Node) -> usize {
    let declared = w_child(table, "tblGrid")
        .map(|grid| grid.children().filter(|node| is_w(*node, "gridCol")).count())
        .unwrap_or(0);
    if declared > 0 {
        return declared;
    }

    table
        .children()
        .filter(|node| is_w(*node, "tr"))
        .map(|row| row.children().filter(|node| is_w(*node, "tc")).count())
        .max()
        .unwrap_or(0)
}

fn cell_text(cell: Node) -> String {
    cell.children()
        .filter(|node| is_w(*node, "p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn grid_span(cell: Node) -> usize {
    w_child(cell, "tcPr")
        .and_then(|props| w_child(props, "gridSpan"))
        .and_then(w_val)
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

fn grid_before(row: Node) -> usize {
    w_child(row, "trPr")
        .and_then(|props| w_child(props, "gridBefore"))
        .and_then(w_val)
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(0)
}

fn continues_vertical_merge(cell: Node) -> bool {
    match w_child(cell, "tcPr").and_then(|props| w_child(props, "vMerge")) {
        Some(merge) => matches!(w_val(merge), None | Some("continue")),
        None => false,
    }
}
