//! Newline-delimited JSON readers.
//!
//! Bad lines are logged and skipped; only I/O failures abort a read.

use std::io::BufRead;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::records::{AlignmentPair, LanguageChunk};
use crate::error::DatasetError;

/// Parsed records plus skip accounting
#[derive(Debug, Clone, Serialize)]
pub struct ReadReport<T> {
    pub records: Vec<T>,
    pub parsed: usize,
    pub skipped: usize,
}

impl<T> Default for ReadReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            parsed: 0,
            skipped: 0,
        }
    }
}

impl<T> ReadReport<T> {
    fn accept(&mut self, record: T) {
        self.records.push(record);
        self.parsed += 1;
    }

    fn reject(&mut self, err: DatasetError) {
        log::warn!("skipping dataset line: {}", err);
        self.skipped += 1;
    }
}

fn parse_line<T: DeserializeOwned>(report: &mut ReadReport<T>, line_no: usize, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<T>(line) {
        Ok(record) => report.accept(record),
        Err(source) => report.reject(DatasetError::Json { line: line_no, source }),
    }
}

/// Read any JSONL record type from a buffered reader. Line numbers are 1-based.
pub fn read_jsonl<T: DeserializeOwned, R: BufRead>(reader: R) -> Result<ReadReport<T>, DatasetError> {
    let mut report = ReadReport::default();
    for (idx, line) in reader.lines().enumerate() {
        parse_line(&mut report, idx + 1, &line?);
    }
    Ok(report)
}

/// Same as [`read_jsonl`] over an in-memory string
pub fn parse_jsonl<T: DeserializeOwned>(text: &str) -> ReadReport<T> {
    let mut report = ReadReport::default();
    for (idx, line) in text.lines().enumerate() {
        parse_line(&mut report, idx + 1, line);
    }
    report
}

/// Drop chunks whose page is not a positive number
fn check_pages(mut report: ReadReport<LanguageChunk>) -> ReadReport<LanguageChunk> {
    let records = std::mem::take(&mut report.records);
    report.parsed = 0;
    for chunk in records {
        match chunk.page_number() {
            Ok(_) => report.accept(chunk),
            Err(_) => report.reject(DatasetError::InvalidPage {
                line: 0,
                page: format!("{} (chunk {})", chunk.page, chunk.chunk_id),
            }),
        }
    }
    report
}

pub fn read_chunks<R: BufRead>(reader: R) -> Result<ReadReport<LanguageChunk>, DatasetError> {
    read_jsonl(reader).map(check_pages)
}

pub fn parse_chunks(text: &str) -> ReadReport<LanguageChunk> {
    check_pages(parse_jsonl(text))
}

pub fn read_alignments<R: BufRead>(reader: R) -> Result<ReadReport<AlignmentPair>, DatasetError> {
    read_jsonl(reader)
}

pub fn parse_alignments(text: &str) -> ReadReport<AlignmentPair> {
    parse_jsonl(text)
}
