//! Alignment dataset input
//!
//! - `records.rs` - LanguageChunk / AlignmentPair JSONL shapes
//! - `reader.rs` - line-tolerant JSONL readers
//! - `ingest.rs` - language detection, chunk anchoring, alignment building

pub mod ingest;
pub mod reader;
pub mod records;

pub use ingest::{
    detect_language_pair, AlignmentReport, AnchoredChunks, ConfidenceStats, DatasetIngest, IngestConfig, LanguagePair,
};
pub use reader::{parse_alignments, parse_chunks, parse_jsonl, read_alignments, read_chunks, read_jsonl, ReadReport};
pub use records::{AlignmentPair, ChunkRef, LanguageChunk, Validation};
