//! Alignment dataset record shapes.
//!
//! Chunk ids are unique across the whole dataset (all languages share one
//! counter), so they can key anchors without the language.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DatasetError;

/// One line of extracted page text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageChunk {
    pub text: String,
    pub chunk_id: u64,
    pub language: String,
    /// Zero-padded 1-based page number ("007"). Numbers are accepted too.
    #[serde(deserialize_with = "page_string")]
    pub page: String,
}

impl LanguageChunk {
    pub fn new(chunk_id: u64, language: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chunk_id,
            language: language.into(),
            page: format!("{:03}", page),
        }
    }

    /// Parsed page number. "000" and non-numeric strings are rejected.
    pub fn page_number(&self) -> Result<u32, DatasetError> {
        match self.page.trim().parse::<u32>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(DatasetError::InvalidPage {
                line: 0,
                page: self.page.clone(),
            }),
        }
    }
}

fn page_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Page {
        Text(String),
        Number(u64),
    }

    Ok(match Page::deserialize(deserializer)? {
        Page::Text(s) => s,
        Page::Number(n) => n.to_string(),
    })
}

/// A side of an alignment pair: bare chunk ids, or the full chunk records the
/// alignment pipeline embeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkRef {
    Id(u64),
    Chunk(Box<LanguageChunk>),
}

impl ChunkRef {
    pub fn chunk_id(&self) -> u64 {
        match self {
            Self::Id(id) => *id,
            Self::Chunk(chunk) => chunk.chunk_id,
        }
    }
}

/// Validator verdict attached to an alignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub is_valid_alignment: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Anything else the validator wrote (`validation_success`, `error`, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Validation {
    /// Unjudged alignments count as valid
    pub fn is_valid(&self) -> bool {
        self.is_valid_alignment.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentPair {
    pub alignment_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<String>,
    pub src_chunks: Vec<ChunkRef>,
    pub tgt_chunks: Vec<ChunkRef>,
    pub alignment_type: String,
    #[serde(default)]
    pub validation: Validation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tgt_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tgt_text: Option<String>,
}

impl AlignmentPair {
    pub fn src_ids(&self) -> Vec<u64> {
        self.src_chunks.iter().map(ChunkRef::chunk_id).collect()
    }

    pub fn tgt_ids(&self) -> Vec<u64> {
        self.tgt_chunks.iter().map(ChunkRef::chunk_id).collect()
    }
}
