// pdfalign-core/src/anchor/types.rs
//
// Anchor and Alignment records, as handed to the persistence layer

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatasetError;
use crate::layer::NormalizedRect;

// ==================== ANCHOR ====================

/// A quote located on one page of one document. Immutable once created;
/// re-resolution produces a new anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub anchor_id: Uuid,
    pub document_id: Uuid,
    /// 1-based
    pub page: u32,
    pub rect: NormalizedRect,
    pub quote: String,
    pub quote_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Anchor {
    /// Stamp a fresh id, hash and creation time
    pub fn new(document_id: Uuid, page: u32, rect: NormalizedRect, quote: impl Into<String>) -> Self {
        let quote = quote.into();
        Self {
            anchor_id: Uuid::new_v4(),
            document_id,
            page: page.max(1),
            rect,
            quote_hash: super::hash::quote_hash(&quote),
            quote,
            row_number: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_row_number(mut self, row: u64) -> Self {
        self.row_number = Some(row);
        self
    }
}

// ==================== ALIGNMENT ====================

/// Shape of an alignment, from the dataset's "m-n" strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignmentType {
    #[serde(rename = "1-1")]
    OneToOne,
    #[serde(rename = "1-n")]
    OneToMany,
    #[serde(rename = "n-1")]
    ManyToOne,
    #[serde(rename = "n-m")]
    ManyToMany,
}

static ALIGNMENT_TYPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").unwrap());

impl AlignmentType {
    pub fn from_counts(src: usize, tgt: usize) -> Self {
        match (src, tgt) {
            (1, 1) => Self::OneToOne,
            (1, _) => Self::OneToMany,
            (_, 1) => Self::ManyToOne,
            _ => Self::ManyToMany,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "1-1",
            Self::OneToMany => "1-n",
            Self::ManyToOne => "n-1",
            Self::ManyToMany => "n-m",
        }
    }
}

impl FromStr for AlignmentType {
    type Err = DatasetError;

    /// Accepts numeric "2-1" forms and the symbolic names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-1" => return Ok(Self::OneToOne),
            "1-n" => return Ok(Self::OneToMany),
            "n-1" => return Ok(Self::ManyToOne),
            "n-m" | "m-n" => return Ok(Self::ManyToMany),
            _ => {}
        }

        let caps = ALIGNMENT_TYPE_RE
            .captures(s)
            .ok_or_else(|| DatasetError::InvalidAlignmentType(s.to_string()))?;
        let count = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<usize>().ok()).unwrap_or(0);
        let (src, tgt) = (count(1), count(2));
        if src == 0 || tgt == 0 {
            return Err(DatasetError::InvalidAlignmentType(s.to_string()));
        }
        Ok(Self::from_counts(src, tgt))
    }
}

impl fmt::Display for AlignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validator confidence buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence < 0.5 {
            Self::Low
        } else if confidence >= 0.9 {
            Self::High
        } else {
            Self::Medium
        }
    }
}

/// Correspondence between source and target anchors.
///
/// Ids may point at anchors that are not loaded locally; consumers skip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    pub alignment_id: Uuid,
    pub source_anchor_ids: Vec<Uuid>,
    pub target_anchor_ids: Vec<Uuid>,
    /// Clamped to [0, 1]
    pub confidence: f32,
    pub alignment_type: AlignmentType,
    /// Dataset record this alignment came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<u64>,
}

impl Alignment {
    pub fn new(source_anchor_ids: Vec<Uuid>, target_anchor_ids: Vec<Uuid>, confidence: f32) -> Self {
        let alignment_type = AlignmentType::from_counts(source_anchor_ids.len(), target_anchor_ids.len());
        Self {
            alignment_id: Uuid::new_v4(),
            source_anchor_ids,
            target_anchor_ids,
            confidence: if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 },
            alignment_type,
            dataset_id: None,
        }
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }

    /// Ids on the other side of `anchor_id`, or None if it is not part of
    /// this alignment
    pub fn counterparts(&self, anchor_id: &Uuid) -> Option<&[Uuid]> {
        if self.source_anchor_ids.contains(anchor_id) {
            Some(&self.target_anchor_ids)
        } else if self.target_anchor_ids.contains(anchor_id) {
            Some(&self.source_anchor_ids)
        } else {
            None
        }
    }
}
