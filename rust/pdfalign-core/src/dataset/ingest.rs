// pdfalign-core/src/dataset/ingest.rs
//
// Dataset -> anchors + alignments

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::records::{AlignmentPair, LanguageChunk};
use crate::anchor::{Alignment, AlignmentType, Anchor, AnchorRequest, AnchorResolutionPipeline, ConfidenceBand, DocumentSet};

/// Languages preferred as the source side, in order
const SOURCE_PRIORITY: [&str; 4] = ["en", "it", "de", "fr"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub targets: Vec<String>,
}

/// Pick the source language (en > it > de > fr, else alphabetically first);
/// every other language present is a target. None for an empty dataset.
pub fn detect_language_pair(chunks: &[LanguageChunk]) -> Option<LanguagePair> {
    let langs: BTreeSet<String> = chunks.iter().map(|c| c.language.to_lowercase()).collect();

    let source = SOURCE_PRIORITY
        .iter()
        .find(|p| langs.contains(**p))
        .map(|p| p.to_string())
        .or_else(|| langs.iter().next().cloned())?;

    let targets = langs.into_iter().filter(|l| *l != source).collect();
    Some(LanguagePair { source, targets })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Drop alignments whose validator confidence is below this
    pub min_confidence: f32,
    /// Keep alignments the validator marked invalid
    pub keep_invalid: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            keep_invalid: false,
        }
    }
}

/// Anchors for a batch of chunks
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnchoredChunks {
    pub anchors: Vec<Anchor>,
    /// chunk_id -> anchor_id
    pub chunk_map: HashMap<u64, Uuid>,
    pub placeholders: usize,
    /// Chunks skipped on a genuine error (unknown language, bad page data)
    pub failed: usize,
}

/// Confidence summary over accepted alignments
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
    pub low: usize,
    pub high: usize,
}

impl ConfidenceStats {
    fn from_alignments(alignments: &[Alignment]) -> Self {
        let mut values: Vec<f32> = alignments.iter().map(|a| a.confidence).collect();
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(f32::total_cmp);

        let count = values.len();
        let band_count = |band| alignments.iter().filter(|a| a.band() == band).count();
        Self {
            count,
            min: values[0],
            max: values[count - 1],
            mean: values.iter().sum::<f32>() / count as f32,
            median: values[count / 2],
            low: band_count(ConfidenceBand::Low),
            high: band_count(ConfidenceBand::High),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlignmentReport {
    pub alignments: Vec<Alignment>,
    pub skipped: usize,
    pub confidence: ConfidenceStats,
}

pub struct DatasetIngest {
    config: IngestConfig,
}

impl Default for DatasetIngest {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl DatasetIngest {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Resolve every chunk with the pipeline's configured strategy.
    ///
    /// Placeholders count as anchors. Chunks that hit a genuine error are
    /// logged and left out of the map, so their alignments are skipped later.
    pub async fn anchor_chunks(
        &self,
        pipeline: &AnchorResolutionPipeline,
        chunks: &[LanguageChunk],
        documents: &DocumentSet,
    ) -> AnchoredChunks {
        let mut out = AnchoredChunks::default();

        for chunk in chunks {
            let request = match AnchorRequest::try_from(chunk) {
                Ok(request) => request,
                Err(e) => {
                    log::warn!("chunk {}: {}", chunk.chunk_id, e);
                    out.failed += 1;
                    continue;
                }
            };

            match pipeline.resolve(&request, documents).await {
                Ok(resolution) => {
                    if resolution.is_placeholder() {
                        out.placeholders += 1;
                    }
                    out.chunk_map.insert(chunk.chunk_id, resolution.anchor.anchor_id);
                    out.anchors.push(resolution.anchor);
                }
                Err(e) => {
                    log::warn!("chunk {}: {}", chunk.chunk_id, e);
                    out.failed += 1;
                }
            }
        }

        log::info!(
            "anchored {} chunks ({} placeholders, {} failed)",
            out.anchors.len(),
            out.placeholders,
            out.failed
        );
        out
    }

    /// Turn dataset pairs into alignments between already-built anchors
    pub fn build_alignments(&self, pairs: &[AlignmentPair], chunk_map: &HashMap<u64, Uuid>) -> AlignmentReport {
        let mut report = AlignmentReport::default();

        for pair in pairs {
            match self.convert(pair, chunk_map) {
                Ok(alignment) => report.alignments.push(alignment),
                Err(why) => {
                    log::warn!("alignment {}: {}", pair.alignment_id, why);
                    report.skipped += 1;
                }
            }
        }

        report.confidence = ConfidenceStats::from_alignments(&report.alignments);
        log::info!(
            "built {} alignments, skipped {} (mean confidence {:.3})",
            report.alignments.len(),
            report.skipped,
            report.confidence.mean
        );
        report
    }

    fn convert(&self, pair: &AlignmentPair, chunk_map: &HashMap<u64, Uuid>) -> Result<Alignment, String> {
        if pair.src_chunks.is_empty() || pair.tgt_chunks.is_empty() {
            return Err("empty side".to_string());
        }
        if !pair.validation.is_valid() && !self.config.keep_invalid {
            return Err(format!(
                "marked invalid ({})",
                pair.validation.reason.as_deref().unwrap_or("no reason given")
            ));
        }
        if pair.validation.confidence < self.config.min_confidence {
            return Err(format!(
                "confidence {:.3} below {:.3}",
                pair.validation.confidence, self.config.min_confidence
            ));
        }

        let lookup = |ids: Vec<u64>| -> Result<Vec<Uuid>, String> {
            ids.into_iter()
                .map(|id| chunk_map.get(&id).copied().ok_or_else(|| format!("chunk {} has no anchor", id)))
                .collect()
        };
        let source = lookup(pair.src_ids())?;
        let target = lookup(pair.tgt_ids())?;

        let mut alignment = Alignment::new(source, target, pair.validation.confidence);
        alignment.alignment_type = pair.alignment_type.parse().unwrap_or_else(|e| {
            log::debug!("alignment {}: {}, using side counts", pair.alignment_id, e);
            AlignmentType::from_counts(pair.src_chunks.len(), pair.tgt_chunks.len())
        });
        alignment.dataset_id = Some(pair.alignment_id);
        Ok(alignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::records::{ChunkRef, Validation};

    fn chunk(id: u64, lang: &str) -> LanguageChunk {
        LanguageChunk::new(id, lang, 1, "text")
    }

    fn pair(id: u64, src: Vec<u64>, tgt: Vec<u64>, confidence: f32, valid: Option<bool>) -> AlignmentPair {
        AlignmentPair {
            alignment_id: id,
            pair_id: None,
            src_chunks: src.into_iter().map(ChunkRef::Id).collect(),
            tgt_chunks: tgt.into_iter().map(ChunkRef::Id).collect(),
            alignment_type: "1-1".into(),
            validation: Validation {
                confidence,
                is_valid_alignment: valid,
                ..Default::default()
            },
            src_lang: None,
            tgt_lang: None,
            src_text: None,
            tgt_text: None,
        }
    }

    #[test]
    fn test_language_priority() {
        let chunks = vec![chunk(0, "fr"), chunk(1, "IT"), chunk(2, "de")];
        let pair = detect_language_pair(&chunks).unwrap();
        assert_eq!(pair.source, "it");
        assert_eq!(pair.targets, vec!["de", "fr"]);
    }

    #[test]
    fn test_language_fallback_alphabetical() {
        let chunks = vec![chunk(0, "pt"), chunk(1, "es")];
        assert_eq!(detect_language_pair(&chunks).unwrap().source, "es");
        assert!(detect_language_pair(&[]).is_none());
    }

    #[test]
    fn test_build_alignments_filters() {
        let map: HashMap<u64, Uuid> = (0..4).map(|i| (i, Uuid::new_v4())).collect();
        let pairs = vec![
            pair(1, vec![0], vec![1], 0.95, Some(true)),
            pair(2, vec![2], vec![3], 0.4, Some(false)),
            pair(3, vec![0], vec![99], 0.8, None),
            pair(4, vec![], vec![1], 0.8, None),
            pair(5, vec![2], vec![3], 0.3, None),
        ];

        let report = DatasetIngest::default().build_alignments(&pairs, &map);
        assert_eq!(report.alignments.len(), 2);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.alignments[0].source_anchor_ids, vec![map[&0]]);
        assert_eq!(report.alignments[0].dataset_id, Some(1));
        assert_eq!(report.confidence.count, 2);
        assert_eq!(report.confidence.high, 1);
        assert_eq!(report.confidence.low, 1);

        let strict = DatasetIngest::new(IngestConfig {
            min_confidence: 0.5,
            keep_invalid: true,
        });
        let report = strict.build_alignments(&pairs, &map);
        // pair 2 is now kept for validity but fails the confidence floor
        assert_eq!(report.alignments.len(), 1);
    }

    #[test]
    fn test_bad_type_falls_back_to_counts() {
        let map: HashMap<u64, Uuid> = (0..3).map(|i| (i, Uuid::new_v4())).collect();
        let mut p = pair(1, vec![0, 1], vec![2], 0.9, Some(true));
        p.alignment_type = "weird".into();
        let report = DatasetIngest::default().build_alignments(&[p], &map);
        assert_eq!(report.alignments[0].alignment_type, AlignmentType::ManyToOne);
    }
}
