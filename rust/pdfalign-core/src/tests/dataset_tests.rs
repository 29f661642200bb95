use std::sync::Arc;

use futures::executor::block_on;
use uuid::Uuid;

use super::line_tokens;
use crate::anchor::{AlignmentType, AnchorResolutionPipeline, DocumentSet, InMemoryDocument, PageSource};
use crate::dataset::{detect_language_pair, parse_alignments, parse_chunks, DatasetIngest};
use crate::layer::{NormalizedRect, PageViewport, TextLayer};
use crate::sync::{ScrollPosition, ScrollSyncController};

const CHUNKS: &str = r#"
{"text":"The old harbour was quiet at dawn","chunk_id":1,"language":"en","page":"001"}
{"text":"Fishermen mended their nets along the stone wall","chunk_id":2,"language":"en","page":"001"}
{"text":"Il vecchio porto era silenzioso all'alba","chunk_id":3,"language":"it","page":"001"}
{"text":"pescatori riparavano le reti lungo il muro di pietra","chunk_id":4,"language":"it","page":1}
{"text":"una pagina che non esiste","chunk_id":5,"language":"it","page":"009"}
{"text":"Die Fischer flickten ihre Netze","chunk_id":6,"language":"de","page":"001"}
{not json
{"text":"cover","chunk_id":7,"language":"en","page":"000"}
"#;

const ALIGNMENTS: &str = r#"
{"alignment_id":1,"src_chunks":[1],"tgt_chunks":[3],"alignment_type":"1-1","validation":{"confidence":0.95,"is_valid_alignment":true}}
{"alignment_id":2,"src_chunks":[{"text":"Fishermen mended their nets along the stone wall","chunk_id":2,"language":"en","page":"001"}],"tgt_chunks":[4],"alignment_type":"1:1","validation":{"confidence":0.8}}
{"alignment_id":3,"src_chunks":[2],"tgt_chunks":[6],"alignment_type":"1-1","validation":{"confidence":0.7}}
{"alignment_id":4,"src_chunks":[1],"tgt_chunks":[4],"alignment_type":"1-1","validation":{"confidence":0.3,"is_valid_alignment":false,"reason":"different sentences"}}
"#;

fn viewport() -> PageViewport {
    PageViewport::new(600.0, 800.0, 1.0)
}

fn document(words: &[&str]) -> InMemoryDocument {
    InMemoryDocument::new(Uuid::new_v4(), 1, viewport()).with_layer(TextLayer::new(1, viewport(), line_tokens(words)))
}

fn english() -> InMemoryDocument {
    document(&[
        "The", "old", "harbour", "was", "quiet", "at", "dawn", "Fishermen", "mended", "their", "nets", "along", "the",
        "stone", "wall",
    ])
}

fn italian() -> InMemoryDocument {
    document(&[
        "Il", "vecchio", "porto", "era", "silenzioso", "all'alba", "pescatori", "riparavano", "le", "reti", "lungo",
        "il", "muro", "di", "pietra",
    ])
}

#[test]
fn test_reader_accounting() {
    let chunks = parse_chunks(CHUNKS);
    // malformed JSON and page "000"
    assert_eq!(chunks.parsed, 6);
    assert_eq!(chunks.skipped, 2);

    let pairs = parse_alignments(ALIGNMENTS);
    assert_eq!(pairs.parsed, 4);
    assert_eq!(pairs.records[1].src_ids(), vec![2]);

    let languages = detect_language_pair(&chunks.records).unwrap();
    assert_eq!(languages.source, "en");
    assert_eq!(languages.targets, vec!["de", "it"]);
}

#[test]
fn test_dataset_to_synced_panes() {
    let (en, it) = (english(), italian());
    let (en_id, it_id) = (en.document_id(), it.document_id());
    let documents = DocumentSet::new().with("en", Arc::new(en)).with("it", Arc::new(it));

    let chunks = parse_chunks(CHUNKS).records;
    let pairs = parse_alignments(ALIGNMENTS).records;

    let ingest = DatasetIngest::default();
    let anchored = block_on(ingest.anchor_chunks(&AnchorResolutionPipeline::default(), &chunks, &documents));

    // the German chunk has no document
    assert_eq!(anchored.failed, 1);
    assert_eq!(anchored.anchors.len(), 5);
    assert_eq!(anchored.placeholders, 1);
    assert!(!anchored.chunk_map.contains_key(&6));

    let placeholder = anchored.anchors.iter().find(|a| a.row_number == Some(5)).unwrap();
    assert_eq!(placeholder.rect, NormalizedRect::placeholder());
    assert_eq!(placeholder.page, 1);
    assert_eq!(placeholder.document_id, it_id);

    let report = ingest.build_alignments(&pairs, &anchored.chunk_map);
    // pair 3 points at the unanchored chunk, pair 4 was rejected by the validator
    assert_eq!(report.alignments.len(), 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.confidence.count, 2);
    assert_eq!(report.confidence.high, 1);
    assert_eq!(report.confidence.low, 0);
    assert!((report.confidence.max - 0.95).abs() < 1e-6);
    assert!((report.confidence.min - 0.8).abs() < 1e-6);

    // "1:1" is not a recognized type; falls back to the side counts
    let second = report.alignments.iter().find(|a| a.dataset_id == Some(2)).unwrap();
    assert_eq!(second.alignment_type, AlignmentType::OneToOne);
    assert_eq!(second.source_anchor_ids, vec![anchored.chunk_map[&2]]);
    assert_eq!(second.target_anchor_ids, vec![anchored.chunk_map[&4]]);

    let mut sync = ScrollSyncController::default();
    sync.rebuild_index(en_id, it_id, &anchored.anchors, &report.alignments);
    sync.enable();

    // inside the "Fishermen ..." line pair; both pages share the same layout
    let target = sync
        .on_source_scroll(ScrollPosition::new(1, 0.05).with_viewport_height(900.0), 0.0)
        .target()
        .expect("aligned anchors should sync");
    assert_eq!(target.page, 1);
    assert!((target.normalized_y - 0.05).abs() < 1e-9);
}
