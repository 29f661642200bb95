//! PDFAlign Core: anchor resolution + scroll sync for side-by-side bilingual PDFs
//!
//! A Rust/WASM implementation of the PDFAlign reader's alignment layer.
//!
//! # Architecture
//!
//! ## Resolution (dataset chunk -> Anchor)
//! - `layer/` - TextToken / TextLayer input, NormalizedRect, BoundingBoxResolver
//! - `matcher/` - SequenceMatcher (literal, gap-tolerant), EmbeddingMatcher (semantic)
//! - `embeddings/` - TextEmbedder trait, single-flight EmbeddingResource, tract ONNX model
//! - `anchor/` - AnchorResolutionPipeline, Anchor / Alignment records, AnchorCortex binding
//! - `dataset/` - JSONL chunk + alignment readers, batch ingestion
//!
//! ## Synchronization
//! - `sync/` - ScrollSyncController state machine over the anchor graph,
//!   ScrollSyncConductor binding
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { AnchorCortex, ScrollSyncConductor } from 'pdfalign-core';
//!
//! await init();
//!
//! const cortex = new AnchorCortex();
//! const enId = cortex.registerDocument('en', undefined, numPages, 612, 792);
//! cortex.addPage('en', 1, textContent.items, 612, 792, 1.5);
//!
//! const { anchors, alignments } = await cortex.ingestDataset(chunksJsonl, alignmentsJsonl);
//!
//! const sync = new ScrollSyncConductor();
//! sync.rebuildIndex(enId, itId, anchors, alignments);
//! sync.enable();
//!
//! const r = sync.onSourceScroll(page, y, pane.clientHeight);
//! if (r.decision === 'applied') scrollTarget(r.detail);
//! ```

pub mod anchor;
pub mod dataset;
pub mod embeddings;
pub mod error;
pub mod layer;
pub mod logging;
pub mod matcher;
pub mod sync;

#[cfg(test)]
mod tests;

pub use anchor::{
    Alignment, AlignmentType, Anchor, AnchorConfig, AnchorCortex, AnchorRequest, AnchorResolution,
    AnchorResolutionPipeline, DocumentSet, InMemoryDocument, MatchStrategy, PageSource, ResolutionOutcome,
};
pub use error::{AnchorError, DatasetError, ModelError};
pub use layer::{BoundingBoxResolver, NormalizedRect, PageViewport, TextLayer, TextToken};
pub use matcher::{EmbeddingMatcher, MatchKind, MatchOutcome, MatchResult, NotFoundReason, SequenceMatcher};
pub use sync::{Pane, ScrollPosition, ScrollSyncConductor, ScrollSyncController, SyncConfig, SyncDecision, SyncState};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Panic hook + console logger
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init_console_logger(log::LevelFilter::Info);
}

/// Raise or lower log verbosity from JS ("error" .. "trace")
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) {
    let filter = level.parse().unwrap_or(log::LevelFilter::Info);
    log::set_max_level(filter);
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("pdfalign-core v{}", env!("CARGO_PKG_VERSION"))
}
