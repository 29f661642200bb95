//! Anchor resolution
//!
//! - `pipeline.rs` - AnchorResolutionPipeline: chunk -> matched tokens -> rect -> Anchor
//! - `source.rs` - PageSource seam + in-memory documents keyed by language
//! - `types.rs` - Anchor / Alignment records
//! - `hash.rs` - quote identity hash
//! - `wasm.rs` - AnchorCortex JS binding

pub mod config;
pub mod hash;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod wasm;

pub use config::{AnchorConfig, MatchStrategy};
pub use hash::quote_hash;
pub use pipeline::{AnchorRequest, AnchorResolution, AnchorResolutionPipeline, ResolutionOutcome};
pub use source::{DocumentSet, InMemoryDocument, PageSource};
pub use types::{Alignment, AlignmentType, Anchor, ConfidenceBand};
pub use wasm::AnchorCortex;
