//! Scroll synchronization between the source and target panes
//!
//! - `controller.rs` - ScrollSyncController: drift-bounded sync state machine
//! - `graph.rs` - AnchorGraph: page / alignment / anchor indices
//! - `clock.rs` - time sources for the JS binding and tests
//! - `wasm.rs` - ScrollSyncConductor JS binding

pub mod clock;
pub mod config;
pub mod controller;
pub mod graph;
pub mod types;
pub mod wasm;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::SyncConfig;
pub use controller::ScrollSyncController;
pub use graph::AnchorGraph;
pub use types::{Pane, ScrollPosition, SkipReason, SyncDecision, SyncState};
pub use wasm::ScrollSyncConductor;
