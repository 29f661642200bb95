//! ScrollSyncController: keeps the two panes of a bilingual view aligned.
//!
//! # State machine
//! `Idle -> Syncing` on enable with a non-empty graph,
//! `Syncing -> ManualOverride` on `disable_temporarily`,
//! `ManualOverride -> Syncing` once the window has elapsed,
//! `* -> Idle` on disable or when the graph empties.
//!
//! Time is passed in as `now_ms`; the controller never reads a clock.
//!
//! # Usage
//! ```rust,ignore
//! let mut sync = ScrollSyncController::new(SyncConfig::default());
//! sync.rebuild_index(src_doc, tgt_doc, &anchors, &alignments);
//! sync.enable();
//! if let SyncDecision::Applied(target) = sync.on_source_scroll(position, now_ms) {
//!     view.scroll_target_to(target);
//! }
//! ```

use uuid::Uuid;

use crate::anchor::{Alignment, Anchor};

use super::config::SyncConfig;
use super::graph::AnchorGraph;
use super::types::{Pane, ScrollPosition, SkipReason, SyncDecision, SyncState};

pub struct ScrollSyncController {
    config: SyncConfig,
    graph: AnchorGraph,
    enabled: bool,
    state: SyncState,
    last_target: Option<ScrollPosition>,
    last_drift_px: f64,
}

impl Default for ScrollSyncController {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl ScrollSyncController {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            graph: AnchorGraph::default(),
            enabled: false,
            state: SyncState::Idle,
            last_target: None,
            last_drift_px: 0.0,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn graph(&self) -> &AnchorGraph {
        &self.graph
    }

    // ==================== LIFECYCLE ====================

    pub fn enable(&mut self) {
        self.enabled = true;
        if self.state == SyncState::Idle && !self.graph.is_empty() {
            self.state = SyncState::Syncing;
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.state = SyncState::Idle;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Suppress sync for the override window after a manual scroll. Any
    /// pending window is replaced, never extended from its old deadline.
    pub fn disable_temporarily(&mut self, now_ms: f64) {
        if self.state == SyncState::Idle {
            return;
        }
        let expires_at_ms = now_ms + self.config.manual_override_ms;
        log::debug!("manual override until {:.0}ms", expires_at_ms);
        self.state = SyncState::ManualOverride { expires_at_ms };
    }

    /// Leave an elapsed override. Called by every scroll event too.
    pub fn tick(&mut self, now_ms: f64) {
        if let SyncState::ManualOverride { expires_at_ms } = self.state {
            if now_ms >= expires_at_ms {
                self.state = if self.enabled && !self.graph.is_empty() {
                    SyncState::Syncing
                } else {
                    SyncState::Idle
                };
            }
        }
    }

    /// Replace the anchor/alignment indices
    pub fn rebuild_index(&mut self, source_doc: Uuid, target_doc: Uuid, anchors: &[Anchor], alignments: &[Alignment]) {
        self.graph = AnchorGraph::rebuild(source_doc, target_doc, anchors, alignments);
        self.last_target = None;

        if self.graph.is_empty() {
            self.state = SyncState::Idle;
        } else if self.enabled && self.state == SyncState::Idle {
            self.state = SyncState::Syncing;
        }
    }

    // ==================== QUERIES ====================

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            SyncState::Idle => "idle",
            SyncState::Syncing => "syncing",
            SyncState::ManualOverride { .. } => "manual_override",
        }
    }

    pub fn last_target(&self) -> Option<ScrollPosition> {
        self.last_target
    }

    pub fn last_drift_px(&self) -> f64 {
        self.last_drift_px
    }

    // ==================== SCROLL EVENTS ====================

    pub fn on_source_scroll(&mut self, position: ScrollPosition, now_ms: f64) -> SyncDecision {
        self.on_scroll(Pane::Source, position, now_ms)
    }

    /// Scroll in `pane`; on success the returned position is for the other pane.
    pub fn on_scroll(&mut self, pane: Pane, position: ScrollPosition, now_ms: f64) -> SyncDecision {
        self.tick(now_ms);

        match self.state {
            SyncState::Idle => return SyncDecision::Skipped(SkipReason::Disabled),
            SyncState::ManualOverride { .. } => return SyncDecision::Skipped(SkipReason::ManualOverride),
            SyncState::Syncing => {}
        }

        let (target, drift_px) = match self.compute_target(pane, position) {
            Ok(found) => found,
            Err(reason) => {
                log::trace!("sync skipped: {:?}", reason);
                return SyncDecision::Skipped(reason);
            }
        };

        if drift_px > self.config.max_drift_px {
            log::debug!("sync dropped: drift {:.1}px > {:.1}px", drift_px, self.config.max_drift_px);
            return SyncDecision::Skipped(SkipReason::DriftExceeded { drift_px });
        }

        self.last_target = Some(target);
        self.last_drift_px = drift_px;
        SyncDecision::Applied(target)
    }

    /// Target position for `position` in the other pane and the drift in
    /// pixels, without touching state or applying the drift limit.
    pub fn compute_target(&self, pane: Pane, position: ScrollPosition) -> Result<(ScrollPosition, f64), SkipReason> {
        let y = position.normalized_y;

        let anchor = self
            .graph
            .anchors_on_page(pane, position.page)
            .min_by(|a, b| {
                let da = (a.rect.center_y() - y).abs();
                let db = (b.rect.center_y() - y).abs();
                da.total_cmp(&db)
            })
            .ok_or(SkipReason::NoAnchorsOnPage)?;

        if self.graph.alignment_for(&anchor.anchor_id).is_none() {
            return Err(SkipReason::NoAlignment);
        }
        let counterpart = self
            .graph
            .counterpart(&anchor.anchor_id, pane.other())
            .ok_or(SkipReason::MissingCounterpart)?;

        let offset = if anchor.rect.h > 0.0 {
            ((y - anchor.rect.y) / anchor.rect.h).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let target_y = counterpart.rect.y + offset * counterpart.rect.h;

        let viewport_px = position
            .viewport_height
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(self.config.fallback_viewport_px);
        let drift_px = (y - target_y).abs() * viewport_px;

        let target = ScrollPosition {
            page: counterpart.page,
            normalized_y: target_y,
            viewport_height: None,
        };
        Ok((target, drift_px))
    }
}
