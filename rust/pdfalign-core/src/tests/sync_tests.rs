use uuid::Uuid;

use crate::anchor::{Alignment, Anchor};
use crate::layer::NormalizedRect;
use crate::sync::{
    Clock, ManualClock, Pane, ScrollPosition, ScrollSyncController, SkipReason, SyncConfig, SyncDecision, SyncState,
};

fn rect(y: f64, h: f64) -> NormalizedRect {
    NormalizedRect { x: 0.1, y, w: 0.8, h }
}

/// Two documents plus aligned anchor pairs, one pair per `(page, src, tgt)`
struct Fixture {
    source: Uuid,
    target: Uuid,
    anchors: Vec<Anchor>,
    alignments: Vec<Alignment>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            source: Uuid::new_v4(),
            target: Uuid::new_v4(),
            anchors: Vec::new(),
            alignments: Vec::new(),
        }
    }

    fn pair(mut self, page: u32, src: NormalizedRect, tgt: NormalizedRect) -> Self {
        let a = Anchor::new(self.source, page, src, "source quote");
        let b = Anchor::new(self.target, page, tgt, "target quote");
        self.alignments.push(Alignment::new(vec![a.anchor_id], vec![b.anchor_id], 0.9));
        self.anchors.push(a);
        self.anchors.push(b);
        self
    }

    fn controller(&self, config: SyncConfig) -> ScrollSyncController {
        let mut sync = ScrollSyncController::new(config);
        sync.rebuild_index(self.source, self.target, &self.anchors, &self.alignments);
        sync.enable();
        sync
    }
}

// ============================================================================
// Offset mapping
// ============================================================================

#[test]
fn test_relative_offset_carries_over() {
    let sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.6, 0.1))
        .controller(SyncConfig::default());

    let (top, _) = sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.5)).unwrap();
    assert!((top.normalized_y - 0.6).abs() < 1e-12);
    assert_eq!(top.page, 1);

    let (mid, _) = sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.55)).unwrap();
    assert!((mid.normalized_y - 0.65).abs() < 1e-12);
}

#[test]
fn test_offset_clamped_outside_anchor() {
    let sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.6, 0.2))
        .controller(SyncConfig::default());

    // below the anchor's bottom edge maps to the counterpart's bottom edge
    let (below, _) = sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.9)).unwrap();
    assert!((below.normalized_y - 0.8).abs() < 1e-12);
    let (above, _) = sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.1)).unwrap();
    assert!((above.normalized_y - 0.6).abs() < 1e-12);
}

#[test]
fn test_nearest_anchor_wins() {
    let sync = Fixture::new()
        .pair(1, rect(0.1, 0.1), rect(0.2, 0.1))
        .pair(1, rect(0.7, 0.1), rect(0.72, 0.1))
        .controller(SyncConfig::default());

    let (target, _) = sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.7)).unwrap();
    assert!((target.normalized_y - 0.72).abs() < 1e-12);
}

#[test]
fn test_counterpart_on_other_page() {
    let mut fixture = Fixture::new();
    let a = Anchor::new(fixture.source, 3, rect(0.9, 0.05), "page end");
    let b = Anchor::new(fixture.target, 4, rect(0.05, 0.05), "next page top");
    fixture.alignments.push(Alignment::new(vec![a.anchor_id], vec![b.anchor_id], 0.8));
    fixture.anchors.extend([a, b]);
    let mut sync = fixture.controller(SyncConfig::default().with_max_drift_px(f64::INFINITY));

    let target = sync
        .on_source_scroll(ScrollPosition::new(3, 0.9), 0.0)
        .target()
        .expect("should sync");
    assert_eq!(target.page, 4);
}

// ============================================================================
// Drift gate
// ============================================================================

#[test]
fn test_drift_gate() {
    let mut sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.51, 0.1))
        .pair(2, rect(0.2, 0.1), rect(0.23, 0.1))
        .controller(SyncConfig::default());

    // 0.01 of a 1000px viewport
    let applied = sync.on_source_scroll(ScrollPosition::new(1, 0.5).with_viewport_height(1000.0), 0.0);
    let target = applied.target().expect("10px is within the limit");
    assert!((target.normalized_y - 0.51).abs() < 1e-12);
    assert!((sync.last_drift_px() - 10.0).abs() < 1e-6);

    // 0.03 of a 1000px viewport
    let dropped = sync.on_source_scroll(ScrollPosition::new(2, 0.2).with_viewport_height(1000.0), 0.0);
    assert!(matches!(
        dropped,
        SyncDecision::Skipped(SkipReason::DriftExceeded { drift_px }) if (drift_px - 30.0).abs() < 1e-6
    ));
    assert_eq!(sync.last_target(), Some(target));
    assert_eq!(sync.state(), SyncState::Syncing);
}

#[test]
fn test_drift_uses_fallback_viewport() {
    let sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.51, 0.1))
        .controller(SyncConfig::default());

    let (_, drift) = sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.5)).unwrap();
    assert!((drift - 10.0).abs() < 1e-6);

    // unusable heights fall back too
    let (_, drift) = sync
        .compute_target(Pane::Source, ScrollPosition::new(1, 0.5).with_viewport_height(0.0))
        .unwrap();
    assert!((drift - 10.0).abs() < 1e-6);

    let (_, drift) = sync
        .compute_target(Pane::Source, ScrollPosition::new(1, 0.5).with_viewport_height(500.0))
        .unwrap();
    assert!((drift - 5.0).abs() < 1e-6);
}

// ============================================================================
// Manual override
// ============================================================================

#[test]
fn test_manual_override_window() {
    let mut sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.5, 0.1))
        .controller(SyncConfig::default());
    let position = ScrollPosition::new(1, 0.5);

    sync.disable_temporarily(1000.0);
    assert_eq!(sync.state_name(), "manual_override");
    assert_eq!(
        sync.on_source_scroll(position, 2000.0),
        SyncDecision::Skipped(SkipReason::ManualOverride)
    );
    assert!(sync.on_source_scroll(position, 3000.0).target().is_some());
    assert_eq!(sync.state(), SyncState::Syncing);
}

#[test]
fn test_override_replaced_not_extended() {
    let mut clock = ManualClock::default();
    let mut sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.5, 0.1))
        .controller(SyncConfig::default());
    let position = ScrollPosition::new(1, 0.5);

    clock.advance(1000.0);
    sync.disable_temporarily(clock.now_ms());
    clock.advance(1500.0);
    sync.disable_temporarily(clock.now_ms());

    // first window would have ended at 3000
    clock.advance(1000.0);
    assert_eq!(
        sync.on_source_scroll(position, clock.now_ms()),
        SyncDecision::Skipped(SkipReason::ManualOverride)
    );
    clock.advance(1000.0);
    assert!(sync.on_source_scroll(position, clock.now_ms()).target().is_some());
}

#[test]
fn test_override_applies_to_both_panes() {
    let mut sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.5, 0.1))
        .controller(SyncConfig::default());

    sync.disable_temporarily(0.0);
    assert_eq!(
        sync.on_scroll(Pane::Target, ScrollPosition::new(1, 0.5), 100.0),
        SyncDecision::Skipped(SkipReason::ManualOverride)
    );
}

#[test]
fn test_override_ignored_when_idle() {
    let mut sync = ScrollSyncController::default();
    sync.disable_temporarily(0.0);
    assert_eq!(sync.state(), SyncState::Idle);
}

#[test]
fn test_override_expiry_after_disable_goes_idle() {
    let mut sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.5, 0.1))
        .controller(SyncConfig::default());
    sync.disable_temporarily(0.0);
    sync.disable();
    sync.tick(5000.0);
    assert_eq!(sync.state(), SyncState::Idle);
}

// ============================================================================
// Graph edge cases
// ============================================================================

#[test]
fn test_empty_rebuild_goes_idle() {
    let mut sync = Fixture::new()
        .pair(1, rect(0.5, 0.1), rect(0.5, 0.1))
        .controller(SyncConfig::default());
    assert_eq!(sync.state(), SyncState::Syncing);

    sync.rebuild_index(Uuid::new_v4(), Uuid::new_v4(), &[], &[]);
    assert_eq!(sync.state(), SyncState::Idle);
    assert!(sync.last_target().is_none());
    assert_eq!(
        sync.on_source_scroll(ScrollPosition::new(1, 0.5), 0.0),
        SyncDecision::Skipped(SkipReason::Disabled)
    );
}

#[test]
fn test_dangling_counterpart() {
    let mut fixture = Fixture::new();
    let a = Anchor::new(fixture.source, 1, rect(0.5, 0.1), "orphan");
    fixture.alignments.push(Alignment::new(vec![a.anchor_id], vec![Uuid::new_v4()], 0.9));
    fixture.anchors.push(a);
    let sync = fixture.controller(SyncConfig::default());

    assert_eq!(
        sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.5)),
        Err(SkipReason::MissingCounterpart)
    );
}

#[test]
fn test_unaligned_anchor() {
    let mut fixture = Fixture::new().pair(1, rect(0.1, 0.05), rect(0.1, 0.05));
    fixture.anchors.push(Anchor::new(fixture.source, 1, rect(0.8, 0.1), "no partner"));
    let sync = fixture.controller(SyncConfig::default());

    assert_eq!(
        sync.compute_target(Pane::Source, ScrollPosition::new(1, 0.85)),
        Err(SkipReason::NoAlignment)
    );
}
