use serde::{Deserialize, Serialize};

/// Scroll location in one pane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPosition {
    /// 1-based
    pub page: u32,
    /// Position within the page, 0 = top
    pub normalized_y: f64,
    /// Pane height in CSS pixels, when the view layer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_height: Option<f64>,
}

impl ScrollPosition {
    pub fn new(page: u32, normalized_y: f64) -> Self {
        Self {
            page,
            normalized_y,
            viewport_height: None,
        }
    }

    pub fn with_viewport_height(mut self, px: f64) -> Self {
        self.viewport_height = Some(px);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Source,
    Target,
}

impl Pane {
    pub fn other(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    /// Disabled, or nothing to sync with
    Idle,
    Syncing,
    /// Suppressed after a manual scroll until `expires_at_ms`
    ManualOverride { expires_at_ms: f64 },
}

/// Why a scroll event produced no target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    ManualOverride,
    NoAnchorsOnPage,
    NoAlignment,
    MissingCounterpart,
    DriftExceeded { drift_px: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum SyncDecision {
    /// Scroll the other pane here
    Applied(ScrollPosition),
    Skipped(SkipReason),
}

impl SyncDecision {
    pub fn target(&self) -> Option<ScrollPosition> {
        match self {
            Self::Applied(position) => Some(*position),
            Self::Skipped(_) => None,
        }
    }
}
