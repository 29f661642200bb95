use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Largest correction applied; bigger jumps are treated as bad alignments
    pub max_drift_px: f64,
    /// Suppression window after a manual scroll
    pub manual_override_ms: f64,
    /// Stand-in pane height when the caller gives none. Approximate.
    pub fallback_viewport_px: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_drift_px: 20.0,
            manual_override_ms: 2000.0,
            fallback_viewport_px: 1000.0,
        }
    }
}

impl SyncConfig {
    pub fn with_max_drift_px(mut self, px: f64) -> Self {
        self.max_drift_px = px;
        self
    }

    pub fn with_manual_override_ms(mut self, ms: f64) -> Self {
        self.manual_override_ms = ms;
        self
    }
}
