// pdfalign-core/src/sync/wasm.rs
//
// ScrollSyncConductor: JS wrapper around ScrollSyncController with a
// monotonic clock, so scroll handlers don't pass timestamps.

use uuid::Uuid;
use wasm_bindgen::prelude::*;

use crate::anchor::{Alignment, Anchor};

use super::clock::{Clock, MonotonicClock};
use super::config::SyncConfig;
use super::controller::ScrollSyncController;
use super::types::{Pane, ScrollPosition};

fn js_err<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct ScrollSyncConductor {
    controller: ScrollSyncController,
    clock: MonotonicClock,
}

#[wasm_bindgen]
impl ScrollSyncConductor {
    /// `config` is an optional SyncConfig object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ScrollSyncConductor, JsValue> {
        let config: SyncConfig = if config.is_undefined() || config.is_null() {
            SyncConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_err)?
        };
        Ok(ScrollSyncConductor {
            controller: ScrollSyncController::new(config),
            clock: MonotonicClock::default(),
        })
    }

    /// Load Anchor[] and Alignment[] (as produced by AnchorCortex)
    #[wasm_bindgen(js_name = rebuildIndex)]
    pub fn rebuild_index(
        &mut self,
        source_doc: &str,
        target_doc: &str,
        anchors: JsValue,
        alignments: JsValue,
    ) -> Result<(), JsValue> {
        let source_doc = Uuid::parse_str(source_doc).map_err(js_err)?;
        let target_doc = Uuid::parse_str(target_doc).map_err(js_err)?;
        let anchors: Vec<Anchor> = serde_wasm_bindgen::from_value(anchors).map_err(js_err)?;
        let alignments: Vec<Alignment> = serde_wasm_bindgen::from_value(alignments).map_err(js_err)?;
        self.controller.rebuild_index(source_doc, target_doc, &anchors, &alignments);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn enable(&mut self) {
        self.controller.enable();
    }

    #[wasm_bindgen]
    pub fn disable(&mut self) {
        self.controller.disable();
    }

    /// Call on a manual scroll in either pane
    #[wasm_bindgen(js_name = disableTemporarily)]
    pub fn disable_temporarily(&mut self) {
        let now = self.clock.now_ms();
        self.controller.disable_temporarily(now);
    }

    #[wasm_bindgen]
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        self.controller.tick(now);
    }

    /// Returns `{ decision: "applied", detail: ScrollPosition }` or
    /// `{ decision: "skipped", detail: { reason } }`
    #[wasm_bindgen(js_name = onSourceScroll)]
    pub fn on_source_scroll(
        &mut self,
        page: u32,
        normalized_y: f64,
        viewport_height: Option<f64>,
    ) -> Result<JsValue, JsValue> {
        self.on_scroll("source", page, normalized_y, viewport_height)
    }

    /// `pane` is "source" or "target"; the result is for the other pane
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(
        &mut self,
        pane: &str,
        page: u32,
        normalized_y: f64,
        viewport_height: Option<f64>,
    ) -> Result<JsValue, JsValue> {
        let pane = match pane {
            "source" => Pane::Source,
            "target" => Pane::Target,
            other => return Err(JsValue::from_str(&format!("unknown pane '{}'", other))),
        };
        let position = ScrollPosition {
            page,
            normalized_y,
            viewport_height,
        };
        let now = self.clock.now_ms();
        let decision = self.controller.on_scroll(pane, position, now);
        serde_wasm_bindgen::to_value(&decision).map_err(js_err)
    }

    #[wasm_bindgen(js_name = stateName)]
    pub fn state_name(&self) -> String {
        self.controller.state_name().to_string()
    }

    #[wasm_bindgen(js_name = lastTarget)]
    pub fn last_target(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.controller.last_target()).map_err(js_err)
    }

    #[wasm_bindgen(js_name = lastDriftPx)]
    pub fn last_drift_px(&self) -> f64 {
        self.controller.last_drift_px()
    }
}
