//! Positioned text tokens for one rendered page

use serde::{Deserialize, Serialize};

use crate::error::AnchorError;

/// A positioned unit of extracted text, in page-viewport pixels at the
/// layer's render scale. Lives only for one resolution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToken {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TextToken {
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Page size at scale 1.0 plus the scale tokens were extracted at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageViewport {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl PageViewport {
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self { width, height, scale }
    }

    /// Width of the token coordinate space
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale
    }

    /// Height of the token coordinate space
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale
    }
}

/// Raw text item as emitted by the renderer (pdf.js `getTextContent` shape).
///
/// `transform` is `[a, b, c, d, e, f]`; `e`/`f` are the baseline origin with
/// y measured from the bottom of the page. All geometry is in unscaled PDF
/// units, whatever scale the page is rendered at.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTextItem {
    #[serde(rename = "str")]
    pub text: String,
    #[serde(default)]
    pub transform: Option<Vec<f64>>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// The extracted text layer of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub page: u32,
    pub viewport: PageViewport,
    pub tokens: Vec<TextToken>,
}

impl TextLayer {
    pub fn new(page: u32, viewport: PageViewport, tokens: Vec<TextToken>) -> Self {
        Self { page, viewport, tokens }
    }

    /// Convert renderer items into tokens at the viewport's scale, flipping y
    /// to a top-left origin.
    ///
    /// Items without a usable transform are skipped with a warning. Returns the
    /// layer and the number of skipped items.
    pub fn from_raw_items(page: u32, viewport: PageViewport, items: Vec<RawTextItem>) -> (Self, usize) {
        let scale = viewport.scale;
        let mut tokens = Vec::with_capacity(items.len());
        let mut skipped = 0;

        for (i, item) in items.into_iter().enumerate() {
            let origin = match item.transform.as_deref() {
                Some([_, _, _, _, e, f]) if e.is_finite() && f.is_finite() => Some((*e, *f)),
                _ => None,
            };
            let Some((e, f)) = origin else {
                log::warn!("page {}: text item {} has no usable transform, skipping", page, i);
                skipped += 1;
                continue;
            };
            if item.text.trim().is_empty() {
                continue;
            }
            tokens.push(TextToken {
                text: item.text,
                x: e * scale,
                y: (viewport.height - f - item.height) * scale,
                width: item.width * scale,
                height: item.height * scale,
            });
        }

        (Self::new(page, viewport, tokens), skipped)
    }

    /// Reject page data that can't be normalized.
    pub fn validate(&self) -> Result<(), AnchorError> {
        let vp = &self.viewport;
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(vp.width) || !usable(vp.height) || !usable(vp.scale) {
            return Err(AnchorError::MalformedTextLayer {
                page: self.page,
                reason: format!("viewport {}x{} @ {}", vp.width, vp.height, vp.scale),
            });
        }
        if let Some(i) = self.tokens.iter().position(|t| !t.is_well_formed()) {
            return Err(AnchorError::MalformedTextLayer {
                page: self.page,
                reason: format!("token {} has non-finite or negative geometry", i),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, transform: Option<Vec<f64>>) -> RawTextItem {
        RawTextItem {
            text: text.to_string(),
            transform,
            width: 40.0,
            height: 10.0,
        }
    }

    #[test]
    fn test_from_raw_items_flips_y() {
        let viewport = PageViewport::new(600.0, 800.0, 1.0);
        let items = vec![item("Hello", Some(vec![10.0, 0.0, 0.0, 10.0, 72.0, 700.0]))];
        let (layer, skipped) = TextLayer::from_raw_items(1, viewport, items);

        assert_eq!(skipped, 0);
        assert_eq!(layer.tokens.len(), 1);
        assert_eq!(layer.tokens[0].x, 72.0);
        assert_eq!(layer.tokens[0].y, 90.0); // 800 - 700 - 10
    }

    #[test]
    fn test_from_raw_items_applies_render_scale() {
        let items = || vec![item("Hello", Some(vec![10.0, 0.0, 0.0, 10.0, 72.0, 700.0]))];
        let (layer, _) = TextLayer::from_raw_items(1, PageViewport::new(600.0, 800.0, 1.5), items());

        let token = &layer.tokens[0];
        assert_eq!(token.x, 108.0);
        assert_eq!(token.y, 135.0); // (800 - 700 - 10) * 1.5
        assert_eq!(token.width, 60.0);
        assert_eq!(token.height, 15.0);
    }

    #[test]
    fn test_from_raw_items_skips_missing_transform() {
        let viewport = PageViewport::new(600.0, 800.0, 1.0);
        let items = vec![
            item("kept", Some(vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0])),
            item("no transform", None),
            item("short transform", Some(vec![1.0, 0.0])),
        ];
        let (layer, skipped) = TextLayer::from_raw_items(1, viewport, items);
        assert_eq!(skipped, 2);
        assert_eq!(layer.tokens.len(), 1);
    }

    #[test]
    fn test_validate_rejects_zero_viewport() {
        let layer = TextLayer::new(3, PageViewport::new(0.0, 800.0, 1.0), vec![]);
        assert!(matches!(
            layer.validate(),
            Err(AnchorError::MalformedTextLayer { page: 3, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan_token() {
        let tokens = vec![TextToken::new("x", f64::NAN, 0.0, 1.0, 1.0)];
        let layer = TextLayer::new(1, PageViewport::new(100.0, 100.0, 1.0), tokens);
        assert!(layer.validate().is_err());
    }
}
