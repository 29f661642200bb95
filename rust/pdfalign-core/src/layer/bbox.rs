//! BoundingBoxResolver: matched tokens -> one normalized rectangle

use crate::error::AnchorError;
use crate::layer::rect::NormalizedRect;
use crate::layer::token::TextToken;

pub struct BoundingBoxResolver;

impl BoundingBoxResolver {
    /// Tight min/max over all token rects, normalized by the page size.
    ///
    /// `page_width`/`page_height` must be in the same pixel space as the
    /// tokens. Callers substitute a placeholder before calling with no tokens.
    pub fn resolve<'a, I>(tokens: I, page_width: f64, page_height: f64) -> Result<NormalizedRect, AnchorError>
    where
        I: IntoIterator<Item = &'a TextToken>,
    {
        if !(page_width.is_finite() && page_width > 0.0 && page_height.is_finite() && page_height > 0.0) {
            return Err(AnchorError::MalformedTextLayer {
                page: 0,
                reason: format!("page size {}x{}", page_width, page_height),
            });
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut seen = false;

        for token in tokens {
            seen = true;
            min_x = min_x.min(token.x);
            min_y = min_y.min(token.y);
            max_x = max_x.max(token.x + token.width);
            max_y = max_y.max(token.y + token.height);
        }

        if !seen {
            return Err(AnchorError::EmptyTokenSet);
        }

        Ok(NormalizedRect::from_edges(
            min_x / page_width,
            min_y / page_height,
            max_x / page_width,
            max_y / page_height,
        ))
    }
}
