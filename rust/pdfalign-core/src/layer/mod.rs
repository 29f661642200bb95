pub mod bbox;
pub mod rect;
pub mod token;

pub use bbox::BoundingBoxResolver;
pub use rect::{NormalizedRect, RECT_EPSILON};
pub use token::{PageViewport, RawTextItem, TextLayer, TextToken};
