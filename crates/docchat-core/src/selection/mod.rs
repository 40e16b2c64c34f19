//! Selection capture module.
//!
//! - `geometry`: viewport-aware menu placement (`SelectionConfig::place_menu`)
//! - `capture`: the event-driven menu state (`SelectionCapture`)

mod capture;
mod geometry;

pub use capture::{PageSelection, PointerEvent, SelectionCapture, SelectionSource};
pub use geometry::{Point, Rect, SelectionConfig, SelectionMenuPosition, Viewport};
