//! Viewport geometry for the contextual "ask about this" menu.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in viewport coordinates (a selection range's
/// bounding client rect).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

/// Size of the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Anchor of the menu: `x` is its horizontal center, `y` its top edge.
///
/// Both coordinates stay within `[padding, viewport - padding]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionMenuPosition {
    pub x: f64,
    pub y: f64,
}

/// Placement parameters of the selection menu, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Minimum distance between the menu and any viewport edge.
    pub padding: f64,
    /// Vertical distance between the selection and the menu.
    pub gap: f64,
    pub menu_width: f64,
    pub menu_height: f64,
    /// Smallest allowed top offset when the menu is flipped above.
    pub min_top: f64,
    /// Delay after pointer-up before the selection range is read.
    pub settle_delay_ms: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            padding: 10.0,
            gap: 8.0,
            menu_width: 160.0,
            menu_height: 40.0,
            min_top: 10.0,
            settle_delay_ms: 10,
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.menu_width > 0.0 && self.menu_height > 0.0) {
            return Err(ChatError::config("selection menu dimensions must be positive"));
        }
        if self.padding < 0.0 || self.gap < 0.0 || self.min_top < 0.0 {
            return Err(ChatError::config("selection offsets must not be negative"));
        }
        Ok(())
    }

    fn half_width(&self) -> f64 {
        self.menu_width / 2.0
    }

    /// Computes where the menu goes for a selection bounded by `rect`.
    ///
    /// The candidate anchor is `(rect.center_x, rect.bottom + gap)`. The menu
    /// is clamped horizontally so neither half crosses the padded viewport
    /// edge, and flipped above the selection when it would overflow the
    /// bottom, never rising above `min_top`.
    pub fn place_menu(&self, rect: &Rect, viewport: Viewport) -> SelectionMenuPosition {
        let half = self.half_width();
        let x = clamp_axis(
            rect.center_x(),
            self.padding + half,
            viewport.width - self.padding - half,
        );

        let min_y = self.min_top.max(self.padding);
        let max_y = viewport.height - self.padding - self.menu_height;
        let below = rect.bottom() + self.gap;
        let y = if below <= max_y {
            below
        } else {
            (rect.top - self.gap - self.menu_height).max(min_y)
        };

        SelectionMenuPosition {
            x,
            y: clamp_axis(y, min_y, max_y),
        }
    }

    /// Screen area covered by a menu anchored at `position`.
    pub fn menu_bounds(&self, position: SelectionMenuPosition) -> Rect {
        Rect::new(
            position.x - self.half_width(),
            position.y,
            self.menu_width,
            self.menu_height,
        )
    }
}

/// Clamps `value` into `[min, max]`; a viewport too small to satisfy both
/// bounds centers the menu between them.
fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if max < min {
        (min + max) / 2.0
    } else {
        value.clamp(min, max)
    }
}
