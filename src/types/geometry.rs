//! Geometry primitives for the layout engine

use serde::{Deserialize, Serialize};

/// Size of a layout container in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A panel rectangle assigned by the layout engine
///
/// Coordinates are relative to the container origin. A zero-area rectangle
/// means the panel is hidden (another panel is fullscreen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// The hidden rectangle assigned to panels eclipsed by a fullscreen panel
    pub const HIDDEN: Rect = Rect { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new rectangle
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether this rectangle has zero area
    pub fn is_hidden(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `other` lies entirely within this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width as i32 <= self.x + self.width as i32
            && other.y + other.height as i32 <= self.y + self.height as i32
    }
}
