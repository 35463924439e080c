//! Geometric types for on-screen element placement
//!
//! Provides a type-safe rectangle so positions and sizes travel together
//! instead of as loose integer quadruples.

use serde::{Deserialize, Serialize};

/// On-screen placement of a UI element: top-left corner plus dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Bound {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Bound {
    /// Create a new bound
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Total area in pixels
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Convert to tuple for compatibility
    pub fn as_tuple(self) -> (i32, i32, u32, u32) {
        (self.x, self.y, self.w, self.h)
    }

    /// Create from tuple
    pub const fn from_tuple(tuple: (i32, i32, u32, u32)) -> Self {
        Self {
            x: tuple.0,
            y: tuple.1,
            w: tuple.2,
            h: tuple.3,
        }
    }
}

impl From<(i32, i32, u32, u32)> for Bound {
    fn from(tuple: (i32, i32, u32, u32)) -> Self {
        Self::from_tuple(tuple)
    }
}

impl From<Bound> for (i32, i32, u32, u32) {
    fn from(bound: Bound) -> Self {
        bound.as_tuple()
    }
}
