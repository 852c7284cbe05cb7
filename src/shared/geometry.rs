//! 平面几何工具
//!
//! Kitchens and riders live on a flat 2-D plane; every proximity decision in
//! the engine (rule 5 and nearest-rider selection) goes through [`distance`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the delivery plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Location {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Location, b: Location) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
