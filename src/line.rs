// Copyright 2025 the Flatbez Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use crate::{Point, Vec2};

/// A single line segment.
///
/// This is the unit of output of the flattener: every sink call receives
/// one `Line`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// The displacement from start to end.
    #[inline]
    pub fn delta(self) -> Vec2 {
        self.p1 - self.p0
    }

    /// The length of the line.
    #[inline]
    pub fn length(self) -> f64 {
        self.delta().hypot()
    }

    /// Returns `true` if both endpoints coincide.
    #[inline]
    pub fn is_degenerate(self) -> bool {
        self.p0 == self.p1
    }

    /// Is this line finite?
    #[inline]
    pub fn is_finite(self) -> bool {
        self.p0.is_finite() && self.p1.is_finite()
    }
}

impl From<(Point, Point)> for Line {
    #[inline(always)]
    fn from((from, to): (Point, Point)) -> Self {
        Line::new(from, to)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Line, Point, Vec2};

    #[test]
    fn line_basics() {
        let l = Line::new((1.0, 2.0), (4.0, 6.0));
        assert_eq!(l.delta(), Vec2::new(3.0, 4.0));
        assert_eq!(l.length(), 5.0);
        assert!(!l.is_degenerate());
        assert!(Line::new((3.0, 3.0), (3.0, 3.0)).is_degenerate());
        assert_eq!(Line::from((Point::ZERO, Point::new(1.0, 0.0))).length(), 1.0);
    }
}
