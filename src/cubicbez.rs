// Copyright 2025 the Flatbez Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments.

use crate::{FlattenError, FlattenOpts, Flattener, Line, Point};

/// A single cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicBez {
    /// The start point.
    pub p0: Point,
    /// The first control point.
    pub p1: Point,
    /// The second control point.
    pub p2: Point,
    /// The end point.
    pub p3: Point,
}

impl CubicBez {
    /// Create a new cubic Bézier segment.
    #[inline]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CubicBez {
        CubicBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    /// Evaluate the curve at parameter `t`.
    #[inline]
    pub fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let v = self.p0.to_vec2() * (mt * mt * mt)
            + (self.p1.to_vec2() * (mt * mt * 3.0)
                + (self.p2.to_vec2() * (mt * 3.0) + self.p3.to_vec2() * t) * t)
                * t;
        v.to_point()
    }

    /// The start point.
    #[inline]
    pub fn start(&self) -> Point {
        self.p0
    }

    /// The end point.
    #[inline]
    pub fn end(&self) -> Point {
        self.p3
    }

    /// Subdivide into halves, using de Casteljau.
    ///
    /// The first half covers the parameter range `[0, 0.5]` and the second
    /// `[0.5, 1]`. The shared point is computed once, so the end of the first
    /// half is bitwise equal to the start of the second.
    #[inline]
    pub fn subdivide(&self) -> (CubicBez, CubicBez) {
        let p01 = self.p0.midpoint(self.p1);
        let p12 = self.p1.midpoint(self.p2);
        let p23 = self.p2.midpoint(self.p3);
        let p012 = p01.midpoint(p12);
        let p123 = p12.midpoint(p23);
        let pm = p012.midpoint(p123);
        (
            CubicBez::new(self.p0, p01, p012, pm),
            CubicBez::new(pm, p123, p23, self.p3),
        )
    }

    /// Is this cubic Bezier curve finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.p3.is_finite()
    }

    /// Flatten this curve with the given options, calling `callback` once
    /// for each line segment.
    ///
    /// This is a convenience for one-off use; build a [`Flattener`] to reuse
    /// the same options and sink across many curves.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatbez::{CubicBez, FlattenOpts, Line};
    ///
    /// let c = CubicBez::new((0.0, 0.0), (33.0, 0.0), (66.0, 0.0), (100.0, 0.0));
    /// let mut lines = Vec::new();
    /// c.flatten_adaptive(FlattenOpts::default(), |l| lines.push(l)).unwrap();
    /// assert_eq!(lines, [Line::new((0.0, 0.0), (100.0, 0.0))]);
    /// ```
    pub fn flatten_adaptive(
        &self,
        opts: FlattenOpts,
        mut callback: impl FnMut(Line),
    ) -> Result<(), FlattenError> {
        let mut flattener = Flattener::new(|line: Line, _: &()| callback(line), opts)?;
        flattener.flatten(*self, &());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{CubicBez, Point};

    #[test]
    fn cubicbez_subdivide_matches_eval() {
        let c = CubicBez::new((0.0, 0.0), (1.0 / 3.0, 0.0), (2.0 / 3.0, 1.0 / 3.0), (1.0, 1.0));
        let (left, right) = c.subdivide();
        assert_eq!(left.p0, c.p0);
        assert_eq!(right.p3, c.p3);
        assert_eq!(left.p3, right.p0);
        let epsilon = 1e-12;
        for i in 0..=8 {
            let t = i as f64 / 8.0;
            assert!(left.eval(t).distance(c.eval(0.5 * t)) < epsilon);
            assert!(right.eval(t).distance(c.eval(0.5 + 0.5 * t)) < epsilon);
        }
    }

    #[test]
    fn cubicbez_eval_endpoints() {
        let c = CubicBez::new((1.0, 2.0), (5.0, -3.0), (-2.0, 7.0), (4.0, 4.0));
        assert_eq!(c.eval(0.0), Point::new(1.0, 2.0));
        assert_eq!(c.eval(1.0), Point::new(4.0, 4.0));
        assert_eq!(c.start(), c.p0);
        assert_eq!(c.end(), c.p3);
    }

    #[test]
    fn cubicbez_is_finite() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0));
        assert!(c.is_finite());
        let c = CubicBez::new((0.0, 0.0), (f64::NAN, 1.0), (2.0, 2.0), (3.0, 3.0));
        assert!(!c.is_finite());
    }
}
