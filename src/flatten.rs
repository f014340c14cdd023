// Copyright 2025 the Flatbez Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive flattening of cubic Béziers into line segments.
//!
//! The approach is recursive de Casteljau subdivision in the style of the
//! Anti-Grain Geometry `curve4_div` flattener. Each sub-curve is first tested
//! for flatness: how far its control points stray from the chord, and (when
//! enabled) how much the tangent direction turns along the control polygon.
//! A sub-curve that is flat enough is replaced by one or two line segments;
//! anything else is split in half and both halves are tested in turn, left
//! before right, until the recursion limit forces a chord.
//!
//! The flatness branches may end a sub-curve at an interior point (a control
//! point, or the midpoint of the two control points) rather than at its end,
//! so every emitted segment starts where the previous one ended, and a final
//! segment closes any gap to the true end of the curve.

use core::f64::consts::PI;
use core::fmt;

use arrayvec::ArrayVec;
use log::{trace, warn};
use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::angle_between;
use crate::{CubicBez, Line, Point, QuadBez};

/// A consumer of the line segments produced by flattening.
///
/// The `tag` is caller data handed to [`Flattener::flatten`], passed through
/// unchanged. Each call is a distinct emission: segments arrive in order and
/// must not be assumed to be deduplicated.
///
/// Any `FnMut(Line, &T)` closure is a sink.
pub trait LineSink<T: ?Sized> {
    /// Receive one line segment.
    fn line(&mut self, line: Line, tag: &T);
}

impl<T: ?Sized, F: FnMut(Line, &T)> LineSink<T> for F {
    #[inline]
    fn line(&mut self, line: Line, tag: &T) {
        self(line, tag);
    }
}

/// Options for adaptive flattening.
///
/// All fields have sensible defaults, so the usual way to build one is
/// [`FlattenOpts::default`] followed by the `with_` builder methods.
///
/// ```
/// use flatbez::FlattenOpts;
///
/// let opts = FlattenOpts::default()
///     .with_approximation_scale(4.0)
///     .with_cusp_limit(0.1);
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct FlattenOpts {
    /// Scale factor applied to the distance tolerance.
    ///
    /// The maximum allowed deviation is `0.5 / approximation_scale`, so larger
    /// values produce more segments. Typically this is the scale of the
    /// transform the output will be drawn with.
    pub approximation_scale: f64,
    /// A chord whose squared length is at or below this is treated as having
    /// zero length.
    #[cfg_attr(feature = "serde", serde(rename = "curveDistanceEpsilon"))]
    pub distance_epsilon: f64,
    /// A control point whose (chord-scaled) deviation from the chord is at or
    /// below this is treated as lying on the chord.
    #[cfg_attr(feature = "serde", serde(rename = "curveColinearityEpsilon"))]
    pub collinearity_epsilon: f64,
    /// When `angle_tolerance` is below this, the angle test is skipped and the
    /// distance test alone decides flatness.
    #[cfg_attr(feature = "serde", serde(rename = "curveAngleToleranceEpsilon"))]
    pub angle_tolerance_epsilon: f64,
    /// Maximum turn of the tangent direction, in radians, allowed across a
    /// sub-curve before it is subdivided further.
    pub angle_tolerance: f64,
    /// Cusp detection limit, in radians.
    ///
    /// Zero disables cusp detection. Otherwise, a turn sharper than
    /// `π - cusp_limit` ends subdivision at the cusp instead of refining
    /// toward it.
    pub cusp_limit: f64,
    /// Maximum subdivision depth. A sub-curve at this depth is replaced by its
    /// chord regardless of the remaining error.
    ///
    /// One curve yields at most `2^recursion_limit` segments, and the distance
    /// tolerance is absolute, so a very large curve (coordinates around
    /// `1e150`, say) reaches this limit everywhere and produces exactly that
    /// many. Lower the limit when input coordinates are not bounded.
    pub recursion_limit: u32,
}

impl Default for FlattenOpts {
    fn default() -> Self {
        FlattenOpts {
            approximation_scale: 1.0,
            distance_epsilon: 1e-30,
            collinearity_epsilon: 1e-30,
            angle_tolerance_epsilon: 0.01,
            angle_tolerance: 0.4,
            cusp_limit: 0.0,
            recursion_limit: 32,
        }
    }
}

impl FlattenOpts {
    /// Builder method for setting the approximation scale.
    pub fn with_approximation_scale(mut self, scale: f64) -> Self {
        self.approximation_scale = scale;
        self
    }

    /// Builder method for setting the zero-length chord threshold.
    pub fn with_distance_epsilon(mut self, epsilon: f64) -> Self {
        self.distance_epsilon = epsilon;
        self
    }

    /// Builder method for setting the collinearity threshold.
    pub fn with_collinearity_epsilon(mut self, epsilon: f64) -> Self {
        self.collinearity_epsilon = epsilon;
        self
    }

    /// Builder method for setting the threshold below which the angle test is
    /// skipped.
    pub fn with_angle_tolerance_epsilon(mut self, epsilon: f64) -> Self {
        self.angle_tolerance_epsilon = epsilon;
        self
    }

    /// Builder method for setting the angle tolerance, in radians.
    pub fn with_angle_tolerance(mut self, angle: f64) -> Self {
        self.angle_tolerance = angle;
        self
    }

    /// Builder method for setting the cusp limit, in radians. Zero disables
    /// cusp detection.
    pub fn with_cusp_limit(mut self, limit: f64) -> Self {
        self.cusp_limit = limit;
        self
    }

    /// Builder method for setting the maximum subdivision depth.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Check that every option is in range.
    pub fn validate(&self) -> Result<(), FlattenError> {
        if !(self.approximation_scale.is_finite() && self.approximation_scale > 0.0) {
            return Err(FlattenError::InvalidApproximationScale(
                self.approximation_scale,
            ));
        }
        for (name, value) in [
            ("distance_epsilon", self.distance_epsilon),
            ("collinearity_epsilon", self.collinearity_epsilon),
            ("angle_tolerance_epsilon", self.angle_tolerance_epsilon),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlattenError::InvalidEpsilon { name, value });
            }
        }
        if !(self.angle_tolerance.is_finite() && self.angle_tolerance >= 0.0) {
            return Err(FlattenError::InvalidAngleTolerance(self.angle_tolerance));
        }
        if !(self.cusp_limit == 0.0 || (self.cusp_limit > 0.0 && self.cusp_limit < PI)) {
            return Err(FlattenError::InvalidCuspLimit(self.cusp_limit));
        }
        if self.recursion_limit < 1 {
            return Err(FlattenError::InvalidRecursionLimit(self.recursion_limit));
        }
        Ok(())
    }
}

/// An error returned when [`FlattenOpts`] are out of range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlattenError {
    /// The approximation scale was not a positive finite number.
    InvalidApproximationScale(f64),
    /// One of the epsilon thresholds was negative or not finite.
    InvalidEpsilon {
        /// The option name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The angle tolerance was negative or not finite.
    InvalidAngleTolerance(f64),
    /// The cusp limit was neither zero nor in `(0, π)`.
    InvalidCuspLimit(f64),
    /// The recursion limit was zero.
    InvalidRecursionLimit(u32),
}

impl fmt::Display for FlattenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlattenError::InvalidApproximationScale(v) => {
                write!(f, "approximation scale must be positive and finite, got {v}")
            }
            FlattenError::InvalidEpsilon { name, value } => {
                write!(f, "{name} must be non-negative and finite, got {value}")
            }
            FlattenError::InvalidAngleTolerance(v) => {
                write!(f, "angle tolerance must be non-negative and finite, got {v}")
            }
            FlattenError::InvalidCuspLimit(v) => {
                write!(f, "cusp limit must be 0 or between 0 and π, got {v}")
            }
            FlattenError::InvalidRecursionLimit(v) => {
                write!(f, "recursion limit must be at least 1, got {v}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FlattenError {}

/// Thresholds derived from [`FlattenOpts`], in the form the flatness test
/// consumes them.
#[derive(Clone, Copy, Debug)]
struct Tolerance {
    distance_sq: f64,
    distance_epsilon: f64,
    collinearity_epsilon: f64,
    angle_tolerance: f64,
    angle_tolerance_epsilon: f64,
    // Zero when cusp detection is disabled, otherwise `π - cusp_limit`.
    cusp_threshold: f64,
    recursion_limit: u32,
}

impl Tolerance {
    fn new(opts: &FlattenOpts) -> Self {
        let distance = 0.5 / opts.approximation_scale;
        let cusp_threshold = if opts.cusp_limit == 0.0 {
            0.0
        } else {
            PI - opts.cusp_limit
        };
        Tolerance {
            distance_sq: distance * distance,
            distance_epsilon: opts.distance_epsilon,
            collinearity_epsilon: opts.collinearity_epsilon,
            angle_tolerance: opts.angle_tolerance,
            angle_tolerance_epsilon: opts.angle_tolerance_epsilon,
            cusp_threshold,
            recursion_limit: opts.recursion_limit,
        }
    }

    #[inline]
    fn angle_test_enabled(&self) -> bool {
        self.angle_tolerance >= self.angle_tolerance_epsilon
    }

    #[inline]
    fn is_cusp(&self, da: f64) -> bool {
        self.cusp_threshold != 0.0 && da > self.cusp_threshold
    }

    /// Decide whether `c` is flat enough to stop subdividing.
    ///
    /// Returns the points the polyline should visit for this sub-curve, or
    /// `None` if it needs to be split further.
    fn flat_enough(&self, c: &CubicBez) -> Option<ArrayVec<Point, 2>> {
        let CubicBez { p0, p1, p2, p3 } = *c;
        let mut out = ArrayVec::new();
        let d = p3 - p0;
        let chord_sq = d.hypot2();
        // These are the distances from the chord, scaled by the chord length.
        let mut d1 = (p1 - p3).cross(d).abs();
        let mut d2 = (p2 - p3).cross(d).abs();

        match (
            d1 > self.collinearity_epsilon,
            d2 > self.collinearity_epsilon,
        ) {
            (false, false) => {
                // All collinear, or p0 == p3.
                if chord_sq <= self.distance_epsilon {
                    d1 = p0.distance_squared(p1);
                    d2 = p3.distance_squared(p2);
                } else {
                    let k = chord_sq.recip();
                    let t1 = k * (p1 - p0).dot(d);
                    let t2 = k * (p2 - p0).dot(d);
                    if t1 > 0.0 && t1 < 1.0 && t2 > 0.0 && t2 < 1.0 {
                        // Simple collinear case, 0---1---2---3.
                        out.push(p3);
                        return Some(out);
                    }
                    let dist_sq = |p: Point, t: f64| {
                        if t <= 0.0 {
                            p.distance_squared(p0)
                        } else if t >= 1.0 {
                            p.distance_squared(p3)
                        } else {
                            p.distance_squared(p0 + t * d)
                        }
                    };
                    d1 = dist_sq(p1, t1);
                    d2 = dist_sq(p2, t2);
                }
                if d1 > d2 {
                    if d1 < self.distance_sq {
                        out.push(p1);
                        return Some(out);
                    }
                } else if d2 < self.distance_sq {
                    out.push(p2);
                    return Some(out);
                }
            }
            (false, true) => {
                // p0, p1, p3 are collinear; p2 is significant.
                if d2 * d2 <= self.distance_sq * chord_sq {
                    if !self.angle_test_enabled() {
                        out.push(p1.midpoint(p2));
                        return Some(out);
                    }
                    let da = angle_between((p3 - p2).atan2(), (p2 - p1).atan2());
                    if da < self.angle_tolerance {
                        out.push(p1);
                        out.push(p2);
                        return Some(out);
                    }
                    if self.is_cusp(da) {
                        out.push(p2);
                        return Some(out);
                    }
                }
            }
            (true, false) => {
                // p0, p2, p3 are collinear; p1 is significant.
                if d1 * d1 <= self.distance_sq * chord_sq {
                    if !self.angle_test_enabled() {
                        out.push(p1.midpoint(p2));
                        return Some(out);
                    }
                    let da = angle_between((p2 - p1).atan2(), (p1 - p0).atan2());
                    if da < self.angle_tolerance {
                        out.push(p1);
                        out.push(p2);
                        return Some(out);
                    }
                    if self.is_cusp(da) {
                        out.push(p1);
                        return Some(out);
                    }
                }
            }
            (true, true) => {
                let dsum = d1 + d2;
                if dsum * dsum <= self.distance_sq * chord_sq {
                    if !self.angle_test_enabled() {
                        out.push(p1.midpoint(p2));
                        return Some(out);
                    }
                    let a12 = (p2 - p1).atan2();
                    let da1 = angle_between(a12, (p1 - p0).atan2());
                    let da2 = angle_between((p3 - p2).atan2(), a12);
                    if da1 + da2 < self.angle_tolerance {
                        out.push(p1.midpoint(p2));
                        return Some(out);
                    }
                    if self.is_cusp(da1) {
                        out.push(p1);
                        return Some(out);
                    }
                    if self.is_cusp(da2) {
                        out.push(p2);
                        return Some(out);
                    }
                }
            }
        }
        None
    }
}

/// The output side of one `flatten` call.
///
/// Tracks the last point handed to the sink so that every segment starts
/// where the previous one ended. It lives only as long as the call.
struct Cursor<'a, S: ?Sized, T: ?Sized> {
    sink: &'a mut S,
    tag: &'a T,
    last: Point,
}

impl<S: LineSink<T> + ?Sized, T: ?Sized> Cursor<'_, S, T> {
    #[inline]
    fn line_to(&mut self, p: Point) {
        self.sink.line(Line::new(self.last, p), self.tag);
        self.last = p;
    }
}

// Enough for the default recursion limit without spilling.
type WorkStack = SmallVec<[(CubicBez, u32); 36]>;

/// Flattens cubic Béziers into line segments delivered to a sink.
///
/// The options are validated once, at construction, and are read-only
/// afterwards. `FlattenOpts` is `Copy`, so several threads can each build a
/// `Flattener` around their own sink from the same options.
///
/// ```
/// use flatbez::{CubicBez, FlattenOpts, Flattener, Line};
///
/// let mut lines = Vec::new();
/// let mut flattener = Flattener::new(
///     |line: Line, _: &()| lines.push(line),
///     FlattenOpts::default(),
/// )
/// .unwrap();
/// let c = CubicBez::new((0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0));
/// flattener.flatten(c, &());
/// drop(flattener);
/// assert!(lines.len() > 1);
/// assert_eq!(lines[0].p0, c.p0);
/// assert_eq!(lines[lines.len() - 1].p1, c.p3);
/// ```
#[derive(Debug)]
pub struct Flattener<S> {
    sink: S,
    opts: FlattenOpts,
    tolerance: Tolerance,
}

impl<S> Flattener<S> {
    /// Create a new flattener.
    ///
    /// Returns an error if any of the options are out of range.
    pub fn new(sink: S, opts: FlattenOpts) -> Result<Self, FlattenError> {
        opts.validate()?;
        Ok(Flattener {
            sink,
            opts,
            tolerance: Tolerance::new(&opts),
        })
    }

    /// The options this flattener was built with.
    pub fn opts(&self) -> &FlattenOpts {
        &self.opts
    }

    /// A reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// A mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the flattener, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Flatten a cubic Bézier, calling the sink once per line segment.
    ///
    /// Segments are emitted from the start of the curve toward its end. The
    /// first segment starts at `c.p0`, each segment starts where the previous
    /// one ended, and the last one ends exactly at `c.p3`.
    ///
    /// A curve with non-finite control points emits nothing.
    pub fn flatten<T: ?Sized>(&mut self, c: CubicBez, tag: &T)
    where
        S: LineSink<T>,
    {
        if !c.is_finite() {
            warn!("A cubic contains non-finite coordinates, ignoring it: {c:?}");
            return;
        }
        let tolerance = &self.tolerance;
        let mut cursor = Cursor {
            sink: &mut self.sink,
            tag,
            last: c.p0,
        };
        let mut stack = WorkStack::new();
        stack.push((c, 0));
        while let Some((sub, depth)) = stack.pop() {
            if let Some(points) = tolerance.flat_enough(&sub) {
                for p in points {
                    cursor.line_to(p);
                }
            } else if depth >= tolerance.recursion_limit {
                trace!("recursion limit {depth} reached, emitting chord");
                cursor.line_to(sub.p3);
            } else {
                let (left, right) = sub.subdivide();
                // Left on top, so it is processed first.
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
        if cursor.last != c.p3 {
            cursor.line_to(c.p3);
        }
    }

    /// Flatten a quadratic Bézier by raising it to a cubic.
    pub fn flatten_quad<T: ?Sized>(&mut self, q: QuadBez, tag: &T)
    where
        S: LineSink<T>,
    {
        self.flatten(q.raise(), tag);
    }
}
