// Copyright 2025 the Flatbez Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walking a sequence of path commands into line segments.
//!
//! Commands use single-letter, absolute-coordinate verbs: `M` move, `L` line,
//! `H` horizontal line, `V` vertical line, `C` cubic, `Q` quadratic and `Z`
//! close. Straight commands go straight to the sink; curves go through the
//! [`Flattener`]. The index of each command in the slice is the sink tag.

use core::fmt;

use log::debug;
use smallvec::SmallVec;

use crate::{CubicBez, Flattener, Line, LineSink, Point, QuadBez};

/// A single path command: a verb letter and its numeric arguments.
///
/// The arguments are stored flat, so a cubic is `[x1, y1, x2, y2, x, y]`,
/// repeated once per curve for a polycurve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCommand {
    /// The command letter.
    pub verb: char,
    /// The numeric arguments.
    pub args: SmallVec<[f64; 6]>,
}

impl PathCommand {
    /// Create a command from a verb letter and its arguments.
    ///
    /// No checking happens here; unknown verbs and malformed argument lists
    /// are reported by [`PathWalker::walk`].
    pub fn new(verb: char, args: impl IntoIterator<Item = f64>) -> Self {
        PathCommand {
            verb,
            args: args.into_iter().collect(),
        }
    }

    /// A "move to" command.
    pub fn move_to(p: impl Into<Point>) -> Self {
        let p = p.into();
        PathCommand::new('M', [p.x, p.y])
    }

    /// A "line to" command.
    pub fn line_to(p: impl Into<Point>) -> Self {
        let p = p.into();
        PathCommand::new('L', [p.x, p.y])
    }

    /// A horizontal line to the given x coordinate.
    pub fn horizontal_to(x: f64) -> Self {
        PathCommand::new('H', [x])
    }

    /// A vertical line to the given y coordinate.
    pub fn vertical_to(y: f64) -> Self {
        PathCommand::new('V', [y])
    }

    /// A cubic Bézier from the pen through two control points to `p3`.
    pub fn curve_to(p1: impl Into<Point>, p2: impl Into<Point>, p3: impl Into<Point>) -> Self {
        let (p1, p2, p3) = (p1.into(), p2.into(), p3.into());
        PathCommand::new('C', [p1.x, p1.y, p2.x, p2.y, p3.x, p3.y])
    }

    /// A quadratic Bézier from the pen through one control point to `p2`.
    pub fn quad_to(p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        let (p1, p2) = (p1.into(), p2.into());
        PathCommand::new('Q', [p1.x, p1.y, p2.x, p2.y])
    }

    /// A "close path" command.
    pub fn close() -> Self {
        PathCommand::new('Z', [])
    }

    fn checked_verb(&self, index: usize) -> Result<Verb, WalkError> {
        let verb = Verb::from_char(self.verb).ok_or(WalkError::UnsupportedCommand {
            index,
            verb: self.verb,
        })?;
        if !verb.accepts(self.args.len()) {
            return Err(WalkError::BadArgumentCount {
                index,
                verb: self.verb,
                count: self.args.len(),
            });
        }
        Ok(verb)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verb {
    Move,
    Line,
    Horizontal,
    Vertical,
    Cubic,
    Quad,
    Close,
}

impl Verb {
    fn from_char(c: char) -> Option<Verb> {
        match c {
            'M' => Some(Verb::Move),
            'L' => Some(Verb::Line),
            'H' => Some(Verb::Horizontal),
            'V' => Some(Verb::Vertical),
            'C' => Some(Verb::Cubic),
            'Q' => Some(Verb::Quad),
            'Z' => Some(Verb::Close),
            _ => None,
        }
    }

    fn accepts(self, count: usize) -> bool {
        match self {
            Verb::Move | Verb::Line => count >= 2 && count % 2 == 0,
            Verb::Horizontal | Verb::Vertical => count == 1,
            Verb::Cubic => count >= 6 && count % 6 == 0,
            Verb::Quad => count >= 4 && count % 4 == 0,
            Verb::Close => count == 0,
        }
    }
}

/// An error returned by [`PathWalker::walk`].
///
/// The whole command list is checked before anything is emitted, so on error
/// the sink has not been called.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkError {
    /// Encountered an unknown command letter.
    UnsupportedCommand {
        /// Index of the offending command.
        index: usize,
        /// The command letter.
        verb: char,
    },
    /// A command had the wrong number of arguments for its verb.
    BadArgumentCount {
        /// Index of the offending command.
        index: usize,
        /// The command letter.
        verb: char,
        /// The number of arguments it had.
        count: usize,
    },
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkError::UnsupportedCommand { index, verb } => {
                write!(f, "path command '{verb}' (index {index}) not supported")
            }
            WalkError::BadArgumentCount { index, verb, count } => {
                write!(
                    f,
                    "path command '{verb}' (index {index}) has {count} arguments"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WalkError {}

/// Walks path commands, feeding straight segments to the sink and curves to
/// the flattener.
///
/// ```
/// use flatbez::{FlattenOpts, Flattener, Line, PathCommand, PathWalker, Point};
///
/// let mut lines = Vec::new();
/// let flattener = Flattener::new(
///     |line: Line, index: &usize| lines.push((*index, line)),
///     FlattenOpts::default(),
/// )
/// .unwrap();
/// let mut walker = PathWalker::new(flattener);
/// let path = [
///     PathCommand::move_to((0.0, 0.0)),
///     PathCommand::line_to((10.0, 0.0)),
///     PathCommand::horizontal_to(20.0),
///     PathCommand::vertical_to(10.0),
/// ];
/// let pen = walker.walk(&path, Point::ZERO).unwrap();
/// drop(walker);
/// assert_eq!(pen, Point::new(20.0, 10.0));
/// assert_eq!(lines.len(), 3);
/// assert_eq!(lines[2], (3, Line::new((20.0, 0.0), (20.0, 10.0))));
/// ```
#[derive(Debug)]
pub struct PathWalker<S> {
    flattener: Flattener<S>,
}

impl<S> PathWalker<S> {
    /// Create a walker around a flattener.
    pub fn new(flattener: Flattener<S>) -> Self {
        PathWalker { flattener }
    }

    /// A reference to the flattener.
    pub fn flattener(&self) -> &Flattener<S> {
        &self.flattener
    }

    /// A mutable reference to the flattener.
    pub fn flattener_mut(&mut self) -> &mut Flattener<S> {
        &mut self.flattener
    }

    /// Consume the walker, returning the flattener.
    pub fn into_flattener(self) -> Flattener<S> {
        self.flattener
    }
}

impl<S: LineSink<usize>> PathWalker<S> {
    /// Walk `commands` with the pen starting at `start`.
    ///
    /// Every command is validated before the first segment is emitted. On
    /// success, returns the final pen position.
    ///
    /// A move with several points jumps to the first one and draws lines
    /// through the rest. Close is a no-op; connecting back to the start of
    /// the subpath is up to the caller.
    pub fn walk(&mut self, commands: &[PathCommand], start: Point) -> Result<Point, WalkError> {
        let verbs = commands
            .iter()
            .enumerate()
            .map(|(index, cmd)| cmd.checked_verb(index))
            .collect::<Result<SmallVec<[Verb; 16]>, _>>()?;
        let mut pen = start;
        // Argument counts are checked, so indexing `args` is in bounds.
        for (index, (cmd, verb)) in commands.iter().zip(verbs).enumerate() {
            let args = &cmd.args[..];
            match verb {
                Verb::Move => {
                    let mut points = points(args);
                    if let Some(p) = points.next() {
                        pen = p;
                    }
                    for p in points {
                        self.line(pen, p, index);
                        pen = p;
                    }
                }
                Verb::Line => {
                    for p in points(args) {
                        self.line(pen, p, index);
                        pen = p;
                    }
                }
                Verb::Horizontal => {
                    let p = Point::new(args[0], pen.y);
                    self.line(pen, p, index);
                    pen = p;
                }
                Verb::Vertical => {
                    let p = Point::new(pen.x, args[0]);
                    self.line(pen, p, index);
                    pen = p;
                }
                Verb::Cubic => {
                    for a in args.chunks_exact(6) {
                        let c = CubicBez::new(
                            pen,
                            Point::new(a[0], a[1]),
                            Point::new(a[2], a[3]),
                            Point::new(a[4], a[5]),
                        );
                        self.flattener.flatten(c, &index);
                        pen = c.p3;
                    }
                }
                Verb::Quad => {
                    for a in args.chunks_exact(4) {
                        let q = QuadBez::new(pen, Point::new(a[0], a[1]), Point::new(a[2], a[3]));
                        self.flattener.flatten_quad(q, &index);
                        pen = q.p2;
                    }
                }
                Verb::Close => {}
            }
        }
        debug!("walked {} path commands, pen at {pen}", commands.len());
        Ok(pen)
    }

    #[inline]
    fn line(&mut self, p0: Point, p1: Point, index: usize) {
        self.flattener.sink_mut().line(Line::new(p0, p1), &index);
    }
}

fn points(args: &[f64]) -> impl Iterator<Item = Point> + '_ {
    args.chunks_exact(2).map(|xy| Point::new(xy[0], xy[1]))
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::{FlattenOpts, Flattener, Line, PathCommand, PathWalker, Point, WalkError};

    fn walk(
        commands: &[PathCommand],
        start: Point,
    ) -> (Result<Point, WalkError>, Vec<(usize, Line)>) {
        let mut lines = Vec::new();
        let flattener = Flattener::new(
            |line: Line, index: &usize| lines.push((*index, line)),
            FlattenOpts::default(),
        )
        .unwrap();
        let mut walker = PathWalker::new(flattener);
        let result = walker.walk(commands, start);
        drop(walker);
        (result, lines)
    }

    #[test]
    fn straight_commands() {
        let path = [
            PathCommand::new('M', [0.0, 0.0]),
            PathCommand::new('L', [10.0, 0.0]),
            PathCommand::new('H', [20.0]),
            PathCommand::new('V', [10.0]),
        ];
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(result, Ok(Point::new(20.0, 10.0)));
        assert_eq!(
            lines,
            [
                (1, Line::new((0.0, 0.0), (10.0, 0.0))),
                (2, Line::new((10.0, 0.0), (20.0, 0.0))),
                (3, Line::new((20.0, 0.0), (20.0, 10.0))),
            ]
        );
    }

    #[test]
    fn multi_point_move_draws_after_first() {
        let path = [PathCommand::new('M', [5.0, 5.0, 6.0, 5.0, 6.0, 7.0])];
        let (result, lines) = walk(&path, Point::new(100.0, 100.0));
        assert_eq!(result, Ok(Point::new(6.0, 7.0)));
        assert_eq!(
            lines,
            [
                (0, Line::new((5.0, 5.0), (6.0, 5.0))),
                (0, Line::new((6.0, 5.0), (6.0, 7.0))),
            ]
        );
    }

    #[test]
    fn polyline_line_command() {
        let path = [PathCommand::new('L', [1.0, 0.0, 1.0, 1.0, 0.0, 1.0])];
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(result, Ok(Point::new(0.0, 1.0)));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].1.p0, Point::ZERO);
        assert_eq!(lines[2].1.p1, Point::new(0.0, 1.0));
    }

    #[test]
    fn curves_are_flattened_and_advance_pen() {
        let path = [
            PathCommand::move_to((0.0, 0.0)),
            PathCommand::curve_to((0.0, 50.0), (50.0, 50.0), (50.0, 0.0)),
            PathCommand::quad_to((75.0, -50.0), (100.0, 0.0)),
            PathCommand::close(),
        ];
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(result, Ok(Point::new(100.0, 0.0)));
        assert!(lines.len() > 2);
        assert_eq!(lines[0], (1, lines[0].1));
        assert_eq!(lines[0].1.p0, Point::ZERO);
        let cubic_end = lines.iter().rposition(|(i, _)| *i == 1).unwrap();
        assert_eq!(lines[cubic_end].1.p1, Point::new(50.0, 0.0));
        assert_eq!(lines[cubic_end + 1].0, 2);
        assert_eq!(lines[cubic_end + 1].1.p0, Point::new(50.0, 0.0));
        assert_eq!(lines[lines.len() - 1], (2, lines[lines.len() - 1].1));
        assert_eq!(lines[lines.len() - 1].1.p1, Point::new(100.0, 0.0));
        for pair in lines.windows(2) {
            assert_eq!(pair[0].1.p1, pair[1].1.p0);
        }
    }

    #[test]
    fn polycubic_runs_each_curve_from_the_pen() {
        let path = [PathCommand::new(
            'C',
            [0.0, 10.0, 10.0, 10.0, 10.0, 0.0, 10.0, -10.0, 20.0, -10.0, 20.0, 0.0],
        )];
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(result, Ok(Point::new(20.0, 0.0)));
        assert!(lines.iter().any(|(_, l)| l.p1 == Point::new(10.0, 0.0)));
        assert_eq!(lines[lines.len() - 1].1.p1, Point::new(20.0, 0.0));
    }

    #[test]
    fn long_paths_are_validated_up_front() {
        let mut path: Vec<PathCommand> = (0..40)
            .map(|i| PathCommand::line_to((f64::from(i), 0.0)))
            .collect();
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(result, Ok(Point::new(39.0, 0.0)));
        assert_eq!(lines.len(), 40);
        assert_eq!(lines[39], (39, Line::new((38.0, 0.0), (39.0, 0.0))));

        path.push(PathCommand::new('V', []));
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(
            result,
            Err(WalkError::BadArgumentCount {
                index: 40,
                verb: 'V',
                count: 0
            })
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn close_is_a_no_op() {
        let path = [PathCommand::line_to((3.0, 4.0)), PathCommand::close()];
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(result, Ok(Point::new(3.0, 4.0)));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn unsupported_command_emits_nothing() {
        let path = [
            PathCommand::line_to((1.0, 1.0)),
            PathCommand::new('A', [1.0, 1.0, 0.0, 0.0, 1.0, 2.0, 2.0]),
        ];
        let (result, lines) = walk(&path, Point::ZERO);
        assert_eq!(
            result,
            Err(WalkError::UnsupportedCommand {
                index: 1,
                verb: 'A'
            })
        );
        assert!(lines.is_empty());

        // Relative verbs are not understood either.
        let (result, _) = walk(&[PathCommand::new('l', [1.0, 1.0])], Point::ZERO);
        assert_eq!(
            result,
            Err(WalkError::UnsupportedCommand {
                index: 0,
                verb: 'l'
            })
        );
    }

    #[test]
    fn bad_argument_count() {
        let cases = [
            PathCommand::new('L', [1.0]),
            PathCommand::new('M', []),
            PathCommand::new('H', [1.0, 2.0]),
            PathCommand::new('C', [1.0, 2.0, 3.0, 4.0]),
            PathCommand::new('Q', [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            PathCommand::new('Z', [1.0]),
        ];
        for cmd in cases {
            let (result, lines) = walk(&[cmd.clone()], Point::ZERO);
            assert_eq!(
                result,
                Err(WalkError::BadArgumentCount {
                    index: 0,
                    verb: cmd.verb,
                    count: cmd.args.len()
                })
            );
            assert!(lines.is_empty());
        }
    }

    #[test]
    fn error_messages() {
        let err = WalkError::UnsupportedCommand {
            index: 3,
            verb: 'S',
        };
        assert_eq!(err.to_string(), "path command 'S' (index 3) not supported");
    }
}
