// Copyright 2025 the Flatbez Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive flattening of Bézier curves into line segments.
//!
//! The flatbez library turns cubic and quadratic Bézier curves into polylines
//! that stay within a distance tolerance of the true curve, and optionally
//! within an angle tolerance as well. Line segments are pushed to a caller
//! supplied [`LineSink`] rather than collected, so the output can go straight
//! into a rasterizer, a tessellator or a `Vec`.
//!
//! On top of the flattener, a [`PathWalker`] interprets a sequence of simple
//! path commands (move, line, horizontal, vertical, cubic, quadratic, close)
//! and flattens the whole path through the same sink.
//!
//! # Examples
//!
//! Flattening a single curve:
//! ```
//! use flatbez::{CubicBez, FlattenOpts, Line};
//!
//! let c = CubicBez::new((0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0));
//! let mut lines: Vec<Line> = Vec::new();
//! c.flatten_adaptive(FlattenOpts::default(), |l| lines.push(l)).unwrap();
//! assert_eq!(lines[0].p0, c.p0);
//! assert_eq!(lines[lines.len() - 1].p1, c.p3);
//! ```
//!
//! Walking a path, with the command index as the tag:
//! ```
//! use flatbez::{FlattenOpts, Flattener, Line, PathCommand, PathWalker, Point};
//!
//! let mut count = [0usize; 3];
//! let flattener = Flattener::new(
//!     |_: Line, index: &usize| count[*index] += 1,
//!     FlattenOpts::default().with_approximation_scale(4.0),
//! )
//! .unwrap();
//! let mut walker = PathWalker::new(flattener);
//! let path = [
//!     PathCommand::move_to((10.0, 10.0)),
//!     PathCommand::quad_to((50.0, 90.0), (90.0, 10.0)),
//!     PathCommand::close(),
//! ];
//! let pen = walker.walk(&path, Point::ZERO).unwrap();
//! drop(walker);
//! assert_eq!(pen, Point::new(90.0, 10.0));
//! assert_eq!(count[0], 0);
//! assert!(count[1] > 1);
//! ```
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. This is useful for
//! `no_std` environments. The `alloc` crate is used regardless.
//!
//! The `serde` and `schemars` features derive serialization and JSON schema
//! support for the geometry types, [`FlattenOpts`] and [`PathCommand`]. The
//! `mint` feature adds conversions to and from `mint` points and vectors.
//!
//! [`libm`]: https://docs.rs/libm

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    clippy::missing_errors_doc,
    clippy::exhaustive_enums,
    clippy::exhaustive_structs,
    missing_debug_implementations
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("flatbez requires either the `std` or `libm` feature");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use libm as _;

extern crate alloc;

mod common;
mod cubicbez;
mod flatten;
mod line;
mod point;
mod quadbez;
mod vec2;
mod walk;

pub use crate::cubicbez::CubicBez;
pub use crate::flatten::{FlattenError, FlattenOpts, Flattener, LineSink};
pub use crate::line::Line;
pub use crate::point::Point;
pub use crate::quadbez::QuadBez;
pub use crate::vec2::Vec2;
pub use crate::walk::{PathCommand, PathWalker, WalkError};
