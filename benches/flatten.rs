// Copyright 2025 the Flatbez Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks of adaptive flattening.

#![cfg(nightly)]
#![feature(test)]
extern crate test;
use test::{black_box, Bencher};

use flatbez::{CubicBez, FlattenOpts, Flattener, Line, PathCommand, PathWalker, Point};

fn arch() -> CubicBez {
    CubicBez::new((0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0))
}

fn bench_scale(b: &mut Bencher, opts: FlattenOpts) {
    let c = arch();
    let mut n = 0usize;
    let mut flattener = Flattener::new(|_: Line, _: &()| n += 1, opts).unwrap();
    b.iter(|| flattener.flatten(black_box(c), &()));
}

#[bench]
fn flatten_scale_1(b: &mut Bencher) {
    bench_scale(b, FlattenOpts::default());
}

#[bench]
fn flatten_scale_16(b: &mut Bencher) {
    bench_scale(b, FlattenOpts::default().with_approximation_scale(16.0));
}

#[bench]
fn flatten_distance_only(b: &mut Bencher) {
    bench_scale(b, FlattenOpts::default().with_angle_tolerance(0.0));
}

#[bench]
fn flatten_cusp(b: &mut Bencher) {
    let c = CubicBez::new((0.0, 0.0), (100.0, 100.0), (0.0, 100.0), (100.0, 0.0));
    let opts = FlattenOpts::default()
        .with_angle_tolerance(0.05)
        .with_cusp_limit(0.2);
    let mut n = 0usize;
    let mut flattener = Flattener::new(|_: Line, _: &()| n += 1, opts).unwrap();
    b.iter(|| flattener.flatten(black_box(c), &()));
}

// About 10 curves, a typical glyph outline.
#[bench]
fn walk_glyph(b: &mut Bencher) {
    let path = [
        PathCommand::move_to((50.0, 0.0)),
        PathCommand::curve_to((77.6, 0.0), (100.0, 22.4), (100.0, 50.0)),
        PathCommand::curve_to((100.0, 77.6), (77.6, 100.0), (50.0, 100.0)),
        PathCommand::curve_to((22.4, 100.0), (0.0, 77.6), (0.0, 50.0)),
        PathCommand::curve_to((0.0, 22.4), (22.4, 0.0), (50.0, 0.0)),
        PathCommand::close(),
        PathCommand::move_to((50.0, 20.0)),
        PathCommand::quad_to((80.0, 20.0), (80.0, 50.0)),
        PathCommand::quad_to((80.0, 80.0), (50.0, 80.0)),
        PathCommand::quad_to((20.0, 80.0), (20.0, 50.0)),
        PathCommand::quad_to((20.0, 20.0), (50.0, 20.0)),
        PathCommand::close(),
    ];
    let mut n = 0usize;
    let flattener = Flattener::new(
        |_: Line, _: &usize| n += 1,
        FlattenOpts::default().with_approximation_scale(4.0),
    )
    .unwrap();
    let mut walker = PathWalker::new(flattener);
    b.iter(|| walker.walk(black_box(&path), Point::ZERO));
}
