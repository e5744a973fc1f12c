//! Stochastic fractal tree generation: angle splitting, the branch
//! work-list engine, and the tree driver.

use crate::canvas::Surface;
use crate::params::Params;
use crate::sampler::Sampler;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8};

/// Global cap on branch calls per tree. A soft limit: generation past it
/// is discarded, leaving the tree partially rendered.
pub const MAX_BRANCHES: u32 = 500_000;

/// The trunk is always this tall, independent of the sampled length
/// handed to the first branch.
pub const TRUNK_HEIGHT: f64 = 50.0;

/// Initial branch length interval.
const TRUNK_LENGTH: (f64, f64) = (90.0, 120.0);
/// Initial stroke weight interval.
const TRUNK_WEIGHT: (f64, f64) = (20.0, 35.0);

/// Counters accumulated over one `draw_tree` call.
#[derive(Clone, Copy, Default)]
pub struct TreeStats {
    /// Branch tasks processed, including ones discarded at the cap.
    pub branches: u32,
    /// Line segments drawn, trunk included.
    pub segments: u32,
    /// True when the branch cap cut generation short.
    pub capped: bool,
}

/// One pending branch: the segment to draw and the state its children
/// derive from. Lives only on the work list.
struct BranchTask {
    x: f64,
    y: f64,
    weight: f64,
    length: f64,
    angle: f64,
}

/// Derive two child angles within a 45-degree cone either side of the
/// parent direction.
///
/// A sampled gap of zero yields the maximal 90-degree spread
/// (`angle +- 45 deg`); gaps near the upper bound converge both children
/// toward the parent direction, down to a minimum separation of
/// 22.5 degrees. Returns `(angle1, angle2)` with `angle2 <= angle1`.
fn split_angles<S: Sampler>(sampler: &mut S, angle: f64) -> (f64, f64) {
    let angle_max = angle + FRAC_PI_4;
    let angle_min = angle - FRAC_PI_4;
    let diff = sampler.sample(0.0, (angle_max - angle_min) - FRAC_PI_8);
    let angle1 = angle_max - diff / 2.0;
    let angle2 = angle_min + diff / 2.0;
    (angle1, angle2)
}

/// Draw one tree from `start`, growing upward.
///
/// Resets the branch counter, draws the fixed-height trunk, then runs the
/// branch engine from the trunk top with a freshly sampled length and
/// weight. The trunk's visible height and the length seeding the first
/// branch are deliberately unrelated.
///
/// Parameters must not be mutated while a call is in progress; the
/// interactive loop only edits them between generations.
pub fn draw_tree<F: Surface, S: Sampler>(
    surface: &mut F,
    sampler: &mut S,
    params: &Params,
    start_x: f64,
    start_y: f64,
) -> TreeStats {
    let mut stats = TreeStats::default();

    let length = sampler.sample(TRUNK_LENGTH.0, TRUNK_LENGTH.1);
    let weight = sampler.sample(TRUNK_WEIGHT.0, TRUNK_WEIGHT.1);

    surface.set_stroke_color(params.color);
    surface.set_stroke_width(weight);
    let trunk_top = start_y - TRUNK_HEIGHT;
    surface.stroke_line(start_x, start_y, start_x, trunk_top);
    stats.segments += 1;

    grow(
        surface,
        sampler,
        params,
        &mut stats,
        BranchTask {
            x: start_x,
            y: trunk_top,
            weight,
            length,
            angle: FRAC_PI_2,
        },
    );
    stats
}

/// The branch engine: an explicit work list replacing call-stack
/// recursion, preserving depth-first pre-order with the left child fully
/// resolved before the right.
fn grow<F: Surface, S: Sampler>(
    surface: &mut F,
    sampler: &mut S,
    params: &Params,
    stats: &mut TreeStats,
    root: BranchTask,
) {
    let mut stack: Vec<BranchTask> = Vec::with_capacity(64);
    stack.push(root);

    while let Some(task) = stack.pop() {
        stats.branches += 1;
        if stats.branches > MAX_BRANCHES {
            // Soft limit: discard this branch, keep draining the rest
            stats.capped = true;
            continue;
        }

        // x1 = x + n cos(theta), y1 = y - n sin(theta); y grows downward
        let x1 = task.x + task.length * task.angle.cos();
        let y1 = task.y - task.length * task.angle.sin();

        surface.set_stroke_width(task.weight);
        surface.stroke_line(task.x, task.y, x1, y1);
        stats.segments += 1;

        let (angle1, angle2) = split_angles(sampler, task.angle);

        // One derivation shared by both children; only the angle differs
        let new_weight = sampler.sample(
            task.weight * params.min_weight_reduction,
            task.weight * params.max_weight_reduction,
        );
        let new_length = sampler.sample(
            task.length * params.min_len_reduction,
            task.length * params.max_len_reduction,
        );

        if new_length < params.final_length {
            continue;
        }

        // LIFO order: push the angle2 child first so angle1 pops first
        stack.push(BranchTask {
            x: x1,
            y: y1,
            weight: new_weight,
            length: new_length,
            angle: angle2,
        });
        stack.push(BranchTask {
            x: x1,
            y: y1,
            weight: new_weight,
            length: new_length,
            angle: angle1,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::RngSampler;
    use crossterm::style::Color;
    use std::f64::consts::PI;

    /// Surface double that records every stroked segment.
    #[derive(Default)]
    struct RecordingSurface {
        width: f64,
        segments: Vec<Segment>,
    }

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Segment {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        width: f64,
    }

    impl Segment {
        fn length(&self) -> f64 {
            (self.x1 - self.x0).hypot(self.y1 - self.y0)
        }
    }

    impl Surface for RecordingSurface {
        fn set_stroke_width(&mut self, width: f64) {
            self.width = width;
        }
        fn set_stroke_color(&mut self, _color: Color) {}
        fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
            self.segments.push(Segment {
                x0,
                y0,
                x1,
                y1,
                width: self.width,
            });
        }
    }

    /// Surface double that only counts strokes.
    #[derive(Default)]
    struct CountingSurface {
        strokes: u64,
    }

    impl Surface for CountingSurface {
        fn set_stroke_width(&mut self, _width: f64) {}
        fn set_stroke_color(&mut self, _color: Color) {}
        fn stroke_line(&mut self, _x0: f64, _y0: f64, _x1: f64, _y1: f64) {
            self.strokes += 1;
        }
    }

    /// Always returns the low end of the interval.
    struct LowSampler;

    impl Sampler for LowSampler {
        fn sample(&mut self, low: f64, _high: f64) -> f64 {
            low
        }
    }

    /// Always returns a fixed value, ignoring the interval.
    struct FixedSampler(f64);

    impl Sampler for FixedSampler {
        fn sample(&mut self, _low: f64, _high: f64) -> f64 {
            self.0
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn split_angles_ordering_and_bounds() {
        let mut sampler = RngSampler::seeded(11);
        for i in 0..1000 {
            let angle = -PI + (i as f64 / 1000.0) * 2.0 * PI;
            let (a1, a2) = split_angles(&mut sampler, angle);
            assert!(a2 <= a1);
            assert!(a1 <= angle + FRAC_PI_4 + 1e-9);
            assert!(a2 >= angle - FRAC_PI_4 - 1e-9);
            // Midpoint of the pair is always the parent direction
            assert_close((a1 + a2) / 2.0, angle);
        }
    }

    #[test]
    fn zero_gap_gives_maximal_spread() {
        let (a1, a2) = split_angles(&mut LowSampler, FRAC_PI_2);
        assert_close(a1, 3.0 * FRAC_PI_4);
        assert_close(a2, FRAC_PI_4);
    }

    #[test]
    fn spread_shrinks_as_gap_grows() {
        // spread = 90 deg - diff, exactly
        for diff in [0.0, 0.3, 0.8, FRAC_PI_2 - FRAC_PI_8 - 1e-6] {
            let (a1, a2) = split_angles(&mut FixedSampler(diff), 1.2);
            assert_close(a1 - a2, FRAC_PI_2 - diff);
        }
        // The spread therefore never drops below the 22.5 deg minimum
        let (a1, a2) = split_angles(&mut FixedSampler(FRAC_PI_2 - FRAC_PI_8), 1.2);
        assert!(a1 - a2 >= FRAC_PI_8 - 1e-9);
    }

    #[test]
    fn trunk_is_always_fifty_units() {
        for seed in 0..20 {
            let mut surface = RecordingSurface::default();
            let mut sampler = RngSampler::seeded(seed);
            draw_tree(&mut surface, &mut sampler, &Params::default(), 0.0, 0.0);
            let trunk = surface.segments[0];
            assert_eq!(trunk.x0, trunk.x1);
            assert_close(trunk.length(), TRUNK_HEIGHT);
            // while the first branch length is sampled from [90, 120)
            let first = surface.segments[1];
            let len = first.length();
            assert!(len >= 90.0 - 1e-9 && len < 120.0, "{}", len);
        }
    }

    #[test]
    fn same_seed_draws_identical_trees() {
        let params = Params::default();
        let mut a = RecordingSurface::default();
        let mut b = RecordingSurface::default();
        draw_tree(&mut a, &mut RngSampler::seeded(99), &params, 12.0, 300.0);
        draw_tree(&mut b, &mut RngSampler::seeded(99), &params, 12.0, 300.0);
        assert!(!a.segments.is_empty());
        assert_eq!(a.segments, b.segments);
    }

    #[test]
    fn every_branch_starts_at_an_earlier_endpoint() {
        let params = Params {
            final_length: 30.0,
            ..Params::default()
        };
        let mut surface = RecordingSurface::default();
        let mut sampler = RngSampler::seeded(5);
        draw_tree(&mut surface, &mut sampler, &params, 0.0, 400.0);

        // Pre-order: each segment after the trunk begins at the endpoint
        // of some segment already drawn.
        for (i, seg) in surface.segments.iter().enumerate().skip(1) {
            let attached = surface.segments[..i]
                .iter()
                .any(|prev| (prev.x1 - seg.x0).abs() < 1e-9 && (prev.y1 - seg.y0).abs() < 1e-9);
            assert!(attached, "segment {} is detached", i);
        }
    }

    #[test]
    fn children_share_weight_and_length_and_differ_in_angle() {
        // One branching level: root at length 100 spawns two leaves at 70
        let params = Params {
            final_length: 50.0,
            min_len_reduction: 0.7,
            max_len_reduction: 0.7,
            min_weight_reduction: 0.6,
            max_weight_reduction: 0.6,
            ..Params::default()
        };
        let mut surface = RecordingSurface::default();
        let mut stats = TreeStats::default();
        grow(
            &mut surface,
            &mut LowSampler,
            &params,
            &mut stats,
            BranchTask {
                x: 0.0,
                y: 0.0,
                weight: 20.0,
                length: 100.0,
                angle: FRAC_PI_2,
            },
        );

        assert_eq!(stats.branches, 3);
        let left = surface.segments[1];
        let right = surface.segments[2];
        assert_eq!(left.width, right.width);
        assert_close(left.length(), right.length());
        assert_close(left.length(), 70.0);
        // Zero gap: children leave at 135 and 45 degrees, left drawn first
        assert!(left.x1 < left.x0);
        assert!(right.x1 > right.x0);
        assert_close(left.x0, right.x0);
        assert_close(left.y0, right.y0);
    }

    #[test]
    fn degenerate_decay_terminates_at_seven_levels() {
        // length 100 decaying by exactly 0.7 crosses final_length 10 at
        // level 7, giving a full binary tree of 2^7 - 1 branches
        let params = Params {
            final_length: 10.0,
            min_len_reduction: 0.7,
            max_len_reduction: 0.7,
            min_weight_reduction: 0.6,
            max_weight_reduction: 0.6,
            ..Params::default()
        };
        let mut surface = RecordingSurface::default();
        let mut stats = TreeStats::default();
        grow(
            &mut surface,
            &mut LowSampler,
            &params,
            &mut stats,
            BranchTask {
                x: 0.0,
                y: 0.0,
                weight: 20.0,
                length: 100.0,
                angle: FRAC_PI_2,
            },
        );

        assert_eq!(stats.branches, 127);
        assert_eq!(stats.segments, 127);
        assert!(!stats.capped);

        let shortest = surface
            .segments
            .iter()
            .map(Segment::length)
            .fold(f64::MAX, f64::min);
        assert_close(shortest, 100.0 * 0.7f64.powi(6));
    }

    #[test]
    fn cap_truncates_without_error() {
        let params = Params {
            final_length: 0.001,
            min_len_reduction: 0.95,
            max_len_reduction: 0.99,
            min_weight_reduction: 0.95,
            max_weight_reduction: 0.99,
            ..Params::default()
        };
        let mut surface = CountingSurface::default();
        let mut sampler = RngSampler::seeded(3);
        let stats = draw_tree(&mut surface, &mut sampler, &params, 0.0, 0.0);

        assert!(stats.capped);
        assert!(stats.branches > MAX_BRANCHES);
        // Exactly cap branch segments drawn, plus the trunk
        assert_eq!(stats.segments, MAX_BRANCHES + 1);
        assert_eq!(surface.strokes as u32, stats.segments);
    }
}
