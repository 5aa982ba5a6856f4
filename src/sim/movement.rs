//! Movement patterns for a single leg
//!
//! Every pattern interpolates x linearly. Only `Linear` is guaranteed to land
//! on the target at t=1: `Curved` and `Bounce` return to the start height and
//! `Zigzag` keeps its lateral wobble. That is the established look of the
//! game and is kept as-is.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::ZIGZAG_AMPLITUDE;

/// Interpolation pattern for one start→target leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementPattern {
    #[default]
    Linear,
    Curved,
    Zigzag,
    Bounce,
}

impl MovementPattern {
    pub const ALL: [MovementPattern; 4] = [
        MovementPattern::Linear,
        MovementPattern::Curved,
        MovementPattern::Zigzag,
        MovementPattern::Bounce,
    ];

    /// Uniform draw over all patterns (no bias against repeating the last one)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementPattern::Linear => "linear",
            MovementPattern::Curved => "curved",
            MovementPattern::Zigzag => "zigzag",
            MovementPattern::Bounce => "bounce",
        }
    }
}

/// Position along a leg at progress `t` (expected in [0, 1])
pub fn position_at(start: Vec2, target: Vec2, pattern: MovementPattern, t: f32) -> Vec2 {
    let delta = target - start;
    let x = start.x + delta.x * t;

    let y = match pattern {
        MovementPattern::Linear => start.y + delta.y * t,
        // Arc: sin(tπ) peaks mid-leg and is back to 0 at t=1
        MovementPattern::Curved => start.y + delta.y * (t * PI).sin(),
        MovementPattern::Zigzag => start.y + delta.y * t + (t * PI * 4.0).sin() * ZIGZAG_AMPLITUDE,
        MovementPattern::Bounce => start.y + delta.y * (t * PI * 2.0).sin().abs(),
    };

    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const EPS: f32 = 1e-3;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < EPS
    }

    #[test]
    fn test_linear_lands_on_target() {
        let start = Vec2::new(40.0, 300.0);
        let target = Vec2::new(500.0, 90.0);
        assert_eq!(position_at(start, target, MovementPattern::Linear, 1.0), target);
        assert!(close(
            position_at(start, target, MovementPattern::Linear, 0.5),
            Vec2::new(270.0, 195.0)
        ));
    }

    #[test]
    fn test_curved_returns_to_start_height() {
        let start = Vec2::new(40.0, 300.0);
        let target = Vec2::new(500.0, 90.0);
        let end = position_at(start, target, MovementPattern::Curved, 1.0);
        assert!((end.x - target.x).abs() < EPS);
        assert!((end.y - start.y).abs() < EPS);

        // Full vertical delta applied at the top of the arc
        let mid = position_at(start, target, MovementPattern::Curved, 0.5);
        assert!((mid.y - target.y).abs() < EPS);
    }

    #[test]
    fn test_zigzag_formula() {
        let start = Vec2::new(0.0, 100.0);
        let target = Vec2::new(400.0, 300.0);
        // sin(4π * 0.125) = 1: peak of the wobble
        let p = position_at(start, target, MovementPattern::Zigzag, 0.125);
        assert!((p.x - 50.0).abs() < EPS);
        assert!((p.y - (100.0 + 25.0 + ZIGZAG_AMPLITUDE)).abs() < EPS);

        let end = position_at(start, target, MovementPattern::Zigzag, 1.0);
        let expected_y = 100.0 + 200.0 + (4.0 * PI).sin() * ZIGZAG_AMPLITUDE;
        assert!((end.y - expected_y).abs() < EPS);
    }

    #[test]
    fn test_bounce_formula() {
        let start = Vec2::new(0.0, 100.0);
        let target = Vec2::new(400.0, 300.0);
        let quarter = position_at(start, target, MovementPattern::Bounce, 0.25);
        assert!((quarter.y - 300.0).abs() < EPS);
        // |sin(1.5π)| = 1: bounces back up to the full delta, never below start
        let three_quarter = position_at(start, target, MovementPattern::Bounce, 0.75);
        assert!((three_quarter.y - 300.0).abs() < EPS);

        let end = position_at(start, target, MovementPattern::Bounce, 1.0);
        assert!((end.y - start.y).abs() < EPS);
        assert!((end.x - target.x).abs() < EPS);
    }

    #[test]
    fn test_random_covers_all_patterns() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let p = MovementPattern::random(&mut rng);
            let idx = MovementPattern::ALL.iter().position(|q| *q == p).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    proptest! {
        #[test]
        fn prop_every_pattern_starts_at_start(
            sx in 0.0f32..2000.0, sy in 0.0f32..2000.0,
            tx in 0.0f32..2000.0, ty in 0.0f32..2000.0,
        ) {
            let start = Vec2::new(sx, sy);
            let target = Vec2::new(tx, ty);
            for pattern in MovementPattern::ALL {
                prop_assert_eq!(position_at(start, target, pattern, 0.0), start);
            }
        }
    }
}
