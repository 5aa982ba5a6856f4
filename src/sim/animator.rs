//! Per-frame object animator
//!
//! Drives the moving object through an endless chain of legs. Each tick:
//! advance progress → plan position → clamp to the container → place on the
//! visual sink → detect arrival → retarget (same tick, no pause between legs).
//!
//! Two output channels:
//! - the [`PositionSink`] receives every tick's position (rendering only)
//! - the observed position is republished every N ticks for collaborators
//!   that react to position at low frequency

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::movement::{MovementPattern, position_at};
use super::spawn::random_position;
use crate::consts::OBJECT_VARIANTS;
use crate::settings::Settings;

/// High-frequency visual placement target
pub trait PositionSink {
    fn place(&mut self, position: Vec2);
}

impl<F: FnMut(Vec2)> PositionSink for F {
    fn place(&mut self, position: Vec2) {
        self(position)
    }
}

/// Animator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorPhase {
    /// Not driven; ticks are ignored
    Idle,
    /// Advancing toward the current target
    Animating,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Position written to the sink this tick
    pub position: Vec2,
    /// Throttled publication, if one was due this tick
    pub observed: Option<Vec2>,
    /// A new leg began at the end of this tick
    pub retargeted: bool,
}

/// Owns the moving object's state (one leg at a time)
#[derive(Debug, Clone)]
pub struct ObjectAnimator {
    phase: AnimatorPhase,
    current: Vec2,
    start: Vec2,
    target: Vec2,
    pattern: MovementPattern,
    progress: f32,
    object_size: f32,
    speed: f32,
    arrival_distance: f32,
    observe_every: u32,
    frames_since_observed: u32,
    observed: Vec2,
    /// Sprite index, cycles 1..=OBJECT_VARIANTS on every reset
    variant: u8,
    /// Legs completed since the last reset
    legs: u32,
    rng: Pcg32,
}

impl ObjectAnimator {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            phase: AnimatorPhase::Idle,
            current: Vec2::ZERO,
            start: Vec2::ZERO,
            target: Vec2::ZERO,
            pattern: MovementPattern::Linear,
            progress: 0.0,
            object_size: settings.object_size,
            speed: settings.movement_speed,
            arrival_distance: settings.arrival_distance,
            observe_every: settings.observe_every_frames.max(1),
            frames_since_observed: 0,
            observed: Vec2::ZERO,
            variant: 1,
            legs: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Begin animating from a freshly spawned position
    pub fn start(&mut self, container: Vec2) -> Vec2 {
        self.phase = AnimatorPhase::Animating;
        self.reset_object(container)
    }

    /// Stop being driven; the next `start` re-seeds everything
    pub fn stop(&mut self) {
        self.phase = AnimatorPhase::Idle;
    }

    /// Respawn the object: new position, target and pattern, progress 0.
    ///
    /// Publishes the new position on the observed channel immediately and
    /// returns it so the caller can place the visual right away.
    pub fn reset_object(&mut self, container: Vec2) -> Vec2 {
        let spawn = random_position(&mut self.rng, container, self.object_size);
        self.current = spawn;
        self.start = spawn;
        self.observed = spawn;
        self.pattern = MovementPattern::random(&mut self.rng);
        self.progress = 0.0;
        self.target = random_position(&mut self.rng, container, self.object_size);
        self.legs = 0;
        self.variant = self.variant % OBJECT_VARIANTS + 1;

        log::debug!(
            "Object spawned at ({:.0}, {:.0}) heading {} to ({:.0}, {:.0})",
            spawn.x,
            spawn.y,
            self.pattern.as_str(),
            self.target.x,
            self.target.y
        );
        spawn
    }

    /// Advance one display frame. Returns `None` while idle.
    pub fn tick<S: PositionSink + ?Sized>(
        &mut self,
        elapsed_ms: f32,
        container: Vec2,
        sink: &mut S,
    ) -> Option<TickOutcome> {
        if self.phase == AnimatorPhase::Idle {
            return None;
        }

        self.progress += elapsed_ms.max(0.0) * self.speed;
        let t = self.progress.min(1.0);
        let planned = position_at(self.start, self.target, self.pattern, t);

        let half = self.object_size / 2.0;
        let position = Vec2::new(
            planned.x.min(container.x - half).max(half),
            planned.y.min(container.y - half).max(half),
        );

        self.current = position;
        sink.place(position);

        self.frames_since_observed += 1;
        let observed = if self.frames_since_observed >= self.observe_every {
            self.frames_since_observed = 0;
            self.observed = position;
            Some(position)
        } else {
            None
        };

        let arrived =
            position.distance(self.target) < self.arrival_distance || self.progress >= 1.0;
        if arrived {
            self.begin_leg(container);
        }

        Some(TickOutcome {
            position,
            observed,
            retargeted: arrived,
        })
    }

    /// New leg from the current position
    fn begin_leg(&mut self, container: Vec2) {
        self.start = self.current;
        self.target = random_position(&mut self.rng, container, self.object_size);
        self.pattern = MovementPattern::random(&mut self.rng);
        self.progress = 0.0;
        self.legs += 1;
    }

    pub fn phase(&self) -> AnimatorPhase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        self.phase == AnimatorPhase::Animating
    }

    /// Full-rate position (last tick)
    pub fn position(&self) -> Vec2 {
        self.current
    }

    /// Throttled position
    pub fn observed_position(&self) -> Vec2 {
        self.observed
    }

    pub fn start_position(&self) -> Vec2 {
        self.start
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn pattern(&self) -> MovementPattern {
        self.pattern
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn object_size(&self) -> f32 {
        self.object_size
    }

    pub fn variant(&self) -> u8 {
        self.variant
    }

    pub fn legs_completed(&self) -> u32 {
        self.legs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Vec2 = Vec2::new(1024.0, 768.0);

    fn animator() -> ObjectAnimator {
        ObjectAnimator::new(42, &Settings::default())
    }

    #[test]
    fn test_idle_ignores_ticks() {
        let mut anim = animator();
        let mut placed = Vec::new();
        let mut sink = |p: Vec2| placed.push(p);
        assert!(anim.tick(16.0, CONTAINER, &mut sink).is_none());
        assert!(placed.is_empty());
    }

    #[test]
    fn test_start_seeds_leg() {
        let mut anim = animator();
        let spawn = anim.start(CONTAINER);
        assert!(anim.is_animating());
        assert_eq!(anim.position(), spawn);
        assert_eq!(anim.start_position(), spawn);
        assert_eq!(anim.observed_position(), spawn);
        assert_eq!(anim.progress(), 0.0);
        assert_eq!(anim.variant(), 2);
    }

    #[test]
    fn test_progress_advances_with_elapsed() {
        let mut anim = animator();
        anim.start(CONTAINER);
        // Far-away target so arrival can't trigger
        anim.start = Vec2::new(200.0, 200.0);
        anim.target = Vec2::new(800.0, 600.0);
        anim.pattern = MovementPattern::Linear;

        let mut sink = |_: Vec2| {};
        let out = anim.tick(1000.0, CONTAINER, &mut sink).unwrap();
        assert!(!out.retargeted);
        assert!((anim.progress() - 0.25).abs() < 1e-5);
        assert!((out.position - Vec2::new(350.0, 300.0)).length() < 1e-2);
    }

    #[test]
    fn test_every_tick_reaches_sink() {
        let mut anim = animator();
        anim.start(CONTAINER);
        let mut placed = Vec::new();
        {
            let mut sink = |p: Vec2| placed.push(p);
            for _ in 0..10 {
                anim.tick(16.0, CONTAINER, &mut sink);
            }
        }
        assert_eq!(placed.len(), 10);
        assert_eq!(*placed.last().unwrap(), anim.position());
    }

    #[test]
    fn test_observed_is_throttled() {
        let mut anim = animator();
        anim.start(CONTAINER);
        let mut sink = |_: Vec2| {};
        let mut published = 0;
        for _ in 0..90 {
            if anim.tick(16.0, CONTAINER, &mut sink).unwrap().observed.is_some() {
                published += 1;
            }
        }
        assert_eq!(published, 3);
    }

    #[test]
    fn test_clamps_to_container() {
        let mut anim = animator();
        anim.start(CONTAINER);
        anim.start = Vec2::new(-500.0, 5000.0);
        anim.target = Vec2::new(-400.0, 6000.0);
        anim.pattern = MovementPattern::Linear;

        let mut sink = |_: Vec2| {};
        let out = anim.tick(16.0, CONTAINER, &mut sink).unwrap();
        let half = anim.object_size() / 2.0;
        assert_eq!(out.position, Vec2::new(half, CONTAINER.y - half));
    }

    #[test]
    fn test_full_progress_retargets_same_tick() {
        let mut anim = animator();
        anim.start(CONTAINER);
        anim.start = Vec2::new(200.0, 200.0);
        anim.target = Vec2::new(800.0, 600.0);
        anim.pattern = MovementPattern::Linear;

        let old_target = anim.target();
        let mut sink = |_: Vec2| {};
        let out = anim.tick(5000.0, CONTAINER, &mut sink).unwrap();
        assert!(out.retargeted);
        assert_eq!(anim.progress(), 0.0);
        assert_eq!(anim.start_position(), out.position);
        assert_eq!(anim.legs_completed(), 1);
        // (800, 600) lies outside the spawn band, so any fresh draw differs
        assert_ne!(anim.target(), old_target);
    }

    #[test]
    fn test_near_target_retargets_before_full_progress() {
        let mut anim = animator();
        anim.start(CONTAINER);
        anim.start = Vec2::new(300.0, 300.0);
        anim.target = Vec2::new(310.0, 300.0);
        anim.pattern = MovementPattern::Linear;

        let old_target = anim.target();
        let mut sink = |_: Vec2| {};
        let out = anim.tick(16.0, CONTAINER, &mut sink).unwrap();
        assert!(out.retargeted);
        assert_eq!(anim.progress(), 0.0);
        assert_eq!(anim.start_position(), out.position);
        assert_ne!(anim.target(), old_target);
    }

    #[test]
    fn test_arrivals_resample_pattern() {
        let mut anim = animator();
        anim.start(CONTAINER);
        let mut sink = |_: Vec2| {};
        let mut seen = Vec::new();
        for _ in 0..100 {
            let before = anim.target();
            // A full leg per tick
            let out = anim.tick(5000.0, CONTAINER, &mut sink).unwrap();
            assert!(out.retargeted);
            assert_ne!(anim.target(), before);
            if !seen.contains(&anim.pattern()) {
                seen.push(anim.pattern());
            }
        }
        assert_eq!(anim.legs_completed(), 100);
        for pattern in MovementPattern::ALL {
            assert!(seen.contains(&pattern), "{} never drawn", pattern.as_str());
        }
    }

    #[test]
    fn test_progress_monotonic_within_leg() {
        let mut anim = animator();
        anim.start(CONTAINER);
        let mut sink = |_: Vec2| {};
        let mut last = anim.progress();
        for _ in 0..2000 {
            let out = anim.tick(16.0, CONTAINER, &mut sink).unwrap();
            if out.retargeted {
                assert_eq!(anim.progress(), 0.0);
            } else {
                assert!(anim.progress() >= last);
            }
            last = anim.progress();
        }
        assert!(anim.legs_completed() > 0);
    }

    #[test]
    fn test_stop_then_start_reseeds() {
        let mut anim = animator();
        anim.start(CONTAINER);
        let mut sink = |_: Vec2| {};
        anim.tick(800.0, CONTAINER, &mut sink);
        anim.stop();
        assert!(anim.tick(16.0, CONTAINER, &mut sink).is_none());

        let spawn = anim.start(CONTAINER);
        assert_eq!(anim.progress(), 0.0);
        assert_eq!(anim.start_position(), spawn);
        assert_eq!(anim.legs_completed(), 0);
    }

    #[test]
    fn test_variant_cycles() {
        let mut anim = animator();
        let variants: Vec<u8> = (0..6)
            .map(|_| {
                anim.reset_object(CONTAINER);
                anim.variant()
            })
            .collect();
        assert_eq!(variants, vec![2, 3, 4, 5, 1, 2]);
    }
}
