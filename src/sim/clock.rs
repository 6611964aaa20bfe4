//! Fixed timestep accumulator
//!
//! Turns variable frame deltas into a deterministic sequence of equal
//! simulation steps.

use crate::consts::{FIXED_STEP, MAX_FRAME_DELTA};

/// Accumulates frame time and emits fixed-size simulation steps
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f32,
    max_delta: f32,
    accumulator: f32,
    /// Total steps emitted since creation
    steps_taken: u64,
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(FIXED_STEP, MAX_FRAME_DELTA)
    }
}

impl FixedStepClock {
    pub fn new(step: f32, max_delta: f32) -> Self {
        assert!(step > 0.0, "fixed step must be positive, got {step}");
        assert!(max_delta >= 0.0, "max frame delta must be non-negative, got {max_delta}");
        Self {
            step,
            max_delta,
            accumulator: 0.0,
            steps_taken: 0,
        }
    }

    /// Feed one frame delta and run `on_step(step)` for every whole step
    /// that fits in the accumulator. Returns the number of steps run.
    pub fn advance(&mut self, real_delta: f32, mut on_step: impl FnMut(f32)) -> u32 {
        // Negative or NaN deltas contribute nothing
        let delta = if real_delta > 0.0 { real_delta.min(self.max_delta) } else { 0.0 };
        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.step {
            on_step(self.step);
            self.accumulator -= self.step;
            steps += 1;
        }
        self.steps_taken += u64::from(steps);
        steps
    }

    /// Leftover time not yet consumed by a step, always in `[0, step)`
    pub fn residual(&self) -> f32 {
        self.accumulator
    }

    /// Interpolation factor between the last and next step
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_delta_runs_no_step() {
        let mut clock = FixedStepClock::default();
        let steps = clock.advance(0.005, |_| panic!("no step expected"));
        assert_eq!(steps, 0);
        assert!((clock.residual() - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_accumulates_across_frames() {
        let mut clock = FixedStepClock::default();
        assert_eq!(clock.advance(0.01, |_| {}), 0);
        assert_eq!(clock.advance(0.01, |_| {}), 1);
        assert!((clock.residual() - (0.02 - FIXED_STEP)).abs() < 1e-6);
    }

    #[test]
    fn test_many_steps_in_one_frame() {
        let mut clock = FixedStepClock::default();
        let mut seen = Vec::new();
        let steps = clock.advance(0.11, |dt| seen.push(dt));
        assert_eq!(steps, 6);
        assert_eq!(seen.len(), 6);
        assert!(seen.iter().all(|&dt| dt == FIXED_STEP));
    }

    #[test]
    fn test_hitch_is_clamped() {
        let mut hitched = FixedStepClock::default();
        let mut capped = FixedStepClock::default();
        let a = hitched.advance(10.0, |_| {});
        let b = capped.advance(MAX_FRAME_DELTA, |_| {});
        assert_eq!(a, b);
        assert!(a <= 15);
        assert!((hitched.residual() - capped.residual()).abs() < 1e-6);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut clock = FixedStepClock::default();
        assert_eq!(clock.advance(-1.0, |_| {}), 0);
        assert_eq!(clock.residual(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_steps_match_accumulated_time(deltas in proptest::collection::vec(0.0f32..0.4, 1..64)) {
            let mut clock = FixedStepClock::default();
            let mut total = 0.0f64;
            let mut steps = 0u64;
            for dt in &deltas {
                total += f64::from(dt.min(MAX_FRAME_DELTA));
                steps += u64::from(clock.advance(*dt, |_| {}));
            }

            let residual = clock.residual();
            prop_assert!(residual >= 0.0);
            prop_assert!(residual < FIXED_STEP);
            prop_assert_eq!(steps, clock.steps_taken());

            // steps * step + residual reconstructs the clamped total (up to f32 drift)
            let rebuilt = steps as f64 * f64::from(FIXED_STEP) + f64::from(residual);
            prop_assert!((rebuilt - total).abs() < 1e-4, "rebuilt={} total={}", rebuilt, total);

            let expected = (total / f64::from(FIXED_STEP)).floor() as i64;
            prop_assert!((steps as i64 - expected).abs() <= 1);
        }
    }
}
