//! Flight path history for projectile trails
//!
//! Samples are taken by polling, not by exact integration: a new sample is
//! recorded whenever the actor has moved at least the threshold distance
//! since the previous one.

use std::collections::VecDeque;

use glam::Vec2;

use crate::consts::{TRACE_LENGTH, TRACE_THRESHOLD};
use crate::render::{DrawContext, TRAIL_COLOR};

/// One trail sample (display units, degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTrace {
    pub position: Vec2,
    pub angle: f32,
}

impl PathTrace {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    /// Endpoints of the short tick drawn for this sample
    pub fn tick(&self) -> (Vec2, Vec2) {
        let dir = Vec2::from_angle(self.angle.to_radians()) * (TRACE_LENGTH * 0.5);
        (self.position - dir, self.position + dir)
    }
}

#[derive(Debug, Clone)]
pub struct Trajectory {
    samples: VecDeque<PathTrace>,
    threshold: f32,
    /// `None` keeps every sample for the actor's lifetime
    capacity: Option<usize>,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new(TRACE_THRESHOLD, None)
    }
}

impl Trajectory {
    pub fn new(threshold: f32, capacity: Option<usize>) -> Self {
        Self {
            samples: VecDeque::new(),
            threshold,
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    /// Record a sample if this is the first one or the actor moved far
    /// enough. Returns whether a sample was added.
    pub fn record(&mut self, position: Vec2, angle: f32) -> bool {
        let moved_enough = self
            .samples
            .back()
            .is_none_or(|last| last.position.distance(position) >= self.threshold);
        if !moved_enough {
            return false;
        }

        self.samples.push_back(PathTrace::new(position, angle));
        if let Some(capacity) = self.capacity {
            while self.samples.len() > capacity {
                self.samples.pop_front();
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&PathTrace> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathTrace> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn draw(&self, ctx: &mut DrawContext<'_>) {
        for trace in &self.samples {
            let (from, to) = trace.tick();
            ctx.renderer.draw_line(from, to, TRAIL_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_always_recorded() {
        let mut path = Trajectory::default();
        assert!(path.record(Vec2::new(3.0, 4.0), 0.0));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_straight_line_100_units_adds_four_samples() {
        let mut path = Trajectory::default();
        path.record(Vec2::ZERO, 0.0);
        for i in 1..=20 {
            path.record(Vec2::new(i as f32 * 5.0, 0.0), 0.0);
        }
        assert_eq!(path.len(), 5);
        let xs: Vec<f32> = path.iter().map(|t| t.position.x).collect();
        assert_eq!(xs, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn test_jitter_below_threshold_ignored() {
        let mut path = Trajectory::default();
        path.record(Vec2::ZERO, 0.0);
        for i in 0..50 {
            let wobble = if i % 2 == 0 { 10.0 } else { -10.0 };
            assert!(!path.record(Vec2::new(wobble, 5.0), 90.0));
        }
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut path = Trajectory::new(1.0, Some(3));
        for i in 0..10 {
            path.record(Vec2::new(i as f32 * 2.0, 0.0), 0.0);
        }
        assert_eq!(path.len(), 3);
        assert_eq!(path.iter().next().unwrap().position.x, 14.0);
        assert_eq!(path.last().unwrap().position.x, 18.0);
    }

    #[test]
    fn test_tick_is_centered() {
        let trace = PathTrace::new(Vec2::new(10.0, 10.0), 0.0);
        let (from, to) = trace.tick();
        assert!((from - Vec2::new(5.0, 10.0)).length() < 1e-4);
        assert!((to - Vec2::new(15.0, 10.0)).length() < 1e-4);
    }
}
