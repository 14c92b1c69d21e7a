//! Scrolling pipe field of the non-boss modes

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Visual};
use crate::Viewport;

pub const PIPE_WIDTH: f32 = 52.0;
pub const PIPE_HEIGHT: f32 = 320.0;
/// Pairs spawn this far past the right window edge
pub const SPAWN_OFFSET: f32 = 10.0;

/// Pipe field balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeSpec {
    /// Scroll speed in px/frame
    pub speed: f32,
    /// Vertical opening between the two pipes
    pub gap: f32,
    /// Distance the newest pair travels before the next one spawns
    pub spacing: f32,
}

impl Default for PipeSpec {
    fn default() -> Self {
        Self {
            speed: 5.0,
            gap: 120.0,
            spacing: 180.0,
        }
    }
}

/// Upper and lower pipe sharing one x
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipePair {
    pub upper: Body,
    pub lower: Body,
    /// Already counted toward the score
    pub passed: bool,
}

impl PipePair {
    /// Pair whose opening starts at `gap_top`
    pub fn new(x: f32, gap_top: f32, gap: f32) -> Self {
        Self {
            upper: Body::new(x, gap_top - PIPE_HEIGHT, PIPE_WIDTH, PIPE_HEIGHT, Visual::PIPE_UPPER),
            lower: Body::new(x, gap_top + gap, PIPE_WIDTH, PIPE_HEIGHT, Visual::PIPE_LOWER),
            passed: false,
        }
    }

    pub fn x(&self) -> f32 {
        self.upper.x()
    }

    /// The bird at `x` is between the pipe's left and right edges
    pub fn crossed_by(&self, x: f32) -> bool {
        self.x() < x && x < self.x() + self.upper.w()
    }

    pub fn bodies(&self) -> [&Body; 2] {
        [&self.upper, &self.lower]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeField {
    pub spec: PipeSpec,
    pub pairs: Vec<PipePair>,
}

impl PipeField {
    pub fn new(spec: PipeSpec) -> Self {
        Self {
            spec,
            pairs: Vec::new(),
        }
    }

    fn spawn_x(viewport: &Viewport) -> f32 {
        viewport.width + SPAWN_OFFSET
    }

    fn spawn(&mut self, viewport: &Viewport, rng: &mut Pcg32) {
        let lo = viewport.floor_y * 0.2;
        let hi = (viewport.floor_y * 0.8 - self.spec.gap).max(lo + 1.0);
        let gap_top = rng.random_range(lo..hi);
        self.pairs
            .push(PipePair::new(Self::spawn_x(viewport), gap_top, self.spec.gap));
    }

    /// Scroll one frame, spawning and dropping pairs as needed
    pub fn update(&mut self, viewport: &Viewport, rng: &mut Pcg32) {
        for pair in &mut self.pairs {
            pair.upper.pos.x -= self.spec.speed;
            pair.lower.pos.x -= self.spec.speed;
        }
        self.pairs.retain(|p| p.x() >= -p.upper.w());

        let due = match self.pairs.last() {
            Some(newest) => newest.x() < Self::spawn_x(viewport) - self.spec.spacing,
            None => true,
        };
        if due {
            self.spawn(viewport, rng);
        }
    }

    /// Mark pairs the bird just entered. Returns how many were new.
    pub fn score_passes(&mut self, player_x: f32) -> u32 {
        let mut scored = 0;
        for pair in self.pairs.iter_mut().filter(|p| !p.passed) {
            if pair.crossed_by(player_x) {
                pair.passed = true;
                scored += 1;
            }
        }
        scored
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.pairs.iter().flat_map(|p| p.bodies())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_gap_stays_in_band() {
        let viewport = Viewport::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut field = PipeField::new(PipeSpec::default());
        for _ in 0..2000 {
            field.update(&viewport, &mut rng);
        }
        assert!(!field.pairs.is_empty());
        for pair in &field.pairs {
            let gap_top = pair.upper.max().y;
            assert!((95.99..264.01).contains(&gap_top));
            assert!((pair.lower.y() - gap_top - 120.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_pairs_are_spaced_and_culled() {
        let viewport = Viewport::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut field = PipeField::new(PipeSpec::default());
        for _ in 0..500 {
            field.update(&viewport, &mut rng);
            assert!(field.pairs.iter().all(|p| p.x() >= -PIPE_WIDTH));
            for w in field.pairs.windows(2) {
                assert!(w[1].x() - w[0].x() > 180.0);
            }
        }
    }

    #[test]
    fn test_pass_scores_once() {
        let mut field = PipeField::new(PipeSpec::default());
        field.pairs.push(PipePair::new(60.0, 150.0, 120.0));
        assert_eq!(field.score_passes(70.0), 1);
        assert_eq!(field.score_passes(70.0), 0);
        assert_eq!(field.score_passes(200.0), 0);
    }
}
