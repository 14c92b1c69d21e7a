//! Projectiles and their motion policies
//!
//! A projectile is owned by the list of whoever fired it. Its motion policy is
//! chosen at construction and advanced uniformly every frame through
//! [`MotionPolicy`]; per-frame list updates build the next list from the
//! survivors instead of removing entries mid-iteration.

use std::collections::VecDeque;
use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, BossId, Positioned, TargetLookup, Visual};
use crate::{Viewport, heading_velocity, normalize_angle, velocity_heading};

/// Angular offsets (degrees) of the shards a splitter breaks into
pub const SPLIT_OFFSETS_DEG: [f32; 3] = [-30.0, 0.0, 30.0];
/// Speed of each splitter shard
pub const SHARD_SPEED: f32 = 8.0;
/// Shard size (square)
pub const SHARD_SIZE: f32 = 5.0;
/// Peak opacity of the oldest visible trail entry
pub const TRAIL_BASE_ALPHA: u32 = 128;

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emitter {
    Player,
    Boss(BossId),
}

/// What happened to a projectile during one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStep {
    /// Still in flight
    Flying,
    /// Timer elapsed; the projectile should be replaced by its shards
    Split,
}

/// Per-frame position update rule
pub trait MotionPolicy {
    fn advance(
        &mut self,
        body: &mut Body,
        vel: &mut Vec2,
        targets: &dyn TargetLookup,
    ) -> MotionStep;
}

/// Straight-line flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Linear;

impl MotionPolicy for Linear {
    fn advance(&mut self, body: &mut Body, vel: &mut Vec2, _: &dyn TargetLookup) -> MotionStep {
        body.pos += *vel;
        MotionStep::Flying
    }
}

/// Holds position for `remaining` frames, then flies straight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delayed {
    pub remaining: u32,
}

impl MotionPolicy for Delayed {
    fn advance(
        &mut self,
        body: &mut Body,
        vel: &mut Vec2,
        targets: &dyn TargetLookup,
    ) -> MotionStep {
        if self.remaining > 0 {
            self.remaining -= 1;
            return MotionStep::Flying;
        }
        Linear.advance(body, vel, targets)
    }
}

/// Steers toward a target's center at a fixed speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    pub target: Option<BossId>,
    pub speed: f32,
    /// Fraction of the heading error corrected per frame
    pub turn_rate: f32,
}

impl Homing {
    /// Signed heading error toward `aim`, in [-π, π)
    pub fn heading_error(body: &Body, vel: Vec2, aim: Vec2) -> f32 {
        let to_aim = aim - body.center();
        normalize_angle(to_aim.y.atan2(to_aim.x) - velocity_heading(vel))
    }
}

impl MotionPolicy for Homing {
    fn advance(
        &mut self,
        body: &mut Body,
        vel: &mut Vec2,
        targets: &dyn TargetLookup,
    ) -> MotionStep {
        // A target that no longer resolves is dropped for good
        let aim = self.target.and_then(|id| targets.locate(id));
        match aim {
            Some(target) => {
                let error = Self::heading_error(body, *vel, target.center());
                let heading = velocity_heading(*vel) + error * self.turn_rate;
                *vel = heading_velocity(heading, self.speed);
            }
            None => self.target = None,
        }
        body.pos += *vel;
        MotionStep::Flying
    }
}

/// One remembered position of a trailing projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
}

/// Straight flight that remembers its last `depth` positions (oldest first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trailing {
    pub depth: usize,
    pub history: VecDeque<TrailPoint>,
}

impl Trailing {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            history: VecDeque::with_capacity(depth + 1),
        }
    }

    /// Ghost images behind the projectile with their opacity (0-255).
    ///
    /// The newest entry is the projectile itself and is not repeated.
    pub fn ghosts(&self) -> impl Iterator<Item = (Vec2, u8)> + '_ {
        let len = self.history.len() as u32;
        self.history
            .iter()
            .take(self.history.len().saturating_sub(1))
            .enumerate()
            .map(move |(i, p)| (p.pos, (TRAIL_BASE_ALPHA * (i as u32 + 1) / len) as u8))
    }
}

impl MotionPolicy for Trailing {
    fn advance(
        &mut self,
        body: &mut Body,
        vel: &mut Vec2,
        targets: &dyn TargetLookup,
    ) -> MotionStep {
        let step = Linear.advance(body, vel, targets);
        self.history.push_back(TrailPoint { pos: body.pos });
        while self.history.len() > self.depth {
            self.history.pop_front();
        }
        step
    }
}

/// Straight flight that breaks into shards when its timer runs out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Splitter {
    pub timer: u32,
}

impl MotionPolicy for Splitter {
    fn advance(
        &mut self,
        body: &mut Body,
        vel: &mut Vec2,
        targets: &dyn TargetLookup,
    ) -> MotionStep {
        Linear.advance(body, vel, targets);
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            MotionStep::Split
        } else {
            MotionStep::Flying
        }
    }
}

/// Motion policy chosen when the projectile is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Linear(Linear),
    Delayed(Delayed),
    Homing(Homing),
    Trailing(Trailing),
    Splitter(Splitter),
}

impl Motion {
    fn policy(&mut self) -> &mut dyn MotionPolicy {
        match self {
            Motion::Linear(p) => p,
            Motion::Delayed(p) => p,
            Motion::Homing(p) => p,
            Motion::Trailing(p) => p,
            Motion::Splitter(p) => p,
        }
    }
}

/// A single moving hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: Emitter,
    pub body: Body,
    pub vel: Vec2,
    pub damage: u32,
    pub motion: Motion,
    /// Laser beams render as a streak and are tagged for hit effects
    pub is_laser: bool,
}

impl Projectile {
    /// Straight-flying projectile
    pub fn new(owner: Emitter, body: Body, vel: Vec2, damage: u32) -> Self {
        Self {
            owner,
            body,
            vel,
            damage,
            motion: Motion::Linear(Linear),
            is_laser: false,
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn delayed(self, frames: u32) -> Self {
        self.with_motion(Motion::Delayed(Delayed { remaining: frames }))
    }

    pub fn homing(self, target: Option<BossId>, speed: f32, turn_rate: f32) -> Self {
        self.with_motion(Motion::Homing(Homing {
            target,
            speed,
            turn_rate,
        }))
    }

    pub fn splitting(self, timer: u32) -> Self {
        self.with_motion(Motion::Splitter(Splitter { timer }))
    }

    /// Straight flight with a position trail, tagged as a laser
    pub fn laser(mut self, trail_depth: usize) -> Self {
        self.is_laser = true;
        self.with_motion(Motion::Trailing(Trailing::new(trail_depth)))
    }

    /// Advance one frame
    pub fn step(&mut self, targets: &dyn TargetLookup) -> MotionStep {
        let Self {
            body, vel, motion, ..
        } = self;
        motion.policy().advance(body, vel, targets)
    }

    /// Shards released when a splitter expires: one per offset around the
    /// parent's horizontal heading, each carrying half the parent's damage
    pub fn shards(&self) -> Vec<Projectile> {
        let base = if self.vel.x < 0.0 { PI } else { 0.0 };
        SPLIT_OFFSETS_DEG
            .iter()
            .map(|offset| {
                let vel = heading_velocity(base + offset.to_radians(), SHARD_SPEED);
                let body = Body::new(
                    self.body.x(),
                    self.body.y(),
                    SHARD_SIZE,
                    SHARD_SIZE,
                    Visual::BULLET_SHARD,
                );
                Projectile::new(self.owner, body, vel, self.damage / 2)
            })
            .collect()
    }

    /// Fully outside the window on any side
    pub fn is_out_of_screen(&self, viewport: &Viewport) -> bool {
        self.body.x() > viewport.width
            || self.body.x() < -self.body.w()
            || self.body.y() > viewport.height
            || self.body.y() < -self.body.h()
    }

    /// Trail ghosts, if this projectile keeps a trail
    pub fn trail(&self) -> Option<&Trailing> {
        match &self.motion {
            Motion::Trailing(t) => Some(t),
            _ => None,
        }
    }
}

impl Positioned for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }
}

/// Advance every projectile in a list by one frame.
///
/// Expired splitters are replaced by their shards, and anything that left the
/// window is dropped. Returns the number of splits that happened.
pub fn advance_projectiles(
    projectiles: &mut Vec<Projectile>,
    targets: &dyn TargetLookup,
    viewport: &Viewport,
) -> usize {
    let current = std::mem::take(projectiles);
    let mut next = Vec::with_capacity(current.len());
    let mut splits = 0;

    for mut projectile in current {
        match projectile.step(targets) {
            MotionStep::Flying => next.push(projectile),
            MotionStep::Split => {
                splits += 1;
                next.extend(projectile.shards());
            }
        }
    }

    next.retain(|p| !p.is_out_of_screen(viewport));
    *projectiles = next;
    splits
}
