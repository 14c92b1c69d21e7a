//! Positioned bodies shared by every simulated entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle the renderer maps to a sprite or procedural shape.
///
/// The simulation never interprets it beyond carrying it along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Visual(pub u16);

impl Visual {
    pub const NONE: Visual = Visual(0);
    pub const BIRD: Visual = Visual(1);
    pub const BULLET_PLAYER: Visual = Visual(10);
    pub const BULLET_TRIPLE: Visual = Visual(11);
    pub const BULLET_LASER: Visual = Visual(12);
    pub const BULLET_HOMING: Visual = Visual(13);
    pub const BULLET_BOSS: Visual = Visual(20);
    pub const BULLET_BOSS_SPLIT: Visual = Visual(21);
    pub const BULLET_BOSS_HEAVY: Visual = Visual(22);
    pub const BULLET_SHARD: Visual = Visual(23);
    pub const BOSS_NORMAL: Visual = Visual(30);
    pub const BOSS_SPEEDY: Visual = Visual(31);
    pub const BOSS_SPLITTER: Visual = Visual(32);
    pub const BOSS_TANK: Visual = Visual(33);
    pub const CAPSULE: Visual = Visual(40);
    pub const COIN: Visual = Visual(41);
    pub const PIPE_UPPER: Visual = Visual(50);
    pub const PIPE_LOWER: Visual = Visual(51);
}

/// Axis-aligned body: top-left position, size and visual handle.
///
/// Position and size together are the collision rectangle. Anything that
/// scales an entity must rewrite `size` in the same call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub visual: Visual,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32, visual: Visual) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            visual,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn h(&self) -> f32 {
        self.size.y
    }

    /// Center of the collision rectangle
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }
}

/// Stable identity of a boss for the lifetime of one battle.
///
/// Projectiles refer to bosses through this handle, never by reference, so a
/// defeated boss simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BossId(pub u32);

/// Read-only lookup of entity bodies by handle
pub trait TargetLookup {
    /// Snapshot of the target's body, or `None` once it is gone
    fn locate(&self, id: BossId) -> Option<Body>;
}

/// Lookup that never resolves anything
pub struct NoTargets;

impl TargetLookup for NoTargets {
    fn locate(&self, _id: BossId) -> Option<Body> {
        None
    }
}

impl<T: TargetLookup + ?Sized> TargetLookup for &T {
    fn locate(&self, id: BossId) -> Option<Body> {
        (**self).locate(id)
    }
}

impl<T: TargetLookup> TargetLookup for Option<T> {
    fn locate(&self, id: BossId) -> Option<Body> {
        self.as_ref().and_then(|t| t.locate(id))
    }
}

/// Anything with a body
pub trait Positioned {
    fn body(&self) -> &Body;
}

impl Positioned for Body {
    fn body(&self) -> &Body {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_max() {
        let body = Body::new(10.0, 20.0, 30.0, 40.0, Visual::NONE);
        assert_eq!(body.center(), Vec2::new(25.0, 40.0));
        assert_eq!(body.max(), Vec2::new(40.0, 60.0));
    }
}
