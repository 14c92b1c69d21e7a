//! Player weapons: cooldown and ammo gate plus a projectile recipe
//!
//! All four kinds share the same gate. Only the projectiles they build differ,
//! so swapping the selected weapon is just an index change on the player.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, BossId, Visual};
use super::projectile::{Emitter, Projectile};
use crate::heading_velocity;

/// Spread of the triple shot (degrees from horizontal)
pub const TRIPLE_SPREAD_DEG: [f32; 3] = [-15.0, 0.0, 15.0];
/// Laser trail length in frames
pub const LASER_TRAIL_DEPTH: usize = 3;
/// Homing missiles leave the muzzle at this speed before they start steering
pub const HOMING_LAUNCH_SPEED: f32 = 5.0;
/// Fraction of heading error a homing missile corrects per frame
pub const HOMING_TURN_RATE: f32 = 0.15;

/// Weapon kinds in loadout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Normal,
    Triple,
    Laser,
    Homing,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Normal,
        WeaponKind::Triple,
        WeaponKind::Laser,
        WeaponKind::Homing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Normal => "Normal",
            WeaponKind::Triple => "Triple",
            WeaponKind::Laser => "Laser",
            WeaponKind::Homing => "Homing",
        }
    }

    fn visual(&self) -> Visual {
        match self {
            WeaponKind::Normal => Visual::BULLET_PLAYER,
            WeaponKind::Triple => Visual::BULLET_TRIPLE,
            WeaponKind::Laser => Visual::BULLET_LASER,
            WeaponKind::Homing => Visual::BULLET_HOMING,
        }
    }

    /// Presentation color
    fn color(&self) -> [u8; 3] {
        match self {
            WeaponKind::Normal => [255, 255, 0],
            WeaponKind::Triple => [0, 255, 255],
            WeaponKind::Laser => [255, 0, 255],
            WeaponKind::Homing => [255, 128, 0],
        }
    }
}

/// Remaining ammunition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ammo {
    Unlimited,
    Finite(u32),
}

impl Ammo {
    /// HUD counter: `-1` for unlimited
    pub fn counter(&self) -> i32 {
        match self {
            Ammo::Unlimited => -1,
            Ammo::Finite(n) => i32::try_from(*n).unwrap_or(i32::MAX),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Ammo::Finite(0))
    }
}

/// Balance values for one weapon kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    /// Frames between shots
    pub cooldown: u32,
    pub damage: u32,
    /// Ammo on a fresh loadout
    pub ammo: Ammo,
    /// Projectile size (w, h)
    pub size: [f32; 2],
    /// Projectile speed in px/frame
    pub speed: f32,
}

impl WeaponSpec {
    pub fn default_for(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::Normal => Self {
                cooldown: 15,
                damage: 10,
                ammo: Ammo::Unlimited,
                size: [8.0, 8.0],
                speed: 10.0,
            },
            WeaponKind::Triple => Self {
                cooldown: 25,
                damage: 5,
                ammo: Ammo::Finite(30),
                size: [6.0, 6.0],
                speed: 10.0,
            },
            WeaponKind::Laser => Self {
                cooldown: 5,
                damage: 2,
                ammo: Ammo::Finite(100),
                size: [24.0, 7.0],
                speed: 20.0,
            },
            WeaponKind::Homing => Self {
                cooldown: 45,
                damage: 15,
                ammo: Ammo::Finite(10),
                size: [18.0, 18.0],
                speed: 7.0,
            },
        }
    }
}

/// Balance values for the whole loadout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponTable {
    pub normal: WeaponSpec,
    pub triple: WeaponSpec,
    pub laser: WeaponSpec,
    pub homing: WeaponSpec,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            normal: WeaponSpec::default_for(WeaponKind::Normal),
            triple: WeaponSpec::default_for(WeaponKind::Triple),
            laser: WeaponSpec::default_for(WeaponKind::Laser),
            homing: WeaponSpec::default_for(WeaponKind::Homing),
        }
    }
}

impl WeaponTable {
    pub fn get(&self, kind: WeaponKind) -> &WeaponSpec {
        match kind {
            WeaponKind::Normal => &self.normal,
            WeaponKind::Triple => &self.triple,
            WeaponKind::Laser => &self.laser,
            WeaponKind::Homing => &self.homing,
        }
    }

    /// Fresh four-slot loadout in `WeaponKind::ALL` order
    pub fn loadout(&self) -> [Weapon; 4] {
        WeaponKind::ALL.map(|kind| Weapon::with_spec(kind, *self.get(kind)))
    }
}

/// Minimum ammo restored after a boss falls
pub fn succession_ammo_floor(kind: WeaponKind) -> Option<u32> {
    match kind {
        WeaponKind::Normal => None,
        WeaponKind::Triple => Some(15),
        WeaponKind::Laser => Some(50),
        WeaponKind::Homing => Some(5),
    }
}

/// One loadout slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub spec: WeaponSpec,
    pub current_cooldown: u32,
    pub ammo: Ammo,
    pub color: [u8; 3],
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self::with_spec(kind, WeaponSpec::default_for(kind))
    }

    pub fn with_spec(kind: WeaponKind, spec: WeaponSpec) -> Self {
        Self {
            kind,
            spec,
            current_cooldown: 0,
            ammo: spec.ammo,
            color: kind.color(),
        }
    }

    pub fn cooldown(&self) -> u32 {
        self.spec.cooldown
    }

    pub fn damage(&self) -> u32 {
        self.spec.damage
    }

    /// Count the cooldown down by one frame
    pub fn update(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
    }

    pub fn can_fire(&self) -> bool {
        self.current_cooldown == 0 && !self.ammo.is_empty()
    }

    /// Refill to the loadout default
    pub fn restore_ammo(&mut self) {
        self.ammo = self.spec.ammo;
    }

    /// Raise finite ammo to at least `floor`
    pub fn top_up(&mut self, floor: u32) {
        if let Ammo::Finite(n) = self.ammo {
            self.ammo = Ammo::Finite(n.max(floor));
        }
    }

    /// Pull the trigger at the muzzle point `origin`.
    ///
    /// Returns no projectiles while cooling down or out of ammo.
    pub fn fire(&mut self, origin: Vec2, target: Option<BossId>) -> Vec<Projectile> {
        if !self.can_fire() {
            return Vec::new();
        }
        self.current_cooldown = self.spec.cooldown;
        if let Ammo::Finite(n) = self.ammo {
            self.ammo = Ammo::Finite(n.saturating_sub(1));
        }

        let [w, h] = self.spec.size;
        let body = Body::new(origin.x, origin.y - h * 0.5, w, h, self.kind.visual());
        let damage = self.spec.damage;
        let speed = self.spec.speed;

        match self.kind {
            WeaponKind::Normal => vec![Projectile::new(
                Emitter::Player,
                body,
                Vec2::new(speed, 0.0),
                damage,
            )],
            WeaponKind::Triple => TRIPLE_SPREAD_DEG
                .iter()
                .map(|deg| {
                    let vel = heading_velocity(deg.to_radians(), speed);
                    Projectile::new(Emitter::Player, body, vel, damage)
                })
                .collect(),
            WeaponKind::Laser => vec![
                Projectile::new(Emitter::Player, body, Vec2::new(speed, 0.0), damage)
                    .laser(LASER_TRAIL_DEPTH),
            ],
            WeaponKind::Homing => vec![
                Projectile::new(
                    Emitter::Player,
                    body,
                    Vec2::new(HOMING_LAUNCH_SPEED, 0.0),
                    damage,
                )
                .homing(target, speed, HOMING_TURN_RATE),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::projectile::Motion;
    use proptest::prelude::*;

    #[test]
    fn test_normal_is_unlimited() {
        let mut w = Weapon::new(WeaponKind::Normal);
        assert_eq!(w.ammo.counter(), -1);
        for _ in 0..200 {
            while !w.can_fire() {
                w.update();
            }
            assert_eq!(w.fire(Vec2::ZERO, None).len(), 1);
        }
        assert!(matches!(w.ammo, Ammo::Unlimited));
    }

    #[test]
    fn test_fire_on_cooldown_is_empty() {
        let mut w = Weapon::new(WeaponKind::Normal);
        assert_eq!(w.fire(Vec2::new(50.0, 100.0), None).len(), 1);
        assert!(w.fire(Vec2::new(50.0, 100.0), None).is_empty());
        assert_eq!(w.current_cooldown, 15);
    }

    #[test]
    fn test_triple_spread() {
        let mut w = Weapon::new(WeaponKind::Triple);
        let shots = w.fire(Vec2::new(80.0, 200.0), None);
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|p| p.damage == 5));
        assert!(shots[0].vel.y < 0.0 && shots[1].vel.y == 0.0 && shots[2].vel.y > 0.0);
        assert!(shots.iter().all(|p| (p.vel.length() - 10.0).abs() < 1e-4));
        assert_eq!(w.ammo, Ammo::Finite(29));
    }

    #[test]
    fn test_laser_is_tagged_and_trailing() {
        let mut w = Weapon::new(WeaponKind::Laser);
        let shots = w.fire(Vec2::new(80.0, 200.0), None);
        assert_eq!(shots.len(), 1);
        assert!(shots[0].is_laser);
        assert_eq!(shots[0].vel, Vec2::new(20.0, 0.0));
        assert!(matches!(&shots[0].motion, Motion::Trailing(t) if t.depth == 3));
        // Muzzle point is the vertical center of the beam
        assert_eq!(shots[0].body.center().y, 200.0);
    }

    #[test]
    fn test_homing_binds_target() {
        let mut w = Weapon::new(WeaponKind::Homing);
        let shots = w.fire(Vec2::ZERO, Some(BossId(3)));
        match &shots[0].motion {
            Motion::Homing(h) => {
                assert_eq!(h.target, Some(BossId(3)));
                assert_eq!(h.speed, 7.0);
                assert_eq!(h.turn_rate, 0.15);
            }
            other => panic!("unexpected motion {other:?}"),
        }
    }

    #[test]
    fn test_top_up_never_lowers() {
        let mut w = Weapon::new(WeaponKind::Laser);
        w.ammo = Ammo::Finite(10);
        w.top_up(50);
        assert_eq!(w.ammo, Ammo::Finite(50));
        w.ammo = Ammo::Finite(80);
        w.top_up(50);
        assert_eq!(w.ammo, Ammo::Finite(80));

        let mut n = Weapon::new(WeaponKind::Normal);
        n.top_up(50);
        assert_eq!(n.ammo, Ammo::Unlimited);
    }

    fn kind() -> impl Strategy<Value = WeaponKind> {
        prop_oneof![
            Just(WeaponKind::Normal),
            Just(WeaponKind::Triple),
            Just(WeaponKind::Laser),
            Just(WeaponKind::Homing),
        ]
    }

    proptest! {
        #[test]
        fn prop_rearms_after_exactly_cooldown_updates(k in kind()) {
            let mut w = Weapon::new(k);
            prop_assert!(!w.fire(Vec2::ZERO, None).is_empty());
            for _ in 0..w.cooldown() {
                prop_assert!(!w.can_fire());
                w.update();
            }
            prop_assert!(w.can_fire());
        }

        #[test]
        fn prop_ammo_exhausts_without_underflow(k in kind(), extra in 0u32..20) {
            let mut w = Weapon::new(k);
            let Ammo::Finite(start) = w.ammo else {
                return Ok(());
            };
            for _ in 0..start {
                w.current_cooldown = 0;
                prop_assert!(!w.fire(Vec2::ZERO, None).is_empty());
            }
            for _ in 0..extra {
                w.current_cooldown = 0;
                prop_assert!(!w.can_fire());
                prop_assert!(w.fire(Vec2::ZERO, None).is_empty());
            }
            prop_assert_eq!(w.ammo, Ammo::Finite(0));
            prop_assert_eq!(w.ammo.counter(), 0);
        }
    }
}
