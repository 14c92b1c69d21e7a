//! Drifting power-up capsules and coins, plus their spawners

use std::time::Duration;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Hitbox, hitboxes_overlap};
use super::effects::EffectKind;
use super::entity::{Body, Positioned, Visual};
use crate::Viewport;

pub const CAPSULE_SIZE: f32 = 44.0;
pub const COIN_SIZE: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoinKind {
    Bronze,
    Silver,
    Gold,
}

impl CoinKind {
    pub fn points(&self) -> u32 {
        match self {
            CoinKind::Bronze => 1,
            CoinKind::Silver => 3,
            CoinKind::Gold => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    PowerUp(EffectKind),
    Coin(CoinKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub body: Body,
    pub vel_x: f32,
}

impl Positioned for Pickup {
    fn body(&self) -> &Body {
        &self.body
    }
}

/// Spawn balance for capsules and coins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupSpec {
    /// Sim time between capsule spawn rolls
    pub power_up_interval_ms: u64,
    /// Chance a roll spawns anything
    pub power_up_chance: f64,
    /// Chance a successful roll spawns 2-3 capsules instead of one
    pub multi_chance: f64,
    /// Frames between coin spawns
    pub coin_interval: u32,
    pub max_coins: usize,
    /// Leftward drift in px/frame
    pub drift_speed: f32,
    pub bronze_chance: f64,
    pub silver_chance: f64,
}

impl Default for PickupSpec {
    fn default() -> Self {
        Self {
            power_up_interval_ms: 1500,
            power_up_chance: 0.9,
            multi_chance: 0.4,
            coin_interval: 100,
            max_coins: 15,
            drift_speed: 4.0,
            bronze_chance: 0.6,
            silver_chance: 0.3,
        }
    }
}

/// Everything collectible currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupField {
    pub spec: PickupSpec,
    pub pickups: Vec<Pickup>,
    /// Coins spawn only when enabled
    pub coins_enabled: bool,
    power_up_timer: Duration,
    coin_timer: u32,
}

impl PickupField {
    pub fn new(spec: PickupSpec, coins_enabled: bool) -> Self {
        Self {
            spec,
            pickups: Vec::new(),
            coins_enabled,
            power_up_timer: Duration::ZERO,
            coin_timer: 0,
        }
    }

    pub fn coin_count(&self) -> usize {
        self.pickups
            .iter()
            .filter(|p| matches!(p.kind, PickupKind::Coin(_)))
            .count()
    }

    /// Run the spawners for `dt` of sim time, then drift and cull
    pub fn update(&mut self, dt: Duration, viewport: &Viewport, rng: &mut Pcg32) {
        self.power_up_timer += dt;
        if self.power_up_timer >= Duration::from_millis(self.spec.power_up_interval_ms) {
            self.power_up_timer = Duration::ZERO;
            if rng.random_bool(self.spec.power_up_chance) {
                let count = if rng.random_bool(self.spec.multi_chance) {
                    rng.random_range(2..=3)
                } else {
                    1
                };
                for _ in 0..count {
                    self.spawn_capsule(viewport, rng);
                }
            }
        }

        if self.coins_enabled {
            self.coin_timer += 1;
            if self.coin_timer >= self.spec.coin_interval
                && self.coin_count() < self.spec.max_coins
            {
                self.spawn_coin(viewport, rng);
                self.coin_timer = 0;
            }
        }

        for pickup in &mut self.pickups {
            pickup.body.pos.x += pickup.vel_x;
        }
        self.pickups.retain(|p| p.body.x() >= -p.body.w());
    }

    fn spawn_capsule(&mut self, viewport: &Viewport, rng: &mut Pcg32) {
        let kind = EffectKind::ALL[rng.random_range(0..EffectKind::ALL.len())];
        let min_y = (viewport.height * 0.2) as i32;
        let max_y = (viewport.height * 0.7) as i32;
        let y = rng.random_range(min_y..=max_y) as f32;
        self.pickups.push(Pickup {
            kind: PickupKind::PowerUp(kind),
            body: Body::new(viewport.width + 10.0, y, CAPSULE_SIZE, CAPSULE_SIZE, Visual::CAPSULE),
            vel_x: -self.spec.drift_speed,
        });
        log::trace!("Spawned {} capsule at y={y}", kind.name());
    }

    fn spawn_coin(&mut self, viewport: &Viewport, rng: &mut Pcg32) {
        let roll: f64 = rng.random();
        let kind = if roll < self.spec.bronze_chance {
            CoinKind::Bronze
        } else if roll < self.spec.bronze_chance + self.spec.silver_chance {
            CoinKind::Silver
        } else {
            CoinKind::Gold
        };
        let max_y = ((viewport.height - 100.0) as i32).max(50);
        let y = rng.random_range(50..=max_y) as f32;
        self.pickups.push(Pickup {
            kind: PickupKind::Coin(kind),
            body: Body::new(viewport.width, y, COIN_SIZE, COIN_SIZE, Visual::COIN),
            vel_x: -self.spec.drift_speed,
        });
    }

    /// Remove and return everything the player is touching
    pub fn collect(&mut self, player: &Body, hitbox: Hitbox) -> Vec<PickupKind> {
        let (taken, left): (Vec<Pickup>, Vec<Pickup>) = std::mem::take(&mut self.pickups)
            .into_iter()
            .partition(|p| hitboxes_overlap(player, hitbox, &p.body, Hitbox::Rect));
        self.pickups = left;
        taken.into_iter().map(|p| p.kind).collect()
    }
}
