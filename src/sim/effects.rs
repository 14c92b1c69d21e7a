//! Timed power-up effects
//!
//! The ledger stores one absolute expiry per effect kind. Re-acquiring an
//! effect overwrites its expiry; it never stacks.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Power-up effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    SpeedBoost,
    Invincible,
    SlowMotion,
    SmallSize,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::SpeedBoost,
        EffectKind::Invincible,
        EffectKind::SlowMotion,
        EffectKind::SmallSize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::SpeedBoost => "Speed Boost",
            EffectKind::Invincible => "Invincible",
            EffectKind::SlowMotion => "Slow Motion",
            EffectKind::SmallSize => "Small Size",
        }
    }

    /// Effect that cannot be active at the same time as this one
    fn excludes(&self) -> Option<EffectKind> {
        match self {
            EffectKind::SpeedBoost => Some(EffectKind::SlowMotion),
            EffectKind::SlowMotion => Some(EffectKind::SpeedBoost),
            _ => None,
        }
    }
}

/// How long each effect lasts once picked up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectDurations {
    pub speed_boost_ms: u64,
    pub invincible_ms: u64,
    pub slow_motion_ms: u64,
    pub small_size_ms: u64,
}

impl Default for EffectDurations {
    fn default() -> Self {
        Self {
            speed_boost_ms: 8_000,
            invincible_ms: 10_000,
            slow_motion_ms: 8_000,
            small_size_ms: 8_000,
        }
    }
}

impl EffectDurations {
    pub fn get(&self, kind: EffectKind) -> Duration {
        let ms = match kind {
            EffectKind::SpeedBoost => self.speed_boost_ms,
            EffectKind::Invincible => self.invincible_ms,
            EffectKind::SlowMotion => self.slow_motion_ms,
            EffectKind::SmallSize => self.small_size_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Active effects keyed by kind, each with its absolute expiry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectLedger {
    durations: EffectDurations,
    active: BTreeMap<EffectKind, Duration>,
}

impl EffectLedger {
    pub fn new(durations: EffectDurations) -> Self {
        Self {
            durations,
            active: BTreeMap::new(),
        }
    }

    /// Start (or restart) an effect at sim time `now`.
    ///
    /// SpeedBoost and SlowMotion cancel each other.
    pub fn activate(&mut self, kind: EffectKind, now: Duration) {
        if let Some(other) = kind.excludes() {
            self.active.remove(&other);
        }
        let expiry = now + self.durations.get(kind);
        self.active.insert(kind, expiry);
        log::debug!("Effect {} active until {:?}", kind.name(), expiry);
    }

    /// Drop every effect whose expiry is not after `now`
    pub fn tick(&mut self, now: Duration) {
        self.active.retain(|kind, expiry| {
            let keep = *expiry > now;
            if !keep {
                log::debug!("Effect {} expired", kind.name());
            }
            keep
        });
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Time left on `kind`, or `None` if inactive
    pub fn remaining(&self, kind: EffectKind, now: Duration) -> Option<Duration> {
        self.active
            .get(&kind)
            .map(|expiry| expiry.saturating_sub(now))
    }

    /// Active effects in stable order
    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, Duration)> + '_ {
        self.active.iter().map(|(k, e)| (*k, *e))
    }
}

pub const SPEED_BOOST_FACTOR: f32 = 1.5;
pub const SLOW_MOTION_FACTOR: f32 = 0.5;
pub const SMALL_SIZE_FACTOR: f32 = 0.6;

/// Player modifiers derived from the ledger. Each effect owns one slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusModifiers {
    pub speed: f32,
    pub invincible: bool,
    pub size: f32,
}

impl Default for StatusModifiers {
    fn default() -> Self {
        Self {
            speed: 1.0,
            invincible: false,
            size: 1.0,
        }
    }
}

impl StatusModifiers {
    /// Recompute from scratch; nothing carries over from the last frame
    pub fn from_ledger(ledger: &EffectLedger) -> Self {
        let mut mods = Self::default();
        for (kind, _) in ledger.iter() {
            match kind {
                EffectKind::SpeedBoost => mods.speed = SPEED_BOOST_FACTOR,
                EffectKind::SlowMotion => mods.speed = SLOW_MOTION_FACTOR,
                EffectKind::Invincible => mods.invincible = true,
                EffectKind::SmallSize => mods.size = SMALL_SIZE_FACTOR,
            }
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_reactivation_resets_expiry() {
        let mut ledger = EffectLedger::default();
        ledger.activate(EffectKind::SpeedBoost, secs(0));
        ledger.activate(EffectKind::SpeedBoost, secs(3));
        assert_eq!(
            ledger.remaining(EffectKind::SpeedBoost, secs(3)),
            Some(secs(8))
        );
    }

    #[test]
    fn test_tick_purges_expired() {
        let mut ledger = EffectLedger::default();
        ledger.activate(EffectKind::Invincible, secs(0));
        ledger.activate(EffectKind::SmallSize, secs(0));
        ledger.tick(secs(8));
        assert!(!ledger.has_effect(EffectKind::SmallSize));
        assert!(ledger.has_effect(EffectKind::Invincible));
        ledger.tick(secs(10));
        assert!(!ledger.has_effect(EffectKind::Invincible));
        assert_eq!(ledger.remaining(EffectKind::Invincible, secs(10)), None);
    }

    #[test]
    fn test_speed_effects_exclusive() {
        let mut ledger = EffectLedger::default();
        ledger.activate(EffectKind::SpeedBoost, secs(0));
        ledger.activate(EffectKind::SlowMotion, secs(1));
        assert!(!ledger.has_effect(EffectKind::SpeedBoost));
        assert_eq!(StatusModifiers::from_ledger(&ledger).speed, 0.5);
    }

    #[test]
    fn test_modifiers_use_disjoint_slots() {
        let mut ledger = EffectLedger::default();
        for kind in [
            EffectKind::SpeedBoost,
            EffectKind::Invincible,
            EffectKind::SmallSize,
        ] {
            ledger.activate(kind, secs(0));
        }
        let mods = StatusModifiers::from_ledger(&ledger);
        assert_eq!(mods.speed, 1.5);
        assert!(mods.invincible);
        assert_eq!(mods.size, 0.6);

        ledger.tick(secs(60));
        assert_eq!(StatusModifiers::from_ledger(&ledger), StatusModifiers::default());
    }

    fn effect() -> impl Strategy<Value = EffectKind> {
        prop_oneof![
            Just(EffectKind::SpeedBoost),
            Just(EffectKind::Invincible),
            Just(EffectKind::SlowMotion),
            Just(EffectKind::SmallSize),
        ]
    }

    proptest! {
        #[test]
        fn prop_expiry_never_exceeds_last_activation(
            kind in effect(),
            times in prop::collection::vec(0u64..60_000, 1..10),
        ) {
            let mut times = times;
            times.sort_unstable();
            let mut ledger = EffectLedger::default();
            for t in &times {
                ledger.activate(kind, Duration::from_millis(*t));
            }
            let last = Duration::from_millis(*times.last().unwrap_or(&0));
            prop_assert_eq!(
                ledger.remaining(kind, last),
                Some(EffectDurations::default().get(kind))
            );
        }
    }
}
