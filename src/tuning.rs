//! Data-driven game balance
//!
//! Every number the simulation reads for weapons, bosses, effects and spawners
//! lives here. `Tuning::default()` is the shipped balance; a JSON file can
//! override any subset of it.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::boss::{Archetype, BATTLE_START_PREPARATION, BossTable};
use crate::sim::effects::{EffectDurations, EffectKind};
use crate::sim::pickup::PickupSpec;
use crate::sim::pipes::PipeSpec;
use crate::sim::weapon::{WeaponKind, WeaponTable};

/// Length of a Timed round
pub const TIMED_ROUND_SECONDS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuningError {
    Parse(String),
    Io(String),
    Invalid { field: String, reason: String },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "tuning parse error: {msg}"),
            Self::Io(msg) => write!(f, "tuning read error: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning value {field}: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {}

fn invalid(field: impl Into<String>, reason: &str) -> TuningError {
    TuningError::Invalid {
        field: field.into(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub weapons: WeaponTable,
    pub bosses: BossTable,
    pub effects: EffectDurations,
    /// Hits the bird can take; 1 means any unshielded hit is lethal
    pub player_health: u32,
    pub pickups: PickupSpec,
    pub pipes: PipeSpec,
    pub timed_seconds: u64,
    /// Preparation frames of the very first boss
    pub battle_start_preparation: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            weapons: WeaponTable::default(),
            bosses: BossTable::default(),
            effects: EffectDurations::default(),
            player_health: 1,
            pickups: PickupSpec::default(),
            pipes: PipeSpec::default(),
            timed_seconds: TIMED_ROUND_SECONDS,
            battle_start_preparation: BATTLE_START_PREPARATION,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TuningError::Io(format!("{}: {e}", path.display())))?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        for kind in WeaponKind::ALL {
            let spec = self.weapons.get(kind);
            if spec.speed <= 0.0 {
                return Err(invalid(format!("weapons.{kind:?}.speed"), "must be positive"));
            }
            if spec.size[0] <= 0.0 || spec.size[1] <= 0.0 {
                return Err(invalid(format!("weapons.{kind:?}.size"), "must be positive"));
            }
        }

        for archetype in Archetype::ROTATION {
            let spec = self.bosses.get(archetype);
            let name = format!("{archetype:?}").to_lowercase();
            if spec.bullet_rate == 0 {
                return Err(invalid(format!("bosses.{name}.bullet_rate"), "must be at least 1"));
            }
            if spec.speed <= 0.0 {
                return Err(invalid(format!("bosses.{name}.speed"), "must be positive"));
            }
            if spec.size <= 0.0 {
                return Err(invalid(format!("bosses.{name}.size"), "must be positive"));
            }
            if spec.health == 0 {
                return Err(invalid(format!("bosses.{name}.health"), "must be at least 1"));
            }
        }

        for kind in EffectKind::ALL {
            if self.effects.get(kind).is_zero() {
                return Err(invalid(format!("effects.{kind:?}"), "duration must be non-zero"));
            }
        }

        if self.player_health == 0 {
            return Err(invalid("player_health", "must be at least 1"));
        }
        if self.pipes.speed <= 0.0 {
            return Err(invalid("pipes.speed", "must be positive"));
        }
        if self.pipes.gap <= 0.0 {
            return Err(invalid("pipes.gap", "must be positive"));
        }
        if self.pickups.drift_speed < 0.0 {
            return Err(invalid("pickups.drift_speed", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.pickups.power_up_chance)
            || !(0.0..=1.0).contains(&self.pickups.multi_chance)
        {
            return Err(invalid("pickups", "chances must be within 0..=1"));
        }
        if self.timed_seconds == 0 {
            return Err(invalid("timed_seconds", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapon::Ammo;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player_health": 3, "timed_seconds": 90 }"#).unwrap();
        assert_eq!(tuning.player_health, 3);
        assert_eq!(tuning.timed_seconds, 90);
        assert_eq!(tuning.bosses.tank.health, 200);
        assert_eq!(tuning.weapons.homing.ammo, Ammo::Finite(10));
    }

    #[test]
    fn test_zero_bullet_rate_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.bosses.speedy.bullet_rate = 0;
        let err = tuning.validate().unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid { ref field, .. } if field.contains("bullet_rate")
        ));
    }

    #[test]
    fn test_zero_effect_duration_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.effects.invincible_ms = 0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = Tuning::from_json("{ nope").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
        assert!(err.to_string().starts_with("tuning parse error"));
    }

    #[test]
    fn test_missing_file() {
        let err = Tuning::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        assert_eq!(Tuning::from_json(&tuning.to_json()).unwrap(), tuning);
    }
}
