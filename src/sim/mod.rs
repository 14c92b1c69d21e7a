//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module stays pure and reproducible:
//! - One fixed-order pass per frame
//! - Seeded RNG only
//! - Sim time is passed in, never read from a clock
//! - No rendering, audio or platform dependencies

pub mod boss;
pub mod collision;
pub mod effects;
pub mod entity;
pub mod pickup;
pub mod pipes;
pub mod player;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod weapon;

pub use boss::{Archetype, Boss, BossPhase, BossSignal, BossSpec, BossTable, DamageReport};
pub use collision::{Hitbox, hitboxes_overlap, overlaps};
pub use effects::{EffectDurations, EffectKind, EffectLedger, StatusModifiers};
pub use entity::{Body, BossId, NoTargets, Positioned, TargetLookup, Visual};
pub use pickup::{CoinKind, Pickup, PickupField, PickupKind, PickupSpec};
pub use pipes::{PipeField, PipePair, PipeSpec};
pub use player::{CrashCause, IncomingFire, Player, PlayerMode};
pub use projectile::{Emitter, Motion, Projectile, advance_projectiles};
pub use snapshot::FrameSnapshot;
pub use state::{BattleState, GameMode};
pub use tick::{FrameInput, FrameOutcome, InputEvent, TerminateReason, Transition, tick};
pub use weapon::{Ammo, Weapon, WeaponKind, WeaponSpec, WeaponTable};
