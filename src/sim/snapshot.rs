//! Read-only per-frame view of a battle for renderers and tooling

use serde::{Deserialize, Serialize};

use super::boss::{Archetype, Boss, BossPhase};
use super::effects::EffectKind;
use super::entity::Body;
use super::pickup::PickupKind;
use super::player::{Player, PlayerMode};
use super::projectile::{Emitter, Projectile};
use super::state::{BattleState, GameMode};
use super::weapon::{Weapon, WeaponKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub visual: u16,
}

impl From<&Body> for EntitySnapshot {
    fn from(body: &Body) -> Self {
        Self {
            x: body.x(),
            y: body.y(),
            w: body.w(),
            h: body.h(),
            visual: body.visual.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(flatten)]
    pub entity: EntitySnapshot,
    pub mode: PlayerMode,
    pub rotation: f32,
    pub health: u32,
    pub max_health: u32,
    pub invincible: bool,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            entity: (&player.body).into(),
            mode: player.mode,
            rotation: player.rot,
            health: player.health,
            max_health: player.max_health,
            invincible: player.modifiers.invincible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSnapshot {
    pub kind: WeaponKind,
    /// -1 for unlimited
    pub ammo: i32,
    pub cooldown_remaining: u32,
    pub cooldown: u32,
    pub color: [u8; 3],
    pub selected: bool,
}

impl WeaponSnapshot {
    fn new(weapon: &Weapon, selected: bool) -> Self {
        Self {
            kind: weapon.kind,
            ammo: weapon.ammo.counter(),
            cooldown_remaining: weapon.current_cooldown,
            cooldown: weapon.cooldown(),
            color: weapon.color,
            selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossSnapshot {
    #[serde(flatten)]
    pub entity: EntitySnapshot,
    pub archetype: Archetype,
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub phase: BossPhase,
    /// 1.0 on arrival, 0.0 once ready
    pub preparation: f32,
    pub level: u32,
    pub hit_flash: u32,
}

impl From<&Boss> for BossSnapshot {
    fn from(boss: &Boss) -> Self {
        Self {
            entity: (&boss.body).into(),
            archetype: boss.archetype,
            name: boss.archetype.name().to_string(),
            health: boss.health,
            max_health: boss.max_health,
            phase: boss.phase,
            preparation: boss.preparation_progress(),
            level: boss.level,
            hit_flash: boss.hit_flash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostSnapshot {
    pub x: f32,
    pub y: f32,
    pub alpha: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    #[serde(flatten)]
    pub entity: EntitySnapshot,
    pub owner: Emitter,
    pub is_laser: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub trail: Vec<GhostSnapshot>,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        let trail = p
            .trail()
            .map(|t| {
                t.ghosts()
                    .map(|(pos, alpha)| GhostSnapshot {
                        x: pos.x,
                        y: pos.y,
                        alpha,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            entity: (&p.body).into(),
            owner: p.owner,
            is_laser: p.is_laser,
            trail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSnapshot {
    #[serde(flatten)]
    pub entity: EntitySnapshot,
    pub kind: PickupKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub kind: EffectKind,
    pub remaining_ms: u64,
}

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub time_ms: u64,
    pub mode: GameMode,
    pub score: u32,
    pub coins: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timer_remaining_ms: Option<u64>,
    pub player: PlayerSnapshot,
    pub weapons: Vec<WeaponSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub boss: Option<BossSnapshot>,
    /// Player projectiles first, then the boss's
    pub projectiles: Vec<ProjectileSnapshot>,
    pub pickups: Vec<PickupSnapshot>,
    pub pipes: Vec<EntitySnapshot>,
    pub effects: Vec<EffectSnapshot>,
}

impl FrameSnapshot {
    pub fn capture(state: &BattleState) -> Self {
        let player = &state.player;
        let boss_projectiles = state.boss.iter().flat_map(|b| b.projectiles.iter());

        Self {
            frame: state.frame,
            time_ms: state.time.as_millis() as u64,
            mode: state.mode,
            score: state.score,
            coins: state.coins,
            timer_remaining_ms: state.timer_remaining.map(|t| t.as_millis() as u64),
            player: player.into(),
            weapons: if state.mode == GameMode::Boss {
                player
                    .weapons
                    .iter()
                    .enumerate()
                    .map(|(i, w)| WeaponSnapshot::new(w, i == player.selected))
                    .collect()
            } else {
                Vec::new()
            },
            boss: state.boss.as_ref().map(BossSnapshot::from),
            projectiles: player
                .projectiles
                .iter()
                .chain(boss_projectiles)
                .map(ProjectileSnapshot::from)
                .collect(),
            pickups: state
                .pickups
                .pickups
                .iter()
                .map(|p| PickupSnapshot {
                    entity: (&p.body).into(),
                    kind: p.kind,
                })
                .collect(),
            pipes: state
                .pipes
                .iter()
                .flat_map(|field| field.bodies())
                .map(EntitySnapshot::from)
                .collect(),
            effects: state
                .ledger
                .iter()
                .map(|(kind, expiry)| EffectSnapshot {
                    kind,
                    remaining_ms: expiry.saturating_sub(state.time).as_millis() as u64,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
