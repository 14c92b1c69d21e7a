//! Player controller
//!
//! The bird runs one of five motion modes plus the terminal Crashed mode.
//! Entering a mode loads that mode's motion preset; status modifiers from the
//! effect ledger are overwritten every frame and never accumulate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::collision::{Hitbox, hitboxes_overlap};
use super::effects::StatusModifiers;
use super::entity::{Body, BossId, Positioned, TargetLookup, Visual};
use super::pipes::PipePair;
use super::projectile::{Projectile, advance_projectiles};
use super::weapon::{Weapon, WeaponTable, succession_ammo_floor};
use crate::Viewport;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH, PLAYER_X_FRACTION};

/// Rotation right after a flap (degrees)
pub const FLAP_ROTATION: f32 = 80.0;
/// Frames per half bob in Shm mode
pub const SHM_HALF_PERIOD: u32 = 14;
/// How far above the window the bird may rise
pub const CEILING_SLACK: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    /// Idle bob before the run starts
    Shm,
    Normal,
    /// Gravity points up
    Reverse,
    /// Normal gravity plus weapons
    Boss,
    /// Falling after a crash
    Crash,
    /// On the floor; nothing changes any more
    Crashed,
}

/// What the bird crashed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashCause {
    Floor,
    Pipe,
    Projectile,
}

impl CrashCause {
    pub fn name(&self) -> &'static str {
        match self {
            CrashCause::Floor => "floor",
            CrashCause::Pipe => "pipe",
            CrashCause::Projectile => "projectile",
        }
    }
}

/// Per-mode motion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionPreset {
    pub max_vel: f32,
    pub min_vel: f32,
    pub acc: f32,
    pub vel_rot: f32,
    pub rot_min: f32,
    pub rot_max: f32,
    pub flap_impulse: f32,
}

impl MotionPreset {
    /// Preset for a mode plus its starting velocity and rotation.
    ///
    /// Crash and Crashed have no full preset; see [`Player::set_mode`].
    pub fn for_mode(mode: PlayerMode) -> Option<(Self, f32, f32)> {
        let (vel, rot, preset) = match mode {
            PlayerMode::Shm => (1.0, 0.0, SHM_PRESET),
            PlayerMode::Normal => (-9.0, 60.0, Self {
                max_vel: 10.0,
                min_vel: -8.0,
                acc: 1.0,
                vel_rot: -3.0,
                rot_min: -90.0,
                rot_max: 20.0,
                flap_impulse: -9.0,
            }),
            PlayerMode::Reverse => (9.0, -60.0, Self {
                max_vel: 8.0,
                min_vel: -10.0,
                acc: -1.0,
                vel_rot: 3.0,
                rot_min: -20.0,
                rot_max: 90.0,
                flap_impulse: 9.0,
            }),
            PlayerMode::Boss => (-6.0, 60.0, Self {
                max_vel: 8.0,
                min_vel: -6.0,
                acc: 0.8,
                vel_rot: -2.0,
                rot_min: -60.0,
                rot_max: 15.0,
                flap_impulse: -7.0,
            }),
            PlayerMode::Crash | PlayerMode::Crashed => return None,
        };
        Some((preset, vel, rot))
    }
}

const SHM_PRESET: MotionPreset = MotionPreset {
    max_vel: 4.0,
    min_vel: -4.0,
    acc: 0.5,
    vel_rot: 0.0,
    rot_min: 0.0,
    rot_max: 0.0,
    flap_impulse: 0.0,
};

/// Crash fall overrides (the rest of the preset is kept)
const CRASH_VEL: f32 = 7.0;
const CRASH_MAX_VEL: f32 = 15.0;
const CRASH_ACC: f32 = 2.0;
const CRASH_VEL_ROT: f32 = -8.0;

/// Result of checking the bird against boss projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomingFire {
    Clean,
    /// Invincible: this many projectiles bounced off
    Deflected(usize),
    Hit { damage: u32 },
}

/// Read-only inputs for a player update
pub struct PlayerContext<'a> {
    pub viewport: &'a Viewport,
    /// Resolves homing targets
    pub targets: &'a dyn TargetLookup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub mode: PlayerMode,
    pub body: Body,
    /// Size before the size modifier
    pub base_size: Vec2,
    pub hitbox: Hitbox,
    pub vel_y: f32,
    pub rot: f32,
    pub preset: MotionPreset,
    /// Flap happened since the last update
    pub flapped: bool,
    /// Shm bob phase
    pub loop_iter: u32,
    pub weapons: [Weapon; 4],
    pub selected: usize,
    pub projectiles: Vec<Projectile>,
    pub modifiers: StatusModifiers,
    pub health: u32,
    pub max_health: u32,
    pub crash_cause: Option<CrashCause>,
    /// Boss that homing shots lock onto
    pub boss_target: Option<BossId>,
}

impl Player {
    pub fn new(weapons: &WeaponTable, health: u32, viewport: &Viewport) -> Self {
        let x = (viewport.width * PLAYER_X_FRACTION).floor();
        let y = ((viewport.height - PLAYER_HEIGHT) / 2.0).floor();
        Self {
            mode: PlayerMode::Shm,
            body: Body::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT, Visual::BIRD),
            base_size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            hitbox: Hitbox::Ellipse,
            vel_y: 1.0,
            rot: 0.0,
            preset: SHM_PRESET,
            flapped: false,
            loop_iter: 0,
            weapons: weapons.loadout(),
            selected: 0,
            projectiles: Vec::new(),
            modifiers: StatusModifiers::default(),
            health,
            max_health: health,
            crash_cause: None,
            boss_target: None,
        }
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapons[self.selected]
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn is_crashing(&self) -> bool {
        matches!(self.mode, PlayerMode::Crash | PlayerMode::Crashed)
    }

    /// Switch motion mode, loading its preset. Ignored once Crashed.
    pub fn set_mode(&mut self, mode: PlayerMode) {
        if mode == self.mode || self.mode == PlayerMode::Crashed {
            return;
        }
        log::debug!("Player mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.flapped = false;

        match mode {
            PlayerMode::Crash => {
                self.vel_y = CRASH_VEL;
                self.preset.max_vel = CRASH_MAX_VEL;
                self.preset.acc = CRASH_ACC;
                self.preset.vel_rot = CRASH_VEL_ROT;
            }
            PlayerMode::Crashed => {}
            _ => {
                if let Some((preset, vel_y, rot)) = MotionPreset::for_mode(mode) {
                    self.preset = preset;
                    self.vel_y = vel_y;
                    self.rot = rot;
                }
                if mode == PlayerMode::Boss {
                    self.projectiles.clear();
                    for weapon in &mut self.weapons {
                        weapon.restore_ammo();
                        weapon.current_cooldown = 0;
                    }
                }
            }
        }
    }

    pub fn flap(&mut self) {
        if self.is_crashing() {
            return;
        }
        self.vel_y = self.preset.flap_impulse;
        self.flapped = true;
        match self.mode {
            PlayerMode::Normal | PlayerMode::Boss => self.rot = FLAP_ROTATION,
            PlayerMode::Reverse => self.rot = -FLAP_ROTATION,
            _ => {}
        }
    }

    /// Overwrite the status modifiers and resize the body to match
    pub fn apply_modifiers(&mut self, modifiers: StatusModifiers) {
        self.modifiers = modifiers;
        let size = self.base_size * modifiers.size;
        if size != self.body.size {
            // Keep the bird's center where it was
            let center = self.body.center();
            self.body.size = size;
            self.body.pos = center - size * 0.5;
        }
    }

    fn clamp_y(&mut self, viewport: &Viewport) {
        let min_y = -self.body.h() - CEILING_SLACK;
        let max_y = viewport.height - 1.0;
        self.body.pos.y = self.body.pos.y.clamp(min_y, max_y);
    }

    fn rotate(&mut self) {
        self.rot = (self.rot + self.preset.vel_rot).clamp(self.preset.rot_min, self.preset.rot_max);
    }

    /// Gravity step shared by Normal, Reverse and Boss
    fn fly(&mut self, viewport: &Viewport) {
        if self.flapped {
            self.flapped = false;
        } else {
            self.vel_y =
                (self.vel_y + self.preset.acc).clamp(self.preset.min_vel, self.preset.max_vel);
        }
        self.body.pos.y += self.vel_y * self.modifiers.speed;
        self.clamp_y(viewport);
        self.rotate();
    }

    fn bob(&mut self) {
        self.loop_iter = (self.loop_iter + 1) % (SHM_HALF_PERIOD * 2);
        if self.loop_iter % SHM_HALF_PERIOD == 0 {
            self.vel_y = -self.vel_y;
        }
        self.body.pos.y += self.vel_y;
    }

    fn fall(&mut self, viewport: &Viewport) {
        let min_y = -self.body.h() - CEILING_SLACK;
        let max_y = viewport.height - 1.0;
        if (min_y..=max_y).contains(&self.body.y()) {
            self.body.pos.y = (self.body.y() + self.vel_y).clamp(min_y, max_y);
            if self.crash_cause != Some(CrashCause::Floor) {
                self.rotate();
            }
        }
        self.vel_y = (self.vel_y + self.preset.acc).min(self.preset.max_vel);

        if self.body.y() + self.body.h() >= viewport.floor_y - 1.0 {
            self.body.pos.y = viewport.floor_y - self.body.h();
            self.mode = PlayerMode::Crashed;
            log::debug!("Player came to rest on the floor");
        }
    }

    /// Advance one frame
    pub fn update(&mut self, ctx: &PlayerContext) {
        match self.mode {
            PlayerMode::Shm => self.bob(),
            PlayerMode::Normal | PlayerMode::Reverse => self.fly(ctx.viewport),
            PlayerMode::Boss => {
                self.fly(ctx.viewport);
                for weapon in &mut self.weapons {
                    weapon.update();
                }
                advance_projectiles(&mut self.projectiles, ctx.targets, ctx.viewport);
            }
            PlayerMode::Crash => self.fall(ctx.viewport),
            PlayerMode::Crashed => {}
        }
    }

    /// Fire the selected weapon. Returns how many projectiles left the muzzle.
    pub fn shoot(&mut self) -> usize {
        if self.mode != PlayerMode::Boss {
            return 0;
        }
        let muzzle = Vec2::new(self.body.max().x, self.body.center().y);
        let shots = self.weapons[self.selected].fire(muzzle, self.boss_target);
        let fired = shots.len();
        self.projectiles.extend(shots);
        fired
    }

    /// Cycle the selection by `direction` slots, wrapping around
    pub fn switch_weapon(&mut self, direction: i32) {
        let len = self.weapons.len() as i32;
        self.selected = (self.selected as i32 + direction).rem_euclid(len) as usize;
        log::debug!("Selected weapon {}", self.weapon().kind.name());
    }

    /// Select a slot directly; out-of-range indices are ignored
    pub fn select_weapon(&mut self, index: usize) {
        if index < self.weapons.len() {
            self.selected = index;
            log::debug!("Selected weapon {}", self.weapon().kind.name());
        }
    }

    /// Refill finite ammo to the post-succession floors
    pub fn top_up_weapons(&mut self) {
        for weapon in &mut self.weapons {
            if let Some(floor) = succession_ammo_floor(weapon.kind) {
                weapon.top_up(floor);
            }
        }
    }

    /// Did the bird hit the floor, the ceiling or a pipe? Never while invincible.
    pub fn collided(&mut self, pipes: &[PipePair], floor_y: f32) -> bool {
        if self.modifiers.invincible {
            return false;
        }
        if self.body.y() + self.body.h() >= floor_y - 1.0 || self.body.y() < 0.0 {
            self.crash_cause = Some(CrashCause::Floor);
            return true;
        }
        let hit_pipe = pipes
            .iter()
            .flat_map(|p| p.bodies())
            .any(|pipe| hitboxes_overlap(&self.body, self.hitbox, pipe, Hitbox::Rect));
        if hit_pipe {
            self.crash_cause = Some(CrashCause::Pipe);
        }
        hit_pipe
    }

    /// Consume every boss projectile touching the bird.
    ///
    /// Invincibility turns hits into deflections; otherwise each projectile
    /// costs at least one point of health.
    pub fn resolve_boss_fire(&mut self, incoming: &mut Vec<Projectile>) -> IncomingFire {
        let (touching, missed): (Vec<Projectile>, Vec<Projectile>) = std::mem::take(incoming)
            .into_iter()
            .partition(|p| hitboxes_overlap(&self.body, self.hitbox, &p.body, Hitbox::Rect));
        *incoming = missed;

        if touching.is_empty() {
            return IncomingFire::Clean;
        }
        if self.modifiers.invincible {
            return IncomingFire::Deflected(touching.len());
        }

        let damage: u32 = touching.iter().map(|p| p.damage.max(1)).sum();
        self.health = self.health.saturating_sub(damage);
        if self.is_dead() {
            self.crash_cause = Some(CrashCause::Projectile);
        }
        IncomingFire::Hit { damage }
    }

    /// Apply own projectiles touching the boss. Returns hits landed.
    ///
    /// A preparing boss lets shots pass through.
    pub fn resolve_hits_on(&mut self, boss: &mut Boss) -> u32 {
        if boss.is_preparing() {
            return 0;
        }
        let mut hits = 0;
        let current = std::mem::take(&mut self.projectiles);
        for projectile in current {
            if !boss.is_defeated()
                && hitboxes_overlap(&projectile.body, Hitbox::Rect, &boss.body, Hitbox::Rect)
            {
                boss.take_damage(projectile.damage);
                hits += 1;
            } else {
                self.projectiles.push(projectile);
            }
        }
        hits
    }

    /// Put the bird back in the middle of the window, at rest
    pub fn recentre(&mut self, viewport: &Viewport) {
        self.body.pos.y = (viewport.height / 2.0 - self.body.h() / 2.0).floor();
        self.vel_y = 0.0;
    }
}

impl Positioned for Player {
    fn body(&self) -> &Body {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::{Archetype, BossSpec};
    use crate::sim::entity::NoTargets;
    use crate::sim::projectile::Emitter;
    use crate::sim::weapon::{Ammo, WeaponKind};

    fn player() -> Player {
        Player::new(&WeaponTable::default(), 1, &Viewport::default())
    }

    fn step(p: &mut Player, frames: u32) {
        let viewport = Viewport::default();
        let ctx = PlayerContext {
            viewport: &viewport,
            targets: &NoTargets,
        };
        for _ in 0..frames {
            p.update(&ctx);
        }
    }

    fn boss_bullet_at(body: &Body) -> Projectile {
        let c = body.center();
        Projectile::new(
            Emitter::Boss(BossId(1)),
            Body::new(c.x - 4.0, c.y - 2.0, 8.0, 4.0, Visual::BULLET_BOSS),
            Vec2::new(-8.0, 0.0),
            1,
        )
    }

    #[test]
    fn test_spawn_position() {
        let p = player();
        assert_eq!(p.body.pos, Vec2::new(70.0, 288.0));
        assert_eq!(p.mode, PlayerMode::Shm);
    }

    #[test]
    fn test_mode_presets() {
        let mut p = player();
        p.set_mode(PlayerMode::Reverse);
        assert_eq!((p.vel_y, p.rot), (9.0, -60.0));
        assert_eq!(p.preset.acc, -1.0);
        p.set_mode(PlayerMode::Boss);
        assert_eq!((p.vel_y, p.preset.flap_impulse), (-6.0, -7.0));
    }

    #[test]
    fn test_same_mode_is_noop() {
        let mut p = player();
        p.set_mode(PlayerMode::Normal);
        p.vel_y = 3.0;
        p.set_mode(PlayerMode::Normal);
        assert_eq!(p.vel_y, 3.0);
    }

    #[test]
    fn test_crashed_is_terminal() {
        let mut p = player();
        p.set_mode(PlayerMode::Normal);
        p.set_mode(PlayerMode::Crash);
        assert_eq!(p.vel_y, 7.0);
        p.flap();
        assert_eq!(p.vel_y, 7.0);

        step(&mut p, 200);
        assert_eq!(p.mode, PlayerMode::Crashed);
        assert_eq!(p.body.max().y, 480.0);

        p.set_mode(PlayerMode::Normal);
        assert_eq!(p.mode, PlayerMode::Crashed);
        p.flap();
        assert!(!p.flapped);
    }

    #[test]
    fn test_flap_skips_gravity_once() {
        let mut p = player();
        p.set_mode(PlayerMode::Normal);
        p.flap();
        assert_eq!(p.rot, 80.0);
        let y0 = p.body.y();
        step(&mut p, 1);
        assert_eq!(p.body.y(), y0 - 9.0);
        assert_eq!(p.rot, 20.0);
        step(&mut p, 1);
        assert_eq!(p.vel_y, -8.0);
    }

    #[test]
    fn test_velocity_clamped_and_speed_scales_displacement() {
        let mut p = player();
        p.set_mode(PlayerMode::Normal);
        p.apply_modifiers(StatusModifiers {
            speed: 0.5,
            ..StatusModifiers::default()
        });
        p.body.pos.y = 100.0;
        p.vel_y = 9.5;
        step(&mut p, 1);
        assert_eq!(p.vel_y, 10.0);
        assert_eq!(p.body.y(), 105.0);
    }

    #[test]
    fn test_reverse_flap_pushes_down() {
        let mut p = player();
        p.set_mode(PlayerMode::Reverse);
        p.flap();
        assert_eq!((p.vel_y, p.rot), (9.0, -80.0));
    }

    #[test]
    fn test_shm_bobs() {
        let mut p = player();
        let y0 = p.body.y();
        step(&mut p, 13);
        assert_eq!(p.body.y(), y0 + 13.0);
        step(&mut p, 1);
        assert_eq!(p.body.y(), y0 + 12.0);
        step(&mut p, 14);
        assert_eq!(p.body.y(), y0);
    }

    #[test]
    fn test_small_size_rewrites_body() {
        let mut p = player();
        let center = p.body.center();
        p.apply_modifiers(StatusModifiers {
            size: 0.6,
            ..StatusModifiers::default()
        });
        assert!((p.body.w() - 20.4).abs() < 1e-4);
        assert!((p.body.h() - 14.4).abs() < 1e-4);
        assert!((p.body.center() - center).length() < 1e-4);
        p.apply_modifiers(StatusModifiers::default());
        assert_eq!(p.body.size, Vec2::new(34.0, 24.0));
    }

    #[test]
    fn test_switch_wraps_and_select_ignores_out_of_range() {
        let mut p = player();
        p.switch_weapon(-1);
        assert_eq!(p.weapon().kind, WeaponKind::Homing);
        p.switch_weapon(1);
        assert_eq!(p.weapon().kind, WeaponKind::Normal);
        p.select_weapon(2);
        assert_eq!(p.weapon().kind, WeaponKind::Laser);
        p.select_weapon(9);
        assert_eq!(p.selected, 2);
    }

    #[test]
    fn test_boss_entry_restores_ammo() {
        let mut p = player();
        p.weapons[1].ammo = Ammo::Finite(2);
        p.projectiles.push(boss_bullet_at(&p.body));
        p.set_mode(PlayerMode::Boss);
        assert_eq!(p.weapons[1].ammo, Ammo::Finite(30));
        assert!(p.projectiles.is_empty());
    }

    #[test]
    fn test_boss_mode_ticks_every_weapon() {
        let mut p = player();
        p.set_mode(PlayerMode::Boss);
        p.weapons[3].current_cooldown = 10;
        p.weapons[0].current_cooldown = 10;
        step(&mut p, 4);
        assert_eq!(p.weapons[3].current_cooldown, 6);
        assert_eq!(p.weapons[0].current_cooldown, 6);
    }

    #[test]
    fn test_shoot_only_in_boss_mode() {
        let mut p = player();
        p.set_mode(PlayerMode::Normal);
        assert_eq!(p.shoot(), 0);
        p.set_mode(PlayerMode::Boss);
        assert_eq!(p.shoot(), 1);
        assert_eq!(p.shoot(), 0);
        assert_eq!(p.projectiles[0].body.x(), p.body.max().x);
    }

    #[test]
    fn test_invincible_ignores_pipes_and_floor() {
        let mut p = player();
        p.set_mode(PlayerMode::Normal);
        let pipe = PipePair::new(p.body.x(), -500.0, 10.0);
        p.apply_modifiers(StatusModifiers {
            invincible: true,
            ..StatusModifiers::default()
        });
        p.body.pos.y = 470.0;
        assert!(!p.collided(&[pipe], 480.0));

        p.apply_modifiers(StatusModifiers::default());
        assert!(p.collided(&[], 480.0));
        assert_eq!(p.crash_cause, Some(CrashCause::Floor));
    }

    #[test]
    fn test_pipe_collision_records_cause() {
        let mut p = player();
        p.body.pos.y = 200.0;
        let pipe = PipePair::new(p.body.x(), 100.0, 80.0);
        assert!(p.collided(&[pipe], 480.0));
        assert_eq!(p.crash_cause, Some(CrashCause::Pipe));

        let clear = PipePair::new(p.body.x(), 150.0, 120.0);
        p.crash_cause = None;
        assert!(!p.collided(&[clear], 480.0));
    }

    #[test]
    fn test_invincible_deflects_without_damage() {
        let mut p = player();
        p.apply_modifiers(StatusModifiers {
            invincible: true,
            ..StatusModifiers::default()
        });
        let mut incoming = vec![boss_bullet_at(&p.body)];
        assert_eq!(p.resolve_boss_fire(&mut incoming), IncomingFire::Deflected(1));
        assert!(incoming.is_empty());
        assert_eq!(p.health, 1);
    }

    #[test]
    fn test_hit_is_lethal_at_default_health() {
        let mut p = player();
        let far = Projectile::new(
            Emitter::Boss(BossId(1)),
            Body::new(300.0, 10.0, 8.0, 8.0, Visual::BULLET_BOSS),
            Vec2::new(-8.0, 0.0),
            0,
        );
        let mut incoming = vec![boss_bullet_at(&p.body), far];
        assert_eq!(p.resolve_boss_fire(&mut incoming), IncomingFire::Hit { damage: 1 });
        assert_eq!(incoming.len(), 1);
        assert!(p.is_dead());
        assert_eq!(p.crash_cause, Some(CrashCause::Projectile));
    }

    #[test]
    fn test_shots_pass_through_preparing_boss() {
        let viewport = Viewport::default();
        let mut boss = Boss::new(
            BossId(1),
            Archetype::Normal,
            &BossSpec::default_for(Archetype::Normal),
            &viewport,
        );
        let mut p = player();
        p.set_mode(PlayerMode::Boss);
        p.projectiles.push(Projectile::new(
            Emitter::Player,
            Body::new(boss.body.x() + 10.0, boss.body.y() + 10.0, 8.0, 8.0, Visual::BULLET_PLAYER),
            Vec2::new(10.0, 0.0),
            10,
        ));

        assert_eq!(p.resolve_hits_on(&mut boss), 0);
        assert_eq!(p.projectiles.len(), 1);

        boss.phase = crate::sim::boss::BossPhase::Active;
        assert_eq!(p.resolve_hits_on(&mut boss), 1);
        assert!(p.projectiles.is_empty());
        assert_eq!(boss.health, 90);
    }
}
