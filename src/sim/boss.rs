//! Boss state machine
//!
//! A boss is Preparing (moves, never attacks), then Active (moves and fires on
//! its cooldown), then Defeated once its health reaches zero. Movement, attack
//! pattern and transformation are picked per archetype at construction and
//! driven uniformly through [`MovementPolicy`] and [`AttackPolicy`].

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Body, BossId, NoTargets, Positioned, TargetLookup, Visual};
use super::projectile::{Emitter, Projectile, advance_projectiles};
use crate::Viewport;

/// Preparation window of a freshly built boss
pub const DEFAULT_PREPARATION: u32 = 60;
/// Preparation window of the very first boss of a battle
pub const BATTLE_START_PREPARATION: u32 = 120;
/// Frames a hit keeps the boss flashing
pub const HIT_FLASH_FRAMES: u32 = 5;
/// Distance kept from the top and the floor while patrolling
pub const PATROL_MARGIN: f32 = 50.0;
/// Gap between the boss and the right window edge at spawn
pub const SPAWN_RIGHT_MARGIN: f32 = 40.0;
/// Extra max health per completed cycle of the rotation
pub const CYCLE_HEALTH_BONUS: u32 = 20;
/// Attack-rate reduction per completed cycle, and its cap
pub const CYCLE_RATE_BONUS: u32 = 5;
pub const CYCLE_RATE_BONUS_MAX: u32 = 30;
/// Fastest attack rate succession can produce
pub const MIN_BULLET_RATE: u32 = 10;

/// Offshoots released by a splitting boss
const OFFSHOOT_SPREAD: f32 = 50.0;
const OFFSHOOT_SIZE: f32 = 20.0;
const OFFSHOOT_VEL: Vec2 = Vec2::new(-3.0, 1.0);
const OFFSHOOT_DAMAGE: u32 = 1;

/// Boss archetypes in rotation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Normal,
    Speedy,
    Splitter,
    Tank,
}

impl Archetype {
    pub const ROTATION: [Archetype; 4] = [
        Archetype::Normal,
        Archetype::Speedy,
        Archetype::Splitter,
        Archetype::Tank,
    ];

    /// Archetype fought at a given (0-based) boss level
    pub fn for_level(level: u32) -> Self {
        Self::ROTATION[(level % 4) as usize]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Normal => "Normal Boss",
            Archetype::Speedy => "Speed Boss",
            Archetype::Splitter => "Splitter Boss",
            Archetype::Tank => "Tank Boss",
        }
    }

    fn visual(&self) -> Visual {
        match self {
            Archetype::Normal => Visual::BOSS_NORMAL,
            Archetype::Speedy => Visual::BOSS_SPEEDY,
            Archetype::Splitter => Visual::BOSS_SPLITTER,
            Archetype::Tank => Visual::BOSS_TANK,
        }
    }

    fn movement(&self) -> Movement {
        match self {
            Archetype::Normal => Movement::Patrol(Patrol {
                flip_every: 120,
                flip_chance: 0.3,
            }),
            Archetype::Speedy => Movement::Patrol(Patrol {
                flip_every: 60,
                flip_chance: 0.5,
            }),
            Archetype::Splitter => Movement::Slowing(Slowing {
                threshold: SPLIT_THRESHOLD,
                factor: 0.5,
            }),
            Archetype::Tank => Movement::DutyCycle(DutyCycle {
                period: 180,
                frozen: 60,
            }),
        }
    }

    fn attack(&self) -> Attack {
        match self {
            Archetype::Normal => Attack::Single(Shot {
                size: [15.0, 8.0],
                speed: 8.0,
                damage: 1,
                muzzle_offset: 10.0,
                visual: Visual::BULLET_BOSS,
            }),
            Archetype::Speedy => Attack::Burst(Burst {
                shot: Shot {
                    size: [10.0, 6.0],
                    speed: 12.0,
                    damage: 1,
                    muzzle_offset: 10.0,
                    visual: Visual::BULLET_BOSS,
                },
                rounds: 3,
                stagger: 5,
            }),
            Archetype::Splitter => Attack::Split(SplitShot {
                shot: Shot {
                    size: [12.0, 12.0],
                    speed: 6.0,
                    damage: 1,
                    muzzle_offset: 10.0,
                    visual: Visual::BULLET_BOSS_SPLIT,
                },
                split_after: 30,
            }),
            Archetype::Tank => Attack::Single(Shot {
                size: [20.0, 20.0],
                speed: 5.0,
                damage: 2,
                muzzle_offset: 20.0,
                visual: Visual::BULLET_BOSS_HEAVY,
            }),
        }
    }

    fn transformation(&self) -> Transformation {
        match self {
            Archetype::Splitter => Transformation::Split {
                threshold: SPLIT_THRESHOLD,
                has_split: false,
            },
            Archetype::Tank => Transformation::Mitigate,
            _ => Transformation::None,
        }
    }
}

/// Health at or below which a splitter boss splits
pub const SPLIT_THRESHOLD: u32 = 40;

/// Balance values for one archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossSpec {
    /// Square body size
    pub size: f32,
    pub health: u32,
    pub speed: f32,
    /// Frames between attacks
    pub bullet_rate: u32,
    /// Enrage never pushes the attack rate below this
    pub enrage_floor: u32,
    /// Preparation window when this archetype arrives by succession
    pub succession_prep: u32,
}

impl BossSpec {
    pub fn default_for(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Normal => Self {
                size: 100.0,
                health: 100,
                speed: 2.0,
                bullet_rate: 60,
                enrage_floor: 45,
                succession_prep: 60,
            },
            Archetype::Speedy => Self {
                size: 80.0,
                health: 80,
                speed: 4.0,
                bullet_rate: 30,
                enrage_floor: 20,
                succession_prep: 90,
            },
            Archetype::Splitter => Self {
                size: 120.0,
                health: 120,
                speed: 1.5,
                bullet_rate: 90,
                enrage_floor: 70,
                succession_prep: 75,
            },
            Archetype::Tank => Self {
                size: 140.0,
                health: 200,
                speed: 1.0,
                bullet_rate: 120,
                enrage_floor: 100,
                succession_prep: 45,
            },
        }
    }
}

/// Balance values for the whole rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossTable {
    pub normal: BossSpec,
    pub speedy: BossSpec,
    pub splitter: BossSpec,
    pub tank: BossSpec,
}

impl Default for BossTable {
    fn default() -> Self {
        Self {
            normal: BossSpec::default_for(Archetype::Normal),
            speedy: BossSpec::default_for(Archetype::Speedy),
            splitter: BossSpec::default_for(Archetype::Splitter),
            tank: BossSpec::default_for(Archetype::Tank),
        }
    }
}

impl BossTable {
    pub fn get(&self, archetype: Archetype) -> &BossSpec {
        match archetype {
            Archetype::Normal => &self.normal,
            Archetype::Speedy => &self.speedy,
            Archetype::Splitter => &self.splitter,
            Archetype::Tank => &self.tank,
        }
    }
}

// === Movement ===

/// Per-frame patrol rule
pub trait MovementPolicy {
    /// Multiplier on the boss speed for this frame (0 holds still).
    /// May reverse `direction`.
    fn speed_factor(&self, tick: u64, health: u32, direction: &mut f32, rng: &mut Pcg32) -> f32;
}

/// Patrol with a random chance of turning around every `flip_every` frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub flip_every: u64,
    pub flip_chance: f64,
}

impl MovementPolicy for Patrol {
    fn speed_factor(&self, tick: u64, _: u32, direction: &mut f32, rng: &mut Pcg32) -> f32 {
        if self.flip_every > 0 && tick % self.flip_every == 0 && rng.random_bool(self.flip_chance)
        {
            *direction = -*direction;
        }
        1.0
    }
}

/// Patrol that slows down once health falls below `threshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slowing {
    pub threshold: u32,
    pub factor: f32,
}

impl MovementPolicy for Slowing {
    fn speed_factor(&self, _: u64, health: u32, _: &mut f32, _: &mut Pcg32) -> f32 {
        if health < self.threshold {
            self.factor
        } else {
            1.0
        }
    }
}

/// Patrol that holds still for the first `frozen` frames of every `period`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DutyCycle {
    pub period: u64,
    pub frozen: u64,
}

impl MovementPolicy for DutyCycle {
    fn speed_factor(&self, tick: u64, _: u32, _: &mut f32, _: &mut Pcg32) -> f32 {
        if self.period > 0 && tick % self.period < self.frozen {
            0.0
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Movement {
    Patrol(Patrol),
    Slowing(Slowing),
    DutyCycle(DutyCycle),
}

impl Movement {
    fn policy(&self) -> &dyn MovementPolicy {
        match self {
            Movement::Patrol(p) => p,
            Movement::Slowing(p) => p,
            Movement::DutyCycle(p) => p,
        }
    }
}

// === Attacks ===

/// Projectiles released by one attack
pub trait AttackPolicy {
    fn volley(&self, boss: &Body, owner: BossId) -> Vec<Projectile>;
}

/// One leftward projectile leaving the boss's vertical center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub size: [f32; 2],
    pub speed: f32,
    pub damage: u32,
    /// Spawn distance in front of the boss's left edge
    pub muzzle_offset: f32,
    pub visual: Visual,
}

impl Shot {
    fn build(&self, boss: &Body, owner: BossId) -> Projectile {
        let [w, h] = self.size;
        let body = Body::new(
            boss.x() - self.muzzle_offset,
            boss.y() + boss.h() * 0.5,
            w,
            h,
            self.visual,
        );
        Projectile::new(Emitter::Boss(owner), body, Vec2::new(-self.speed, 0.0), self.damage)
    }
}

impl AttackPolicy for Shot {
    fn volley(&self, boss: &Body, owner: BossId) -> Vec<Projectile> {
        vec![self.build(boss, owner)]
    }
}

/// Rounds released together but held back `stagger` frames apart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub shot: Shot,
    pub rounds: u32,
    pub stagger: u32,
}

impl AttackPolicy for Burst {
    fn volley(&self, boss: &Body, owner: BossId) -> Vec<Projectile> {
        (0..self.rounds)
            .map(|i| self.shot.build(boss, owner).delayed(i * self.stagger))
            .collect()
    }
}

/// A shot that breaks into shards after `split_after` frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitShot {
    pub shot: Shot,
    pub split_after: u32,
}

impl AttackPolicy for SplitShot {
    fn volley(&self, boss: &Body, owner: BossId) -> Vec<Projectile> {
        vec![self.shot.build(boss, owner).splitting(self.split_after)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Attack {
    Single(Shot),
    Burst(Burst),
    Split(SplitShot),
}

impl Attack {
    fn policy(&self) -> &dyn AttackPolicy {
        match self {
            Attack::Single(p) => p,
            Attack::Burst(p) => p,
            Attack::Split(p) => p,
        }
    }
}

// === Boss ===

/// Archetype-specific change in how damage lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transformation {
    None,
    /// Releases two offshoots the first time health reaches `threshold`
    Split { threshold: u32, has_split: bool },
    /// Below half health, half of every hit is refunded
    Mitigate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Preparing { remaining: u32, total: u32 },
    Active,
    Defeated,
}

/// What a boss did this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossSignal {
    Idle,
    /// Preparation just ended
    Ready,
    /// Fired this many projectiles
    Attacked(usize),
}

/// Result of one `take_damage` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageReport {
    pub before: u32,
    pub after: u32,
    /// Offshoots were released by this hit
    pub split: bool,
    pub defeated: bool,
}

/// Shared inputs for a boss update
pub struct BossContext<'a> {
    pub viewport: &'a Viewport,
    pub rng: &'a mut Pcg32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub id: BossId,
    pub archetype: Archetype,
    pub body: Body,
    pub health: u32,
    pub max_health: u32,
    /// +1 moves down, -1 moves up
    pub direction: f32,
    pub speed: f32,
    pub bullet_rate: u32,
    pub bullet_cooldown: u32,
    pub enrage_floor: u32,
    pub phase: BossPhase,
    pub projectiles: Vec<Projectile>,
    pub movement: Movement,
    pub attack: Attack,
    pub transform: Transformation,
    /// 1-based difficulty level shown to the player
    pub level: u32,
    pub hit_flash: u32,
    pub animation_tick: u64,
}

impl Boss {
    pub fn new(id: BossId, archetype: Archetype, spec: &BossSpec, viewport: &Viewport) -> Self {
        let body = Body::new(
            viewport.width - spec.size - SPAWN_RIGHT_MARGIN,
            viewport.height / 2.0 - spec.size / 2.0,
            spec.size,
            spec.size,
            archetype.visual(),
        );
        Self {
            id,
            archetype,
            body,
            health: spec.health,
            max_health: spec.health,
            direction: 1.0,
            speed: spec.speed,
            bullet_rate: spec.bullet_rate,
            bullet_cooldown: 0,
            enrage_floor: spec.enrage_floor,
            phase: BossPhase::Preparing {
                remaining: DEFAULT_PREPARATION,
                total: DEFAULT_PREPARATION,
            },
            projectiles: Vec::new(),
            movement: archetype.movement(),
            attack: archetype.attack(),
            transform: archetype.transformation(),
            level: 1,
            hit_flash: 0,
            animation_tick: 0,
        }
    }

    /// Boss for a 0-based level of the rotation, scaled by completed cycles
    pub fn for_level(id: BossId, level: u32, table: &BossTable, viewport: &Viewport) -> Self {
        let archetype = Archetype::for_level(level);
        let spec = table.get(archetype);
        let cycle = level / 4;

        let mut boss =
            Self::new(id, archetype, spec, viewport).with_preparation(spec.succession_prep);
        if cycle > 0 {
            boss.max_health += CYCLE_HEALTH_BONUS * cycle;
            boss.health = boss.max_health;
            let faster = (CYCLE_RATE_BONUS * cycle).min(CYCLE_RATE_BONUS_MAX);
            boss.bullet_rate = boss.bullet_rate.saturating_sub(faster).max(MIN_BULLET_RATE);
        }
        boss.level = cycle + 1;
        boss
    }

    pub fn with_preparation(mut self, frames: u32) -> Self {
        self.phase = BossPhase::Preparing {
            remaining: frames,
            total: frames,
        };
        self
    }

    pub fn is_preparing(&self) -> bool {
        matches!(self.phase, BossPhase::Preparing { .. })
    }

    pub fn is_active(&self) -> bool {
        self.phase == BossPhase::Active
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Preparation progress from 1.0 (just arrived) down to 0.0
    pub fn preparation_progress(&self) -> f32 {
        match self.phase {
            BossPhase::Preparing { remaining, total } if total > 0 => {
                remaining as f32 / total as f32
            }
            _ => 0.0,
        }
    }

    pub fn has_split(&self) -> bool {
        matches!(self.transform, Transformation::Split { has_split: true, .. })
    }

    fn below_half_health(&self) -> bool {
        self.health < self.max_health - self.health
    }

    /// Advance one frame
    pub fn update(&mut self, ctx: &mut BossContext) -> BossSignal {
        self.advance_movement(ctx);
        advance_projectiles(&mut self.projectiles, &NoTargets, ctx.viewport);
        self.hit_flash = self.hit_flash.saturating_sub(1);

        match self.phase {
            BossPhase::Preparing { remaining, total } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.phase = BossPhase::Active;
                    log::debug!("{} ready", self.archetype.name());
                    BossSignal::Ready
                } else {
                    self.phase = BossPhase::Preparing { remaining, total };
                    BossSignal::Idle
                }
            }
            BossPhase::Active => {
                self.bullet_cooldown = self.bullet_cooldown.saturating_sub(1);
                if self.bullet_cooldown > 0 {
                    return BossSignal::Idle;
                }
                let volley = self.attack.policy().volley(&self.body, self.id);
                let fired = volley.len();
                self.projectiles.extend(volley);
                self.bullet_cooldown = self.bullet_rate;
                self.enrage();
                log::trace!("{} fired {} projectiles", self.archetype.name(), fired);
                BossSignal::Attacked(fired)
            }
            BossPhase::Defeated => BossSignal::Idle,
        }
    }

    fn advance_movement(&mut self, ctx: &mut BossContext) {
        self.animation_tick += 1;

        if self.body.y() <= PATROL_MARGIN {
            self.direction = 1.0;
        } else if self.body.y() >= ctx.viewport.floor_y - self.body.h() - PATROL_MARGIN {
            self.direction = -1.0;
        }

        let factor = self.movement.policy().speed_factor(
            self.animation_tick,
            self.health,
            &mut self.direction,
            &mut *ctx.rng,
        );
        self.body.pos.y += self.speed * factor * self.direction;
    }

    /// Below half health every attack tightens the attack rate a little
    fn enrage(&mut self) {
        if self.below_half_health() && self.bullet_rate > self.enrage_floor {
            self.bullet_rate -= 1;
        }
    }

    /// Apply a hit. Mitigation and clamping happen in one write.
    pub fn take_damage(&mut self, amount: u32) -> DamageReport {
        let before = self.health;
        let max = i64::from(self.max_health);

        let mut next = i64::from(before) - i64::from(amount);
        if self.transform == Transformation::Mitigate && next * 2 < max {
            next += i64::from(amount / 2);
        }
        self.health = next.clamp(0, max) as u32;
        self.hit_flash = HIT_FLASH_FRAMES;

        let mut split = false;
        if let Transformation::Split {
            threshold,
            has_split,
        } = &mut self.transform
        {
            if !*has_split && self.health <= *threshold {
                *has_split = true;
                split = true;
            }
        }
        if split {
            self.release_offshoots();
        }

        let defeated = self.is_defeated();
        if defeated {
            self.phase = BossPhase::Defeated;
            log::info!("{} (level {}) defeated", self.archetype.name(), self.level);
        }

        DamageReport {
            before,
            after: self.health,
            split,
            defeated,
        }
    }

    fn release_offshoots(&mut self) {
        for sign in [1.0, -1.0] {
            let body = Body::new(
                self.body.x(),
                self.body.y() + OFFSHOOT_SPREAD * sign,
                OFFSHOOT_SIZE,
                OFFSHOOT_SIZE,
                Visual::BULLET_BOSS_SPLIT,
            );
            let vel = Vec2::new(OFFSHOOT_VEL.x, OFFSHOOT_VEL.y * sign);
            self.projectiles
                .push(Projectile::new(Emitter::Boss(self.id), body, vel, OFFSHOOT_DAMAGE));
        }
        log::debug!("{} split", self.archetype.name());
    }
}

impl Positioned for Boss {
    fn body(&self) -> &Body {
        &self.body
    }
}

impl TargetLookup for Boss {
    fn locate(&self, id: BossId) -> Option<Body> {
        (id == self.id && !self.is_defeated()).then_some(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn boss(archetype: Archetype) -> Boss {
        Boss::new(
            BossId(1),
            archetype,
            &BossSpec::default_for(archetype),
            &Viewport::default(),
        )
    }

    fn run(boss: &mut Boss, frames: u32) -> Vec<BossSignal> {
        let viewport = Viewport::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ctx = BossContext {
            viewport: &viewport,
            rng: &mut rng,
        };
        (0..frames).map(|_| boss.update(&mut ctx)).collect()
    }

    #[test]
    fn test_spawn_position() {
        let b = boss(Archetype::Normal);
        assert_eq!(b.body.pos, Vec2::new(210.0, 250.0));
        assert_eq!(b.body.size, Vec2::splat(100.0));
        assert!(b.is_preparing());
    }

    #[test]
    fn test_splitter_slows_below_split_threshold() {
        let mut splitter = boss(Archetype::Splitter);
        splitter.body.pos.y = 150.0;
        run(&mut splitter, 1);
        assert!((splitter.body.y() - 151.5).abs() < 1e-5);

        splitter.health = 39;
        run(&mut splitter, 1);
        assert!((splitter.body.y() - 152.25).abs() < 1e-5);
    }

    #[test]
    fn test_patrol_flips_only_on_schedule() {
        let patrol = Patrol {
            flip_every: 30,
            flip_chance: 1.0,
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let mut direction = 1.0;
        let mut flips = Vec::new();
        for tick in 1..=120 {
            let before = direction;
            assert_eq!(patrol.speed_factor(tick, 100, &mut direction, &mut rng), 1.0);
            if direction != before {
                flips.push(tick);
            }
        }
        assert_eq!(flips, vec![30, 60, 90, 120]);
        assert_eq!(direction, 1.0);

        let steady = Patrol {
            flip_every: 30,
            flip_chance: 0.0,
        };
        for tick in 1..=120 {
            steady.speed_factor(tick, 100, &mut direction, &mut rng);
        }
        assert_eq!(direction, 1.0);
    }

    #[test]
    fn test_half_health_check_with_huge_pools() {
        let mut tank = boss(Archetype::Tank);
        tank.max_health = u32::MAX;
        tank.health = u32::MAX - 1;
        assert!(!tank.below_half_health());
        tank.health = u32::MAX / 2;
        assert!(tank.below_half_health());
    }

    #[test]
    fn test_tank_refunds_half_below_half_health() {
        let mut tank = boss(Archetype::Tank);
        tank.health = 90;
        let report = tank.take_damage(20);
        assert_eq!(tank.health, 80);
        assert_eq!(report.before, 90);
        assert_eq!(report.after, 80);
    }

    #[test]
    fn test_tank_full_damage_above_half() {
        let mut tank = boss(Archetype::Tank);
        tank.take_damage(20);
        assert_eq!(tank.health, 180);
        // Odd hits round the refund down
        tank.health = 99;
        tank.take_damage(5);
        assert_eq!(tank.health, 96);
    }

    #[test]
    fn test_health_floors_at_zero() {
        let mut b = boss(Archetype::Normal);
        let report = b.take_damage(500);
        assert_eq!(b.health, 0);
        assert!(report.defeated && b.is_defeated());
        assert_eq!(b.phase, BossPhase::Defeated);
        assert_eq!(b.hit_flash, HIT_FLASH_FRAMES);
    }

    #[test]
    fn test_splitter_splits_exactly_once() {
        let mut s = boss(Archetype::Splitter);
        s.take_damage(70);
        assert!(!s.has_split());
        assert!(s.projectiles.is_empty());

        let mut splits = 0;
        for _ in 0..5 {
            if s.take_damage(10).split {
                splits += 1;
            }
        }
        assert_eq!(splits, 1);
        assert!(s.has_split());
        assert_eq!(s.projectiles.len(), 2);

        let ys: Vec<f32> = s.projectiles.iter().map(|p| p.body.y() - s.body.y()).collect();
        assert_eq!(ys, vec![50.0, -50.0]);
        assert!(s.projectiles.iter().all(|p| p.vel.x == -3.0 && p.damage == 1));
    }

    #[test]
    fn test_preparation_is_silent_then_ready() {
        let mut b = boss(Archetype::Normal).with_preparation(120);
        let signals = run(&mut b, 181);

        assert!(signals[..119].iter().all(|s| *s == BossSignal::Idle));
        assert_eq!(signals[119], BossSignal::Ready);
        assert_eq!(signals[120], BossSignal::Attacked(1));
        assert!(signals[121..180].iter().all(|s| *s == BossSignal::Idle));
        assert_eq!(signals[180], BossSignal::Attacked(1));
    }

    #[test]
    fn test_speedy_burst_is_staggered() {
        let mut b = boss(Archetype::Speedy).with_preparation(1);
        let signals = run(&mut b, 2);
        assert_eq!(signals, vec![BossSignal::Ready, BossSignal::Attacked(3)]);
        let origin_x = b.projectiles[0].body.x();
        run(&mut b, 1);
        let xs: Vec<f32> = b.projectiles.iter().map(|p| p.body.x()).collect();
        assert_eq!(xs, vec![origin_x - 12.0, origin_x, origin_x]);
    }

    #[test]
    fn test_tank_holds_still_in_duty_window() {
        let mut tank = boss(Archetype::Tank);
        let y0 = tank.body.y();
        run(&mut tank, 59);
        assert_eq!(tank.body.y(), y0);
        run(&mut tank, 1);
        assert_eq!(tank.body.y(), y0 + 1.0);
    }

    #[test]
    fn test_patrol_turns_at_bounds() {
        let mut b = boss(Archetype::Splitter);
        b.body.pos.y = 40.0;
        b.direction = -1.0;
        run(&mut b, 1);
        assert_eq!(b.direction, 1.0);
        assert_eq!(b.body.y(), 41.5);

        b.body.pos.y = 480.0 - 120.0 - 50.0;
        run(&mut b, 1);
        assert_eq!(b.direction, -1.0);
    }

    #[test]
    fn test_enrage_tightens_rate_to_floor() {
        let mut b = boss(Archetype::Normal).with_preparation(1);
        b.health = 40;
        b.bullet_rate = 46;
        run(&mut b, 2);
        assert_eq!(b.bullet_rate, 45);
        run(&mut b, 200);
        assert_eq!(b.bullet_rate, 45);
    }

    #[test]
    fn test_succession_scales_by_cycle() {
        let table = BossTable::default();
        let viewport = Viewport::default();

        let b = Boss::for_level(BossId(5), 4, &table, &viewport);
        assert_eq!(b.archetype, Archetype::Normal);
        assert_eq!((b.max_health, b.health), (120, 120));
        assert_eq!(b.bullet_rate, 55);
        assert_eq!(b.level, 2);
        assert_eq!(b.phase, BossPhase::Preparing { remaining: 60, total: 60 });

        let s = Boss::for_level(BossId(6), 1, &table, &viewport);
        assert_eq!(s.archetype, Archetype::Speedy);
        assert_eq!(s.bullet_rate, 30);
        assert_eq!(s.level, 1);
        assert_eq!(s.phase, BossPhase::Preparing { remaining: 90, total: 90 });

        // Rate bonus caps at 30 and never goes below 10
        let late = Boss::for_level(BossId(7), 4 * 9 + 1, &table, &viewport);
        assert_eq!(late.bullet_rate, 10);
    }

    #[test]
    fn test_lookup_stops_resolving_after_defeat() {
        let mut b = boss(Archetype::Normal);
        assert!(b.locate(BossId(1)).is_some());
        assert!(b.locate(BossId(2)).is_none());
        b.take_damage(1000);
        assert!(b.locate(BossId(1)).is_none());
    }
}
