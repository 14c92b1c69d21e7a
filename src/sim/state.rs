//! Battle state
//!
//! Everything one run of the game owns: the bird, the boss, the spawners, the
//! effect ledger, the score and the seeded RNG.

use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::effects::EffectLedger;
use super::entity::BossId;
use super::pickup::PickupField;
use super::pipes::PipeField;
use super::player::{Player, PlayerMode};
use super::snapshot::FrameSnapshot;
use super::tick::TerminateReason;
use crate::Tuning;
use crate::Viewport;
use crate::audio::Cue;

/// Which game the player picked from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Endless pipes
    Classic,
    /// Pipes against the clock
    Timed,
    /// Pipes with gravity flipped
    Reverse,
    /// Boss rotation, no pipes
    Boss,
    /// Pipes plus coins; only coins score
    Coin,
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Timed => "Timed",
            GameMode::Reverse => "Reverse",
            GameMode::Boss => "Boss",
            GameMode::Coin => "Coin",
        }
    }

    /// Player motion mode this game runs in
    pub fn player_mode(&self) -> PlayerMode {
        match self {
            GameMode::Reverse => PlayerMode::Reverse,
            GameMode::Boss => PlayerMode::Boss,
            _ => PlayerMode::Normal,
        }
    }

    pub fn has_pipes(&self) -> bool {
        *self != GameMode::Boss
    }

    /// Passing a pipe pair is worth a point
    pub fn scores_pipes(&self) -> bool {
        !matches!(self, GameMode::Boss | GameMode::Coin)
    }
}

/// Complete state of one battle
#[derive(Debug, Clone)]
pub struct BattleState {
    pub mode: GameMode,
    pub tuning: Tuning,
    pub viewport: Viewport,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Sim time since the battle started
    pub time: Duration,
    pub frame: u64,
    /// Timed mode only
    pub timer_remaining: Option<Duration>,
    pub player: Player,
    pub boss: Option<Boss>,
    /// 0-based position in the boss rotation
    pub boss_level: u32,
    pub ledger: EffectLedger,
    pub pickups: PickupField,
    pub pipes: Option<PipeField>,
    pub score: u32,
    pub coins: u32,
    /// Cues raised during the last tick
    pub cues: Vec<Cue>,
    /// Set once the battle has ended
    pub outcome: Option<TerminateReason>,
    next_boss_id: u32,
}

impl BattleState {
    pub fn new(mode: GameMode, seed: u64, tuning: Tuning) -> Self {
        let viewport = Viewport::default();
        let mut player = Player::new(&tuning.weapons, tuning.player_health, &viewport);
        player.set_mode(mode.player_mode());

        let mut state = Self {
            mode,
            viewport,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: Duration::ZERO,
            frame: 0,
            timer_remaining: (mode == GameMode::Timed)
                .then(|| Duration::from_secs(tuning.timed_seconds)),
            player,
            boss: None,
            boss_level: 0,
            ledger: EffectLedger::new(tuning.effects),
            pickups: PickupField::new(tuning.pickups, mode == GameMode::Coin),
            pipes: mode.has_pipes().then(|| PipeField::new(tuning.pipes)),
            score: 0,
            coins: 0,
            cues: Vec::new(),
            outcome: None,
            next_boss_id: 0,
            tuning,
        };

        if mode == GameMode::Boss {
            let id = state.next_boss_id();
            let boss = Boss::for_level(id, 0, &state.tuning.bosses, &state.viewport)
                .with_preparation(state.tuning.battle_start_preparation);
            log::info!("{} arrives", boss.archetype.name());
            state.player.boss_target = Some(boss.id);
            state.boss = Some(boss);
        }

        log::info!("Starting {} battle (seed {seed})", mode.name());
        state
    }

    pub fn next_boss_id(&mut self) -> BossId {
        let id = BossId(self.next_boss_id);
        self.next_boss_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn push_cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// Take the cues raised since the last drain
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self)
    }
}
