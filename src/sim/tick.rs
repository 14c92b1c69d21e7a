//! Per-frame sequencing
//!
//! One call to [`tick`] runs input, timers, spawners, entity updates,
//! collisions and terminal checks in a fixed order, then reports what
//! happened through the returned [`FrameOutcome`].

use std::time::Duration;

use super::boss::{Archetype, Boss, BossContext, BossSignal};
use super::effects::StatusModifiers;
use super::pickup::PickupKind;
use super::pipes::PipePair;
use super::player::{CrashCause, IncomingFire, PlayerContext, PlayerMode};
use super::state::{BattleState, GameMode};
use crate::audio::Cue;

/// Player input for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub events: Vec<InputEvent>,
}

impl FrameInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Tap/space; also fires in boss battles
    Flap,
    Shoot,
    /// Cycle the weapon selection (+1 / -1)
    SwitchWeapon(i32),
    /// Pick a loadout slot directly
    SelectWeapon(usize),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A boss fell and the next one in the rotation arrived
    BossSuccession {
        defeated: Archetype,
        next: Archetype,
        /// 0-based rotation level of the new boss
        level: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateReason {
    Death(CrashCause),
    TimeExpired,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Transition(Transition),
    Terminate(TerminateReason),
}

/// Advance the battle by one frame of `dt` sim time
pub fn tick(state: &mut BattleState, input: &FrameInput, dt: Duration) -> FrameOutcome {
    state.cues.clear();

    // A finished battle only lets the wreck finish falling
    if let Some(reason) = state.outcome {
        if state.player.mode == PlayerMode::Crash {
            update_player(state);
        }
        return FrameOutcome::Terminate(reason);
    }

    let in_boss = state.mode == GameMode::Boss;
    for event in &input.events {
        match *event {
            InputEvent::Quit => return finish(state, TerminateReason::Quit),
            InputEvent::Flap => {
                state.player.flap();
                if in_boss {
                    fire(state);
                }
            }
            InputEvent::Shoot if in_boss => fire(state),
            InputEvent::SwitchWeapon(direction) if in_boss => {
                state.player.switch_weapon(direction);
                state.cues.push(Cue::Swoosh);
            }
            InputEvent::SelectWeapon(index) if in_boss => state.player.select_weapon(index),
            _ => {}
        }
    }

    // Clocks
    state.time += dt;
    state.frame += 1;
    if let Some(remaining) = state.timer_remaining.as_mut() {
        *remaining = remaining.saturating_sub(dt);
    }

    // Effects
    state.ledger.tick(state.time);
    state
        .player
        .apply_modifiers(StatusModifiers::from_ledger(&state.ledger));

    // Spawners
    state.pickups.update(dt, &state.viewport, &mut state.rng);
    if let Some(pipes) = state.pipes.as_mut() {
        pipes.update(&state.viewport, &mut state.rng);
    }

    // Entities
    update_player(state);
    update_boss(state);

    // Collisions
    resolve_combat(state);
    collect_pickups(state);
    score_pipes(state);
    let crashed = !state.player.is_dead() && {
        let pairs: &[PipePair] = state
            .pipes
            .as_ref()
            .map(|p| p.pairs.as_slice())
            .unwrap_or_default();
        state.player.collided(pairs, state.viewport.floor_y)
    };

    // Terminal checks
    if state.player.is_dead() || crashed {
        let cause = state.player.crash_cause.unwrap_or(CrashCause::Floor);
        state.player.set_mode(PlayerMode::Crash);
        state.cues.push(Cue::Die);
        return finish(state, TerminateReason::Death(cause));
    }
    if state.timer_remaining == Some(Duration::ZERO) {
        return finish(state, TerminateReason::TimeExpired);
    }
    if state.boss.as_ref().is_some_and(Boss::is_defeated) {
        return FrameOutcome::Transition(succeed_boss(state));
    }

    log::trace!("frame {} score {}", state.frame, state.score);
    FrameOutcome::Continue
}

fn fire(state: &mut BattleState) {
    if state.player.shoot() > 0 {
        state.cues.push(Cue::Swoosh);
    }
}

fn update_player(state: &mut BattleState) {
    let targets = state.boss.as_ref();
    let ctx = PlayerContext {
        viewport: &state.viewport,
        targets: &targets,
    };
    state.player.update(&ctx);
}

fn update_boss(state: &mut BattleState) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let mut ctx = BossContext {
        viewport: &state.viewport,
        rng: &mut state.rng,
    };
    match boss.update(&mut ctx) {
        BossSignal::Ready => state.cues.push(Cue::Ready),
        BossSignal::Attacked(_) => state.cues.push(Cue::Attack),
        BossSignal::Idle => {}
    }
}

/// Boss fire against the bird, then the bird's fire against the boss
fn resolve_combat(state: &mut BattleState) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };

    match state.player.resolve_boss_fire(&mut boss.projectiles) {
        IncomingFire::Clean => {}
        IncomingFire::Deflected(count) => {
            log::trace!("Deflected {count} projectiles");
            state.cues.push(Cue::Deflect);
        }
        IncomingFire::Hit { damage } => {
            log::debug!("Bird took {damage} damage ({} left)", state.player.health);
            if !state.player.is_dead() {
                state.cues.push(Cue::Hit);
            }
        }
    }

    let hits = state.player.resolve_hits_on(boss);
    if hits > 0 {
        state.score += hits;
        state.cues.push(Cue::Hit);
        log::trace!(
            "{} hits on {} ({}/{})",
            hits,
            boss.archetype.name(),
            boss.health,
            boss.max_health
        );
    }
}

fn collect_pickups(state: &mut BattleState) {
    for kind in state.pickups.collect(&state.player.body, state.player.hitbox) {
        match kind {
            PickupKind::PowerUp(effect) => {
                state.ledger.activate(effect, state.time);
                if state.mode != GameMode::Boss {
                    state.cues.push(Cue::Point);
                }
            }
            PickupKind::Coin(coin) => {
                state.coins += coin.points();
                state.score += coin.points();
                state.cues.push(Cue::Point);
            }
        }
    }
}

fn score_pipes(state: &mut BattleState) {
    let Some(pipes) = state.pipes.as_mut() else {
        return;
    };
    let passed = pipes.score_passes(state.player.body.x());
    if passed > 0 && state.mode.scores_pipes() {
        state.score += passed;
        state.cues.push(Cue::Point);
    }
}

/// Replace a defeated boss with the next one in the rotation
fn succeed_boss(state: &mut BattleState) -> Transition {
    let defeated = state
        .boss
        .take()
        .map_or(Archetype::for_level(state.boss_level), |b| b.archetype);
    state.cues.push(Cue::Defeat);

    state.boss_level += 1;
    let id = state.next_boss_id();
    let next = Boss::for_level(id, state.boss_level, &state.tuning.bosses, &state.viewport);
    let archetype = next.archetype;
    log::info!(
        "{} arrives (level {}, {} hp)",
        archetype.name(),
        next.level,
        next.max_health
    );
    state.boss = Some(next);

    state.player.projectiles.clear();
    state.player.top_up_weapons();
    state.player.recentre(&state.viewport);
    state.player.boss_target = Some(id);

    Transition::BossSuccession {
        defeated,
        next: archetype,
        level: state.boss_level,
    }
}

fn finish(state: &mut BattleState, reason: TerminateReason) -> FrameOutcome {
    state.outcome = Some(reason);
    log::info!(
        "Battle over after {} frames: {:?} (score {}, coins {})",
        state.frame,
        reason,
        state.score,
        state.coins
    );
    FrameOutcome::Terminate(reason)
}
