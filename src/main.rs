//! Flappy Combat headless runner
//!
//! Drives a boss battle with a simple autopilot and logs what happens.
//!
//! Usage: `flappy-combat [TUNING.json] [--seed N] [--frames N] [--mode MODE]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use clap::Parser;
    use flappy_combat::Settings;
    use flappy_combat::Tuning;
    use flappy_combat::audio::{CueMixer, LogBackend};
    use flappy_combat::consts::FRAME_DT;
    use flappy_combat::sim::{BattleState, FrameOutcome, tick};

    env_logger::init();
    log::info!("Flappy Combat (headless) starting...");

    let args = Args::parse();
    let tuning = match &args.tuning {
        Some(path) => Tuning::from_file(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    let mut state = BattleState::new(args.mode.into(), args.seed, tuning);
    let mut mixer = CueMixer::new(LogBackend::default(), &Settings::default());
    let mut bosses_defeated = 0u32;

    for _ in 0..args.frames {
        let input = autopilot(&state);
        let outcome = tick(&mut state, &input, FRAME_DT);
        mixer.play_all(state.drain_cues());

        match outcome {
            FrameOutcome::Continue => {}
            FrameOutcome::Transition(transition) => {
                bosses_defeated += 1;
                log::info!("{transition:?}");
            }
            FrameOutcome::Terminate(reason) => {
                log::info!("Terminated: {reason:?}");
                break;
            }
        }
    }

    log::info!(
        "Finished at frame {}: score {}, {} bosses defeated, {} cues played",
        state.frame,
        state.score,
        bosses_defeated,
        mixer.backend().played
    );
    println!("{}", state.snapshot().to_json());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host; there is no standalone web runner
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug)]
#[command(name = "flappy-combat")]
#[command(about = "Run a headless flappy-combat battle under a simple autopilot")]
struct Args {
    /// Tuning JSON to load instead of the built-in balance tables
    tuning: Option<std::path::PathBuf>,

    /// Seed for the battle RNG
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Frames to simulate before stopping
    #[arg(long, default_value_t = 30 * 120)]
    frames: u64,

    #[arg(long, value_enum, default_value_t = CliMode::Boss)]
    mode: CliMode,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliMode {
    Classic,
    Timed,
    Reverse,
    Boss,
    Coin,
}

#[cfg(not(target_arch = "wasm32"))]
impl From<CliMode> for flappy_combat::sim::GameMode {
    fn from(value: CliMode) -> Self {
        use flappy_combat::sim::GameMode;

        match value {
            CliMode::Classic => GameMode::Classic,
            CliMode::Timed => GameMode::Timed,
            CliMode::Reverse => GameMode::Reverse,
            CliMode::Boss => GameMode::Boss,
            CliMode::Coin => GameMode::Coin,
        }
    }
}

/// Flap to hold the bird level with the boss (or mid-screen), fire constantly
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &flappy_combat::sim::BattleState) -> flappy_combat::sim::FrameInput {
    use flappy_combat::sim::{FrameInput, InputEvent, PlayerMode, Positioned};

    let bird = state.player.body();
    let aim_y = state
        .boss
        .as_ref()
        .map_or(state.viewport.floor_y / 2.0, |b| b.body().center().y);

    let mut events = Vec::new();
    let drifting_off = match state.player.mode {
        PlayerMode::Reverse => bird.center().y < aim_y && state.player.vel_y < 0.0,
        _ => bird.center().y > aim_y && state.player.vel_y > 0.0,
    };
    if drifting_off {
        events.push(InputEvent::Flap);
    }
    if state.boss.is_some() {
        // One weapon per archetype in the rotation
        let slot = (state.boss_level as usize) % state.player.weapons.len();
        if state.player.selected != slot {
            events.push(InputEvent::SelectWeapon(slot));
        }
        events.push(InputEvent::Shoot);
    }
    FrameInput { events }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use clap::Parser;
    use flappy_combat::sim::GameMode;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["flappy-combat"]).unwrap();
        assert!(args.tuning.is_none());
        assert_eq!(args.seed, 42);
        assert_eq!(args.frames, 3600);
        assert_eq!(GameMode::from(args.mode), GameMode::Boss);
    }

    #[test]
    fn test_args_flags_and_path() {
        let args = Args::try_parse_from([
            "flappy-combat",
            "balance.json",
            "--seed",
            "9",
            "--frames",
            "10",
            "--mode",
            "reverse",
        ])
        .unwrap();
        assert_eq!(
            args.tuning.as_deref(),
            Some(std::path::Path::new("balance.json"))
        );
        assert_eq!(args.seed, 9);
        assert_eq!(args.frames, 10);
        assert_eq!(GameMode::from(args.mode), GameMode::Reverse);
    }

    #[test]
    fn test_args_rejects_extra_paths_and_bad_modes() {
        assert!(Args::try_parse_from(["flappy-combat", "a.json", "b.json"]).is_err());
        assert!(Args::try_parse_from(["flappy-combat", "--mode", "arcade"]).is_err());
        let help = Args::try_parse_from(["flappy-combat", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
