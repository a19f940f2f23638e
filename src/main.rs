use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use tsushima_core::config::GameConfig;
use tsushima_core::game::{Game, TsushimaPlugin};
use tsushima_core::host::{Action, ActionState};
use tsushima_core::logging::LoggingPlugin;

/// Frames to simulate before exiting
#[derive(Resource)]
struct RunLimit(u64);

struct Args {
    config: Option<PathBuf>,
    frames: u64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        frames: 3600,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter.next().context("--frames needs a value")?;
                args.frames = value
                    .parse()
                    .with_context(|| format!("invalid frame count {value:?}"))?;
            }
            _ => args.config = Some(PathBuf::from(arg)),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    let plugin = TsushimaPlugin::new(config).context("invalid game config")?;

    App::new()
        .add_plugins(LoggingPlugin)
        // Headless: no window, fixed 60 Hz loop
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(plugin)
        .insert_resource(RunLimit(args.frames))
        .add_systems(PreUpdate, wander_input_system)
        .add_systems(Last, exit_after_limit_system)
        .run();
    Ok(())
}

/// Walk forward, swinging now and then
fn wander_input_system(game: Res<Game>, mut actions: ResMut<ActionState>) {
    let frame = game.stats.frames;
    actions.press(Action::Forward);
    actions.set(Action::Attack, frame % 90 < 5);
    actions.set(Action::Sprint, frame % 600 < 120);
}

fn exit_after_limit_system(game: Res<Game>, limit: Res<RunLimit>, mut exit: EventWriter<AppExit>) {
    if game.stats.frames < limit.0 {
        return;
    }
    let player = game.player.snapshot();
    info!(
        frames = game.stats.frames,
        chunks = game.world.loaded_count(),
        enemies = game.enemies.count(),
        kills = game.stats.kills,
        discoveries = game.stats.discoveries,
        level = player.level,
        "simulation finished"
    );
    info!("player: {}", player.to_json());
    exit.send(AppExit::Success);
}
