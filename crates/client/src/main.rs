//! Headless dungeon driver.
//!
//! Generates a zone from the configured seed, spawns the player, replays a
//! move script through the scheduler at its real-time pace and prints the
//! resulting map.
//!
//! ```bash
//! # Walk right twice, then diagonally down-right (numpad 3)
//! DUNGEON_SEED=crypt cargo run -p dungeon-client -- rr3
//! ```
//!
//! Script characters: `u`/`d`/`l`/`r` for the cardinal steps, or numpad
//! digits `1`-`9` (`5` waits a tick).
mod ascii;

use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use game_core::{ActorType, GridVector};
use runtime::{RuntimeConfig, Simulation};

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::from_env();
    let script = std::env::args().nth(1).unwrap_or_default();
    let moves = parse_script(&script)?;

    tracing::info!(seed = %config.seed, width = config.zone_width, height = config.zone_height, "starting simulation");
    let mut simulation = Simulation::new(config);
    simulation.generate_default_zone()?;
    simulation.world_mut().populate_map_actors()?;
    let player = simulation.spawn_player(ActorType::player("player"))?;

    for step in moves {
        match step {
            Some(direction) => simulation.request_player_move(direction)?,
            None => simulation.scheduler_mut().request_update_tick(1),
        }
    }

    while simulation.scheduler().pending_requests() > 0 {
        if let Some(report) = simulation.frame(1.0)? {
            tracing::debug!(ticks = report.ticks, tasks = report.tasks_executed, "tick processed");
        }
        thread::sleep(FRAME);
    }

    if let Some(actor) = simulation.world().actor(player) {
        tracing::info!(position = %actor.position, facing = %actor.facing, tick = %simulation.world().tick(), "script finished");
    }
    print!("{}", ascii::render(simulation.world()));
    Ok(())
}

/// Parses a move script; `None` entries are waits.
fn parse_script(script: &str) -> Result<Vec<Option<GridVector>>> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            let step = match c.to_ascii_lowercase() {
                'u' | '8' => GridVector::UP,
                'd' | '2' => GridVector::DOWN,
                'l' | '4' => GridVector::LEFT,
                'r' | '6' => GridVector::RIGHT,
                '7' => GridVector::new(-1, -1),
                '9' => GridVector::new(1, -1),
                '1' => GridVector::new(-1, 1),
                '3' => GridVector::new(1, 1),
                '5' => return Ok(None),
                other => bail!("unknown move {other:?} in script"),
            };
            Ok(Some(step))
        })
        .collect()
}
