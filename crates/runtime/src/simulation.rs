//! Single owner of all simulation state.
//!
//! [`Simulation`] keeps the world, the scheduler and the seeded stream in one
//! place so nothing else holds mutable simulation state. It is driven by
//! polling [`Simulation::frame`] once per rendered frame.
use game_core::{ActorType, EntityId, GridVector, SeededStream, World, WorldError, Zone};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::scheduler::{Scheduler, UpdateReport};

pub struct Simulation<C = SystemClock> {
    config: RuntimeConfig,
    world: World,
    scheduler: Scheduler<C>,
    stream: SeededStream,
}

impl Simulation<SystemClock> {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> Simulation<C> {
    pub fn with_clock(config: RuntimeConfig, clock: C) -> Self {
        let world = World::new(config.game_config.clone());
        let scheduler = Scheduler::new(clock, config.request_delay);
        let stream = SeededStream::new(&config.seed);
        Self {
            config,
            world,
            scheduler,
            stream,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<C> {
        &mut self.scheduler
    }

    /// Seed string of the zone at `index`.
    pub fn zone_seed(&self, index: usize) -> String {
        format!("{}/{}", self.config.seed, index)
    }

    /// Generates a maze zone and appends it to the world.
    ///
    /// The zone seed is derived from the simulation seed and the zone's index,
    /// so a given configuration always produces the same zone sequence. A maze
    /// that hit its iteration cap is kept as carved; a start outside the zone
    /// is an error and adds nothing.
    pub fn generate_zone(&mut self, width: u32, height: u32) -> Result<usize> {
        let index = self.world.zones().len();
        let seed = self.zone_seed(index);
        let mut zone = Zone::new(width, height);
        match zone.create_maze_with(&seed, &self.config.game_config.maze) {
            Ok(report) => info!(
                index,
                seed = %seed,
                width,
                height,
                open_cells = report.open_cells,
                loops = report.loops,
                digest = %hex::encode(zone.layout_digest()),
                "zone generated"
            ),
            Err(err @ game_core::GenerationError::StartOutOfBounds { .. }) => {
                return Err(err.into());
            }
            // Already reported by the generator; the partial maze stays usable.
            Err(game_core::GenerationError::IterationCapReached { .. }) => {}
        }
        Ok(self.world.add_zone(zone))
    }

    /// Generates a zone with the configured dimensions.
    pub fn generate_default_zone(&mut self) -> Result<usize> {
        self.generate_zone(self.config.zone_width, self.config.zone_height)
    }

    /// Adds a player actor on a walkable cell of the current zone picked by
    /// the seeded stream, then refreshes the world so light is computed.
    pub fn spawn_player(&mut self, actor_type: ActorType) -> Result<EntityId> {
        let zone = self
            .world
            .current_zone()
            .ok_or(WorldError::NoCurrentZone)?;
        let open: Vec<GridVector> = zone
            .cells()
            .filter(|(_, tile)| !tile.properties().collision)
            .map(|(position, _)| position)
            .collect();
        let position = if open.is_empty() {
            self.config.game_config.maze.start
        } else {
            open[self.stream.next_index(open.len())]
        };

        let mut actor_type = actor_type;
        actor_type.is_player = true;
        let id = self
            .world
            .add_actor(game_core::Actor::new(position, actor_type))?;
        self.world.update(0)?;
        Ok(id)
    }

    /// Queues a player move and the tick that will apply it.
    pub fn request_player_move(&mut self, direction: GridVector) -> Result<()> {
        let player = self.world.player_id().ok_or(RuntimeError::NoPlayer)?;
        self.scheduler.send_actor_move_request(player, direction);
        self.scheduler.request_update_tick(1);
        Ok(())
    }

    /// One frame: let the scheduler act if it is due, then interpolate render
    /// states by `render_delta` frames.
    pub fn frame(&mut self, render_delta: f64) -> Result<Option<UpdateReport>> {
        let report = self.scheduler.update(&mut self.world)?;
        self.world.render(render_delta);
        Ok(report)
    }
}
