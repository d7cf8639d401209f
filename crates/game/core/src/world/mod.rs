//! Actor registry, zone list and per-tick simulation glue.
//!
//! [`World`] owns every actor and zone. The spatial index and queued tasks
//! refer to actors by [`EntityId`] only, so the actor table is the single
//! source of truth for positions; [`World::update`] re-files anything that
//! moved since the previous tick.
mod hooks;
mod render;
mod snapshot;

pub use hooks::{HookContext, HookRegistry, UpdateHook};
pub use render::RenderState;
pub use snapshot::WorldSnapshot;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::spatial::{SpatialIndex, SpatialIndexError};
use crate::state::{Actor, ActorType, DestroyOutcome, EntityId, GridVector, Tick};
use crate::zone::Zone;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("zone {index} does not exist ({count} zones)")]
    UnknownZone { index: usize, count: usize },

    #[error("world has no current zone")]
    NoCurrentZone,

    #[error("actor {0} appears twice in snapshot")]
    DuplicateActor(EntityId),

    #[error("zone {index} grid does not match its dimensions")]
    MalformedZone { index: usize },

    #[error(transparent)]
    Spatial(#[from] SpatialIndexError),
}

impl GameError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownZone { .. }
            | Self::NoCurrentZone
            | Self::DuplicateActor(_)
            | Self::MalformedZone { .. } => ErrorSeverity::Validation,
            Self::Spatial(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownZone { .. } => "WORLD_UNKNOWN_ZONE",
            Self::NoCurrentZone => "WORLD_NO_CURRENT_ZONE",
            Self::DuplicateActor(_) => "WORLD_DUPLICATE_ACTOR",
            Self::MalformedZone { .. } => "WORLD_MALFORMED_ZONE",
            Self::Spatial(err) => err.error_code(),
        }
    }
}

/// Canonical simulation state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    actors: BTreeMap<EntityId, Actor>,
    render_states: BTreeMap<EntityId, RenderState>,
    zones: Vec<Zone>,
    current_zone: Option<usize>,
    index: SpatialIndex,
    hooks: HookRegistry,
    player: Option<EntityId>,
    next_id: EntityId,
    tick: Tick,
}

impl World {
    pub fn new(config: GameConfig) -> Self {
        Self {
            index: SpatialIndex::new(config.spatial),
            config,
            actors: BTreeMap::new(),
            render_states: BTreeMap::new(),
            zones: Vec::new(),
            current_zone: None,
            hooks: HookRegistry::new(),
            player: None,
            next_id: EntityId::FIRST,
            tick: Tick::ZERO,
        }
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn register_hook(&mut self, hook: Arc<dyn UpdateHook>) {
        self.hooks.register(hook);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Ticks advanced so far.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    // ===== zones =====

    /// Appends a zone. The first zone added becomes the current one.
    pub fn add_zone(&mut self, zone: Zone) -> usize {
        self.zones.push(zone);
        let index = self.zones.len() - 1;
        if self.current_zone.is_none() {
            self.current_zone = Some(index);
        }
        index
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn current_zone_index(&self) -> Option<usize> {
        self.current_zone
    }

    pub fn current_zone(&self) -> Option<&Zone> {
        self.current_zone.and_then(|index| self.zones.get(index))
    }

    pub fn current_zone_mut(&mut self) -> Option<&mut Zone> {
        self.current_zone.and_then(|index| self.zones.get_mut(index))
    }

    pub fn set_current_zone(&mut self, index: usize) -> Result<(), WorldError> {
        if index >= self.zones.len() {
            return Err(WorldError::UnknownZone {
                index,
                count: self.zones.len(),
            });
        }
        self.current_zone = Some(index);
        Ok(())
    }

    // ===== actors =====

    /// Adds an actor under the lowest free id at or after the id counter.
    ///
    /// The first player actor becomes the world's player. Fails only when the
    /// spatial index cannot grow to the actor's position; the actor is then
    /// not added.
    pub fn add_actor(&mut self, mut actor: Actor) -> Result<EntityId, WorldError> {
        while self.actors.contains_key(&self.next_id) {
            self.next_id = self.next_id.next();
        }
        actor.id = self.next_id;
        self.insert_actor(actor)
    }

    fn insert_actor(&mut self, actor: Actor) -> Result<EntityId, WorldError> {
        let id = actor.id;
        self.index.add(id, actor.position)?;
        self.render_states
            .insert(id, RenderState::at(&actor, self.config.tile_size));
        if self.player.is_none() && actor.is_player() {
            info!(%id, position = %actor.position, "player spawned");
            self.player = Some(id);
        } else {
            debug!(%id, position = %actor.position, "actor spawned");
        }
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Removes an actor without reporting a destroy code.
    pub fn remove_actor(&mut self, id: EntityId) -> Option<Actor> {
        let actor = self.actors.remove(&id)?;
        self.render_states.remove(&id);
        self.index.remove(id);
        if self.player == Some(id) {
            self.player = None;
        }
        debug!(%id, "actor removed");
        Some(actor)
    }

    /// Removes an actor and runs its destroy handling with `code`.
    pub fn destroy_actor(&mut self, id: EntityId, code: i32) -> Option<DestroyOutcome> {
        self.remove_actor(id).map(|actor| actor.destroy(code))
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Mutable access to an actor. Position edits are picked up by the next
    /// [`World::update`].
    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Actors in id order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Actor> {
        self.player.and_then(|id| self.actors.get(&id))
    }

    pub fn render_state(&self, id: EntityId) -> Option<&RenderState> {
        self.render_states.get(&id)
    }

    // ===== movement =====

    /// True when `(x, y)` is inside the current zone and its tile does not
    /// collide. Other actors never block.
    pub fn actor_can_move(&self, id: EntityId, x: i32, y: i32) -> bool {
        if !self.actors.contains_key(&id) {
            return false;
        }
        self.current_zone().is_some_and(|zone| {
            zone.contains(x, y) && !zone.get(x, y).properties().collision
        })
    }

    /// Applies a displacement without legality checks and turns the actor
    /// unless its type keeps a fixed facing.
    ///
    /// Returns the Chebyshev length moved, or 0 for unknown actors and
    /// displacements that leave the coordinate range.
    pub fn move_actor(&mut self, id: EntityId, direction: GridVector) -> i32 {
        let Some(actor) = self.actors.get_mut(&id) else {
            return 0;
        };
        let Some(position) = actor.position.checked_add(direction) else {
            warn!(%id, %direction, position = %actor.position, "displacement overflows coordinates");
            return 0;
        };
        actor.position = position;
        if !actor.actor_type.fixed_facing {
            actor.face_dir(direction);
        }
        debug!(%id, %direction, position = %actor.position, facing = %actor.facing, "actor moved");
        direction.chebyshev_len()
    }

    /// Ids of actors filed inside the closed square of `radius` around `(x, y)`.
    pub fn actors_near(&self, x: i32, y: i32, radius: i32) -> Vec<EntityId> {
        self.index.get_all(x, y, radius)
    }

    /// Spawns one map-bound actor for every door tile of the current zone.
    pub fn populate_map_actors(&mut self) -> Result<Vec<EntityId>, WorldError> {
        let zone = self.current_zone().ok_or(WorldError::NoCurrentZone)?;
        let doors: Vec<_> = zone.cells().filter(|(_, tile)| tile.is_door()).collect();

        let mut spawned = Vec::with_capacity(doors.len());
        for (position, tile) in doors {
            let actor = Actor::new(position, ActorType::for_map_tile(tile));
            spawned.push(self.add_actor(actor)?);
        }
        info!(count = spawned.len(), "map actors populated");
        Ok(spawned)
    }

    // ===== simulation =====

    /// Advances the world by `delta` ticks.
    ///
    /// Runs each actor's update hooks, advances the tick counter, recomputes
    /// light from the player in the current zone and re-files moved actors in
    /// the spatial index. A `delta` of 0 performs the refresh without
    /// advancing time.
    pub fn update(&mut self, delta: u64) -> Result<(), WorldError> {
        let context = HookContext {
            zone: self.current_zone.and_then(|index| self.zones.get(index)),
            tick: self.tick,
            delta,
        };
        for actor in self.actors.values_mut() {
            for slot in 0..actor.actor_type.update_hooks.len() {
                let name = &actor.actor_type.update_hooks[slot];
                let Some(hook) = self.hooks.find(name).map(Arc::clone) else {
                    debug!(actor = %actor.id, hook = %name, "unknown update hook skipped");
                    continue;
                };
                if !hook.run(actor, &context) {
                    debug!(actor = %actor.id, hook = hook.name(), "update hook declined");
                }
            }
        }

        self.tick = self.tick + delta;

        let origin = self.player().map(|player| player.position);
        let light = self.config.light;
        if let (Some(origin), Some(zone)) = (origin, self.current_zone_mut()) {
            zone.update_light_from(origin, &light);
        }

        let actors = &self.actors;
        let refiled = self
            .index
            .refresh(|id| actors.get(&id).map(|actor| actor.position))
            .inspect_err(|err| warn!(%err, tick = %self.tick, "spatial index refresh failed"))?;

        debug!(tick = %self.tick, delta, refiled, "world updated");
        Ok(())
    }

    /// Advances every render state towards its actor's tile centre.
    ///
    /// `delta` is measured in frames; render never touches simulation state.
    pub fn render(&mut self, delta: f64) {
        let tile_size = self.config.tile_size;
        for (id, state) in &mut self.render_states {
            if let Some(actor) = self.actors.get(id) {
                state.advance(actor.pixel_center(tile_size), tile_size, delta);
            }
        }
    }

    // ===== persistence =====

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            actors: self.actors.values().cloned().collect(),
            zones: self.zones.clone(),
            current_zone: self.current_zone,
        }
    }

    /// Rebuilds a world from a snapshot, keeping actor ids.
    ///
    /// The spatial index, render states and player are derived again; hooks
    /// are not part of the snapshot and must be registered afterwards.
    pub fn restore(snapshot: WorldSnapshot, config: GameConfig) -> Result<Self, WorldError> {
        let WorldSnapshot {
            actors,
            zones,
            current_zone,
        } = snapshot;
        if let Some(index) = zones.iter().position(|zone| !zone.is_well_formed()) {
            return Err(WorldError::MalformedZone { index });
        }
        if let Some(index) = current_zone.filter(|index| *index >= zones.len()) {
            return Err(WorldError::UnknownZone {
                index,
                count: zones.len(),
            });
        }

        let mut world = World::new(config);
        world.zones = zones;
        world.current_zone = current_zone;
        for actor in actors {
            if world.actors.contains_key(&actor.id) {
                return Err(WorldError::DuplicateActor(actor.id));
            }
            world.insert_actor(actor)?;
        }
        info!(
            actors = world.actors.len(),
            zones = world.zones.len(),
            "world restored"
        );
        Ok(world)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
