//! Actor records: position, facing, interaction descriptor and data bag.
use std::collections::BTreeMap;

use tracing::info;

use super::{EntityId, GridVector};
use crate::zone::TileCode;

/// Cardinal facing used to pick a sprite orientation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Unit grid vector pointing the way this facing looks.
    pub fn vector(self) -> GridVector {
        match self {
            Facing::Up => GridVector::UP,
            Facing::Down => GridVector::DOWN,
            Facing::Left => GridVector::LEFT,
            Facing::Right => GridVector::RIGHT,
        }
    }
}

/// Named interaction capabilities an actor type may carry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    /// Door state, see [`DoorState`].
    Door,
    /// Description key shown when inspecting the actor.
    Description,
    /// Tile code the actor was spawned from.
    MapTile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum DoorState {
    Open = 1,
    Closed = 2,
}

impl DoorState {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(DoorState::Open),
            2 => Some(DoorState::Closed),
            _ => None,
        }
    }
}

/// Free-form per-actor value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorData {
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
    Texts(Vec<String>),
}

/// Static description of what an actor is and how it behaves.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorType {
    /// Sprite key for the renderer.
    pub sprite: Option<String>,
    /// The first player actor added to a world becomes its player.
    pub is_player: bool,
    pub capabilities: BTreeMap<Capability, i32>,
    /// Names of update hooks run on every world update, in order.
    pub update_hooks: Vec<String>,
    /// Animate even while standing still.
    pub idle_animation: bool,
    /// Moving never changes the facing.
    pub fixed_facing: bool,
}

impl ActorType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(sprite: impl Into<String>) -> Self {
        Self {
            sprite: Some(sprite.into()),
            is_player: true,
            ..Self::default()
        }
    }

    /// Descriptor of an actor bound to a map tile.
    ///
    /// Every map actor records its tile code and uses it as description key;
    /// door tiles additionally carry their [`DoorState`].
    pub fn for_map_tile(tile: TileCode) -> Self {
        let mut actor_type = Self::new()
            .with_capability(Capability::MapTile, tile.0)
            .with_capability(Capability::Description, tile.0);
        if tile == TileCode::DOOR_CLOSED {
            actor_type = actor_type.with_capability(Capability::Door, DoorState::Closed.code());
        } else if tile == TileCode::DOOR_OPEN {
            actor_type = actor_type.with_capability(Capability::Door, DoorState::Open.code());
        }
        actor_type
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    pub fn with_capability(mut self, capability: Capability, value: i32) -> Self {
        self.capabilities.insert(capability, value);
        self
    }

    pub fn with_update_hook(mut self, name: impl Into<String>) -> Self {
        self.update_hooks.push(name.into());
        self
    }

    pub fn with_fixed_facing(mut self) -> Self {
        self.fixed_facing = true;
        self
    }

    pub fn capability(&self, capability: Capability) -> Option<i32> {
        self.capabilities.get(&capability).copied()
    }

    pub fn door_state(&self) -> Option<DoorState> {
        self.capability(Capability::Door).and_then(DoorState::from_code)
    }
}

/// Result of [`Actor::destroy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// Destroyed without a result code.
    Silent,
    /// Destroyed with a reported result code.
    Reported(i32),
}

/// A live entity on the grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    /// Assigned by the world when the actor is added.
    pub id: EntityId,
    pub position: GridVector,
    pub facing: Facing,
    pub actor_type: ActorType,
    pub data: BTreeMap<String, ActorData>,
}

impl Actor {
    /// Destroy code that skips reporting.
    pub const SILENT: i32 = -1;

    pub fn new(position: GridVector, actor_type: ActorType) -> Self {
        Self {
            id: EntityId::FIRST,
            position,
            facing: Facing::default(),
            actor_type,
            data: BTreeMap::new(),
        }
    }

    pub fn is_player(&self) -> bool {
        self.actor_type.is_player
    }

    pub fn sprite(&self) -> Option<&str> {
        self.actor_type.sprite.as_deref()
    }

    pub fn data(&self, key: &str) -> Option<&ActorData> {
        self.data.get(key)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: ActorData) -> Option<ActorData> {
        self.data.insert(key.into(), value)
    }

    /// Turns towards `direction`. Returns true if the facing changed.
    ///
    /// The direction is snapped to one of eight grid directions first. Any
    /// vertical component makes the vertical facing ideal; on a diagonal the
    /// horizontal facing is close enough and is kept to avoid flicker.
    pub fn face_dir(&mut self, direction: GridVector) -> bool {
        let snapped = direction.grid_direction();
        if snapped.is_zero() {
            return false;
        }

        let horizontal = match snapped.x {
            x if x > 0 => Some(Facing::Right),
            x if x < 0 => Some(Facing::Left),
            _ => None,
        };
        let ideal = match snapped.y {
            y if y > 0 => Facing::Down,
            y if y < 0 => Facing::Up,
            _ => match horizontal {
                Some(facing) => facing,
                None => return false,
            },
        };

        let acceptable = snapped.y != 0 && horizontal == Some(self.facing);
        if acceptable || ideal == self.facing {
            return false;
        }
        self.facing = ideal;
        true
    }

    /// Pixel coordinates of the centre of the actor's tile.
    pub fn pixel_center(&self, tile_size: f64) -> (f64, f64) {
        (
            f64::from(self.position.x) * tile_size + tile_size / 2.0,
            f64::from(self.position.y) * tile_size + tile_size / 2.0,
        )
    }

    /// Runs destruction handling for a result code.
    ///
    /// [`Actor::SILENT`] destroys quietly; any other code is reported.
    pub fn destroy(&self, code: i32) -> DestroyOutcome {
        if code == Self::SILENT {
            return DestroyOutcome::Silent;
        }
        info!(actor = %self.id, code, position = %self.position, "actor destroyed");
        DestroyOutcome::Reported(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_after(start: Facing, direction: (i32, i32)) -> (Facing, bool) {
        let mut actor = Actor::new(GridVector::ZERO, ActorType::new());
        actor.facing = start;
        let turned = actor.face_dir(direction.into());
        (actor.facing, turned)
    }

    #[test]
    fn new_actors_face_down() {
        let actor = Actor::new(GridVector::new(3, 4), ActorType::player("hero"));
        assert_eq!(actor.facing, Facing::Down);
        assert!(actor.is_player());
        assert_eq!(actor.sprite(), Some("hero"));
    }

    #[test]
    fn straight_moves_turn_to_their_axis() {
        assert_eq!(facing_after(Facing::Down, (1, 0)), (Facing::Right, true));
        assert_eq!(facing_after(Facing::Right, (-3, 0)), (Facing::Left, true));
        assert_eq!(facing_after(Facing::Left, (0, -1)), (Facing::Up, true));
        assert_eq!(facing_after(Facing::Up, (0, -2)), (Facing::Up, false));
    }

    #[test]
    fn diagonal_keeps_adjacent_horizontal_facing() {
        assert_eq!(facing_after(Facing::Right, (1, 1)), (Facing::Right, false));
        assert_eq!(facing_after(Facing::Left, (-1, -1)), (Facing::Left, false));
        assert_eq!(facing_after(Facing::Left, (1, 1)), (Facing::Down, true));
        assert_eq!(facing_after(Facing::Up, (2, 2)), (Facing::Down, true));
    }

    #[test]
    fn shallow_vectors_snap_before_facing() {
        // (4, 1) snaps to pure right.
        assert_eq!(facing_after(Facing::Down, (4, 1)), (Facing::Right, true));
        assert_eq!(facing_after(Facing::Down, (0, 0)), (Facing::Down, false));
    }

    #[test]
    fn map_tile_descriptors() {
        let door = ActorType::for_map_tile(TileCode::DOOR_CLOSED);
        assert_eq!(door.door_state(), Some(DoorState::Closed));
        assert_eq!(door.capability(Capability::MapTile), Some(TileCode::DOOR_CLOSED.0));
        assert_eq!(door.capability(Capability::Description), Some(TileCode::DOOR_CLOSED.0));

        let open = ActorType::for_map_tile(TileCode::DOOR_OPEN);
        assert_eq!(open.door_state(), Some(DoorState::Open));

        let window = ActorType::for_map_tile(TileCode::WINDOW);
        assert_eq!(window.door_state(), None);
    }

    #[test]
    fn destroy_codes() {
        let actor = Actor::new(GridVector::ZERO, ActorType::new());
        assert_eq!(actor.destroy(Actor::SILENT), DestroyOutcome::Silent);
        assert_eq!(actor.destroy(3), DestroyOutcome::Reported(3));
    }

    #[test]
    fn pixel_center_is_tile_middle() {
        let actor = Actor::new(GridVector::new(2, 1), ActorType::new());
        assert_eq!(actor.pixel_center(64.0), (160.0, 96.0));
    }

    #[test]
    fn data_bag_round_trips_values() {
        let mut actor = Actor::new(GridVector::ZERO, ActorType::new());
        actor.set_data("hp", ActorData::Number(7.0));
        actor.set_data("tags", ActorData::Texts(vec!["undead".into()]));
        assert_eq!(actor.data("hp"), Some(&ActorData::Number(7.0)));
        assert_eq!(
            actor.set_data("hp", ActorData::Number(6.0)),
            Some(ActorData::Number(7.0))
        );
        assert!(actor.data("missing").is_none());
    }
}
