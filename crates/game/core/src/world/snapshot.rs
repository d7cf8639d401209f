use crate::state::Actor;
use crate::zone::Zone;

/// Everything a persistence layer needs to rebuild a [`World`](super::World).
///
/// Derived data (spatial index, render states, player id) is left out and
/// rebuilt by [`World::restore`](super::World::restore). No on-disk format is
/// implied; with the `serde` feature the snapshot serializes like any other
/// model type.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSnapshot {
    /// Actors in id order, ids included.
    pub actors: Vec<Actor>,
    pub zones: Vec<Zone>,
    pub current_zone: Option<usize>,
}
