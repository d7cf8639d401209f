//! Adaptive quadrant tree indexing entities by grid position.
//!
//! Every cell is a square with an integer centre and a half-width `h`, covering
//! `(cx - h, cx + h]` on both axes. A cell records the references of its whole
//! subtree; leaves are the cells without children. A leaf splits into four
//! quadrants when it holds more than the configured capacity, and a cell on a
//! removal path collapses its children as soon as its own count drops back to
//! the capacity. The root grows by doubling towards coordinates it does not
//! cover yet.
//!
//! The index holds ids and the position each id was filed at. It never owns
//! the entities: [`SpatialIndex::refresh`] takes a lookup for current positions.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::{GameConfig, SpatialConfig};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, GridVector};

/// Failures of the root growth loop. The index is left as it was before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpatialIndexError {
    #[error("root expansion towards {position} exceeded {expansions} steps")]
    ExpansionCapReached {
        position: GridVector,
        expansions: usize,
    },

    #[error("root expansion towards {position} overflowed the coordinate range")]
    CoordinateOverflow { position: GridVector },
}

impl GameError for SpatialIndexError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ExpansionCapReached { .. } => "SPATIAL_EXPANSION_CAP",
            Self::CoordinateOverflow { .. } => "SPATIAL_COORDINATE_OVERFLOW",
        }
    }
}

/// Child slots, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    fn from_sides(east: bool, south: bool) -> Self {
        match (east, south) {
            (false, false) => Quadrant::NorthWest,
            (true, false) => Quadrant::NorthEast,
            (false, true) => Quadrant::SouthWest,
            (true, true) => Quadrant::SouthEast,
        }
    }

    fn is_east(self) -> bool {
        matches!(self, Quadrant::NorthEast | Quadrant::SouthEast)
    }

    fn is_south(self) -> bool {
        matches!(self, Quadrant::SouthWest | Quadrant::SouthEast)
    }
}

#[derive(Clone, Debug)]
struct QuadCell {
    cx: i64,
    cy: i64,
    half: i64,
    refs: BTreeMap<EntityId, GridVector>,
    children: Option<Box<[QuadCell; 4]>>,
}

impl QuadCell {
    fn new(cx: i64, cy: i64, half: i64) -> Self {
        Self {
            cx,
            cy,
            half,
            refs: BTreeMap::new(),
            children: None,
        }
    }

    fn contains(&self, position: GridVector) -> bool {
        let (x, y) = (i64::from(position.x), i64::from(position.y));
        x > self.cx - self.half
            && x <= self.cx + self.half
            && y > self.cy - self.half
            && y <= self.cy + self.half
    }

    fn quadrant_of(&self, position: GridVector) -> Quadrant {
        Quadrant::from_sides(
            i64::from(position.x) > self.cx,
            i64::from(position.y) > self.cy,
        )
    }

    fn child_for(&self, quadrant: Quadrant) -> QuadCell {
        let offset = self.half / 2;
        let cx = if quadrant.is_east() { self.cx + offset } else { self.cx - offset };
        let cy = if quadrant.is_south() { self.cy + offset } else { self.cy - offset };
        QuadCell::new(cx, cy, offset)
    }

    fn insert(&mut self, id: EntityId, position: GridVector, config: &SpatialConfig) {
        self.refs.insert(id, position);
        let quadrant = self.quadrant_of(position);
        match self.children.as_deref_mut() {
            Some(children) => {
                children[quadrant as usize].insert(id, position, config);
            }
            None => {
                if self.refs.len() > config.cell_capacity && self.half > config.min_half_width {
                    self.split(config);
                }
            }
        }
    }

    fn split(&mut self, config: &SpatialConfig) {
        let mut children = Box::new(Quadrant::ALL.map(|quadrant| self.child_for(quadrant)));
        for (&id, &position) in &self.refs {
            let quadrant = self.quadrant_of(position);
            children[quadrant as usize].insert(id, position, config);
        }
        self.children = Some(children);
    }

    /// Removes `id` (filed at `position`) from this subtree. The first cell on the
    /// path whose count drops to the capacity collapses its children.
    fn remove(&mut self, id: EntityId, position: GridVector, config: &SpatialConfig) -> bool {
        if self.refs.remove(&id).is_none() {
            return false;
        }
        if self.refs.len() <= config.cell_capacity {
            self.children = None;
            return true;
        }
        let quadrant = self.quadrant_of(position);
        if let Some(children) = self.children.as_deref_mut() {
            children[quadrant as usize].remove(id, position, config);
        }
        true
    }

    /// Rewrites the filed position of `id` along the path to its leaf.
    fn update_position(&mut self, id: EntityId, position: GridVector) {
        if let Some(filed) = self.refs.get_mut(&id) {
            *filed = position;
        }
        let quadrant = self.quadrant_of(position);
        if let Some(children) = self.children.as_deref_mut() {
            children[quadrant as usize].update_position(id, position);
        }
    }

    fn leaf_for(&self, position: GridVector) -> &QuadCell {
        match self.children.as_deref() {
            Some(children) => children[self.quadrant_of(position) as usize].leaf_for(position),
            None => self,
        }
    }

    fn collect_range(&self, x: i64, y: i64, radius: i64, out: &mut Vec<EntityId>) {
        let Some(children) = self.children.as_deref() else {
            out.extend(
                self.refs
                    .iter()
                    .filter(|(_, position)| {
                        let (px, py) = (i64::from(position.x), i64::from(position.y));
                        px >= x - radius && px <= x + radius && py >= y - radius && py <= y + radius
                    })
                    .map(|(id, _)| *id),
            );
            return;
        };

        let reaches_east = x + radius > self.cx;
        let reaches_west = x - radius <= self.cx;
        let reaches_south = y + radius > self.cy;
        let reaches_north = y - radius <= self.cy;
        for quadrant in Quadrant::ALL {
            let horizontal = if quadrant.is_east() { reaches_east } else { reaches_west };
            let vertical = if quadrant.is_south() { reaches_south } else { reaches_north };
            if horizontal && vertical {
                children[quadrant as usize].collect_range(x, y, radius, out);
            }
        }
    }

    fn visit_leaves<'a>(&'a self, visit: &mut impl FnMut(&'a QuadCell)) {
        match self.children.as_deref() {
            Some(children) => children.iter().for_each(|child| child.visit_leaves(visit)),
            None => visit(self),
        }
    }

    fn depth(&self) -> usize {
        self.children
            .as_deref()
            .map_or(0, |children| 1 + children.iter().map(QuadCell::depth).max().unwrap_or(0))
    }
}

/// Quadrant tree over entity ids.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    root: QuadCell,
    config: SpatialConfig,
}

impl SpatialIndex {
    pub fn new(config: SpatialConfig) -> Self {
        // Power-of-two half-widths keep every split exact.
        let half = config.initial_half_width.max(1).unsigned_abs().next_power_of_two() as i64;
        Self {
            root: QuadCell::new(0, 0, half),
            config,
        }
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.root.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.refs.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.root.refs.contains_key(&id)
    }

    /// Position `id` is currently filed at.
    pub fn position_of(&self, id: EntityId) -> Option<GridVector> {
        self.root.refs.get(&id).copied()
    }

    /// Files `id` at `position`, growing the root first when needed.
    ///
    /// Adding an id that is already indexed re-files it at the new position.
    pub fn add(&mut self, id: EntityId, position: GridVector) -> Result<(), SpatialIndexError> {
        self.grow_to(position)?;
        if let Some(filed) = self.position_of(id) {
            self.root.remove(id, filed, &self.config);
        }
        self.root.insert(id, position, &self.config);
        Ok(())
    }

    /// Removes `id`. Returns false if it was not indexed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.position_of(id) {
            Some(filed) => self.root.remove(id, filed, &self.config),
            None => false,
        }
    }

    /// Ids filed inside the closed square `[x - radius, x + radius] × [y - radius, y + radius]`.
    pub fn get_all(&self, x: i32, y: i32, radius: i32) -> Vec<EntityId> {
        let mut out = Vec::new();
        if radius >= 0 {
            self.root
                .collect_range(i64::from(x), i64::from(y), i64::from(radius), &mut out);
        }
        out
    }

    /// Re-files entities whose position changed since they were filed.
    ///
    /// `locate` returns the current position of an id, or `None` if the entity
    /// no longer exists (it is then dropped from the index). Entities still
    /// inside their leaf are updated in place; the rest are removed and
    /// re-added. Returns the number of entities re-filed.
    pub fn refresh<F>(&mut self, locate: F) -> Result<usize, SpatialIndexError>
    where
        F: Fn(EntityId) -> Option<GridVector>,
    {
        let mut gone = Vec::new();
        let mut moved = Vec::new();
        for (&id, &filed) in &self.root.refs {
            match locate(id) {
                None => gone.push(id),
                Some(current) if current != filed => moved.push((id, filed, current)),
                Some(_) => {}
            }
        }

        for id in gone {
            self.remove(id);
        }

        let mut refiled = 0;
        for (id, filed, current) in moved {
            if self.root.leaf_for(filed).contains(current) {
                self.root.update_position(id, current);
            } else {
                self.root.remove(id, filed, &self.config);
                if let Err(err) = self.add(id, current) {
                    warn!(%id, %current, %err, "entity dropped from spatial index");
                    return Err(err);
                }
                refiled += 1;
            }
        }
        Ok(refiled)
    }

    /// Number of leaf cells.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.root.visit_leaves(&mut |_| count += 1);
        count
    }

    /// Levels below the root (0 when the root is a leaf).
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    fn grow_to(&mut self, position: GridVector) -> Result<(), SpatialIndexError> {
        let mut expansions = 0;
        while !self.root.contains(position) {
            if expansions >= GameConfig::MAX_EXPANSIONS {
                warn!(%position, expansions, "spatial index expansion cap reached");
                return Err(SpatialIndexError::ExpansionCapReached {
                    position,
                    expansions,
                });
            }
            self.expand_towards(position)?;
            expansions += 1;
        }
        if expansions > 0 {
            debug!(%position, expansions, half = self.root.half, "spatial index root grown");
        }
        Ok(())
    }

    /// Wraps the root in a root of twice the size whose centre moves one
    /// half-width towards `position` on each axis.
    fn expand_towards(&mut self, position: GridVector) -> Result<(), SpatialIndexError> {
        let overflow = SpatialIndexError::CoordinateOverflow { position };
        let half = self.root.half;
        let east = i64::from(position.x) > self.root.cx;
        let south = i64::from(position.y) > self.root.cy;

        let new_half = half.checked_mul(2).ok_or(overflow)?;
        let cx = if east { self.root.cx.checked_add(half) } else { self.root.cx.checked_sub(half) };
        let cy = if south { self.root.cy.checked_add(half) } else { self.root.cy.checked_sub(half) };
        let (cx, cy) = cx.zip(cy).ok_or(overflow)?;

        let mut grown = QuadCell::new(cx, cy, new_half);
        grown.refs = self.root.refs.clone();
        let mut children = Box::new(Quadrant::ALL.map(|quadrant| grown.child_for(quadrant)));

        // The old root sits on the side facing away from the target.
        let old_slot = Quadrant::from_sides(!east, !south);
        children[old_slot as usize] = std::mem::replace(&mut self.root, grown);
        self.root.children = Some(children);
        Ok(())
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(SpatialConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::rng::SeededStream;

    fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
        ids.sort();
        ids
    }

    fn brute_force(
        positions: &BTreeMap<EntityId, GridVector>,
        x: i32,
        y: i32,
        radius: i32,
    ) -> Vec<EntityId> {
        positions
            .iter()
            .filter(|(_, p)| (p.x - x).abs() <= radius && (p.y - y).abs() <= radius)
            .map(|(id, _)| *id)
            .collect()
    }

    fn assert_filed_once(index: &SpatialIndex, positions: &BTreeMap<EntityId, GridVector>) {
        let mut seen: BTreeMap<EntityId, usize> = BTreeMap::new();
        index.root.visit_leaves(&mut |leaf| {
            for (id, filed) in &leaf.refs {
                *seen.entry(*id).or_default() += 1;
                assert!(leaf.contains(*filed), "{id} filed outside its leaf");
                assert_eq!(positions.get(id), Some(filed), "{id} filed at a stale position");
            }
        });
        assert_eq!(seen.len(), positions.len(), "orphaned or stale ids in index");
        assert!(seen.values().all(|count| *count == 1), "duplicate leaf entries");
    }

    #[test]
    fn range_query_is_inclusive() {
        let mut index = SpatialIndex::default();
        index.add(EntityId(1), GridVector::new(2, 2)).unwrap();
        index.add(EntityId(2), GridVector::new(5, 2)).unwrap();
        index.add(EntityId(3), GridVector::new(6, 2)).unwrap();

        assert_eq!(sorted(index.get_all(3, 2, 2)), vec![EntityId(1), EntityId(2)]);
        assert_eq!(index.get_all(0, 0, 0), Vec::<EntityId>::new());
        assert_eq!(index.get_all(0, 0, -1), Vec::<EntityId>::new());
    }

    #[test]
    fn root_grows_towards_far_coordinates() {
        let mut index = SpatialIndex::default();
        index.add(EntityId(1), GridVector::new(1_000, -5_000)).unwrap();
        index.add(EntityId(2), GridVector::new(-70_000, 90_000)).unwrap();
        assert!(index.root.contains(GridVector::new(1_000, -5_000)));
        assert!(index.root.contains(GridVector::new(-70_000, 90_000)));
        assert_eq!(index.get_all(1_000, -5_000, 0), vec![EntityId(1)]);
        assert_eq!(index.get_all(-70_000, 90_000, 3), vec![EntityId(2)]);
    }

    #[test]
    fn extreme_coordinates_are_reachable() {
        let mut index = SpatialIndex::default();
        index.add(EntityId(1), GridVector::new(i32::MAX, i32::MIN)).unwrap();
        assert_eq!(index.get_all(i32::MAX, i32::MIN, 0), vec![EntityId(1)]);
    }

    #[test]
    fn leaves_split_past_capacity_and_collapse_on_removal() {
        let mut index = SpatialIndex::default();
        for i in 0..11 {
            index.add(EntityId(i), GridVector::new(i as i32 * 5 - 25, i as i32 * 3)).unwrap();
        }
        assert!(index.depth() >= 1);
        assert_eq!(index.leaf_count() % 3, 1);

        assert!(index.remove(EntityId(0)));
        assert_eq!(index.depth(), 0);
        assert_eq!(index.leaf_count(), 1);
        assert!(!index.remove(EntityId(0)));
    }

    #[test]
    fn small_cells_do_not_split() {
        let mut index = SpatialIndex::new(SpatialConfig {
            initial_half_width: 8,
            ..SpatialConfig::default()
        });
        for i in 0..20 {
            index.add(EntityId(i), GridVector::new(1, 1)).unwrap();
        }
        assert_eq!(index.depth(), 0);
        assert_eq!(index.get_all(1, 1, 0).len(), 20);
    }

    #[test]
    fn re_adding_moves_the_entity() {
        let mut index = SpatialIndex::default();
        index.add(EntityId(7), GridVector::new(0, 0)).unwrap();
        index.add(EntityId(7), GridVector::new(40, 40)).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get_all(0, 0, 1).is_empty());
        assert_eq!(index.position_of(EntityId(7)), Some(GridVector::new(40, 40)));
    }

    #[test]
    fn refresh_tracks_moved_and_vanished_entities() {
        let mut index = SpatialIndex::default();
        let mut positions = BTreeMap::new();
        for i in 0..30 {
            let position = GridVector::new(i * 4, -i * 3);
            positions.insert(EntityId(i as u32), position);
            index.add(EntityId(i as u32), position).unwrap();
        }

        positions.insert(EntityId(3), GridVector::new(500, 500));
        positions.insert(EntityId(4), GridVector::new(17, -12));
        positions.remove(&EntityId(5));

        let refiled = index.refresh(|id| positions.get(&id).copied()).unwrap();
        assert!(refiled >= 1);
        assert!(!index.contains(EntityId(5)));
        assert_eq!(index.get_all(500, 500, 0), vec![EntityId(3)]);
        assert_filed_once(&index, &positions);
    }

    #[test]
    fn random_operations_match_brute_force() {
        let mut stream = SeededStream::new("quadtree");
        let mut index = SpatialIndex::default();
        let mut positions: BTreeMap<EntityId, GridVector> = BTreeMap::new();
        let coordinate = |stream: &mut SeededStream| stream.next_index(400) as i32 - 200;

        for round in 0..40 {
            for _ in 0..15 {
                let id = EntityId(stream.next_index(120) as u32);
                let position = GridVector::new(coordinate(&mut stream), coordinate(&mut stream));
                index.add(id, position).unwrap();
                positions.insert(id, position);
            }
            for _ in 0..5 {
                let id = EntityId(stream.next_index(120) as u32);
                assert_eq!(index.remove(id), positions.remove(&id).is_some());
            }
            let ids: Vec<EntityId> = positions.keys().copied().collect();
            for id in ids.iter().step_by(3) {
                let nudge = GridVector::new(stream.next_index(21) as i32 - 10, stream.next_index(21) as i32 - 10);
                if let Some(position) = positions.get_mut(id) {
                    *position += nudge;
                }
            }
            index.refresh(|id| positions.get(&id).copied()).unwrap();

            assert_filed_once(&index, &positions);
            for _ in 0..10 {
                let (x, y) = (coordinate(&mut stream), coordinate(&mut stream));
                let radius = stream.next_index(80) as i32;
                assert_eq!(
                    sorted(index.get_all(x, y, radius)),
                    brute_force(&positions, x, y, radius),
                    "round {round}: query ({x}, {y}) r={radius}"
                );
            }
        }

        let all: BTreeSet<EntityId> = index.get_all(0, 0, 10_000).into_iter().collect();
        assert_eq!(all, positions.keys().copied().collect());
    }

    #[test]
    fn errors_are_internal() {
        let err = SpatialIndexError::CoordinateOverflow {
            position: GridVector::ZERO,
        };
        assert_eq!(err.severity(), ErrorSeverity::Internal);
        assert_eq!(err.error_code(), "SPATIAL_COORDINATE_OVERFLOW");
    }
}
