//! Interpolated pixel positions for the external renderer.

use crate::state::Actor;

/// Frames a one-tile move takes at base speed.
const FRAMES_PER_TILE: f64 = 30.0;
/// Upper bound on the per-frame step, in pixels.
const MAX_STEP: f64 = 30.0;
/// Speed-up applied to diagonal travel.
const DIAGONAL_SPEED: f64 = 1.41;
/// Lag (in tiles) past which the state speeds up to catch up.
const CATCH_UP_TILES: f64 = 1.1;

/// Where the renderer should currently draw an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub x: f64,
    pub y: f64,
}

impl RenderState {
    /// State already resting on the actor's tile centre.
    pub fn at(actor: &Actor, tile_size: f64) -> Self {
        let (x, y) = actor.pixel_center(tile_size);
        Self { x, y }
    }

    pub fn is_at(&self, target: (f64, f64)) -> bool {
        self.x == target.0 && self.y == target.1
    }

    /// Moves towards `target` by one step scaled by `delta` frames.
    ///
    /// Each axis snaps onto the target once it is closer than a step.
    /// Returns true while the state is still travelling.
    pub fn advance(&mut self, target: (f64, f64), tile_size: f64, delta: f64) -> bool {
        let dx = target.0 - self.x;
        let dy = target.1 - self.y;
        if (dx == 0.0 && dy == 0.0) || delta <= 0.0 {
            return !self.is_at(target);
        }

        let lag = dx.abs().max(dy.abs());
        let mut speed = 1.0;
        if (dx.abs() - dy.abs()).abs() < 0.1 {
            speed = DIAGONAL_SPEED;
        }
        if lag > tile_size * CATCH_UP_TILES {
            speed = lag / (tile_size * CATCH_UP_TILES);
        }

        let step = (tile_size / FRAMES_PER_TILE * speed).min(MAX_STEP) * delta;
        let heading = dy.atan2(dx);
        self.x += step * heading.cos();
        self.y += step * heading.sin();
        if dx.abs() < step {
            self.x = target.0;
        }
        if dy.abs() < step {
            self.y = target.1;
        }
        !self.is_at(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorType, GridVector};

    const TILE: f64 = 64.0;

    #[test]
    fn one_tile_move_arrives_within_thirty_odd_frames() {
        let mut actor = Actor::new(GridVector::new(1, 1), ActorType::new());
        let mut state = RenderState::at(&actor, TILE);
        actor.position = GridVector::new(2, 1);
        let target = actor.pixel_center(TILE);

        let mut frames = 0;
        while state.advance(target, TILE, 1.0) {
            frames += 1;
            assert!(frames < 40, "still travelling after {frames} frames");
        }
        assert!(frames >= 25);
        assert!(state.is_at(target));
    }

    #[test]
    fn long_jumps_catch_up_quickly() {
        let mut actor = Actor::new(GridVector::ZERO, ActorType::new());
        let mut state = RenderState::at(&actor, TILE);
        actor.position = GridVector::new(10, 0);
        let target = actor.pixel_center(TILE);

        state.advance(target, TILE, 1.0);
        let moved = state.x - TILE / 2.0;
        assert!(moved > 15.0 && moved <= MAX_STEP, "moved {moved}");
    }

    #[test]
    fn zero_delta_holds_position() {
        let actor = Actor::new(GridVector::ZERO, ActorType::new());
        let mut state = RenderState::at(&actor, TILE);
        assert!(state.advance((200.0, 32.0), TILE, 0.0));
        assert_eq!(state, RenderState::at(&actor, TILE));
    }
}
