//! Plain-text rendering of the current zone.
use game_core::{GridVector, TileCode, UNLIT, WallShape, World};

/// Renders the current zone one character per tile.
///
/// Actors draw over tiles (`@` for the player, `&` for anything else). Walls
/// pick a glyph from their wall shape; floor shows `.` when lit and a blank
/// when the last light pass left it dark.
pub fn render(world: &World) -> String {
    let Some(zone) = world.current_zone() else {
        return String::from("(no zone)\n");
    };

    let mut out = String::with_capacity((zone.width() as usize + 1) * zone.height() as usize);
    for y in 0..zone.height() as i32 {
        for x in 0..zone.width() as i32 {
            out.push(glyph(world, GridVector::new(x, y)));
        }
        out.push('\n');
    }
    out
}

fn glyph(world: &World, at: GridVector) -> char {
    if let Some(id) = world.actors_near(at.x, at.y, 0).first() {
        return if world.player_id() == Some(*id) { '@' } else { '&' };
    }

    let Some(zone) = world.current_zone() else {
        return ' ';
    };
    let tile = zone.get(at.x, at.y);
    if tile.is_wall() {
        return match zone.wall_direction(at.x, at.y) {
            Some(WallShape::Ud) => '-',
            Some(WallShape::Lr) => '|',
            Some(WallShape::Pillar) => 'o',
            Some(WallShape::None) => ' ',
            _ => '#',
        };
    }

    let light = zone.get_light(at.x, at.y);
    match tile {
        TileCode::DOOR_CLOSED | TileCode::DOOR_OPEN => '+',
        TileCode::WINDOW => '"',
        _ if light > 0.0 && light != UNLIT => '.',
        _ => ' ',
    }
}

#[cfg(test)]
mod tests {
    use game_core::{Actor, ActorType, Zone};

    use super::*;

    #[test]
    fn renders_player_walls_and_light() {
        let mut world = World::default();
        let mut zone = Zone::new(5, 3);
        for x in 0..5 {
            zone.set(x, 1, TileCode::WALL);
        }
        world.add_zone(zone);
        world
            .add_actor(Actor::new(GridVector::new(2, 0), ActorType::player("hero")))
            .unwrap();
        world.update(0).unwrap();

        let text = render(&world);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], "..@..");
        assert_eq!(rows[1], "-----");
        assert_eq!(rows[2], "     ");
    }

    #[test]
    fn no_zone_placeholder() {
        assert_eq!(render(&World::default()), "(no zone)\n");
    }
}
