//! Shared fixtures for the `level` test suites.

use super::*;

/// Two single-tile tables with two chairs each; the player spawns at (1.5, 1.5).
pub(super) fn party(pass: u32, fail: u32) -> LevelDescription {
    LevelDescription {
        tiles: [
            "..........", //
            "..........",
            "..ct...ct.",
            "...c....c.",
            "..........",
            "..........",
        ]
        .iter()
        .map(|row| (*row).to_string())
        .collect(),
        pass_score: pass,
        fail_score: fail,
        goose_count: 0,
    }
}

pub(super) fn in_progress(pass: u32, fail: u32) -> Level {
    let mut level = Level::new(&party(pass, fail), SimulationConfig::default(), 3).expect("level");
    level.update(level.config().intro_duration + 0.01);
    assert_eq!(level.state(), LevelState::InProgress);
    level
}

/// Places the player at `position` looking along `facing`.
pub(super) fn stand(level: &mut Level, position: Vec2, facing: CardinalDirection) {
    let player = level.world_mut().player_mut();
    player.position = position;
    player.facing = facing.to_vec2().angle();
}

pub(super) fn chair_at(level: &Level, x: i32, z: i32) -> ChairId {
    level
        .world()
        .chairs
        .iter()
        .find(|(_, chair)| chair.tile == TileCoord::new(x, z))
        .map(|(id, _)| id)
        .expect("chair at tile")
}
