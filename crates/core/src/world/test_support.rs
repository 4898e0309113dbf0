//! Shared fixtures for the `world` submodule test suites.

use super::*;
use crate::catalog::Topic;
use crate::layout::{LevelDescription, LevelLayout};

pub(crate) fn parse(rows: &[&str]) -> LevelLayout {
    let description = LevelDescription {
        tiles: rows.iter().map(|row| (*row).to_string()).collect(),
        pass_score: 3,
        fail_score: 3,
        goose_count: 0,
    };
    LevelLayout::parse(&description).expect("fixture layout")
}

/// Two single-tile tables with two chairs each.
pub(crate) fn open_two_table_rows() -> [&'static str; 6] {
    [
        "..........", //
        "..........",
        "..ct...ct.",
        "...c....c.",
        "..........",
        "..........",
    ]
}

fn world_from(rows: &[&str]) -> (World, Vec<ChairId>) {
    let world = World::from_layout(&parse(rows), TopicCatalog::default(), 17).expect("world");
    let chairs = world.chairs.keys().collect();
    (world, chairs)
}

pub(crate) fn two_chair_world() -> (World, Vec<ChairId>) {
    world_from(&[
        "......", //
        "......",
        "..ct..",
        "...c..",
        "......",
    ])
}

pub(crate) fn four_chair_world() -> (World, Vec<ChairId>) {
    world_from(&[
        ".....", //
        "..c..",
        ".ctc.",
        "..c..",
        ".....",
    ])
}

pub(crate) fn only_table(world: &World) -> TableId {
    world.tables.keys().next().expect("fixture has a table")
}

/// Two seated guests with a live topic.
pub(crate) fn talking_table(config: &SimulationConfig) -> (World, Vec<ChairId>, TableId) {
    let (mut world, chairs) = two_chair_world();
    for chair in &chairs {
        world.spawn_guest_on(*chair).expect("guest");
    }
    let table = only_table(&world);
    assert!(world.try_set_topic(table, config));
    (world, chairs, table)
}

pub(crate) fn small_catalog(count: usize) -> TopicCatalog {
    TopicCatalog::new(
        (0..count)
            .map(|i| Topic {
                name: format!("Topic {i}"),
                controversy: 0.5,
                lines: vec![format!("Line {i}")],
            })
            .collect(),
    )
}

/// Open field with no furniture; the player stands at (1.5, 1.5).
pub(crate) fn open_field(width: usize, depth: usize) -> World {
    let row = ".".repeat(width);
    let rows: Vec<&str> = (0..depth).map(|_| row.as_str()).collect();
    World::from_layout(&parse(&rows), TopicCatalog::default(), 23).expect("world")
}

pub(crate) fn add_goose(world: &mut World, tile: TileCoord) -> GooseId {
    let goose = Goose::new(tile.center(), &mut world.rng);
    let id = world.geese.insert(goose);
    world.geese[id].id = id;
    id
}
