//! Level authoring format and its load-time validation.
//! This module exists to turn a character tilemap into table, chair and obstacle
//! placements plus the wall grid, rejecting malformed maps before any simulation runs.
//! It does not own spawning of characters or geese.

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::grid::{CollisionGrid, Grid};
use crate::types::{CardinalDirection, TileCoord, TileKind, TileRect};

pub const TABLE_TILE: char = 't';
pub const CHAIR_TILE: char = 'c';
pub const OBSTACLE_TILE: char = 'b';
pub const FLOOR_TILE: char = '.';

/// Serialized level: rows of tile characters plus scoring metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDescription {
    pub tiles: Vec<String>,
    pub pass_score: u32,
    pub fail_score: u32,
    pub goose_count: u32,
}

impl LevelDescription {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn authoring_grid(&self) -> Result<Grid<char>, LevelError> {
        let rows: Vec<Vec<char>> = self.tiles.iter().map(|row| row.chars().collect()).collect();
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(LevelError::EmptyGrid);
        }
        if let Some((row, found)) =
            rows.iter().map(Vec::len).enumerate().find(|(_, len)| *len != expected)
        {
            return Err(LevelError::RaggedRow { row, expected, found });
        }
        Grid::from_rows(rows).ok_or(LevelError::EmptyGrid)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChairPlacement {
    pub tile: TileCoord,
    pub facing: CardinalDirection,
    /// Index into [`LevelLayout::tables`].
    pub table: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    pub collision: CollisionGrid,
    pub tables: Vec<TileRect>,
    pub chairs: Vec<ChairPlacement>,
    pub obstacles: Vec<TileCoord>,
}

impl LevelLayout {
    pub fn parse(description: &LevelDescription) -> Result<Self, LevelError> {
        if description.pass_score == 0 || description.fail_score == 0 {
            return Err(LevelError::InvalidScoreThreshold);
        }
        let authoring = description.authoring_grid()?;
        let is_table = |tile: &char| *tile == TABLE_TILE;

        let tables = authoring.group_tiles_to_rectangles(is_table);

        let mut chairs = Vec::new();
        for tile in authoring.tile_coords(|t| *t == CHAIR_TILE) {
            let facing = authoring
                .nearest_tile_direction(tile, is_table)
                .ok_or(LevelError::ChairWithoutTable { x: tile.x, z: tile.z })?;
            let table = authoring
                .nearest_tile_in_direction(tile, facing, is_table)
                .and_then(|(table_tile, _)| tables.iter().position(|r| r.contains(table_tile)))
                .ok_or(LevelError::ChairWithoutTable { x: tile.x, z: tile.z })?;
            chairs.push(ChairPlacement { tile, facing, table });
        }

        let obstacles = authoring.tile_coords(|t| *t == OBSTACLE_TILE);

        let mut collision =
            CollisionGrid::new(authoring.width(), authoring.depth(), TileKind::Open);
        for coord in authoring.tile_coords(|t| matches!(*t, TABLE_TILE | CHAIR_TILE | OBSTACLE_TILE))
        {
            collision.set(coord, TileKind::Wall);
        }

        Ok(Self { collision, tables, chairs, obstacles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(rows: &[&str]) -> LevelDescription {
        LevelDescription {
            tiles: rows.iter().map(|row| (*row).to_string()).collect(),
            pass_score: 3,
            fail_score: 3,
            goose_count: 1,
        }
    }

    #[test]
    fn chairs_face_and_belong_to_nearest_table() {
        let layout = LevelLayout::parse(&description(&[
            ".......", //
            ".ctt.b.",
            "..tt...",
            "..c....",
            ".....t.",
            ".....c.",
        ]))
        .expect("layout");

        assert_eq!(layout.tables.len(), 2);
        assert_eq!(layout.chairs.len(), 3);
        assert_eq!(layout.chairs[0].facing, CardinalDirection::Right);
        assert_eq!(layout.chairs[0].table, 0);
        assert_eq!(layout.chairs[1].facing, CardinalDirection::Up);
        assert_eq!(layout.chairs[1].table, 0);
        assert_eq!(layout.chairs[2].facing, CardinalDirection::Up);
        assert_eq!(layout.chairs[2].table, 1);
        assert_eq!(layout.obstacles, vec![TileCoord::new(5, 1)]);
        assert!(layout.collision.is_wall(TileCoord::new(1, 1)));
        assert!(layout.collision.is_wall(TileCoord::new(5, 1)));
        assert!(!layout.collision.is_wall(TileCoord::new(0, 0)));
    }

    #[test]
    fn chair_without_table_is_a_load_error() {
        let err = LevelLayout::parse(&description(&["c..", "...", "..t"])).unwrap_err();
        assert!(matches!(err, LevelError::ChairWithoutTable { x: 0, z: 0 }));
    }

    #[test]
    fn ragged_and_empty_maps_are_rejected() {
        assert!(matches!(
            LevelLayout::parse(&description(&["...", ".."])),
            Err(LevelError::RaggedRow { row: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(LevelLayout::parse(&description(&[])), Err(LevelError::EmptyGrid)));
    }

    #[test]
    fn zero_thresholds_are_rejected() {
        let mut level = description(&["..."]);
        level.fail_score = 0;
        assert!(matches!(LevelLayout::parse(&level), Err(LevelError::InvalidScoreThreshold)));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(LevelDescription::from_json("{\"tiles\": ["), Err(LevelError::Json(_))));
    }
}
