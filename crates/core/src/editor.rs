//! In-memory level authoring.
//! This module exists to let tools paint tiles with a cursor and round-trip the result
//! through the JSON level format with the same validation the loader applies.
//! It does not own simulation state; a saved level is loaded through `Level`.

use crate::error::LevelError;
use crate::grid::Grid;
use crate::layout::{
    CHAIR_TILE, FLOOR_TILE, LevelDescription, LevelLayout, OBSTACLE_TILE, TABLE_TILE,
};
use crate::types::{CardinalDirection, TileCoord};

const PAINTABLE: [char; 4] = [FLOOR_TILE, TABLE_TILE, CHAIR_TILE, OBSTACLE_TILE];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelEditor {
    tiles: Grid<char>,
    cursor: TileCoord,
    pass_score: u32,
    fail_score: u32,
    goose_count: u32,
}

impl LevelEditor {
    /// Blank floor of `width` × `depth` tiles.
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            tiles: Grid::new(width, depth, FLOOR_TILE),
            cursor: TileCoord::new(0, 0),
            pass_score: 1,
            fail_score: 1,
            goose_count: 0,
        }
    }

    pub fn from_description(description: &LevelDescription) -> Result<Self, LevelError> {
        Ok(Self {
            tiles: description.authoring_grid()?,
            cursor: TileCoord::new(0, 0),
            pass_score: description.pass_score,
            fail_score: description.fail_score,
            goose_count: description.goose_count,
        })
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn depth(&self) -> usize {
        self.tiles.depth()
    }

    pub fn tile(&self, x: i32, z: i32) -> Option<char> {
        self.tiles.get(TileCoord::new(x, z)).copied()
    }

    pub fn set_tile(&mut self, x: i32, z: i32, tile: char) -> Result<(), LevelError> {
        if !PAINTABLE.contains(&tile) {
            return Err(LevelError::UnknownTile(tile));
        }
        if !self.tiles.set(TileCoord::new(x, z), tile) {
            return Err(LevelError::OutOfBounds { x, z });
        }
        Ok(())
    }

    pub fn set_scores(&mut self, pass_score: u32, fail_score: u32) {
        self.pass_score = pass_score;
        self.fail_score = fail_score;
    }

    pub fn set_goose_count(&mut self, goose_count: u32) {
        self.goose_count = goose_count;
    }

    pub fn cursor(&self) -> TileCoord {
        self.cursor
    }

    /// Moves the cursor one tile; it stays put at the grid edge.
    pub fn move_cursor(&mut self, direction: CardinalDirection) {
        let next = self.cursor.step(direction, 1);
        if self.tiles.in_bounds(next) {
            self.cursor = next;
        }
    }

    pub fn paint(&mut self, tile: char) -> Result<(), LevelError> {
        self.set_tile(self.cursor.x, self.cursor.z, tile)
    }

    pub fn description(&self) -> LevelDescription {
        let tiles = (0..self.depth() as i32)
            .map(|z| (0..self.width() as i32).filter_map(|x| self.tile(x, z)).collect())
            .collect();
        LevelDescription {
            tiles,
            pass_score: self.pass_score,
            fail_score: self.fail_score,
            goose_count: self.goose_count,
        }
    }

    /// Serializes the level after checking it would load.
    pub fn save(&self) -> Result<String, LevelError> {
        let description = self.description();
        LevelLayout::parse(&description)?;
        description.to_json()
    }

    pub fn load(json: &str) -> Result<Self, LevelError> {
        let description = LevelDescription::from_json(json)?;
        LevelLayout::parse(&description)?;
        Self::from_description(&description)
    }
}
