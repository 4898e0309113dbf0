//! Tile grid storage and the spatial queries the simulation runs against it.
//! This module exists to keep every tile-space lookup in one deterministic place.
//! It does not own movement resolution or any actor state.

use serde::{Deserialize, Serialize};

use crate::types::{CardinalDirection, TileCoord, TileKind, TileRect};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    depth: usize,
    tiles: Vec<T>,
}

/// Wall/open grid that movement and sight lines are resolved against.
pub type CollisionGrid = Grid<TileKind>;

impl<T: Clone> Grid<T> {
    pub fn new(width: usize, depth: usize, fill: T) -> Self {
        Self { width, depth, tiles: vec![fill; width * depth] }
    }
}

impl<T> Grid<T> {
    /// Builds a grid from row-major rows. Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let depth = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let tiles = rows.into_iter().flatten().collect();
        Some(Self { width, depth, tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0
            && coord.z >= 0
            && (coord.x as usize) < self.width
            && (coord.z as usize) < self.depth
    }

    pub fn get(&self, coord: TileCoord) -> Option<&T> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.tiles.get(self.index(coord))
    }

    pub fn set(&mut self, coord: TileCoord, tile: T) -> bool {
        if !self.in_bounds(coord) {
            return false;
        }
        let idx = self.index(coord);
        self.tiles[idx] = tile;
        true
    }

    /// Tile containing the grid-space point `(x, z)`.
    pub fn tile_at(x: f32, z: f32) -> TileCoord {
        TileCoord { x: x.floor() as i32, z: z.floor() as i32 }
    }

    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.depth).flat_map(move |z| {
            (0..self.width).map(move |x| TileCoord { x: x as i32, z: z as i32 })
        })
    }

    /// Number of contiguous non-wall tiles from `origin` (exclusive) until a wall or the
    /// grid edge, for each direction in [`CardinalDirection::ALL`] order.
    pub fn distances_by_cardinal_direction(
        &self,
        origin: TileCoord,
        is_wall: impl Fn(&T) -> bool,
    ) -> [u32; 4] {
        let mut distances = [0_u32; 4];
        for direction in CardinalDirection::ALL {
            let mut distance = 0_u32;
            let mut cursor = origin.step(direction, 1);
            while let Some(tile) = self.get(cursor) {
                if is_wall(tile) {
                    break;
                }
                distance += 1;
                cursor = cursor.step(direction, 1);
            }
            distances[direction.index()] = distance;
        }
        distances
    }

    /// Every coordinate whose tile matches, in row-major order.
    pub fn tile_coords(&self, matches: impl Fn(&T) -> bool) -> Vec<TileCoord> {
        self.coords().filter(|coord| self.get(*coord).is_some_and(&matches)).collect()
    }

    /// Covers every matching tile with disjoint rectangles, greedily growing each one
    /// right then down from its top-left tile.
    pub fn group_tiles_to_rectangles(&self, matches: impl Fn(&T) -> bool) -> Vec<TileRect> {
        let mut claimed = vec![false; self.tiles.len()];
        let free = |coord: TileCoord, claimed: &[bool]| {
            self.get(coord).is_some_and(&matches) && !claimed[self.index(coord)]
        };

        let mut rects = Vec::new();
        for start in self.coords() {
            if !free(start, &claimed) {
                continue;
            }

            let mut width = 1;
            while free(TileCoord { x: start.x + width, z: start.z }, &claimed) {
                width += 1;
            }

            let mut depth = 1;
            'grow: loop {
                for dx in 0..width {
                    if !free(TileCoord { x: start.x + dx, z: start.z + depth }, &claimed) {
                        break 'grow;
                    }
                }
                depth += 1;
            }

            for dz in 0..depth {
                for dx in 0..width {
                    let idx = self.index(TileCoord { x: start.x + dx, z: start.z + dz });
                    claimed[idx] = true;
                }
            }
            rects.push(TileRect { left: start.x, top: start.z, width, depth });
        }
        rects
    }

    /// First matching tile along `direction`, with its step distance from `from`.
    pub fn nearest_tile_in_direction(
        &self,
        from: TileCoord,
        direction: CardinalDirection,
        matches: impl Fn(&T) -> bool,
    ) -> Option<(TileCoord, u32)> {
        let mut steps = 1_u32;
        let mut cursor = from.step(direction, 1);
        while let Some(tile) = self.get(cursor) {
            if matches(tile) {
                return Some((cursor, steps));
            }
            steps += 1;
            cursor = cursor.step(direction, 1);
        }
        None
    }

    /// Cardinal direction of the nearest matching tile on a straight line from `from`.
    /// Equal distances resolve in [`CardinalDirection::ALL`] order.
    pub fn nearest_tile_direction(
        &self,
        from: TileCoord,
        matches: impl Fn(&T) -> bool,
    ) -> Option<CardinalDirection> {
        let mut best: Option<(CardinalDirection, u32)> = None;
        for direction in CardinalDirection::ALL {
            let Some((_, steps)) = self.nearest_tile_in_direction(from, direction, &matches) else {
                continue;
            };
            if best.is_none_or(|(_, best_steps)| steps < best_steps) {
                best = Some((direction, steps));
            }
        }
        best.map(|(direction, _)| direction)
    }

    fn index(&self, coord: TileCoord) -> usize {
        (coord.z as usize) * self.width + (coord.x as usize)
    }
}

impl CollisionGrid {
    /// Out-of-bounds coordinates count as walls.
    pub fn is_wall(&self, coord: TileCoord) -> bool {
        self.get(coord).is_none_or(|tile| *tile == TileKind::Wall)
    }

    pub fn wall_distances(&self, origin: TileCoord) -> [u32; 4] {
        self.distances_by_cardinal_direction(origin, |tile| *tile == TileKind::Wall)
    }
}
