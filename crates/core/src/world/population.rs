//! Initial world construction from a parsed level layout.
//! This module exists to isolate spawn placement from per-frame simulation.
//! It does not own level metadata such as scoring thresholds.

use tracing::debug;

use super::*;
use crate::error::LevelError;
use crate::grid::Grid;
use crate::layout::LevelLayout;

/// Preferred player spawn tile.
const PLAYER_SPAWN: TileCoord = TileCoord { x: 1, z: 1 };
/// Geese never spawn closer than this to the player.
const GOOSE_SPAWN_CLEARANCE: f32 = 3.0;
/// Chairs left empty when seating the initial guests.
const FREE_CHAIRS: usize = 2;

impl World {
    /// Builds the static furniture and the player. Guests and geese are added by
    /// [`World::populate`].
    pub fn from_layout(
        layout: &LevelLayout,
        catalog: TopicCatalog,
        seed: u64,
    ) -> Result<Self, LevelError> {
        let grid = layout.collision.clone();
        let spawn = if grid.in_bounds(PLAYER_SPAWN) && !grid.is_wall(PLAYER_SPAWN) {
            PLAYER_SPAWN
        } else {
            grid.coords()
                .find(|coord| !grid.is_wall(*coord))
                .ok_or(LevelError::NoSpawnTile("player"))?
        };

        let mut world = Self {
            grid,
            characters: SlotMap::with_key(),
            chairs: SlotMap::with_key(),
            tables: SlotMap::with_key(),
            geese: SlotMap::with_key(),
            tears: SlotMap::with_key(),
            obstacles: layout.obstacles.clone(),
            catalog,
            player_id: CharacterId::default(),
            rng: SimRng::new(seed),
            cues: Vec::new(),
        };
        world.player_id = world.insert_character(Character::player(spawn.center()));

        let table_ids: Vec<TableId> = layout
            .tables
            .iter()
            .map(|rect| {
                let id = world.tables.insert(ConversationTable::new(*rect));
                world.tables[id].id = id;
                id
            })
            .collect();

        for placement in &layout.chairs {
            let table = table_ids.get(placement.table).copied();
            let id = world.chairs.insert(Chair {
                id: ChairId::default(),
                position: placement.tile.center(),
                tile: placement.tile,
                direction: placement.facing,
                table,
                sitter: None,
            });
            world.chairs[id].id = id;
            if let Some(table) = table {
                world.tables[table].chairs.push(id);
            }
        }

        debug!(
            tables = world.tables.len(),
            chairs = world.chairs.len(),
            obstacles = world.obstacles.len(),
            "level furniture placed"
        );
        Ok(world)
    }

    /// Seats the initial guests and places `goose_count` geese away from the player.
    pub fn populate(&mut self, goose_count: u32) -> Result<(), LevelError> {
        self.seat_new_guests();

        let player = self.player().position;
        let open: Vec<TileCoord> = self
            .grid
            .coords()
            .filter(|coord| !self.grid.is_wall(*coord))
            .filter(|coord| coord.center().distance(player) >= GOOSE_SPAWN_CLEARANCE)
            .collect();
        let wanted = goose_count as usize;
        let tiles = self.rng.random_subset(&open, wanted);
        if tiles.len() < wanted {
            return Err(LevelError::NoSpawnTile("goose"));
        }
        for tile in tiles {
            let goose = Goose::new(tile.center(), &mut self.rng);
            let id = self.geese.insert(goose);
            self.geese[id].id = id;
        }
        Ok(())
    }

    /// Removes every guest and seats a fresh random set.
    pub fn reinit_guests(&mut self) {
        for id in self.guest_ids() {
            self.release(id);
            self.get_up_from_seat(id);
            self.characters.remove(id);
        }
        for table in self.tables.values_mut() {
            table.forget_sitters();
        }
        self.seat_new_guests();
    }

    /// Adds a guest and seats it on `chair`. Returns `None` if the chair is unknown or taken.
    pub fn spawn_guest_on(&mut self, chair: ChairId) -> Option<CharacterId> {
        let position = self.chairs.get(chair).filter(|c| c.sitter.is_none())?.position;
        let id = self.insert_character(Character::guest(position));
        self.sit_on(id, chair).ok()?;
        Some(id)
    }

    fn seat_new_guests(&mut self) {
        let chairs: Vec<ChairId> = self.chairs.keys().collect();
        let count = chairs.len().saturating_sub(FREE_CHAIRS);
        for chair in self.rng.random_subset(&chairs, count) {
            self.spawn_guest_on(chair);
        }
    }

    /// Tile the given world position falls in.
    pub fn tile_of(position: Vec2) -> TileCoord {
        Grid::<TileKind>::tile_at(position.x, position.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_support::*;

    #[test]
    fn player_spawns_at_preferred_tile_or_first_open_tile() {
        let world = World::from_layout(&parse(&open_two_table_rows()), TopicCatalog::default(), 1)
            .expect("world");
        assert_eq!(world.player().position, Vec2::new(1.5, 1.5));

        let blocked = parse(&["bbb", "bb.", "..."]);
        let world = World::from_layout(&blocked, TopicCatalog::default(), 1).expect("world");
        assert_eq!(world.player().position, Vec2::new(2.5, 1.5));
    }

    #[test]
    fn populate_leaves_two_chairs_free_and_keeps_geese_away() {
        let layout = parse(&open_two_table_rows());
        let mut world = World::from_layout(&layout, TopicCatalog::default(), 9).expect("world");
        world.populate(2).expect("populate");

        let seated = world.chairs.values().filter(|c| c.sitter.is_some()).count();
        assert_eq!(seated, world.chairs.len() - 2);
        assert_eq!(world.guest_ids().len(), seated);
        assert_eq!(world.geese.len(), 2);
        let player = world.player().position;
        for goose in world.geese.values() {
            assert!(goose.position.distance(player) >= GOOSE_SPAWN_CLEARANCE);
            assert!(!world.grid.is_wall(World::tile_of(goose.position)));
            assert!(goose.state().is(GooseState::Sitting));
        }
        world.check_links().expect("links");
    }

    #[test]
    fn too_many_geese_is_a_spawn_error() {
        let layout = parse(&["....", "...."]);
        let mut world = World::from_layout(&layout, TopicCatalog::default(), 1).expect("world");
        assert!(matches!(world.populate(3), Err(LevelError::NoSpawnTile("goose"))));
    }

    #[test]
    fn reinit_guests_replaces_guests_and_clears_carry() {
        let layout = parse(&open_two_table_rows());
        let mut world = World::from_layout(&layout, TopicCatalog::default(), 4).expect("world");
        world.populate(0).expect("populate");
        let before = world.guest_ids();
        let player = world.player_id;
        world.pick_up_object(player, before[0]).expect("pick up");

        world.reinit_guests();
        let after = world.guest_ids();
        assert_eq!(after.len(), before.len());
        assert!(after.iter().all(|id| !before.contains(id)));
        assert_eq!(world.player().carrying, None);
        world.check_links().expect("links");
    }
}
