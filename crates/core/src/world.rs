//! Entity arenas for one garden party and the cross-entity operations on them.
//! This module exists to keep characters, chairs, tables, geese and tears addressed by
//! stable keys so every back-reference is an id and both sides of a link change together.
//! It does not own level flow, scoring thresholds or input handling; see `level`.

use slotmap::SlotMap;

use crate::catalog::TopicCatalog;
use crate::character::{Character, TearSpawn};
use crate::config::SimulationConfig;
use crate::error::LinkError;
use crate::grid::CollisionGrid;
use crate::rng::SimRng;
use crate::timed_state::TimedState;
use crate::types::*;

mod goose;
mod population;
mod seating;
mod table;
#[cfg(test)]
pub(crate) mod test_support;

pub use goose::Goose;
pub use table::ConversationTable;

#[derive(Clone, Debug)]
pub struct Chair {
    pub id: ChairId,
    pub position: Vec2,
    pub tile: TileCoord,
    pub direction: CardinalDirection,
    /// `None` for a freestanding chair.
    pub table: Option<TableId>,
    pub sitter: Option<CharacterId>,
}

/// Cosmetic falling drop shed by a sad character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tear {
    pub position: Vec2,
    pub height: f32,
    pub vertical_speed: f32,
}

impl Tear {
    pub const SPAWN_HEIGHT: f32 = 1.5;
    pub const SIDE_OFFSET: f32 = 0.15;

    fn spawn(at: &TearSpawn) -> Self {
        let forward = Vec2::from_angle(at.facing);
        let right = Vec2::new(forward.z, -forward.x);
        Self {
            position: at.position + right * (Self::SIDE_OFFSET * at.side.sign()),
            height: Self::SPAWN_HEIGHT,
            vertical_speed: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32, gravity: f32) {
        self.vertical_speed -= gravity * dt;
        self.height += self.vertical_speed * dt;
    }

    pub fn is_dead(&self) -> bool {
        self.height < 0.0
    }
}

#[derive(Clone, Debug)]
pub struct World {
    pub grid: CollisionGrid,
    pub characters: SlotMap<CharacterId, Character>,
    pub chairs: SlotMap<ChairId, Chair>,
    pub tables: SlotMap<TableId, ConversationTable>,
    pub geese: SlotMap<GooseId, Goose>,
    pub tears: SlotMap<TearId, Tear>,
    pub obstacles: Vec<TileCoord>,
    pub catalog: TopicCatalog,
    pub player_id: CharacterId,
    pub rng: SimRng,
    pub cues: Vec<Cue>,
}

impl World {
    pub fn player(&self) -> &Character {
        &self.characters[self.player_id]
    }

    pub fn player_mut(&mut self) -> &mut Character {
        &mut self.characters[self.player_id]
    }

    pub fn guest_ids(&self) -> Vec<CharacterId> {
        self.characters.iter().filter(|(_, c)| c.is_guest()).map(|(id, _)| id).collect()
    }

    pub fn insert_character(&mut self, character: Character) -> CharacterId {
        let id = self.characters.insert(character);
        self.characters[id].id = id;
        id
    }

    /// Current occupants of a table's chairs, in chair order.
    pub fn sitters(&self, table: TableId) -> Vec<CharacterId> {
        let Some(table) = self.tables.get(table) else {
            return Vec::new();
        };
        table
            .chairs
            .iter()
            .filter_map(|chair| self.chairs.get(*chair).and_then(|chair| chair.sitter))
            .collect()
    }

    /// Advances one character's state machines and spawns the tears it sheds.
    pub fn update_character(&mut self, id: CharacterId, dt: f32, config: &SimulationConfig) {
        let Some(character) = self.characters.get_mut(id) else {
            return;
        };
        let spawns = character.update(dt, config, &mut self.cues);
        let carrier = character.carried_by;
        for spawn in &spawns {
            self.tears.insert(Tear::spawn(spawn));
        }

        if let Some(carrier) = carrier
            && let Some((position, facing)) =
                self.characters.get(carrier).map(|c| (c.position, c.facing))
        {
            let character = &mut self.characters[id];
            character.position = position;
            character.facing = facing;
        }
    }

    pub fn update_tears(&mut self, dt: f32, config: &SimulationConfig) {
        for tear in self.tears.values_mut() {
            tear.update(dt, config.tear_gravity);
        }
        self.tears.retain(|_, tear| !tear.is_dead());
    }

    /// Checks the seat and carry links from both ends. Returns the first broken link.
    pub fn check_links(&self) -> Result<(), LinkError> {
        for (chair_id, chair) in &self.chairs {
            if let Some(sitter) = chair.sitter {
                let sits_on = self.characters.get(sitter).and_then(|c| c.sitting_on);
                if sits_on != Some(chair_id) {
                    return Err(LinkError::ChairSitterMismatch { chair: chair_id, sitter, sits_on });
                }
            }
        }
        for (id, character) in &self.characters {
            if let Some(chair) = character.sitting_on {
                let sitter = self.chairs.get(chair).and_then(|c| c.sitter);
                if sitter != Some(id) {
                    return Err(LinkError::SeatMismatch { character: id, chair, sitter });
                }
            }
            if character.sitting_on.is_some() && character.carried_by.is_some() {
                return Err(LinkError::SeatedAndCarried(id));
            }
            if let Some(carrier) = character.carried_by {
                let carrying = self.characters.get(carrier).and_then(|c| c.carrying);
                if carrying != Some(id) {
                    return Err(LinkError::CarrierMismatch { character: id, carrier, carrying });
                }
                if character.can_be_picked_up {
                    return Err(LinkError::CarriedButPickable(id));
                }
            }
            if let Some(carried) = character.carrying {
                let carried_by = self.characters.get(carried).and_then(|c| c.carried_by);
                if carried_by != Some(id) {
                    return Err(LinkError::CarryMismatch { character: id, carried, carried_by });
                }
            }
        }
        Ok(())
    }
}
