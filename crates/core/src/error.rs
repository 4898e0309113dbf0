use std::io;

use thiserror::Error;

use crate::types::{ChairId, CharacterId};

/// Level authoring defects, reported at load time.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level tile grid is empty")]
    EmptyGrid,

    #[error("tile row {row} has {found} tiles, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("chair at ({x}, {z}) has no table in any cardinal direction")]
    ChairWithoutTable { x: i32, z: i32 },

    #[error("no open tile left to spawn the {0}")]
    NoSpawnTile(&'static str),

    #[error("pass and fail scores must both be at least 1")]
    InvalidScoreThreshold,

    #[error("tile ({x}, {z}) is outside the level grid")]
    OutOfBounds { x: i32, z: i32 },

    #[error("`{0}` is not a level tile")]
    UnknownTile(char),
}

/// Precondition violations of the carry/seat protocol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("the actor is already carrying someone")]
    AlreadyCarrying,

    #[error("the actor is not carrying anyone")]
    NotCarrying,

    #[error("the chair is already occupied")]
    ChairOccupied,

    #[error("the target cannot be picked up")]
    NotPickable,

    #[error("no such character or chair")]
    UnknownEntity,
}

/// A seat or carry link that does not agree from both ends.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("chair {chair:?} seats {sitter:?} which sits on {sits_on:?}")]
    ChairSitterMismatch { chair: ChairId, sitter: CharacterId, sits_on: Option<ChairId> },

    #[error("{character:?} sits on {chair:?} whose sitter is {sitter:?}")]
    SeatMismatch { character: CharacterId, chair: ChairId, sitter: Option<CharacterId> },

    #[error("{0:?} is both seated and carried")]
    SeatedAndCarried(CharacterId),

    #[error("{character:?} carried by {carrier:?} which carries {carrying:?}")]
    CarrierMismatch {
        character: CharacterId,
        carrier: CharacterId,
        carrying: Option<CharacterId>,
    },

    #[error("{0:?} is carried but still pickable")]
    CarriedButPickable(CharacterId),

    #[error("{character:?} carries {carried:?} which is carried by {carried_by:?}")]
    CarryMismatch {
        character: CharacterId,
        carried: CharacterId,
        carried_by: Option<CharacterId>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config TOML is malformed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("config file could not be read: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("journal level failed to load: {0}")]
    Level(#[from] LevelError),

    #[error("journal step must be positive, got {0}")]
    InvalidStep(f32),
}

#[derive(Debug, Error)]
pub enum JournalFileError {
    #[error("journal file could not be accessed: {0}")]
    Io(#[from] io::Error),

    #[error("journal JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
