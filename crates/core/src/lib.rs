pub mod catalog;
pub mod character;
pub mod config;
pub mod editor;
pub mod error;
pub mod grid;
pub mod journal;
pub mod layout;
pub mod level;
pub mod motion;
pub mod replay;
pub mod rng;
pub mod timed_state;
pub mod types;
pub mod world;

pub use catalog::{Topic, TopicCatalog};
pub use character::{Character, Role};
pub use config::SimulationConfig;
pub use editor::LevelEditor;
pub use error::{
    ConfigError, InteractionError, JournalFileError, LevelError, LinkError, ReplayError,
};
pub use grid::{CollisionGrid, Grid};
pub use journal::{InputJournal, InputRecord};
pub use layout::{LevelDescription, LevelLayout};
pub use level::Level;
pub use motion::{MotionResolver, TileCollider};
pub use replay::{ReplayResult, replay_to_end};
pub use rng::SimRng;
pub use types::*;
pub use world::{Chair, ConversationTable, Goose, Tear, World};
