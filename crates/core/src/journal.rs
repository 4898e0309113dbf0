//! Input journal: the seed, the level and every non-idle frame of player input.
//! This module exists so a played session can be stored and rerun bit for bit.
//! It does not own replay execution; see `replay`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::JournalFileError;
use crate::layout::LevelDescription;
use crate::types::FrameInput;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub seed: u64,
    pub frame_dt: f32,
    /// Frames to simulate in total; trailing frames without a record are idle.
    pub total_frames: u64,
    pub level: LevelDescription,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub frame: u64,
    pub input: FrameInput,
}

impl InputJournal {
    pub fn new(seed: u64, frame_dt: f32, level: LevelDescription) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            seed,
            frame_dt,
            total_frames: 0,
            level,
            inputs: Vec::new(),
        }
    }

    /// Notes the input applied on `frame`. Frames must be recorded in order.
    pub fn record(&mut self, frame: u64, input: FrameInput) {
        debug_assert!(self.inputs.last().is_none_or(|last| last.frame < frame));
        if !input.is_idle() {
            self.inputs.push(InputRecord { frame, input });
        }
        self.total_frames = self.total_frames.max(frame + 1);
    }

    /// Input for `frame`, idle when nothing was recorded.
    pub fn input_at(&self, frame: u64) -> FrameInput {
        self.inputs
            .binary_search_by_key(&frame, |record| record.frame)
            .map_or_else(|_| FrameInput::default(), |index| self.inputs[index].input)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn save(&self, path: &Path) -> Result<(), JournalFileError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, JournalFileError> {
        Ok(Self::from_json(&fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> LevelDescription {
        LevelDescription {
            tiles: vec!["...".to_string(), ".ct".to_string(), "...".to_string()],
            pass_score: 1,
            fail_score: 1,
            goose_count: 0,
        }
    }

    #[test]
    fn idle_frames_are_implicit() {
        let mut journal = InputJournal::new(4, 0.1, level());
        let push = FrameInput { move_x: 1.0, move_z: 0.0, interact: false };
        journal.record(0, FrameInput::default());
        journal.record(1, push);
        journal.record(2, FrameInput::default());

        assert_eq!(journal.inputs.len(), 1);
        assert_eq!(journal.total_frames, 3);
        assert_eq!(journal.input_at(1), push);
        assert!(journal.input_at(2).is_idle());
        assert!(journal.input_at(99).is_idle());
    }

    #[test]
    fn file_round_trip() {
        let mut journal = InputJournal::new(9, 0.05, level());
        journal.record(3, FrameInput { move_x: 0.0, move_z: -1.0, interact: true });

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        journal.save(&path).expect("save");
        assert_eq!(InputJournal::load(&path).expect("load"), journal);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(InputJournal::load(&path), Err(JournalFileError::Json(_))));
        assert!(matches!(
            InputJournal::load(&dir.path().join("missing.json")),
            Err(JournalFileError::Io(_))
        ));
    }
}
