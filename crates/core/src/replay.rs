use crate::config::SimulationConfig;
use crate::error::ReplayError;
use crate::journal::InputJournal;
use crate::level::Level;
use crate::types::LevelState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_state: LevelState,
    pub score: u32,
    pub negative_score: u32,
    pub final_frame: u64,
    pub final_snapshot_hash: u64,
}

impl ReplayResult {
    pub fn of(level: &Level) -> Self {
        Self {
            final_state: level.state(),
            score: level.score(),
            negative_score: level.negative_score(),
            final_frame: level.frame(),
            final_snapshot_hash: level.snapshot_hash(),
        }
    }
}

/// Rebuilds the journal's level and feeds it every recorded frame.
pub fn replay_to_end(
    config: &SimulationConfig,
    journal: &InputJournal,
) -> Result<ReplayResult, ReplayError> {
    if journal.frame_dt <= 0.0 || !journal.frame_dt.is_finite() {
        return Err(ReplayError::InvalidStep(journal.frame_dt));
    }
    let mut level = Level::new(&journal.level, config.clone(), journal.seed)?;
    let mut records = journal.inputs.iter().peekable();
    for frame in 0..journal.total_frames {
        let input = records.next_if(|record| record.frame == frame).map(|record| record.input);
        level.step(journal.frame_dt, input.unwrap_or_default());
    }
    Ok(ReplayResult::of(&level))
}
