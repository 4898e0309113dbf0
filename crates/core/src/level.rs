//! Level orchestration: frame ordering, player control and the pass/fail tally.
//! This module exists to own one garden party from load to outcome and to drive every
//! entity update in a fixed order.
//! It does not own entity behaviour; characters, tables and geese live in `world`.

use std::mem;

use tracing::info;

use crate::catalog::TopicCatalog;
use crate::config::SimulationConfig;
use crate::error::LevelError;
use crate::layout::{LevelDescription, LevelLayout};
use crate::motion::{Body, MotionResolver, TileCollider, intent_velocity, move_body};
use crate::timed_state::TimedState;
use crate::types::*;
use crate::world::World;

mod hash;
mod interaction;
#[cfg(test)]
mod test_support;

pub struct Level {
    world: World,
    config: SimulationConfig,
    resolver: Box<dyn MotionResolver>,
    state: TimedState<LevelState>,
    score: u32,
    negative_score: u32,
    pass_score: u32,
    fail_score: u32,
    goose_count: u32,
    seed: u64,
    frame: u64,
}

impl Level {
    /// Loads and populates a level. Play starts with the intro.
    pub fn new(
        description: &LevelDescription,
        config: SimulationConfig,
        seed: u64,
    ) -> Result<Self, LevelError> {
        Self::build(description, config, seed, TopicCatalog::default(), LevelState::Intro)
    }

    /// Like [`Level::new`] but waits on the title screen until [`Level::begin`].
    pub fn with_title(
        description: &LevelDescription,
        config: SimulationConfig,
        seed: u64,
    ) -> Result<Self, LevelError> {
        Self::build(description, config, seed, TopicCatalog::default(), LevelState::GameTitle)
    }

    pub fn from_json(json: &str, config: SimulationConfig, seed: u64) -> Result<Self, LevelError> {
        Self::new(&LevelDescription::from_json(json)?, config, seed)
    }

    /// Loads with a custom topic catalog.
    pub fn with_catalog(
        description: &LevelDescription,
        config: SimulationConfig,
        seed: u64,
        catalog: TopicCatalog,
    ) -> Result<Self, LevelError> {
        Self::build(description, config, seed, catalog, LevelState::Intro)
    }

    fn build(
        description: &LevelDescription,
        config: SimulationConfig,
        seed: u64,
        catalog: TopicCatalog,
        initial: LevelState,
    ) -> Result<Self, LevelError> {
        let layout = LevelLayout::parse(description)?;
        let mut world = World::from_layout(&layout, catalog, seed)?;
        world.populate(description.goose_count)?;
        info!(
            seed,
            guests = world.guest_ids().len(),
            geese = world.geese.len(),
            "level loaded"
        );
        Ok(Self {
            world,
            config,
            resolver: Box::new(TileCollider),
            state: TimedState::new(initial),
            score: 0,
            negative_score: 0,
            pass_score: description.pass_score,
            fail_score: description.fail_score,
            goose_count: description.goose_count,
            seed,
            frame: 0,
        })
    }

    pub fn with_motion_resolver(mut self, resolver: Box<dyn MotionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Leaves the title screen.
    pub fn begin(&mut self) {
        if self.state.is(LevelState::GameTitle) {
            self.state.change(LevelState::Intro);
        }
    }

    pub fn state(&self) -> LevelState {
        self.state.id()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn negative_score(&self) -> u32 {
        self.negative_score
    }

    pub fn pass_score(&self) -> u32 {
        self.pass_score
    }

    pub fn fail_score(&self) -> u32 {
        self.fail_score
    }

    pub fn goose_count(&self) -> u32 {
        self.goose_count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        mem::take(&mut self.world.cues)
    }

    pub fn reinit_guests(&mut self) {
        self.world.reinit_guests();
    }

    /// Applies one frame of input and advances the simulation by `dt`.
    pub fn step(&mut self, dt: f32, input: FrameInput) {
        let playing = self.state.is(LevelState::InProgress);
        let intent = if playing { Vec2::new(input.move_x, input.move_z) } else { Vec2::ZERO };
        if let Some(controls) = self.world.player_mut().controls_mut() {
            controls.move_intent = intent;
        }
        if playing
            && input.interact
            && let Err(err) = self.try_pick_up_or_drop()
        {
            info!(%err, "interaction rejected");
        }
        self.update(dt);
        self.frame += 1;
    }

    /// Advances every entity by `dt`: level state, player, characters, tables, geese,
    /// then tears. The title screen holds the world still.
    pub fn update(&mut self, dt: f32) {
        self.state.update(dt);
        if self.state.is(LevelState::GameTitle) {
            return;
        }
        if self.state.is(LevelState::Intro) && self.state.time() >= self.config.intro_duration {
            self.state.change(LevelState::InProgress);
            info!("level in progress");
        }
        if self.state.is(LevelState::InProgress) {
            self.move_player(dt);
        }

        let characters: Vec<CharacterId> = self.world.characters.keys().collect();
        for id in characters {
            self.world.update_character(id, dt, &self.config);
        }

        let tables: Vec<TableId> = self.world.tables.keys().collect();
        for id in tables {
            if !self.world.tables.contains_key(id) {
                continue;
            }
            if let Some(score) = self.world.update_table(id, dt, &self.config) {
                self.add_score(score);
            }
        }

        let geese: Vec<GooseId> = self.world.geese.keys().collect();
        for id in geese {
            self.world.update_goose(id, dt, &self.config, self.resolver.as_ref());
        }

        self.world.update_tears(dt, &self.config);
    }

    /// Tallies one concluded conversation. Only counts during the intro and play;
    /// failure is checked before success.
    pub fn add_score(&mut self, value: i32) {
        if !matches!(self.state.id(), LevelState::Intro | LevelState::InProgress) {
            return;
        }
        if value > 0 {
            self.score += value.unsigned_abs();
            self.world.cues.push(Cue::Victory);
        } else if value < 0 {
            self.negative_score += value.unsigned_abs();
            self.world.cues.push(Cue::Aww);
        } else {
            return;
        }

        if self.negative_score >= self.fail_score {
            self.state.change(LevelState::Fail);
            self.world.cues.push(Cue::LevelFailed);
            info!(score = self.score, negative = self.negative_score, "level failed");
        } else if self.score >= self.pass_score {
            self.state.change(LevelState::Success);
            self.world.cues.push(Cue::LevelSucceeded);
            info!(score = self.score, negative = self.negative_score, "level succeeded");
        }
    }

    fn move_player(&mut self, dt: f32) {
        let player = self.world.player();
        let Some(controls) = player.controls() else {
            return;
        };
        let speed = if player.is_stunned() { 0.0 } else { self.config.player_move_speed };
        let velocity = intent_velocity(controls.move_intent, speed);
        if velocity.is_zero() {
            return;
        }
        let position = move_body(
            self.resolver.as_ref(),
            &self.world.grid,
            Body::character(player.position),
            velocity,
            dt,
        );
        let player = self.world.player_mut();
        player.position = position;
        player.facing = velocity.angle();
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::test_support::*;
    use super::*;

    #[test]
    fn title_waits_for_begin_then_intro_runs_its_course() {
        let mut level =
            Level::with_title(&party(3, 3), SimulationConfig::default(), 1).expect("level");
        level.update(10.0);
        assert_eq!(level.state(), LevelState::GameTitle);
        level.begin();
        assert_eq!(level.state(), LevelState::Intro);
        level.update(level.config().intro_duration / 2.0);
        assert_eq!(level.state(), LevelState::Intro);
        level.update(level.config().intro_duration);
        assert_eq!(level.state(), LevelState::InProgress);
    }

    #[test]
    fn title_screen_holds_a_seated_table_still() {
        let mut level =
            Level::with_title(&party(2, 2), SimulationConfig::default(), 1).expect("level");
        for (x, z) in [(2, 2), (3, 3)] {
            let chair = chair_at(&level, x, z);
            if level.world().chairs[chair].sitter.is_none() {
                level.world_mut().spawn_guest_on(chair).expect("guest");
            }
        }
        for _ in 0..2000 {
            level.update(0.1);
        }
        assert_eq!(level.state(), LevelState::GameTitle);
        assert_eq!((level.score(), level.negative_score()), (0, 0));
        assert!(level.world().tables.values().all(|t| t.state().is(TableState::NoTopic)));

        level.add_score(1);
        assert_eq!(level.score(), 0);

        level.begin();
        level.update(level.config().intro_duration / 2.0);
        level.add_score(1);
        assert_eq!(level.score(), 1);
    }

    #[test]
    fn failure_is_checked_before_success() {
        let mut level = in_progress(1, 1);
        level.add_score(-1);
        assert_eq!(level.state(), LevelState::Fail);

        let mut level = in_progress(2, 1);
        level.add_score(1);
        assert_eq!(level.state(), LevelState::InProgress);
        level.add_score(1);
        assert_eq!(level.state(), LevelState::Success);
        assert!(level.drain_cues().ends_with(&[Cue::Victory, Cue::LevelSucceeded]));
    }

    #[test]
    fn scores_freeze_once_decided() {
        let mut level = in_progress(1, 5);
        level.add_score(1);
        assert_eq!(level.state(), LevelState::Success);
        level.add_score(1);
        level.add_score(-1);
        assert_eq!((level.score(), level.negative_score()), (1, 0));
        assert_eq!(level.state(), LevelState::Success);
    }

    #[test]
    fn input_is_ignored_outside_play() {
        let mut level = Level::new(&party(3, 3), SimulationConfig::default(), 1).expect("level");
        let start = level.world().player().position;
        level.step(0.1, FrameInput { move_x: 1.0, move_z: 0.0, interact: true });
        assert_eq!(level.world().player().position, start);
        assert_eq!(level.world().player().carrying, None);
    }

    #[test]
    fn player_moves_at_normalised_speed_and_faces_motion() {
        let mut level = in_progress(3, 3);
        let start = level.world().player().position;
        level.step(0.1, FrameInput { move_x: 1.0, move_z: 1.0, interact: false });
        let player = level.world().player();
        let moved = player.position.distance(start);
        assert!((moved - 0.3).abs() < 1e-4, "{moved}");
        assert!((player.facing - FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn stunned_player_cannot_move() {
        let mut level = in_progress(3, 3);
        let world = level.world_mut();
        let player = world.player_id;
        let mut cues = Vec::new();
        world.characters[player].get_bitten(&mut cues);
        let start = level.world().player().position;
        level.step(0.1, FrameInput { move_x: 1.0, move_z: 0.0, interact: false });
        assert_eq!(level.world().player().position, start);
    }
}
