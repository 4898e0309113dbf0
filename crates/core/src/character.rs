//! Guests and the player character: emotional and action state machines plus the
//! per-topic reaction memory.
//! This module exists to keep a single character's own state transitions in one place.
//! It does not own seating or carrying; those touch two entities at once and live in
//! `seating`.

use std::collections::BTreeMap;

use crate::catalog::Topic;
use crate::config::SimulationConfig;
use crate::rng::SimRng;
use crate::timed_state::TimedState;
use crate::types::*;

#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    Guest,
    Player(PlayerControls),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerControls {
    pub move_intent: Vec2,
}

#[derive(Clone, Debug)]
pub struct Character {
    pub id: CharacterId,
    pub role: Role,
    pub position: Vec2,
    pub facing: f32,
    pub action: TimedState<ActionState>,
    pub emotion: TimedState<EmotionalState>,
    pub sitting_on: Option<ChairId>,
    pub carried_by: Option<CharacterId>,
    pub carrying: Option<CharacterId>,
    pub can_be_picked_up: bool,
    reactions: BTreeMap<String, EmotionalState>,
    current_topic: Option<TopicId>,
    has_cried: bool,
    tears_shed: u32,
    next_tear_side: TearSide,
}

/// A tear the owning level should spawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TearSpawn {
    pub character: CharacterId,
    pub side: TearSide,
    pub position: Vec2,
    pub facing: f32,
}

impl Character {
    pub fn new(role: Role, position: Vec2) -> Self {
        let can_be_picked_up = matches!(role, Role::Guest);
        Self {
            id: CharacterId::default(),
            role,
            position,
            facing: 0.0,
            action: TimedState::new(ActionState::Normal),
            emotion: TimedState::new(EmotionalState::Neutral),
            sitting_on: None,
            carried_by: None,
            carrying: None,
            can_be_picked_up,
            reactions: BTreeMap::new(),
            current_topic: None,
            has_cried: false,
            tears_shed: 0,
            next_tear_side: TearSide::Left,
        }
    }

    pub fn guest(position: Vec2) -> Self {
        Self::new(Role::Guest, position)
    }

    pub fn player(position: Vec2) -> Self {
        Self::new(Role::Player(PlayerControls::default()), position)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player(_))
    }

    pub fn is_guest(&self) -> bool {
        matches!(self.role, Role::Guest)
    }

    pub fn controls(&self) -> Option<&PlayerControls> {
        match &self.role {
            Role::Player(controls) => Some(controls),
            Role::Guest => None,
        }
    }

    pub fn controls_mut(&mut self) -> Option<&mut PlayerControls> {
        match &mut self.role {
            Role::Player(controls) => Some(controls),
            Role::Guest => None,
        }
    }

    pub fn emotional_state(&self) -> EmotionalState {
        self.emotion.id()
    }

    pub fn is_stunned(&self) -> bool {
        self.action.is(ActionState::Stunned)
    }

    pub fn current_topic(&self) -> Option<TopicId> {
        self.current_topic
    }

    pub fn reaction_to(&self, topic_name: &str) -> Option<EmotionalState> {
        self.reactions.get(topic_name).copied()
    }

    /// Always transitions, restarting the mood clock and the crying cycle.
    pub fn change_emotion(&mut self, state: EmotionalState) {
        self.emotion.change(state);
        self.reset_crying();
    }

    pub fn change_emotion_if_different(&mut self, state: EmotionalState) -> bool {
        let changed = self.emotion.change_if_different(state);
        if changed {
            self.reset_crying();
        }
        changed
    }

    /// Reacts to `topic`. Rejoining the topic this character already holds replays the
    /// memorized reaction instead of rolling again.
    pub fn join_topic(&mut self, id: TopicId, topic: &Topic, rng: &mut SimRng) -> EmotionalState {
        if self.current_topic == Some(id)
            && let Some(reaction) = self.reaction_to(&topic.name)
        {
            self.change_emotion_if_different(reaction);
            return reaction;
        }

        let reaction = if rng.uniform() > topic.controversy {
            EmotionalState::Happy
        } else {
            EmotionalState::Sad
        };
        self.change_emotion(reaction);
        self.reactions.insert(topic.name.clone(), reaction);
        self.current_topic = Some(id);
        reaction
    }

    /// The topic ran its course; the next draw of the same topic is a fresh conversation.
    pub fn topic_ended(&mut self) {
        self.current_topic = None;
    }

    pub fn get_bitten(&mut self, cues: &mut Vec<Cue>) {
        self.action.change(ActionState::Stunned);
        cues.push(Cue::Stunned { character: self.id });
    }

    /// Advances both state clocks, reverts an expired stun, and reports tears due this
    /// frame. Sustained sadness cries once and then sheds a tear every interval, starting
    /// `tear_spawn_delay` seconds into the sad state and alternating sides.
    pub fn update(
        &mut self,
        dt: f32,
        config: &SimulationConfig,
        cues: &mut Vec<Cue>,
    ) -> Vec<TearSpawn> {
        self.action.update(dt);
        self.emotion.update(dt);

        if self.is_stunned() && self.action.time() > config.goose_bite_stun_time {
            self.action.change(ActionState::Normal);
        }

        let mut spawns = Vec::new();
        if !self.emotion.is(EmotionalState::Sad) {
            return spawns;
        }
        let sad_for = self.emotion.time() - config.tear_spawn_delay;
        if sad_for <= 0.0 {
            return spawns;
        }
        if !self.has_cried {
            self.has_cried = true;
            cues.push(Cue::Crying { character: self.id });
        }
        let due = if config.tear_spawn_interval > 0.0 {
            (sad_for / config.tear_spawn_interval).floor() as u32 + 1
        } else {
            self.tears_shed + 1
        };
        while self.tears_shed < due {
            let side = self.next_tear_side;
            self.next_tear_side = side.flipped();
            self.tears_shed += 1;
            cues.push(Cue::TearSpawned { character: self.id, side });
            spawns.push(TearSpawn {
                character: self.id,
                side,
                position: self.position,
                facing: self.facing,
            });
        }
        spawns
    }

    fn reset_crying(&mut self) {
        self.has_cried = false;
        self.tears_shed = 0;
        self.next_tear_side = TearSide::Left;
    }
}
