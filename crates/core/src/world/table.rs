//! Dinner-table conversations: topic selection, continuation, scoring and the display
//! lifecycle that follows each topic.
//! This module exists to keep the conversation state machine next to the seat hooks
//! that drive it.
//! It does not own the level score; a concluded topic hands its score to the caller.

use tracing::{debug, info};

use super::*;

#[derive(Clone, Debug)]
pub struct ConversationTable {
    pub id: TableId,
    pub rect: TileRect,
    pub chairs: Vec<ChairId>,
    state: TimedState<TableState>,
    topic: Option<TopicId>,
    line: Option<String>,
    /// Sitters present when the topic was last set or joined. A later seating that
    /// contains all of them resumes the same conversation.
    unfinished_topic_sitters: Vec<CharacterId>,
    pub(crate) conversation_time: f32,
    old_conversation_time: Option<f32>,
    pub(crate) conversation_duration: f32,
    conversation_score: i32,
}

impl ConversationTable {
    pub fn new(rect: TileRect) -> Self {
        Self {
            id: TableId::default(),
            rect,
            chairs: Vec::new(),
            state: TimedState::new(TableState::NoTopic),
            topic: None,
            line: None,
            unfinished_topic_sitters: Vec::new(),
            conversation_time: 0.0,
            old_conversation_time: None,
            conversation_duration: 0.0,
            conversation_score: 0,
        }
    }

    pub fn state(&self) -> &TimedState<TableState> {
        &self.state
    }

    /// The topic being discussed, or the last one while its outcome is shown.
    pub fn topic(&self) -> Option<TopicId> {
        self.topic
    }

    /// Flavor line displayed while a topic is live.
    pub fn line(&self) -> Option<&str> {
        if self.state.is(TableState::Topic) { self.line.as_deref() } else { None }
    }

    pub fn conversation_time(&self) -> f32 {
        self.conversation_time
    }

    pub fn conversation_duration(&self) -> f32 {
        self.conversation_duration
    }

    pub fn conversation_score(&self) -> i32 {
        self.conversation_score
    }

    pub fn unfinished_topic_sitters(&self) -> &[CharacterId] {
        &self.unfinished_topic_sitters
    }

    /// Topic that counts as occupied for the other tables' selection.
    fn live_topic(&self) -> Option<TopicId> {
        if self.state.is(TableState::Topic) { self.topic } else { None }
    }

    pub(crate) fn forget_sitters(&mut self) {
        self.unfinished_topic_sitters.clear();
        self.old_conversation_time = None;
    }
}

impl World {
    /// Advances one table. Returns the conversation score on entering the scoring
    /// display; the caller adds it to the level exactly once.
    pub fn update_table(&mut self, id: TableId, dt: f32, config: &SimulationConfig) -> Option<i32> {
        let table = self.tables.get_mut(id)?;
        table.state.update(dt);
        let time = table.state.time();

        match table.state.id() {
            TableState::NoTopic => {
                if time >= config.topic_selection_delay {
                    self.try_set_topic(id, config);
                }
                None
            }
            TableState::Topic => {
                table.conversation_time += dt;
                if table.conversation_time > table.conversation_duration {
                    self.conclude_topic(id);
                }
                None
            }
            TableState::RemovingTopic => {
                if time < config.topic_removal_time {
                    return None;
                }
                if table.conversation_score != 0 {
                    table.state.change(TableState::ScoringTopic);
                    Some(table.conversation_score)
                } else {
                    table.state.change(TableState::NoTopic);
                    None
                }
            }
            TableState::ScoringTopic => {
                if time >= config.topic_scoring_time {
                    table.state.change(TableState::NoTopic);
                    table.conversation_score = 0;
                }
                None
            }
        }
    }

    /// Starts or resumes a conversation. Needs at least two sitters. Returns whether a
    /// topic is now live.
    pub fn try_set_topic(&mut self, id: TableId, config: &SimulationConfig) -> bool {
        let sitters = self.sitters(id);
        if sitters.len() < 2 {
            return false;
        }
        let Some(table) = self.tables.get(id) else {
            return false;
        };
        let continuing = !table.unfinished_topic_sitters.is_empty()
            && table.unfinished_topic_sitters.iter().all(|s| sitters.contains(s))
            && table.topic.is_some();

        let topic = if continuing {
            let table = &mut self.tables[id];
            if let Some(time) = table.old_conversation_time.take() {
                table.conversation_time = time;
            }
            table.topic
        } else {
            let Some(topic) = self.pick_new_topic(id) else {
                return false;
            };
            let duration = self.rng.uniform_range(
                config.min_time_per_discussion_topic,
                config.max_time_per_discussion_topic,
            );
            let line = self
                .catalog
                .get(topic)
                .and_then(|t| self.rng.random_item(&t.lines))
                .cloned();
            let table = &mut self.tables[id];
            table.topic = Some(topic);
            table.line = line;
            table.conversation_time = 0.0;
            table.old_conversation_time = None;
            table.conversation_duration = duration;
            Some(topic)
        };
        let Some(topic) = topic else {
            return false;
        };

        let table = &mut self.tables[id];
        table.conversation_score = 0;
        table.state.change(TableState::Topic);
        for sitter in &sitters {
            self.join_table_topic(*sitter, topic);
        }
        self.tables[id].unfinished_topic_sitters = sitters;

        let name = self.catalog.get(topic).map_or("", |t| t.name.as_str());
        if continuing {
            debug!(?id, topic = name, "conversation resumed");
            self.cues.push(Cue::TopicContinued { table: id, topic });
        } else {
            debug!(?id, topic = name, "new conversation topic");
            self.cues.push(Cue::TopicStarted { table: id, topic });
        }
        true
    }

    /// Moves the table into its fade-out and calms every sitter.
    pub fn end_topic(&mut self, id: TableId) {
        let Some(table) = self.tables.get_mut(id) else {
            return;
        };
        table.state.change(TableState::RemovingTopic);
        for sitter in self.sitters(id) {
            self.characters[sitter].change_emotion_if_different(EmotionalState::Neutral);
        }
    }

    pub(crate) fn table_added_sitter(&mut self, id: TableId, sitter: CharacterId) {
        let Some(table) = self.tables.get(id) else {
            return;
        };
        if table.state.is(TableState::Topic)
            && let Some(topic) = table.topic
        {
            self.join_table_topic(sitter, topic);
            let sitters = self.sitters(id);
            self.tables[id].unfinished_topic_sitters = sitters;
        }
    }

    pub(crate) fn table_removed_sitter(&mut self, id: TableId) {
        let sitters = self.sitters(id);
        let Some(table) = self.tables.get_mut(id) else {
            return;
        };
        if sitters.len() > 1 {
            return;
        }
        if table.state.is(TableState::Topic) {
            table.old_conversation_time = Some(table.conversation_time);
            self.end_topic(id);
        }
        if let [lonely] = sitters.as_slice() {
            self.characters[*lonely].change_emotion_if_different(EmotionalState::Lonely);
        }
    }

    fn conclude_topic(&mut self, id: TableId) {
        let sitters = self.sitters(id);
        let sad = sitters
            .iter()
            .any(|s| self.characters[*s].emotional_state() == EmotionalState::Sad);
        let score = if sad { -1 } else { 1 };

        let table = &mut self.tables[id];
        table.conversation_score = score;
        table.forget_sitters();
        info!(?id, score, "conversation concluded");
        for sitter in &sitters {
            self.characters[*sitter].topic_ended();
        }
        self.end_topic(id);
    }

    fn join_table_topic(&mut self, sitter: CharacterId, topic: TopicId) {
        let Some(entry) = self.catalog.get(topic) else {
            return;
        };
        if let Some(character) = self.characters.get_mut(sitter) {
            character.join_topic(topic, entry, &mut self.rng);
        }
    }

    /// Uniform pick excluding this table's previous topic and topics live elsewhere.
    /// Falls back to anything but the previous topic when that leaves nothing.
    fn pick_new_topic(&mut self, id: TableId) -> Option<TopicId> {
        let previous = self.tables.get(id).and_then(|t| t.topic);
        let busy: Vec<TopicId> = self
            .tables
            .iter()
            .filter(|(other, _)| *other != id)
            .filter_map(|(_, t)| t.live_topic())
            .collect();

        let fresh: Vec<TopicId> =
            self.catalog.ids().filter(|t| Some(*t) != previous && !busy.contains(t)).collect();
        let candidates = if fresh.is_empty() {
            self.catalog.ids().filter(|t| Some(*t) != previous).collect()
        } else {
            fresh
        };
        self.rng.random_item(&candidates).copied().or(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_support::*;

    fn step(world: &mut World, table: TableId, seconds: f32, config: &SimulationConfig) -> Vec<i32> {
        let mut scores = Vec::new();
        let frames = (seconds / 0.1).round() as usize;
        for _ in 0..frames {
            scores.extend(world.update_table(table, 0.1, config));
        }
        scores
    }

    #[test]
    fn two_sitters_start_a_topic_after_the_selection_delay() {
        let config = SimulationConfig::default();
        let (mut world, chairs) = two_chair_world();
        let a = world.spawn_guest_on(chairs[0]).expect("a");
        let b = world.spawn_guest_on(chairs[1]).expect("b");
        let table = only_table(&world);

        step(&mut world, table, 0.9, &config);
        assert!(world.tables[table].state().is(TableState::NoTopic));
        step(&mut world, table, 0.2, &config);

        let t = &world.tables[table];
        assert!(t.state().is(TableState::Topic));
        assert!(t.topic().is_some());
        assert!(t.line().is_some());
        let duration = t.conversation_duration();
        assert!((8.0..=14.0).contains(&duration));
        for guest in [a, b] {
            assert!(matches!(
                world.characters[guest].emotional_state(),
                EmotionalState::Happy | EmotionalState::Sad
            ));
        }
        assert!(world.cues.iter().any(|c| matches!(c, Cue::TopicStarted { .. })));
    }

    #[test]
    fn lone_sitter_never_gets_a_topic() {
        let config = SimulationConfig::default();
        let (mut world, chairs) = two_chair_world();
        world.spawn_guest_on(chairs[0]).expect("guest");
        let table = only_table(&world);
        step(&mut world, table, 5.0, &config);
        assert!(world.tables[table].state().is(TableState::NoTopic));
        assert_eq!(world.tables[table].topic(), None);
    }

    #[test]
    fn happy_table_scores_plus_one_after_timeout() {
        let config = SimulationConfig::default();
        let (mut world, chairs, table) = talking_table(&config);
        for chair in &chairs {
            let sitter = world.chairs[*chair].sitter.expect("seated");
            world.characters[sitter].change_emotion(EmotionalState::Happy);
        }
        let t = &mut world.tables[table];
        t.conversation_time = t.conversation_duration + 0.01;

        assert_eq!(world.update_table(table, 0.0, &config), None);
        let t = &world.tables[table];
        assert_eq!(t.conversation_score(), 1);
        assert!(t.state().is(TableState::RemovingTopic));
        assert!(t.unfinished_topic_sitters().is_empty());
        for chair in &chairs {
            let sitter = world.chairs[*chair].sitter.expect("seated");
            assert_eq!(world.characters[sitter].emotional_state(), EmotionalState::Neutral);
        }

        assert_eq!(step(&mut world, table, 1.1, &config), vec![1]);
        assert!(world.tables[table].state().is(TableState::ScoringTopic));
        step(&mut world, table, 3.2, &config);
        assert!(world.tables[table].state().is(TableState::NoTopic));
        assert_eq!(world.tables[table].conversation_score(), 0);
    }

    #[test]
    fn any_sad_sitter_scores_minus_one() {
        let config = SimulationConfig::default();
        let (mut world, chairs, table) = talking_table(&config);
        let first = world.chairs[chairs[0]].sitter.expect("seated");
        let second = world.chairs[chairs[1]].sitter.expect("seated");
        world.characters[first].change_emotion(EmotionalState::Happy);
        world.characters[second].change_emotion(EmotionalState::Sad);
        let t = &mut world.tables[table];
        t.conversation_time = t.conversation_duration + 0.01;
        world.update_table(table, 0.0, &config);
        assert_eq!(world.tables[table].conversation_score(), -1);
    }

    #[test]
    fn losing_a_sitter_ends_topic_and_leaves_survivor_lonely() {
        let config = SimulationConfig::default();
        let (mut world, chairs, table) = talking_table(&config);
        let leaving = world.chairs[chairs[0]].sitter.expect("seated");
        let staying = world.chairs[chairs[1]].sitter.expect("seated");
        let player = world.player_id;

        world.pick_up_object(player, leaving).expect("pick up");
        assert!(world.tables[table].state().is(TableState::RemovingTopic));
        assert_eq!(world.characters[staying].emotional_state(), EmotionalState::Lonely);
        assert_eq!(world.tables[table].conversation_score(), 0);

        assert!(step(&mut world, table, 1.1, &config).is_empty());
        assert!(world.tables[table].state().is(TableState::NoTopic));
    }

    #[test]
    fn reseating_the_same_guests_continues_the_conversation() {
        let config = SimulationConfig::default();
        let (mut world, chairs, table) = talking_table(&config);
        let leaving = world.chairs[chairs[0]].sitter.expect("seated");
        let staying = world.chairs[chairs[1]].sitter.expect("seated");
        let player = world.player_id;
        let topic = world.tables[table].topic();
        let reactions = [leaving, staying].map(|g| world.characters[g].emotional_state());

        step(&mut world, table, 2.0, &config);
        let elapsed = world.tables[table].conversation_time();

        world.pick_up_object(player, leaving).expect("pick up");
        step(&mut world, table, 1.1, &config);
        world.drop_object_on_chair(player, chairs[0]).expect("drop");
        step(&mut world, table, 1.1, &config);

        let t = &world.tables[table];
        assert!(t.state().is(TableState::Topic));
        assert_eq!(t.topic(), topic);
        assert!(t.conversation_time() >= elapsed);
        assert!(t.conversation_time() < elapsed + 0.5);
        assert_eq!(reactions, [leaving, staying].map(|g| world.characters[g].emotional_state()));
        assert!(world.cues.iter().any(|c| matches!(c, Cue::TopicContinued { .. })));
    }

    #[test]
    fn new_topic_avoids_previous_and_other_live_topics() {
        let config = SimulationConfig::default();
        let mut world = World::from_layout(&parse(&open_two_table_rows()), small_catalog(3), 2)
            .expect("world");
        let tables: Vec<TableId> = world.tables.keys().collect();
        for chair in world.chairs.keys().collect::<Vec<_>>() {
            world.spawn_guest_on(chair);
        }
        assert!(world.try_set_topic(tables[0], &config));
        let first = world.tables[tables[0]].topic();
        for _ in 0..20 {
            assert!(world.try_set_topic(tables[1], &config));
            let second = world.tables[tables[1]].topic();
            assert_ne!(first, second);
            world.tables[tables[1]].forget_sitters();
        }

        let previous = world.tables[tables[0]].topic();
        world.tables[tables[0]].forget_sitters();
        world.end_topic(tables[0]);
        assert!(world.try_set_topic(tables[0], &config));
        assert_ne!(world.tables[tables[0]].topic(), previous);
    }
}
