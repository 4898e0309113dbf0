//! Discussion topics the dinner tables draw from.

use serde::{Deserialize, Serialize};

use crate::types::TopicId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    /// Probability in `[0, 1]` that a participant reacts badly.
    pub controversy: f32,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TopicId> + '_ {
        (0..self.topics.len()).map(TopicId)
    }

    pub fn find(&self, name: &str) -> Option<TopicId> {
        self.topics.iter().position(|topic| topic.name == name).map(TopicId)
    }
}

impl Default for TopicCatalog {
    fn default() -> Self {
        let topic = |name: &str, controversy: f32, lines: &[&str]| Topic {
            name: name.to_string(),
            controversy,
            lines: lines.iter().map(|line| (*line).to_string()).collect(),
        };
        Self::new(vec![
            topic(
                "Weather",
                0.1,
                &[
                    "I think it's going to rain.",
                    "It's very mild for this time of year.",
                    "What a lovely day!",
                ],
            ),
            topic(
                "Gardening",
                0.2,
                &[
                    "Their roses are the best in the village.",
                    "Yes, but do you prune it?",
                    "It's all about the right kind of manure.",
                ],
            ),
            topic(
                "Art",
                0.4,
                &[
                    "I find his work rather pretentious.",
                    "It transcends beauty, I tell you!",
                    "It's... interesting.",
                ],
            ),
            topic(
                "Travel",
                0.2,
                &[
                    "You must go! We did and we loved it.",
                    "The flight was dreadful.",
                    "Travel is food for the soul, dontcha know.",
                ],
            ),
            topic(
                "Politics",
                0.6,
                &[
                    "I'm thinking of going into politics myself.",
                    "The two state solution is really the...",
                    "I would not vote for those crooks even!",
                ],
            ),
            topic(
                "Village gossip",
                0.5,
                &[
                    "And so she married the vicar.",
                    "I don't think that's a good place to hide a body.",
                    "Well, we all knew that!",
                ],
            ),
            topic(
                "Religion",
                0.6,
                &[
                    "Charity, always charity!",
                    "We need to spread the good word.",
                    "That's not what it says in the...",
                ],
            ),
            topic(
                "Cars",
                0.3,
                &[
                    "30 miles to the gallon.",
                    "Took it to the mechanic the other day...",
                    "The slick lines, the leather seats - heaven!",
                ],
            ),
            topic(
                "Health",
                0.2,
                &[
                    "Two liters of water every day, at least.",
                    "A very strange pain right here.",
                    "The doctor said...",
                ],
            ),
            topic("Pop culture", 0.3, &["Who's that guy in that thing?"]),
            topic(
                "Work",
                0.4,
                &["My boss is such a numpty.", "I do it for the paychecks.", "It's a living, yeh?"],
            ),
            topic("Sports", 0.4, &["Did you catch the game last night?"]),
        ])
    }
}
