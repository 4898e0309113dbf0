//! Tunable simulation parameters.
//!
//! Every field has a serde default, so a TOML file only needs to list the values it
//! overrides. Level, table and goose logic receive a `&SimulationConfig` on every update
//! and read it fresh each tick, which keeps live tuning through [`SimulationConfig::set_parameter`]
//! effective immediately.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub player_move_speed: f32,
    pub goose_walk_speed: f32,
    pub goose_chase_speed: f32,
    pub goose_line_of_sight_chase_distance: f32,
    pub goose_side_chase_distance: f32,
    /// Also the goose's bite cooldown.
    pub goose_bite_stun_time: f32,
    pub goose_player_proximity_chase_distance: f32,
    pub goose_bite_distance: f32,
    pub goose_bite_hold_time: f32,
    pub min_time_per_discussion_topic: f32,
    pub max_time_per_discussion_topic: f32,
    pub topic_selection_delay: f32,
    pub topic_removal_time: f32,
    pub topic_scoring_time: f32,
    pub tear_gravity: f32,
    pub tear_spawn_delay: f32,
    pub tear_spawn_interval: f32,
    pub interaction_distance: f32,
    pub interaction_offset: f32,
    pub intro_duration: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            player_move_speed: 3.0,
            goose_walk_speed: 1.5,
            goose_chase_speed: 4.0,
            goose_line_of_sight_chase_distance: 5.0,
            goose_side_chase_distance: 2.0,
            goose_bite_stun_time: 2.0,
            goose_player_proximity_chase_distance: 1.5,
            goose_bite_distance: 1.0,
            goose_bite_hold_time: 0.5,
            min_time_per_discussion_topic: 8.0,
            max_time_per_discussion_topic: 14.0,
            topic_selection_delay: 1.0,
            topic_removal_time: 1.0,
            topic_scoring_time: 3.0,
            tear_gravity: 5.0,
            tear_spawn_delay: 1.0,
            tear_spawn_interval: 0.2,
            interaction_distance: 1.0,
            interaction_offset: 0.5,
            intro_duration: 2.0,
        }
    }
}

impl SimulationConfig {
    pub const PARAMETER_NAMES: [&'static str; 20] = [
        "player_move_speed",
        "goose_walk_speed",
        "goose_chase_speed",
        "goose_line_of_sight_chase_distance",
        "goose_side_chase_distance",
        "goose_bite_stun_time",
        "goose_player_proximity_chase_distance",
        "goose_bite_distance",
        "goose_bite_hold_time",
        "min_time_per_discussion_topic",
        "max_time_per_discussion_topic",
        "topic_selection_delay",
        "topic_removal_time",
        "topic_scoring_time",
        "tear_gravity",
        "tear_spawn_delay",
        "tear_spawn_interval",
        "interaction_distance",
        "interaction_offset",
        "intro_duration",
    ];

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn parameter(&self, name: &str) -> Option<f32> {
        self.slot(name).map(|value| *value)
    }

    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
        let slot = self.slot_mut(name).ok_or_else(|| ConfigError::UnknownParameter(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    fn slot(&self, name: &str) -> Option<&f32> {
        let value = match name {
            "player_move_speed" => &self.player_move_speed,
            "goose_walk_speed" => &self.goose_walk_speed,
            "goose_chase_speed" => &self.goose_chase_speed,
            "goose_line_of_sight_chase_distance" => &self.goose_line_of_sight_chase_distance,
            "goose_side_chase_distance" => &self.goose_side_chase_distance,
            "goose_bite_stun_time" => &self.goose_bite_stun_time,
            "goose_player_proximity_chase_distance" => &self.goose_player_proximity_chase_distance,
            "goose_bite_distance" => &self.goose_bite_distance,
            "goose_bite_hold_time" => &self.goose_bite_hold_time,
            "min_time_per_discussion_topic" => &self.min_time_per_discussion_topic,
            "max_time_per_discussion_topic" => &self.max_time_per_discussion_topic,
            "topic_selection_delay" => &self.topic_selection_delay,
            "topic_removal_time" => &self.topic_removal_time,
            "topic_scoring_time" => &self.topic_scoring_time,
            "tear_gravity" => &self.tear_gravity,
            "tear_spawn_delay" => &self.tear_spawn_delay,
            "tear_spawn_interval" => &self.tear_spawn_interval,
            "interaction_distance" => &self.interaction_distance,
            "interaction_offset" => &self.interaction_offset,
            "intro_duration" => &self.intro_duration,
            _ => return None,
        };
        Some(value)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut f32> {
        let value = match name {
            "player_move_speed" => &mut self.player_move_speed,
            "goose_walk_speed" => &mut self.goose_walk_speed,
            "goose_chase_speed" => &mut self.goose_chase_speed,
            "goose_line_of_sight_chase_distance" => &mut self.goose_line_of_sight_chase_distance,
            "goose_side_chase_distance" => &mut self.goose_side_chase_distance,
            "goose_bite_stun_time" => &mut self.goose_bite_stun_time,
            "goose_player_proximity_chase_distance" => {
                &mut self.goose_player_proximity_chase_distance
            }
            "goose_bite_distance" => &mut self.goose_bite_distance,
            "goose_bite_hold_time" => &mut self.goose_bite_hold_time,
            "min_time_per_discussion_topic" => &mut self.min_time_per_discussion_topic,
            "max_time_per_discussion_topic" => &mut self.max_time_per_discussion_topic,
            "topic_selection_delay" => &mut self.topic_selection_delay,
            "topic_removal_time" => &mut self.topic_removal_time,
            "topic_scoring_time" => &mut self.topic_scoring_time,
            "tear_gravity" => &mut self.tear_gravity,
            "tear_spawn_delay" => &mut self.tear_spawn_delay,
            "tear_spawn_interval" => &mut self.tear_spawn_interval,
            "interaction_distance" => &mut self.interaction_distance,
            "interaction_offset" => &mut self.interaction_offset,
            "intro_duration" => &mut self.intro_duration,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let config = SimulationConfig::from_toml("goose_chase_speed = 6.5\n").expect("parse");
        assert_eq!(config.goose_chase_speed, 6.5);
        assert_eq!(config.goose_walk_speed, SimulationConfig::default().goose_walk_speed);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = SimulationConfig::from_toml("goose_chase_speed = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn every_named_parameter_is_readable_and_writable() {
        let mut config = SimulationConfig::default();
        for name in SimulationConfig::PARAMETER_NAMES {
            assert!(config.parameter(name).is_some(), "{name} should be readable");
            config.set_parameter(name, 42.0).expect("writable");
            assert_eq!(config.parameter(name), Some(42.0));
        }
        assert!(matches!(
            config.set_parameter("goose_flight_speed", 1.0),
            Err(ConfigError::UnknownParameter(_))
        ));
    }

    #[test]
    fn config_file_loads_from_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("party.toml");
        fs::write(&path, "goose_bite_stun_time = 3.0\nintro_duration = 0.0\n").expect("write");
        let config = SimulationConfig::from_file(&path).expect("load");
        assert_eq!(config.goose_bite_stun_time, 3.0);
        assert_eq!(config.intro_duration, 0.0);
    }
}
