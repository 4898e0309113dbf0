//! Enum-tagged state with an elapsed-time clock.
//! Characters, tables, geese and the level all run one of these; transitions are plain
//! method calls that reset the per-state clock while the lifetime clock keeps running.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedState<E> {
    id: E,
    /// Seconds spent in the current state.
    time: f32,
    /// Seconds since the state machine was created.
    life_time: f32,
}

impl<E: Copy + PartialEq> TimedState<E> {
    pub fn new(id: E) -> Self {
        Self { id, time: 0.0, life_time: 0.0 }
    }

    pub fn id(&self) -> E {
        self.id
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn life_time(&self) -> f32 {
        self.life_time
    }

    pub fn is(&self, id: E) -> bool {
        self.id == id
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.life_time += dt;
    }

    /// Enters `id` unconditionally, restarting the state clock even on self-transitions.
    pub fn change(&mut self, id: E) {
        self.id = id;
        self.time = 0.0;
    }

    /// Enters `id` only if it differs from the current state. Returns whether it did.
    pub fn change_if_different(&mut self, id: E) -> bool {
        if self.id == id {
            return false;
        }
        self.change(id);
        true
    }
}
