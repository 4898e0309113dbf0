//! Snapshot hashing over the canonical party state for determinism checks.
//! This module exists to keep hash layout out of the frame-update code.
//! It does not own replay execution or journal persistence.

use std::hash::Hasher;

use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Level {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.frame);
        hasher.write_u8(self.state.id() as u8);
        hasher.write_u32(self.state.time().to_bits());
        hasher.write_u32(self.score);
        hasher.write_u32(self.negative_score);

        let world = &self.world;
        for (id, character) in &world.characters {
            hasher.write_u64(id.data().as_ffi());
            write_vec2(&mut hasher, character.position);
            hasher.write_u32(character.facing.to_bits());
            hasher.write_u8(character.action.id() as u8);
            hasher.write_u8(character.emotional_state() as u8);
            hasher.write_u32(character.emotion.time().to_bits());
            hasher.write_u64(character.sitting_on.map_or(0, |c| c.data().as_ffi()));
            hasher.write_u64(character.carried_by.map_or(0, |c| c.data().as_ffi()));
        }
        for (id, table) in &world.tables {
            hasher.write_u64(id.data().as_ffi());
            hasher.write_u8(table.state().id() as u8);
            hasher.write_u64(table.topic().map_or(u64::MAX, |t| t.0 as u64));
            hasher.write_u32(table.conversation_time().to_bits());
            hasher.write_i32(table.conversation_score());
        }
        for goose in world.geese.values() {
            write_vec2(&mut hasher, goose.position);
            hasher.write_u32(goose.facing.to_bits());
            hasher.write_u8(goose.state().id() as u8);
        }
        hasher.write_usize(world.tears.len());
        hasher.finish()
    }
}

fn write_vec2(hasher: &mut Xxh3, v: Vec2) {
    hasher.write_u32(v.x.to_bits());
    hasher.write_u32(v.z.to_bits());
}
