//! Carry and seat protocol.
//! Every operation here updates both ends of a link (chair and sitter, carrier and
//! carried) before returning, and notifies the owning table of seat changes.

use super::*;
use crate::error::InteractionError;

impl World {
    /// Seats `character` on `chair`, leaving any previous seat or carrier first.
    pub fn sit_on(&mut self, character: CharacterId, chair: ChairId) -> Result<(), InteractionError> {
        let Some(target) = self.chairs.get(chair) else {
            return Err(InteractionError::UnknownEntity);
        };
        if !self.characters.contains_key(character) {
            return Err(InteractionError::UnknownEntity);
        }
        match target.sitter {
            Some(sitter) if sitter == character => return Ok(()),
            Some(_) => return Err(InteractionError::ChairOccupied),
            None => {}
        }
        let (position, facing, table) =
            (target.position, target.direction.to_vec2().angle(), target.table);

        self.release(character);
        self.get_up_from_seat(character);

        let sitter = &mut self.characters[character];
        sitter.position = position;
        sitter.facing = facing;
        sitter.sitting_on = Some(chair);
        self.chairs[chair].sitter = Some(character);

        if let Some(table) = table {
            self.table_added_sitter(table, character);
        }
        Ok(())
    }

    /// Clears both ends of the seat link. No-op for a character that is not seated.
    pub fn get_up_from_seat(&mut self, character: CharacterId) {
        let Some(chair) = self.characters.get_mut(character).and_then(|c| c.sitting_on.take())
        else {
            return;
        };
        let Some(seat) = self.chairs.get_mut(chair) else {
            return;
        };
        seat.sitter = None;
        if let Some(table) = seat.table {
            self.table_removed_sitter(table);
        }
    }

    /// Sets or clears who carries `target`. Idempotent; only the carried side changes,
    /// the carrier's `carrying` slot is owned by pick-up and drop.
    pub fn set_carried_by(&mut self, target: CharacterId, carrier: Option<CharacterId>) {
        let Some(character) = self.characters.get_mut(target) else {
            return;
        };
        if character.carried_by == carrier {
            return;
        }
        character.carried_by = carrier;
        character.can_be_picked_up = carrier.is_none();
        if let Some(carrier) = carrier
            && let Some(position) = self.characters.get(carrier).map(|c| c.position)
        {
            self.characters[target].position = position;
        }
    }

    pub fn pick_up_object(
        &mut self,
        actor: CharacterId,
        target: CharacterId,
    ) -> Result<(), InteractionError> {
        let carrier = self.characters.get(actor).ok_or(InteractionError::UnknownEntity)?;
        if carrier.carrying.is_some() {
            return Err(InteractionError::AlreadyCarrying);
        }
        let picked = self.characters.get(target).ok_or(InteractionError::UnknownEntity)?;
        if actor == target || !picked.is_guest() || !picked.can_be_picked_up {
            return Err(InteractionError::NotPickable);
        }

        if picked.sitting_on.is_some() {
            self.get_up_from_seat(target);
            self.characters[target].change_emotion(EmotionalState::Neutral);
        }
        self.set_carried_by(target, Some(actor));
        self.characters[actor].carrying = Some(target);
        Ok(())
    }

    pub fn drop_object_on_chair(
        &mut self,
        actor: CharacterId,
        chair: ChairId,
    ) -> Result<(), InteractionError> {
        let carried = self
            .characters
            .get(actor)
            .ok_or(InteractionError::UnknownEntity)?
            .carrying
            .ok_or(InteractionError::NotCarrying)?;
        let seat = self.chairs.get(chair).ok_or(InteractionError::UnknownEntity)?;
        if seat.sitter.is_some() {
            return Err(InteractionError::ChairOccupied);
        }

        self.release(carried);
        self.sit_on(carried, chair)
    }

    /// Ends a carry from both sides.
    pub(crate) fn release(&mut self, target: CharacterId) {
        let Some(carrier) = self.characters.get(target).and_then(|c| c.carried_by) else {
            return;
        };
        self.set_carried_by(target, None);
        if let Some(carrier) = self.characters.get_mut(carrier) {
            carrier.carrying = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_support::*;
    use proptest::prelude::*;

    #[test]
    fn sitting_updates_both_ends_and_faces_table() {
        let (mut world, chairs) = two_chair_world();
        let guest = world.insert_character(Character::guest(Vec2::ZERO));
        world.sit_on(guest, chairs[0]).expect("sit");

        assert_eq!(world.chairs[chairs[0]].sitter, Some(guest));
        assert_eq!(world.characters[guest].sitting_on, Some(chairs[0]));
        assert_eq!(world.characters[guest].position, world.chairs[chairs[0]].position);
        let facing = Vec2::from_angle(world.characters[guest].facing);
        let expected = world.chairs[chairs[0]].direction.to_vec2();
        assert!((facing.x - expected.x).abs() < 1e-6 && (facing.z - expected.z).abs() < 1e-6);

        world.sit_on(guest, chairs[1]).expect("move seats");
        assert_eq!(world.chairs[chairs[0]].sitter, None);
        assert_eq!(world.chairs[chairs[1]].sitter, Some(guest));
        world.check_links().expect("links");
    }

    #[test]
    fn pick_up_clears_seat_and_resets_mood() {
        let (mut world, chairs) = two_chair_world();
        let guest = world.spawn_guest_on(chairs[0]).expect("guest");
        world.characters[guest].change_emotion(EmotionalState::Happy);
        let player = world.player_id;

        world.pick_up_object(player, guest).expect("pick up");
        let carried = &world.characters[guest];
        assert_eq!(carried.sitting_on, None);
        assert_eq!(carried.carried_by, Some(player));
        assert!(!carried.can_be_picked_up);
        assert_eq!(carried.emotional_state(), EmotionalState::Neutral);
        assert_eq!(world.chairs[chairs[0]].sitter, None);
        world.check_links().expect("links");
    }

    #[test]
    fn protocol_preconditions_are_reported() {
        let (mut world, chairs) = two_chair_world();
        let a = world.spawn_guest_on(chairs[0]).expect("a");
        let b = world.spawn_guest_on(chairs[1]).expect("b");
        let player = world.player_id;

        assert_eq!(world.drop_object_on_chair(player, chairs[0]), Err(InteractionError::NotCarrying));
        world.pick_up_object(player, a).expect("pick up");
        assert_eq!(world.pick_up_object(player, b), Err(InteractionError::AlreadyCarrying));
        assert_eq!(world.drop_object_on_chair(player, chairs[1]), Err(InteractionError::ChairOccupied));
        assert_eq!(world.pick_up_object(b, player), Err(InteractionError::NotPickable));

        world.drop_object_on_chair(player, chairs[0]).expect("drop");
        assert_eq!(world.player().carrying, None);
        assert_eq!(world.characters[a].sitting_on, Some(chairs[0]));
        assert!(world.characters[a].can_be_picked_up);
        world.check_links().expect("links");
    }

    #[test]
    fn broken_links_name_the_offending_end() {
        let (mut world, chairs) = two_chair_world();
        let guest = world.spawn_guest_on(chairs[0]).expect("guest");
        let player = world.player_id;

        world.characters[guest].sitting_on = None;
        assert_eq!(
            world.check_links(),
            Err(LinkError::ChairSitterMismatch { chair: chairs[0], sitter: guest, sits_on: None })
        );
        world.characters[guest].sitting_on = Some(chairs[0]);
        world.check_links().expect("restored");

        world.pick_up_object(player, guest).expect("pick up");
        world.characters[guest].can_be_picked_up = true;
        assert_eq!(world.check_links(), Err(LinkError::CarriedButPickable(guest)));
        world.characters[guest].can_be_picked_up = false;

        world.characters[player].carrying = None;
        let err = world.check_links().expect_err("one-sided carry");
        assert_eq!(
            err,
            LinkError::CarrierMismatch { character: guest, carrier: player, carrying: None }
        );
        assert!(err.to_string().contains("which carries None"), "{err}");
    }

    #[test]
    fn set_carried_by_is_idempotent() {
        let (mut world, _) = two_chair_world();
        let guest = world.insert_character(Character::guest(Vec2::ZERO));
        let player = world.player_id;
        world.set_carried_by(guest, Some(player));
        world.set_carried_by(guest, Some(player));
        assert_eq!(world.characters[guest].carried_by, Some(player));
        world.set_carried_by(guest, None);
        world.set_carried_by(guest, None);
        assert!(world.characters[guest].can_be_picked_up);
    }

    #[derive(Clone, Debug)]
    enum Op {
        PickUp(usize),
        Drop(usize),
        Sit(usize, usize),
        GetUp(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3).prop_map(Op::PickUp),
            (0usize..4).prop_map(Op::Drop),
            (0usize..3, 0usize..4).prop_map(|(g, c)| Op::Sit(g, c)),
            (0usize..3).prop_map(Op::GetUp),
        ]
    }

    proptest! {
        #[test]
        fn seat_and_carry_links_stay_consistent(ops in proptest::collection::vec(op(), 1..40)) {
            let (mut world, chairs) = four_chair_world();
            let guests: Vec<CharacterId> =
                (0..3).map(|_| world.insert_character(Character::guest(Vec2::ZERO))).collect();
            let player = world.player_id;

            for op in ops {
                // Rejected calls must leave the world untouched, so their errors are ignored.
                let _ = match op {
                    Op::PickUp(g) => world.pick_up_object(player, guests[g]),
                    Op::Drop(c) => world.drop_object_on_chair(player, chairs[c]),
                    Op::Sit(g, c) => world.sit_on(guests[g], chairs[c]),
                    Op::GetUp(g) => {
                        world.get_up_from_seat(guests[g]);
                        Ok(())
                    }
                };
                prop_assert_eq!(world.check_links(), Ok(()));
            }
        }
    }
}
