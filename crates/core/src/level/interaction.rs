//! Player interaction targeting and the pick-up/drop action.
//! This module exists to keep "what would the interact button do now" separate from
//! the carry/seat protocol that carries it out.

use super::*;
use crate::error::InteractionError;

impl Level {
    /// Point the player reaches for: `interaction_offset` ahead along the facing.
    pub fn interaction_point(&self) -> Vec2 {
        let player = self.world.player();
        player.position + Vec2::from_angle(player.facing) * self.config.interaction_offset
    }

    /// Nearest empty chair while carrying, otherwise nearest pickable guest, within
    /// `interaction_distance` of [`Level::interaction_point`]. Equal distances keep the
    /// first candidate in arena order.
    pub fn interaction_target(&self) -> Option<InteractionTarget> {
        let point = self.interaction_point();
        let reach = self.config.interaction_distance;
        let world = &self.world;

        if world.player().carrying.is_some() {
            nearest(
                world
                    .chairs
                    .iter()
                    .filter(|(_, chair)| chair.sitter.is_none())
                    .map(|(id, chair)| (InteractionTarget::Chair(id), chair.position)),
                point,
                reach,
            )
        } else {
            nearest(
                world
                    .characters
                    .iter()
                    .filter(|(id, c)| *id != world.player_id && c.is_guest() && c.can_be_picked_up)
                    .map(|(id, c)| (InteractionTarget::Guest(id), c.position)),
                point,
                reach,
            )
        }
    }

    /// Picks up or drops on whatever [`Level::interaction_target`] names. `Ok(None)` when
    /// nothing is in reach.
    pub fn try_pick_up_or_drop(&mut self) -> Result<Option<InteractionTarget>, InteractionError> {
        let Some(target) = self.interaction_target() else {
            return Ok(None);
        };
        let player = self.world.player_id;
        match target {
            InteractionTarget::Chair(chair) => self.world.drop_object_on_chair(player, chair)?,
            InteractionTarget::Guest(guest) => self.world.pick_up_object(player, guest)?,
        }
        Ok(Some(target))
    }
}

fn nearest(
    candidates: impl Iterator<Item = (InteractionTarget, Vec2)>,
    point: Vec2,
    reach: f32,
) -> Option<InteractionTarget> {
    let mut best: Option<(InteractionTarget, f32)> = None;
    for (target, position) in candidates {
        let distance = position.distance(point);
        if distance < reach && best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((target, distance));
        }
    }
    best.map(|(target, _)| target)
}
