//! Goose behaviour: idling, patrolling clear corridors, chasing and biting the player.
//! This module exists to keep the goose's decision making next to the spatial queries
//! it reads.
//! It does not own collision resolution; movement goes through a `MotionResolver`.

use tracing::{debug, info};

use super::*;
use crate::motion::{Body, MotionResolver, intent_velocity, move_body};

/// How close to a tile centre or walk target counts as arrived.
const ARRIVE_TOLERANCE: f32 = 0.05;
const SIGHT_HALF_WIDTH: f32 = 0.1;
/// Minimum open tiles ahead for a patrol direction.
const MIN_WALK_CLEARANCE: u32 = 2;
/// While biting is on cooldown, patrol directions this aligned with the player are avoided.
const AVOID_PLAYER_DOT: f32 = 0.3;
const CHASE_RAMP_RATE: f32 = 1.5;
const DIRECT_CHASE_DISTANCE: f32 = 1.5;
const SETTLE_TIME: f32 = 0.3;
const REALIGN_TIME: f32 = 1.0;

#[derive(Clone, Debug)]
pub struct Goose {
    pub id: GooseId,
    pub position: Vec2,
    pub facing: f32,
    state: TimedState<GooseState>,
    move_intent: Vec2,
    walk_target: Option<Vec2>,
    last_bite_time: Option<f32>,
    chase_target: Option<CharacterId>,
    next_state_change_time: f32,
}

impl Goose {
    pub fn new(position: Vec2, rng: &mut SimRng) -> Self {
        Self {
            id: GooseId::default(),
            position,
            facing: 0.0,
            state: TimedState::new(GooseState::Sitting),
            move_intent: Vec2::ZERO,
            walk_target: None,
            last_bite_time: None,
            chase_target: None,
            next_state_change_time: sit_duration(rng),
        }
    }

    pub fn state(&self) -> &TimedState<GooseState> {
        &self.state
    }

    pub fn walk_target(&self) -> Option<Vec2> {
        self.walk_target
    }

    pub fn chase_target(&self) -> Option<CharacterId> {
        self.chase_target
    }

    pub fn move_intent(&self) -> Vec2 {
        self.move_intent
    }

    /// False until `goose_bite_stun_time` has passed since the last bite.
    pub fn can_bite(&self, config: &SimulationConfig) -> bool {
        self.last_bite_time
            .is_none_or(|bitten_at| self.state.life_time() - bitten_at > config.goose_bite_stun_time)
    }

    fn is_tile_aligned(&self) -> bool {
        self.position.distance(World::tile_of(self.position).center()) <= ARRIVE_TOLERANCE
    }

    fn start_sitting(&mut self, rng: &mut SimRng) {
        self.state.change(GooseState::Sitting);
        self.next_state_change_time = sit_duration(rng);
        self.move_intent = Vec2::ZERO;
        self.walk_target = None;
        self.chase_target = None;
    }
}

fn sit_duration(rng: &mut SimRng) -> f32 {
    rng.uniform() * 4.0 + 3.0
}

impl World {
    pub fn update_goose(
        &mut self,
        id: GooseId,
        dt: f32,
        config: &SimulationConfig,
        resolver: &dyn MotionResolver,
    ) {
        let Some(goose) = self.geese.get_mut(id) else {
            return;
        };
        goose.state.update(dt);
        let player = self.player_id;
        let player_position = self.characters.get(player).map(|c| c.position);

        let watching = !matches!(
            goose.state.id(),
            GooseState::Chasing | GooseState::WalkingRealigning
        );
        if watching
            && goose.can_bite(config)
            && let Some(target) = player_position
            && self.goose_notices(id, target, config)
        {
            self.start_chasing(id, player);
        }

        let speed = self.goose_think(id, dt, config);
        self.move_goose(id, dt, speed, resolver);
    }

    /// Proximity check, then the forward sight line (and both side lines while sitting).
    /// A sight line only counts if no wall stands between the goose and the player.
    pub fn goose_notices(&self, id: GooseId, target: Vec2, config: &SimulationConfig) -> bool {
        let Some(goose) = self.geese.get(id) else {
            return false;
        };
        let distance = goose.position.distance(target);
        if distance < config.goose_player_proximity_chase_distance {
            return true;
        }

        let forward = CardinalDirection::from_vec2(Vec2::from_angle(goose.facing));
        let mut lines = vec![(forward, config.goose_line_of_sight_chase_distance)];
        if goose.state.is(GooseState::Sitting) {
            lines.push((forward.next(), config.goose_side_chase_distance));
            lines.push((forward.previous(), config.goose_side_chase_distance));
        }

        let walls = self.grid.wall_distances(World::tile_of(goose.position));
        let target_rect = Body::character(target).rect();
        lines.into_iter().any(|(direction, reach)| {
            let end = goose.position + direction.to_vec2() * reach;
            let sight = Rect::around(goose.position, SIGHT_HALF_WIDTH)
                .union(Rect::around(end, SIGHT_HALF_WIDTH));
            sight.intersects(target_rect) && walls[direction.index()] as f32 > distance
        })
    }

    /// Starts a patrol leg along a clear corridor, realigning to the tile centre first.
    pub fn start_walking(&mut self, id: GooseId, config: &SimulationConfig) {
        let player_position = self.characters.get(self.player_id).map(|c| c.position);
        let Some(goose) = self.geese.get_mut(id) else {
            return;
        };
        let tile = World::tile_of(goose.position);
        let center = tile.center();
        if !goose.is_tile_aligned() {
            goose.state.change(GooseState::WalkingRealigning);
            goose.move_intent = center - goose.position;
            goose.walk_target = Some(center);
            goose.chase_target = None;
            return;
        }

        let walls = self.grid.wall_distances(tile);
        let candidates: Vec<CardinalDirection> = CardinalDirection::ALL
            .into_iter()
            .filter(|d| walls[d.index()] >= MIN_WALK_CLEARANCE)
            .collect();
        let candidates = match player_position {
            Some(player) if !goose.can_bite(config) => {
                let toward = (player - goose.position).normalized();
                let away: Vec<CardinalDirection> = candidates
                    .iter()
                    .copied()
                    .filter(|d| toward.dot(d.to_vec2()) < AVOID_PLAYER_DOT)
                    .collect();
                if away.is_empty() { candidates } else { away }
            }
            _ => candidates,
        };

        let Some(&direction) = self.rng.random_item(&candidates) else {
            goose.start_sitting(&mut self.rng);
            return;
        };
        let clearance = walls[direction.index()];
        let tiles = ((self.rng.uniform() * 5.0 + 0.5).round() as u32).clamp(1, clearance - 1);

        goose.state.change(GooseState::Walking);
        goose.move_intent = direction.to_vec2();
        goose.walk_target = Some(center + direction.to_vec2() * tiles as f32);
        goose.chase_target = None;
    }

    /// Locks onto `target`. Close, nearly diagonal targets are approached directly;
    /// otherwise the goose runs along the axis with the larger offset.
    pub fn start_chasing(&mut self, id: GooseId, target: CharacterId) {
        let Some(target_position) = self.characters.get(target).map(|c| c.position) else {
            return;
        };
        let Some(goose) = self.geese.get_mut(id) else {
            return;
        };
        let offset = target_position - goose.position;
        let (ax, az) = (offset.x.abs(), offset.z.abs());
        let nearly_diagonal = ax <= 2.0 * az && az <= 2.0 * ax;
        goose.move_intent = if nearly_diagonal && offset.length() < DIRECT_CHASE_DISTANCE {
            offset
        } else if ax > az {
            Vec2::new(offset.x, 0.0)
        } else {
            Vec2::new(0.0, offset.z)
        };
        goose.state.change(GooseState::Chasing);
        goose.chase_target = Some(target);
        goose.walk_target = None;

        info!(goose = ?id, "goose gives chase");
        self.cues.push(Cue::GooseAttack { goose: id });
    }

    pub fn bite(&mut self, id: GooseId, target: CharacterId) {
        let Some(goose) = self.geese.get_mut(id) else {
            return;
        };
        goose.state.change(GooseState::Biting);
        goose.last_bite_time = Some(goose.state.life_time());
        goose.chase_target = None;
        goose.move_intent = Vec2::ZERO;

        info!(goose = ?id, "goose bites");
        self.cues.push(Cue::GooseBite { goose: id, target });
        if let Some(victim) = self.characters.get_mut(target) {
            victim.get_bitten(&mut self.cues);
        }
    }

    fn goose_sit(&mut self, id: GooseId) {
        if let Some(goose) = self.geese.get_mut(id) {
            goose.start_sitting(&mut self.rng);
        }
    }

    fn goose_random_idle(&mut self, id: GooseId, config: &SimulationConfig) {
        if self.rng.coin_flip() {
            self.goose_sit(id);
        } else {
            self.start_walking(id, config);
        }
    }

    /// Runs the current state's logic and returns this frame's move speed.
    fn goose_think(&mut self, id: GooseId, dt: f32, config: &SimulationConfig) -> f32 {
        let Some(goose) = self.geese.get(id) else {
            return 0.0;
        };
        let time = goose.state.time();
        match goose.state.id() {
            GooseState::Sitting => {
                if time > goose.next_state_change_time {
                    self.goose_random_idle(id, config);
                }
                0.0
            }
            GooseState::Walking | GooseState::WalkingRealigning => self.walk_step(id, dt, config),
            GooseState::Chasing => self.chase_step(id, config),
            GooseState::Biting => {
                if time > config.goose_bite_hold_time {
                    self.start_walking(id, config);
                }
                0.0
            }
        }
    }

    fn walk_step(&mut self, id: GooseId, dt: f32, config: &SimulationConfig) -> f32 {
        let goose = &mut self.geese[id];
        let Some(target) = goose.walk_target else {
            let time = goose.state.time();
            if time > SETTLE_TIME && goose.is_tile_aligned() {
                self.goose_sit(id);
                return 0.0;
            }
            if time > REALIGN_TIME {
                self.start_walking(id, config);
                return 0.0;
            }
            return config.goose_walk_speed;
        };

        let remaining = target - goose.position;
        let distance = remaining.length();
        if distance < ARRIVE_TOLERANCE {
            goose.position = target;
            if goose.state.is(GooseState::WalkingRealigning) {
                self.start_walking(id, config);
            } else {
                self.goose_random_idle(id, config);
            }
            return 0.0;
        }
        goose.move_intent = remaining;
        if dt > 0.0 { config.goose_walk_speed.min(distance / dt) } else { 0.0 }
    }

    fn chase_step(&mut self, id: GooseId, config: &SimulationConfig) -> f32 {
        let goose = &self.geese[id];
        let target = goose
            .chase_target
            .and_then(|target| self.characters.get(target).map(|c| (target, c.position)));
        let Some((target, target_position)) = target else {
            self.start_walking(id, config);
            return 0.0;
        };

        let offset = target_position - goose.position;
        if offset.length() < config.goose_bite_distance {
            self.bite(id, target);
            return 0.0;
        }

        let ramp = (goose.state.time() * CHASE_RAMP_RATE).clamp(0.0, 1.0);
        let speed =
            config.goose_walk_speed + (config.goose_chase_speed - config.goose_walk_speed) * ramp;
        let intent = goose.move_intent;
        if offset.x * intent.x < 0.0 || offset.z * intent.z < 0.0 {
            let goose = &mut self.geese[id];
            goose.state.change(GooseState::Walking);
            goose.walk_target = None;
            goose.chase_target = None;
            debug!(goose = ?id, "goose overshot and gave up the chase");
        }
        speed
    }

    fn move_goose(&mut self, id: GooseId, dt: f32, speed: f32, resolver: &dyn MotionResolver) {
        let Some(goose) = self.geese.get(id) else {
            return;
        };
        let velocity = intent_velocity(goose.move_intent, speed);
        if velocity.is_zero() || dt <= 0.0 {
            return;
        }
        let before = goose.position;
        let after = move_body(resolver, &self.grid, Body::character(before), velocity, dt);

        let goose = &mut self.geese[id];
        goose.facing = velocity.angle();
        goose.position = after;
        if after == before && !goose.state.is(GooseState::Sitting) {
            debug!(goose = ?id, "goose stuck against a wall");
            self.goose_sit(id);
        }
    }
}
