//! Axis-separated movement against the wall grid.
//! The simulation only depends on [`MotionResolver`]; [`TileCollider`] is the stock
//! resolver that clamps a sliding box against wall tiles.

use crate::grid::CollisionGrid;
use crate::types::{Rect, TileCoord, Vec2};

/// Small tolerance so a box resting exactly on a tile edge is not treated as inside it.
const EDGE_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
}

/// A square collision box centred on `position`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub half_extent: f32,
}

impl Body {
    pub const CHARACTER_HALF_EXTENT: f32 = 0.25;

    pub fn character(position: Vec2) -> Self {
        Self { position, half_extent: Self::CHARACTER_HALF_EXTENT }
    }

    pub fn rect(&self) -> Rect {
        Rect::around(self.position, self.half_extent)
    }
}

pub trait MotionResolver {
    /// Advances `body` by `velocity * dt` along `axis` only and returns the corrected
    /// position, which never penetrates a wall tile.
    fn move_and_collide(
        &self,
        grid: &CollisionGrid,
        body: Body,
        velocity: Vec2,
        dt: f32,
        axis: Axis,
    ) -> Vec2;
}

/// Moves along x, then along z, the way characters and geese step every frame.
pub fn move_body(
    resolver: &dyn MotionResolver,
    grid: &CollisionGrid,
    body: Body,
    velocity: Vec2,
    dt: f32,
) -> Vec2 {
    let after_x = resolver.move_and_collide(grid, body, velocity, dt, Axis::X);
    let body = Body { position: after_x, ..body };
    resolver.move_and_collide(grid, body, velocity, dt, Axis::Z)
}

/// Velocity for a steering intent: each axis clamped to `[-1, 1]`, normalised so
/// diagonals are no faster than straight lines, then scaled by `speed`.
pub fn intent_velocity(intent: Vec2, speed: f32) -> Vec2 {
    Vec2::new(intent.x.clamp(-1.0, 1.0), intent.z.clamp(-1.0, 1.0)).normalized() * speed
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TileCollider;

impl MotionResolver for TileCollider {
    fn move_and_collide(
        &self,
        grid: &CollisionGrid,
        body: Body,
        velocity: Vec2,
        dt: f32,
        axis: Axis,
    ) -> Vec2 {
        let half = body.half_extent;
        let pos = body.position;
        match axis {
            Axis::X => {
                let x = sweep(pos.x, velocity.x * dt, half, pos.z - half, pos.z + half, |along, cross| {
                    grid.is_wall(TileCoord { x: along, z: cross })
                });
                Vec2 { x, z: pos.z }
            }
            Axis::Z => {
                let z = sweep(pos.z, velocity.z * dt, half, pos.x - half, pos.x + half, |along, cross| {
                    grid.is_wall(TileCoord { x: cross, z: along })
                });
                Vec2 { x: pos.x, z }
            }
        }
    }
}

/// One-dimensional sweep of a box of half width `half` from `start` by `delta`.
/// `cross_min..cross_max` is the box extent on the other axis. Only tiles fully ahead
/// of the leading edge can block, so a box already overlapping a wall may move out.
fn sweep(
    start: f32,
    delta: f32,
    half: f32,
    cross_min: f32,
    cross_max: f32,
    is_wall: impl Fn(i32, i32) -> bool,
) -> f32 {
    let end = start + delta;
    let cross_first = cross_min.floor() as i32;
    let cross_last = cross_max.ceil() as i32 - 1;
    let blocked = |along: i32| (cross_first..=cross_last).any(|cross| is_wall(along, cross));

    if delta > 0.0 {
        let first = (start + half - EDGE_EPSILON).ceil() as i32;
        let last = (end + half).ceil() as i32 - 1;
        for along in first..=last {
            if blocked(along) {
                return along as f32 - half;
            }
        }
    } else if delta < 0.0 {
        let first = (start - half + EDGE_EPSILON).floor() as i32 - 1;
        let last = (end - half).floor() as i32;
        for along in (last..=first).rev() {
            if blocked(along) {
                return (along + 1) as f32 + half;
            }
        }
    }
    end
}
