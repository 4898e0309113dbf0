use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct CharacterId;
    pub struct ChairId;
    pub struct TableId;
    pub struct GooseId;
    pub struct TearId;
}

/// Position or direction on the garden floor. `z` grows with the grid row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, z: 0.0 };

    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.z * other.z
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 { Vec2::ZERO } else { Vec2 { x: self.x / len, z: self.z / len } }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.z == 0.0
    }

    /// Unit vector for a facing angle; angle 0 looks down +z.
    pub fn from_angle(angle: f32) -> Vec2 {
        Vec2 { x: angle.sin(), z: angle.cos() }
    }

    /// Facing angle of this vector, inverse of [`Vec2::from_angle`].
    pub fn angle(self) -> f32 {
        self.x.atan2(self.z)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, z: self.z + rhs.z }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, z: self.z - rhs.z }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 { x: self.x * rhs, z: self.z * rhs }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn step(self, direction: CardinalDirection, distance: i32) -> TileCoord {
        let (dx, dz) = direction.offset();
        TileCoord { x: self.x + dx * distance, z: self.z + dz * distance }
    }

    pub fn center(self) -> Vec2 {
        Vec2 { x: self.x as f32 + 0.5, z: self.z as f32 + 0.5 }
    }
}

/// Axis-aligned rectangle in grid space, edges exclusive for intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn around(center: Vec2, half_extent: f32) -> Rect {
        Rect {
            left: center.x - half_extent,
            right: center.x + half_extent,
            top: center.z - half_extent,
            bottom: center.z + half_extent,
        }
    }

    pub fn union(self, other: Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            right: self.right.max(other.right),
            top: self.top.min(other.top),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn intersects(self, other: Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Rectangle of whole tiles, as produced by grouping authoring tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub depth: i32,
}

impl TileRect {
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.left
            && coord.x < self.left + self.width
            && coord.z >= self.top
            && coord.z < self.top + self.depth
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.left as f32 + self.width as f32 * 0.5,
            z: self.top as f32 + self.depth as f32 * 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardinalDirection {
    Right,
    Down,
    Left,
    Up,
}

impl CardinalDirection {
    pub const ALL: [CardinalDirection; 4] = [
        CardinalDirection::Right,
        CardinalDirection::Down,
        CardinalDirection::Left,
        CardinalDirection::Up,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            CardinalDirection::Right => (1, 0),
            CardinalDirection::Down => (0, 1),
            CardinalDirection::Left => (-1, 0),
            CardinalDirection::Up => (0, -1),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        let (dx, dz) = self.offset();
        Vec2 { x: dx as f32, z: dz as f32 }
    }

    /// Dominant-axis direction of `v`. Exact diagonals resolve to the x axis.
    pub fn from_vec2(v: Vec2) -> CardinalDirection {
        if v.x.abs() >= v.z.abs() {
            if v.x >= 0.0 { CardinalDirection::Right } else { CardinalDirection::Left }
        } else if v.z > 0.0 {
            CardinalDirection::Down
        } else {
            CardinalDirection::Up
        }
    }

    /// Clockwise neighbour.
    pub fn next(self) -> CardinalDirection {
        Self::ALL[(self.index() + 1) % 4]
    }

    pub fn previous(self) -> CardinalDirection {
        Self::ALL[(self.index() + 3) % 4]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Open,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionState {
    Normal,
    Stunned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionalState {
    Happy,
    Neutral,
    Sad,
    Lonely,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GooseState {
    Sitting,
    Walking,
    WalkingRealigning,
    Chasing,
    Biting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableState {
    NoTopic,
    Topic,
    RemovingTopic,
    ScoringTopic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelState {
    GameTitle,
    Intro,
    InProgress,
    Success,
    Fail,
}

impl LevelState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LevelState::Success | LevelState::Fail)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TearSide {
    Left,
    Right,
}

impl TearSide {
    pub fn flipped(self) -> TearSide {
        match self {
            TearSide::Left => TearSide::Right,
            TearSide::Right => TearSide::Left,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            TearSide::Left => -1.0,
            TearSide::Right => 1.0,
        }
    }
}

/// Fire-and-forget audio/visual side effects, queued in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum Cue {
    Victory,
    Aww,
    Crying { character: CharacterId },
    TearSpawned { character: CharacterId, side: TearSide },
    Stunned { character: CharacterId },
    GooseAttack { goose: GooseId },
    GooseBite { goose: GooseId, target: CharacterId },
    TopicStarted { table: TableId, topic: TopicId },
    TopicContinued { table: TableId, topic: TopicId },
    LevelSucceeded,
    LevelFailed,
}

/// What the player would interact with if the interact button was pressed now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionTarget {
    Chair(ChairId),
    Guest(CharacterId),
}

/// One frame of player input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    pub move_x: f32,
    pub move_z: f32,
    pub interact: bool,
}

impl FrameInput {
    pub fn is_idle(&self) -> bool {
        self.move_x == 0.0 && self.move_z == 0.0 && !self.interact
    }
}
