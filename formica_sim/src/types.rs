// Core types shared across the simulation.
//
// Defines the continuous position type (`Vec2`), compact ant identifiers,
// the closed enums for colonies, castes, behavior states and control mode,
// and the pheromone channel addressing scheme. Everything derives
// `Serialize`/`Deserialize` so configs, stats and events can be written as
// JSON by external consumers.
//
// **Critical constraint: determinism.** Ordered enums (`Caste`, `ColonyId`)
// are used as `BTreeMap` keys; their `Ord` impls fix iteration order.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// How far inside each wall a clamped position is kept.
pub const WALL_MARGIN: f32 = 0.01;

/// A position (or displacement) in world units. One world unit is one
/// pheromone cell at the default `cell_size` of 1.0.
///
/// Axes: X grows east, Y grows south. Heading 0 faces +X; positive angles
/// rotate toward +Y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector for a heading in radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Heading (radians) pointing from `self` toward `other`.
    pub fn heading_to(self, other: Self) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// The point `distance` units away along `angle`.
    pub fn offset(self, angle: f32, distance: f32) -> Self {
        let dir = Self::from_angle(angle);
        Self::new(self.x + dir.x * distance, self.y + dir.y * distance)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Clamp into a `width` x `height` world, `WALL_MARGIN` inside the walls.
    pub fn clamp_inside(self, width: f32, height: f32) -> Self {
        let margin_x = WALL_MARGIN.min(width * 0.5);
        let margin_y = WALL_MARGIN.min(height * 0.5);
        Self::new(
            self.x.clamp(margin_x, width - margin_x),
            self.y.clamp(margin_y, height - margin_y),
        )
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Compact ant identifier, allocated sequentially by the owning colony and
/// never reused. Unique within a colony; pair with `ColonyId` for a global
/// key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AntId(pub u32);

impl fmt::Display for AntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ant#{}", self.0)
    }
}

/// One of the two competing colonies. Colony A is the player's side when a
/// WON/LOST result is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColonyId {
    A,
    B,
}

impl ColonyId {
    pub const ALL: [ColonyId; 2] = [ColonyId::A, ColonyId::B];

    pub const fn index(self) -> usize {
        match self {
            ColonyId::A => 0,
            ColonyId::B => 1,
        }
    }

    pub const fn opponent(self) -> Self {
        match self {
            ColonyId::A => ColonyId::B,
            ColonyId::B => ColonyId::A,
        }
    }
}

impl fmt::Display for ColonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColonyId::A => write!(f, "colony A"),
            ColonyId::B => write!(f, "colony B"),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent enums
// ---------------------------------------------------------------------------

/// An ant's role. Stats live in the caste table in `GameConfig`; the code
/// branches on caste only where behavior differs (queens don't run the state
/// machine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Caste {
    Worker,
    Soldier,
    Queen,
}

impl Caste {
    pub const ALL: [Caste; 3] = [Caste::Worker, Caste::Soldier, Caste::Queen];
}

/// Behavior state of a non-queen ant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntState {
    /// Random walk, no pheromone signal under any sensor.
    Wandering,
    /// Steering along a sensed pheromone gradient.
    Following,
    /// Holding food, heading home and laying trail.
    Carrying,
    /// Locked onto an enemy within detection radius.
    Fighting,
    /// Slow patrol around the nest.
    Guarding,
}

/// Who decides what an ant does each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    /// The state machine in `ant.rs` runs every tick.
    #[default]
    AiControlled,
    /// AI dispatch is skipped; an outside controller writes position, angle,
    /// state and carried food through the public mutators.
    ExternallyDriven,
}

/// Final outcome of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Victory {
    #[default]
    None,
    ColonyA,
    ColonyB,
}

impl Victory {
    /// The outcome in which `colony` is the winner.
    pub const fn won_by(colony: ColonyId) -> Self {
        match colony {
            ColonyId::A => Victory::ColonyA,
            ColonyId::B => Victory::ColonyB,
        }
    }

    pub const fn winner(self) -> Option<ColonyId> {
        match self {
            Victory::None => None,
            Victory::ColonyA => Some(ColonyId::A),
            Victory::ColonyB => Some(ColonyId::B),
        }
    }
}

// ---------------------------------------------------------------------------
// Pheromone channels
// ---------------------------------------------------------------------------

/// Signal type carried by a pheromone channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PheromoneKind {
    /// Laid by food carriers on the way home; followed by foragers.
    Trail,
    /// Laid by fighting ants; fades fast; draws soldiers.
    Alarm,
}

impl PheromoneKind {
    pub const ALL: [PheromoneKind; 2] = [PheromoneKind::Trail, PheromoneKind::Alarm];

    pub const fn index(self) -> usize {
        match self {
            PheromoneKind::Trail => 0,
            PheromoneKind::Alarm => 1,
        }
    }
}

/// Address of one pheromone grid: one channel per colony per signal kind.
/// Colonies never read each other's channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PheromoneChannel {
    pub colony: ColonyId,
    pub kind: PheromoneKind,
}

/// Number of channels the sim allocates (`ColonyId::ALL × PheromoneKind::ALL`).
pub const CHANNEL_COUNT: usize = 4;

impl PheromoneChannel {
    pub const fn new(colony: ColonyId, kind: PheromoneKind) -> Self {
        Self { colony, kind }
    }

    /// Flat index into the field's channel list: `colony * 2 + kind`.
    pub const fn index(self) -> usize {
        self.colony.index() * PheromoneKind::ALL.len() + self.kind.index()
    }
}
