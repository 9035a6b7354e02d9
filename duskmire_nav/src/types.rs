// Core types shared across the navigation crate.
//
// Defines world-space positions (`WorldVec3`), integer grid coordinates
// (`CellCoord`) together with the octile cost model, flat-arena node
// indices (`NodeIndex`), and agent identity/state types.
//
// See also: `grid.rs` for the arena the indices point into, `agent.rs`
// for the structs that carry `AgentKind`/`AgentState`.
//
// **Critical constraint: determinism.** All of these are plain integer or
// float value types with derived ordering where needed. Agent IDs are
// sequential counters assigned by `NavState`, never random.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in world space.
///
/// The navigation plane is horizontal: x/z span the grid, y is up. The y
/// component is carried through untouched so callers can keep full 3D
/// transforms; the grid and all distance gates only ever look at x/z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldVec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance in the navigation plane (x/z), ignoring height.
    pub fn planar_distance(self, other: Self) -> f32 {
        self.planar_distance_squared(other).sqrt()
    }

    /// Squared planar distance. Cheaper than `planar_distance` for
    /// threshold comparisons.
    pub fn planar_distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }
}

impl fmt::Display for WorldVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Integer grid cell coordinates: column `x`, row `z`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Octile move-cost estimate to `other`: 14 per diagonal step plus 10
    /// per remaining orthogonal step.
    ///
    /// Uses the same integer weights as the search's step costs, so as a
    /// heuristic it never overestimates the true path cost.
    pub fn octile_cost(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        let (lo, hi) = if dx < dz { (dx, dz) } else { (dz, dx) };
        14 * lo + 10 * (hi - lo)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Index of a node in the grid's flat arena.
///
/// Parent links and all per-node search scratch are keyed by these
/// indices rather than holding references into the grid, keeping
/// ownership trivial and the whole grid relocatable.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeIndex(pub u32);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIndex({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Agent identity and state
// ---------------------------------------------------------------------------

/// Unique identifier for an agent. Sequential, assigned by `NavState` at
/// spawn time. Agents are processed in ascending id order each tick —
/// that order is part of the contract (see `sim.rs`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

/// Agent archetype. All behavioral differences between kinds are data in
/// the per-kind `AgentProfile` table — the controller code never branches
/// on the kind itself.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AgentKind {
    /// Fast pursuer with a tight perimeter.
    Shade,
    /// Slow wanderer that holds a wide perimeter to herd the target.
    Husk,
}

/// Activity state gating what the controller does for an agent each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// Navigation disabled (cutscene, scripted hold). Holds no locks.
    Dormant,
    /// Actively pathing toward the target. The only state that searches.
    Seeking,
    /// Within engage radius of the target; pathing is skipped until the
    /// target moves back out of range.
    Engaging,
    /// Terminal failure: the last path exceeded the profile's step
    /// ceiling. The agent never navigates again.
    Lost,
}
