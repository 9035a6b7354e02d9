// Agent state and steering math.
//
// An `Agent` is one autonomous pursuer: transform (position + heading),
// activity state, the transient path buffer, and the cell-lock
// bookkeeping for its perimeter. The per-tick controller logic lives in
// `sim.rs` as `NavState` methods; this module holds the data and the
// angle helpers it steers with.
//
// Headings are radians about the vertical axis, measured from +x toward
// +z, kept wrapped to (-pi, pi]. Steering closes a fraction of the
// shortest arc toward the target heading each tick, so agents turn
// smoothly instead of snapping.
//
// See also: `config.rs` for `AgentProfile` (the data driving speed and
// turn behavior per kind), `sim.rs` for the controller.

use crate::types::{AgentId, AgentKind, AgentState, NodeIndex, WorldVec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f32::consts::PI;

/// One autonomous pursuer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: WorldVec3,
    /// Current facing, radians in (-pi, pi].
    pub heading: f32,
    pub state: AgentState,

    /// Waypoints from the latest search. Transient: overwritten every
    /// tick, invalid the moment the next search runs.
    #[serde(skip)]
    pub path: Vec<NodeIndex>,

    /// Cells this agent currently holds locked (the Moore neighborhood
    /// of `lock_anchor`). Serialized so a restored snapshot can re-apply
    /// live locks onto the rebuilt grid.
    pub locked_cells: SmallVec<[NodeIndex; 8]>,

    /// The occupied node the locked set was derived from. `None` when
    /// the agent holds no locks.
    pub lock_anchor: Option<NodeIndex>,

    /// Whether the previous tick's search failed; used to emit the
    /// unreachable event on the transition only, not every tick.
    #[serde(default)]
    pub path_was_unreachable: bool,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, position: WorldVec3, heading: f32) -> Self {
        Self {
            id,
            kind,
            position,
            heading: wrap_angle(heading),
            state: AgentState::Seeking,
            path: Vec::new(),
            locked_cells: SmallVec::new(),
            lock_anchor: None,
            path_was_unreachable: false,
        }
    }

    /// Advance the position along the current heading.
    pub fn step_along_heading(&mut self, distance: f32) {
        self.position.x += self.heading.cos() * distance;
        self.position.z += self.heading.sin() * distance;
    }
}

/// Planar (x/z) angle from one position toward another.
pub fn planar_angle(from: WorldVec3, to: WorldVec3) -> f32 {
    (to.z - from.z).atan2(to.x - from.x)
}

/// Wrap an angle into (-pi, pi].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI { wrapped - 2.0 * PI } else { wrapped }
}

/// Close `fraction` of the shortest arc from `current` toward `target`.
/// `fraction` 1.0 snaps; small values turn lazily.
pub fn smooth_heading(current: f32, target: f32, fraction: f32) -> f32 {
    wrap_angle(current + wrap_angle(target - current) * fraction)
}
