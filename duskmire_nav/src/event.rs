// Narrative events emitted by the navigation simulation.
//
// Each `NavState::step` returns the events that fired during that tick —
// the output half of the pure function `(state, target, commands) ->
// (state', events)`. The game layer consumes them to drive animation
// state, audio stingers, and encounter scripting; the library itself
// attaches no meaning to them beyond emitting each transition once.
//
// There is no internal scheduled-event queue here: the controller
// replans every agent every tick by contract, so there is never a
// future event to schedule.
//
// See also: `sim.rs` for the transitions that emit these.

use crate::types::{AgentId, AgentKind};
use serde::{Deserialize, Serialize};

/// An event visible to the caller, stamped with the tick it fired on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavEvent {
    pub tick: u64,
    pub kind: NavEventKind,
}

/// Types of events the navigation sim emits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavEventKind {
    /// A new agent entered the simulation.
    AgentSpawned { agent_id: AgentId, kind: AgentKind },
    /// An agent was removed.
    AgentDespawned { agent_id: AgentId },
    /// An agent closed within its engage radius and stopped pathing.
    AgentEngaged { agent_id: AgentId },
    /// An engaging agent's target slipped back out of range.
    AgentResumedSeeking { agent_id: AgentId },
    /// An agent's path exceeded its step ceiling; it is permanently lost.
    AgentLost { agent_id: AgentId, path_steps: usize },
    /// An agent's search found no route this tick. Emitted on the
    /// transition into the failing condition, not every failing tick.
    PathUnreachable { agent_id: AgentId },
}
