// Top-level navigation state and the per-tick pursuit controller.
//
// `NavState` is the explicit owned context for one level's navigation:
// config, obstacle list, the baked grid, the reusable path engine, and
// every agent. Nothing here is global — tests and tools construct as
// many independent `NavState`s as they like.
//
// One call to `step()` is one simulation tick. Per tick, per active
// agent: gate on engage distance, re-run the search from scratch (no
// cached plans — the target moves every tick, so every tick replans),
// apply the give-up ceiling, update the cell-lock perimeter, then steer
// one movement step along the fresh path.
//
// **Agent processing order is contractual**: agents advance in ascending
// `AgentId` order (`BTreeMap` iteration). Locks written by an earlier
// agent are visible to every later agent's search in the same tick, so
// achieved paths depend on that order. The order is fixed precisely so
// the dependence is reproducible — identical inputs replay to identical
// states.
//
// Cell locks: a seeking agent holds its occupied cell's Moore
// neighborhood non-walkable, discouraging other agents from crowding
// through it. The locked set follows the agent: when the occupied cell
// changes, the old set is released (obstructed cells stay blocked) and
// the new one locked. Despawn, deactivation, relocation, and the `Lost`
// transition all release. An agent's own locks are lifted for the
// duration of its own search — a perimeter that walled in its owner
// would freeze the agent in place forever.
//
// Serialization: `to_json`/`from_json` snapshot everything except the
// grid and engine, which `rebuild_transient_state()` reconstructs from
// the retained obstacle list — including re-applying every live lock,
// so a restored snapshot has identical walkability.
//
// See also: `pathfinding.rs` for the search, `agent.rs` for steering
// math, `command.rs`/`event.rs` for the input/output surfaces.
//
// **Critical constraint: determinism.** The sim is a pure function
// `(state, target, commands) -> (state', events)`. No randomness, no
// system time, `BTreeMap` for keyed collections.

use crate::agent::{planar_angle, smooth_heading, wrap_angle, Agent};
use crate::command::{NavAction, NavCommand};
use crate::config::NavConfig;
use crate::event::{NavEvent, NavEventKind};
use crate::grid::NavGrid;
use crate::obstacle::ObstacleVolume;
use crate::pathfinding::{PathEngine, SearchOutcome};
use crate::types::{AgentId, AgentState, NodeIndex, WorldVec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::mem;

/// The navigation context for one loaded level.
#[derive(Serialize, Deserialize)]
pub struct NavState {
    tick: u64,
    pub config: NavConfig,
    /// Static obstacle volumes, retained so the grid can be rebuilt
    /// after deserialization. Never updated post-construction.
    obstacles: Vec<ObstacleVolume>,
    pub agents: BTreeMap<AgentId, Agent>,
    next_agent_id: u32,

    /// Baked from `obstacles` at construction; rebuilt, not serialized.
    #[serde(skip)]
    grid: NavGrid,
    /// Search scratch sized to the grid; rebuilt, not serialized.
    #[serde(skip)]
    engine: PathEngine,
}

/// The result of advancing the simulation one tick.
pub struct StepResult {
    /// Events emitted during this tick, in emission order.
    pub events: Vec<NavEvent>,
}

impl NavState {
    /// Create the navigation context for a level.
    ///
    /// The config is assumed valid — run `NavConfig::validate()` first;
    /// the bake does not defend against degenerate parameters.
    pub fn new(config: NavConfig, obstacles: Vec<ObstacleVolume>) -> Self {
        let grid = NavGrid::bake(&config.grid, &obstacles);
        let engine = PathEngine::new(&grid);
        Self {
            tick: 0,
            config,
            obstacles,
            agents: BTreeMap::new(),
            next_agent_id: 0,
            grid,
            engine,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    /// Advance one tick: apply this tick's commands, then run the
    /// pursuit controller for every agent in ascending id order.
    ///
    /// `target` is the current world position of the pursued target —
    /// supplied fresh every tick by the caller, which is why it is an
    /// argument rather than a command.
    pub fn step(&mut self, target: WorldVec3, commands: &[NavCommand]) -> StepResult {
        let mut events = Vec::new();

        for cmd in commands {
            if cmd.tick != self.tick {
                // Caller error: commands must be stamped for the tick
                // they are submitted on.
                warn!(
                    "ignoring command stamped for tick {} at tick {}",
                    cmd.tick, self.tick
                );
                continue;
            }
            self.apply_command(&cmd.action, &mut events);
        }

        let ids: Vec<AgentId> = self.agents.keys().copied().collect();
        for id in ids {
            self.advance_agent(id, target, &mut events);
        }

        self.tick += 1;
        StepResult { events }
    }

    fn apply_command(&mut self, action: &NavAction, events: &mut Vec<NavEvent>) {
        match *action {
            NavAction::SpawnAgent {
                kind,
                position,
                heading,
            } => {
                if !self.config.profiles.contains_key(&kind) {
                    warn!("no profile configured for {kind:?}; spawn ignored");
                    return;
                }
                let id = AgentId(self.next_agent_id);
                self.next_agent_id += 1;
                self.agents
                    .insert(id, Agent::new(id, kind, position, heading));
                debug!("spawned {kind:?} as {id} at {position}");
                events.push(NavEvent {
                    tick: self.tick,
                    kind: NavEventKind::AgentSpawned { agent_id: id, kind },
                });
            }
            NavAction::DespawnAgent { agent_id } => {
                if self.agents.contains_key(&agent_id) {
                    self.release_locks(agent_id);
                    self.agents.remove(&agent_id);
                    events.push(NavEvent {
                        tick: self.tick,
                        kind: NavEventKind::AgentDespawned { agent_id },
                    });
                }
            }
            NavAction::SetAgentActive { agent_id, active } => {
                let Some(agent) = self.agents.get(&agent_id) else {
                    return;
                };
                if agent.state == AgentState::Lost {
                    return; // terminal
                }
                if active {
                    self.agents.get_mut(&agent_id).unwrap().state = AgentState::Seeking;
                } else {
                    self.release_locks(agent_id);
                    let agent = self.agents.get_mut(&agent_id).unwrap();
                    agent.state = AgentState::Dormant;
                    agent.path.clear();
                }
            }
            NavAction::RelocateAgent {
                agent_id,
                position,
                heading,
            } => {
                if self.agents.contains_key(&agent_id) {
                    self.release_locks(agent_id);
                    let agent = self.agents.get_mut(&agent_id).unwrap();
                    agent.position = position;
                    agent.heading = wrap_angle(heading);
                    agent.path.clear();
                }
            }
        }
    }

    /// One tick of the pursuit controller for one agent.
    fn advance_agent(&mut self, id: AgentId, target: WorldVec3, events: &mut Vec<NavEvent>) {
        let (state, kind, position) = {
            let agent = &self.agents[&id];
            (agent.state, agent.kind, agent.position)
        };
        match state {
            AgentState::Dormant | AgentState::Lost => return,
            AgentState::Seeking | AgentState::Engaging => {}
        }
        let profile = self.config.profiles[&kind].clone();

        // Proximity gate: close enough to the target means no pathing at
        // all this tick.
        let distance = position.planar_distance(target);
        if state == AgentState::Seeking && distance <= profile.engage_radius {
            self.agents.get_mut(&id).unwrap().state = AgentState::Engaging;
            events.push(NavEvent {
                tick: self.tick,
                kind: NavEventKind::AgentEngaged { agent_id: id },
            });
            return;
        }
        if state == AgentState::Engaging {
            if distance <= profile.engage_radius {
                return;
            }
            self.agents.get_mut(&id).unwrap().state = AgentState::Seeking;
            events.push(NavEvent {
                tick: self.tick,
                kind: NavEventKind::AgentResumedSeeking { agent_id: id },
            });
        }

        // Fresh search every tick. The agent's own locks are lifted for
        // the duration — its perimeter exists to deter other agents, not
        // to wall in its owner. The buffer is taken and handed back so
        // the allocation is reused across ticks.
        let held: SmallVec<[NodeIndex; 8]> = self.agents[&id].locked_cells.clone();
        for &cell in &held {
            self.grid.set_walkable(cell, true);
        }
        let mut path = mem::take(&mut self.agents.get_mut(&id).unwrap().path);
        let outcome = self.engine.find_path(&self.grid, position, target, &mut path);
        for &cell in &held {
            self.grid.set_walkable(cell, false);
        }

        match outcome {
            SearchOutcome::Exhausted => {
                let agent = self.agents.get_mut(&id).unwrap();
                if !agent.path_was_unreachable {
                    agent.path_was_unreachable = true;
                    events.push(NavEvent {
                        tick: self.tick,
                        kind: NavEventKind::PathUnreachable { agent_id: id },
                    });
                }
            }
            SearchOutcome::Found => {
                self.agents.get_mut(&id).unwrap().path_was_unreachable = false;

                // Give-up ceiling: a path this long means the agent has
                // wandered off the navigable region.
                let steps = path.len() - 1;
                if steps > profile.max_path_steps {
                    self.release_locks(id);
                    let agent = self.agents.get_mut(&id).unwrap();
                    agent.state = AgentState::Lost;
                    agent.path.clear();
                    debug!(
                        "{id} lost: {steps} steps exceeds ceiling {}",
                        profile.max_path_steps
                    );
                    events.push(NavEvent {
                        tick: self.tick,
                        kind: NavEventKind::AgentLost {
                            agent_id: id,
                            path_steps: steps,
                        },
                    });
                    return;
                }
            }
        }

        // Lock transition: when the occupied cell changed, swap the held
        // perimeter over to the new neighborhood.
        if profile.locks_perimeter {
            let occupied = self.grid.world_to_node(position);
            if self.agents[&id].lock_anchor != Some(occupied) {
                self.release_locks(id);
                let neighborhood = self.grid.neighbors(occupied);
                for &cell in &neighborhood {
                    self.grid.set_walkable(cell, false);
                }
                let agent = self.agents.get_mut(&id).unwrap();
                agent.locked_cells = neighborhood;
                agent.lock_anchor = Some(occupied);
            }
        }

        // Steer toward the next waypoint and advance.
        if path.len() >= 2 {
            let from = self.grid.node(path[0]).world;
            let to = self.grid.node(path[1]).world;
            let desired = planar_angle(from, to);
            let agent = self.agents.get_mut(&id).unwrap();
            agent.heading = smooth_heading(agent.heading, desired, profile.turn_smoothing);
            agent.step_along_heading(profile.move_speed);
        }

        self.agents.get_mut(&id).unwrap().path = path;
    }

    /// Release every cell an agent holds locked. Obstructed cells stay
    /// blocked (`set_walkable` refuses to reopen them).
    fn release_locks(&mut self, id: AgentId) {
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };
        let cells = mem::take(&mut agent.locked_cells);
        agent.lock_anchor = None;
        for cell in cells {
            self.grid.set_walkable(cell, true);
        }
    }

    /// Serialize the full navigation state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore from a JSON snapshot, rebuilding transient state.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut state: NavState = serde_json::from_str(json)?;
        state.rebuild_transient_state();
        Ok(state)
    }

    /// Rebuild the baked grid and search engine from the retained
    /// obstacle list, then re-apply every live agent lock so dynamic
    /// walkability matches the snapshotted simulation exactly.
    pub fn rebuild_transient_state(&mut self) {
        self.grid = NavGrid::bake(&self.config.grid, &self.obstacles);
        self.engine = PathEngine::new(&self.grid);
        for agent in self.agents.values() {
            for &cell in &agent.locked_cells {
                self.grid.set_walkable(cell, false);
            }
        }
    }
}
