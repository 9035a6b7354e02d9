// Data-driven navigation configuration.
//
// All tunable parameters live in `NavConfig`, loaded from JSON at level
// load. The navigation code never uses magic numbers — it reads from the
// config, so pursuit balance can be iterated without recompilation.
//
// Grid geometry lives in `GridParams`. Per-kind behavioral data (speed,
// turn smoothing, engage radius, give-up ceiling) lives in `AgentProfile`
// entries keyed by `AgentKind` in the `profiles` map — the controller
// uses a single `Agent` type and reads kind-specific values from the
// table at runtime, no code branching per kind.
//
// Construction preconditions are the caller's responsibility:
// `NavConfig::validate()` is the check to run before handing the config
// to `NavState::new`. `NavGrid::bake` itself assumes a valid config.
//
// See also: `sim.rs` which owns the `NavConfig` as part of `NavState`,
// `agent.rs` for how profiles drive steering, `grid.rs` for the bake
// that consumes `GridParams`.
//
// **Critical constraint: determinism.** Config values feed directly into
// navigation logic. Identical configs produce identical simulations.

use crate::types::{AgentKind, WorldVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Geometry of the baked navigation grid.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GridParams {
    /// World-space center of the grid. The navigation plane sits at
    /// `center.y`.
    pub center: WorldVec3,
    /// Total world extent covered along x. The cell count per axis is
    /// `floor(extent / (2 * cell_radius))`.
    pub extent_x: f32,
    /// Total world extent covered along z.
    pub extent_z: f32,
    /// Half the side length of one cell. Also the probe radius used
    /// against obstacle volumes at bake time.
    pub cell_radius: f32,
}

/// Behavioral parameters for one agent kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Movement speed in world units per tick.
    pub move_speed: f32,

    /// Fraction of the remaining heading error closed per tick, in
    /// (0, 1]. 1.0 snaps instantly; small values turn lazily.
    pub turn_smoothing: f32,

    /// Planar distance to the target below which the agent stops pathing
    /// and switches to `Engaging`.
    pub engage_radius: f32,

    /// Paths longer than this many steps mean the agent has wandered off
    /// the navigable region; it transitions to the terminal `Lost` state
    /// instead of searching forever.
    pub max_path_steps: usize,

    /// Whether this kind locks the cells around its occupied cell to
    /// discourage other agents from routing through it.
    pub locks_perimeter: bool,
}

/// Top-level navigation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavConfig {
    pub grid: GridParams,

    /// Per-kind behavioral data, keyed by `AgentKind`.
    pub profiles: BTreeMap<AgentKind, AgentProfile>,
}

/// Violations reported by `NavConfig::validate`, plus JSON load failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cell radius must be positive, got {0}")]
    NonPositiveCellRadius(f32),

    #[error("grid extent ({extent}) must fit at least one cell of radius {cell_radius}")]
    ExtentTooSmall { extent: f32, cell_radius: f32 },

    #[error("profile for {kind:?} has non-positive move speed {speed}")]
    NonPositiveSpeed { kind: AgentKind, speed: f32 },

    #[error("profile for {kind:?} has turn smoothing {value} outside (0, 1]")]
    TurnSmoothingOutOfRange { kind: AgentKind, value: f32 },

    #[error("config JSON failed to parse: {0}")]
    Parse(#[from] serde_json::Error),
}

impl NavConfig {
    /// Load a config from a JSON string. Parsing alone does not validate —
    /// call `validate()` before constructing a `NavState` from it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the construction preconditions the grid bake assumes.
    ///
    /// The bake itself does not defend against a degenerate config; this
    /// is the caller-side gate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.cell_radius <= 0.0 {
            return Err(ConfigError::NonPositiveCellRadius(self.grid.cell_radius));
        }
        let cell_size = self.grid.cell_radius * 2.0;
        for extent in [self.grid.extent_x, self.grid.extent_z] {
            if extent < cell_size {
                return Err(ConfigError::ExtentTooSmall {
                    extent,
                    cell_radius: self.grid.cell_radius,
                });
            }
        }
        for (&kind, profile) in &self.profiles {
            if profile.move_speed <= 0.0 {
                return Err(ConfigError::NonPositiveSpeed {
                    kind,
                    speed: profile.move_speed,
                });
            }
            if profile.turn_smoothing <= 0.0 || profile.turn_smoothing > 1.0 {
                return Err(ConfigError::TurnSmoothingOutOfRange {
                    kind,
                    value: profile.turn_smoothing,
                });
            }
        }
        Ok(())
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            AgentKind::Shade,
            AgentProfile {
                move_speed: 0.12,
                turn_smoothing: 0.35,
                engage_radius: 1.5,
                max_path_steps: 96,
                locks_perimeter: true,
            },
        );
        profiles.insert(
            AgentKind::Husk,
            AgentProfile {
                move_speed: 0.05,
                turn_smoothing: 0.15,
                engage_radius: 2.0,
                max_path_steps: 64,
                locks_perimeter: true,
            },
        );

        Self {
            grid: GridParams {
                center: WorldVec3::new(0.0, 0.0, 0.0),
                extent_x: 60.0,
                extent_z: 60.0,
                cell_radius: 0.5,
            },
            profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_roundtrips() {
        let config = NavConfig::default();
        config.validate().unwrap();

        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = NavConfig::from_json_str(&json).unwrap();
        assert_eq!(config.grid.cell_radius, restored.grid.cell_radius);
        assert_eq!(config.profiles.len(), restored.profiles.len());
        let shade = &restored.profiles[&AgentKind::Shade];
        assert!(shade.locks_perimeter);
    }

    #[test]
    fn config_loads_from_json_string() {
        let json = r#"{
            "grid": {
                "center": { "x": 10.0, "y": 0.0, "z": -4.0 },
                "extent_x": 30.0,
                "extent_z": 20.0,
                "cell_radius": 0.5
            },
            "profiles": {
                "Shade": {
                    "move_speed": 0.2,
                    "turn_smoothing": 0.5,
                    "engage_radius": 1.0,
                    "max_path_steps": 40,
                    "locks_perimeter": false
                }
            }
        }"#;
        let config = NavConfig::from_json_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.grid.extent_z, 20.0);
        assert_eq!(config.profiles[&AgentKind::Shade].max_path_steps, 40);
    }

    #[test]
    fn zero_cell_radius_is_rejected() {
        let mut config = NavConfig::default();
        config.grid.cell_radius = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCellRadius(_))
        ));
    }

    #[test]
    fn extent_smaller_than_one_cell_is_rejected() {
        let mut config = NavConfig::default();
        config.grid.extent_z = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ExtentTooSmall { .. })
        ));
    }

    #[test]
    fn bad_turn_smoothing_is_rejected() {
        let mut config = NavConfig::default();
        config
            .profiles
            .get_mut(&AgentKind::Husk)
            .unwrap()
            .turn_smoothing = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TurnSmoothingOutOfRange { .. })
        ));
    }
}
