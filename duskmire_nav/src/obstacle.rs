// Static obstacle volumes consumed at grid bake time.
//
// The world/physics collaborator hands the grid a flat list of
// axis-aligned bounding volumes once per level load. How those volumes
// were produced (mesh colliders, authored blockers) is outside this
// crate; here they are opaque boxes tested against candidate cell
// spheres during `NavGrid::bake`.
//
// See also: `grid.rs` for the bake loop that runs these tests.

use crate::types::WorldVec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding volume: center plus half-extents per axis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ObstacleVolume {
    pub center: WorldVec3,
    pub half_extents: WorldVec3,
}

impl ObstacleVolume {
    pub const fn new(center: WorldVec3, half_extents: WorldVec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Sphere-vs-box overlap test: clamp the sphere center onto the box,
    /// then compare the residual distance against the radius.
    ///
    /// Touching counts as overlapping, matching how a physics check at
    /// cell radius would report a cell flush against a wall.
    pub fn overlaps_sphere(&self, center: WorldVec3, radius: f32) -> bool {
        let cx = (center.x - self.center.x).clamp(-self.half_extents.x, self.half_extents.x);
        let cy = (center.y - self.center.y).clamp(-self.half_extents.y, self.half_extents.y);
        let cz = (center.z - self.center.z).clamp(-self.half_extents.z, self.half_extents.z);

        let dx = center.x - (self.center.x + cx);
        let dy = center.y - (self.center.y + cy);
        let dz = center.z - (self.center.z + cz);

        dx * dx + dy * dy + dz * dz <= radius * radius
    }
}
