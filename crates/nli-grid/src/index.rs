//! R-tree proximity index over agent positions.
//!
//! Built once per interaction stage from the pre-tick positions of one
//! population, then queried by the agents of another ("which fungi are within
//! `rec_r` of this macrophage?").  Bulk loading is O(n log n); each radius
//! query is O(log n + k).

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use nli_core::{AgentId, Point3};

/// Entry stored in the R-tree: a 3-D point plus the owning agent.
#[derive(Clone, Debug)]
struct AgentEntry {
    point: [f64; 3],
    id:    AgentId,
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Spatial index of `(AgentId, Point3)` pairs.
pub struct ProximityIndex {
    tree: RTree<AgentEntry>,
}

impl ProximityIndex {
    /// Bulk-load from an iterator of agent positions.
    pub fn build<I>(agents: I) -> Self
    where
        I: IntoIterator<Item = (AgentId, Point3)>,
    {
        let entries: Vec<AgentEntry> = agents
            .into_iter()
            .map(|(id, p)| AgentEntry { point: p.to_array(), id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Ids of all agents within `radius` (inclusive) of `center`, ascending.
    ///
    /// Sorting makes the result independent of tree layout so interaction
    /// order is reproducible.
    pub fn within(&self, center: Point3, radius: f64) -> Vec<AgentId> {
        if radius < 0.0 || !radius.is_finite() {
            return vec![];
        }
        let mut ids: Vec<AgentId> = self
            .tree
            .locate_within_distance(center.to_array(), radius * radius)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// The nearest indexed agent to `center`, if any.
    pub fn nearest(&self, center: Point3) -> Option<AgentId> {
        self.tree.nearest_neighbor(&center.to_array()).map(|e| e.id)
    }
}
