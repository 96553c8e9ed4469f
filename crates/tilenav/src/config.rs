#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for one mesh rebuild and the queries made against it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavMeshConfig {
    /// Cell classifications that block movement.
    pub collision_indices: Vec<u32>,
    /// Portals shorter than this are crossed at their midpoint instead of being funnelled.
    pub narrowness_threshold: f32,
    /// Agent radius used when a query doesn't name one.
    pub agent_radius_default: f32,
    /// Upper bound on contours discovered across the whole cluster tree.
    pub max_clusters: usize,
    /// Upper bound on A* expansions per query.
    pub search_iteration_limit: usize,
}

impl NavMeshConfig {
    pub fn new(collision_indices: impl Into<Vec<u32>>) -> Self {
        Self {
            collision_indices: collision_indices.into(),
            ..Self::default()
        }
    }

    pub fn with_narrowness_threshold(mut self, threshold: f32) -> Self {
        self.narrowness_threshold = threshold;
        self
    }

    pub fn with_agent_radius(mut self, radius: f32) -> Self {
        self.agent_radius_default = radius;
        self
    }
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            collision_indices: Vec::new(),
            narrowness_threshold: 0.0,
            agent_radius_default: 0.0,
            max_clusters: 10_000,
            search_iteration_limit: 100_000,
        }
    }
}
