use crate::funnel::Waypoint;
use crate::math::Vec2;
use crate::mesh::TriangleId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a path query: the funnel output and its agent-radius offset variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPath {
    pub raw_path: Vec<Waypoint>,
    /// Same length as `raw_path`; equal to it when the radius is zero.
    pub smoothed_path: Vec<Vec2>,
}

impl NavPath {
    pub fn raw_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.raw_path.iter().map(|w| w.point)
    }

    pub fn len(&self) -> usize {
        self.raw_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_path.is_empty()
    }
}

/// Debug-friendly corridor result for path following / visualization.
///
/// `portals.len() == triangles.len() - 1`: `portals[i]` is the edge crossed from `triangles[i]`
/// into `triangles[i + 1]`, oriented `(left, right)` for funnel algorithms.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavCorridor {
    pub triangles: Vec<TriangleId>,
    pub portals: Vec<(Vec2, Vec2)>,
    /// Funnel corners through `portals`, without radius offsetting. `corners[0]` is the requested
    /// start and `corners.last()` the requested end.
    pub corners: Vec<Vec2>,
}

pub trait Navigator {
    fn find_path(&self, start: Vec2, end: Vec2) -> Option<NavPath>;

    /// Return a corridor (triangle path + portals) suitable for debugging/funnel path following.
    ///
    /// Backends that don't support corridor queries may return `None`.
    fn corridor(&self, _start: Vec2, _end: Vec2) -> Option<NavCorridor> {
        None
    }
}
