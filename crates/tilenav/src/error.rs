use thiserror::Error;

use crate::math::GridPoint;

/// Failures that abort a mesh rebuild. The previously published mesh stays in place.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("contour starting at {start:?} did not close after {steps} steps")]
    MalformedContour { start: GridPoint, steps: usize },

    #[error("cluster discovery exceeded {limit} contours")]
    ClusterLimit { limit: usize },

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Why a path query produced no path. Never fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    #[error("start or end point is not on the navigation mesh")]
    OutOfMesh,

    #[error("no route between start and end")]
    Unreachable,
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
