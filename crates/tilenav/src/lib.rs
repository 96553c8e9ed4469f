//! Navigation meshes for tile grids.
//!
//! Blocked cells are traced into nested outlines, the walkable space between them is
//! triangulated, and paths are found with A* over the triangles and straightened with a funnel.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod contour;
pub mod error;
pub mod funnel;
pub mod grid;
pub mod math;
pub mod mesh;
pub mod navigator;
pub mod search;
pub mod tile_nav;
pub mod triangulate;

pub use cluster::Cluster;
pub use config::NavMeshConfig;
pub use contour::Contour;
pub use error::{BuildError, PathError};
pub use funnel::Waypoint;
pub use grid::{Cell, GridView, TileGrid, TileSource};
pub use math::{GridPoint, Vec2};
pub use mesh::{NavMesh, NavTriangle, Portal, TriangleId};
pub use navigator::{NavCorridor, NavPath, Navigator};
pub use search::{NavMeshQuery, SearchPath};
pub use tile_nav::TileNavMesh;
