use tracing::{debug, info, warn};

use crate::cluster::{build_clusters, Cluster};
use crate::config::NavMeshConfig;
use crate::error::{BuildError, PathError};
use crate::funnel::{inflate, string_pull_into, Waypoint};
use crate::grid::{GridView, TileSource};
use crate::math::Vec2;
use crate::mesh::{NavMesh, TriangleId};
use crate::navigator::{NavCorridor, NavPath, Navigator};
use crate::search::{find_corridor_into, NavMeshQuery, SearchPath};
use crate::triangulate::triangulate_clusters;

/// Navigation mesh generated from a tile grid.
///
/// `generate` rebuilds everything from the grid; queries only read the last published mesh.
#[derive(Debug, Clone, Default)]
pub struct TileNavMesh {
    config: NavMeshConfig,
    mesh: NavMesh,
    clusters: Vec<Cluster>,
}

impl TileNavMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh for `grid` in one step.
    pub fn build<G>(grid: &G, config: NavMeshConfig) -> Result<Self, BuildError>
    where
        G: TileSource + ?Sized,
    {
        let mut nav = Self::new();
        nav.generate(grid, config)?;
        Ok(nav)
    }

    /// Rebuild the mesh from the current state of `grid`.
    ///
    /// On error nothing is replaced: the previous mesh, clusters and config stay published.
    pub fn generate<G>(&mut self, grid: &G, config: NavMeshConfig) -> Result<(), BuildError>
    where
        G: TileSource + ?Sized,
    {
        if config.collision_indices.is_empty() {
            warn!("no collision indices configured; only cells flagged blocked will be obstacles");
        }

        let view = GridView::new(grid, &config.collision_indices);
        let clusters = build_clusters(&view, config.max_clusters)?;
        let triangles = triangulate_clusters(&view, &clusters)?;
        let mesh = NavMesh::from_triangles(triangles);

        info!(
            width = grid.width(),
            height = grid.height(),
            clusters = clusters.iter().map(|c| c.descendants().count()).sum::<usize>(),
            triangles = mesh.triangle_count(),
            "navmesh generated"
        );

        self.mesh = mesh;
        self.clusters = clusters;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &NavMeshConfig {
        &self.config
    }

    pub fn mesh(&self) -> &NavMesh {
        &self.mesh
    }

    /// Top-level clusters of the last successful build.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn get_polygon_at(&self, x: f32, y: f32) -> Option<TriangleId> {
        self.mesh.find_triangle(Vec2::new(x, y))
    }

    /// Path from `start` to `end`, or `None` if either point is off the mesh or no route exists.
    pub fn get_path(&self, start: Vec2, end: Vec2, agent_radius: f32) -> Option<NavPath> {
        self.try_path(start, end, agent_radius).ok()
    }

    pub fn try_path(&self, start: Vec2, end: Vec2, agent_radius: f32) -> Result<NavPath, PathError> {
        let mut query = self.query();
        self.try_path_with(start, end, agent_radius, &mut query)
    }

    /// Like [`TileNavMesh::try_path`], reusing `query`'s buffers.
    pub fn try_path_with(
        &self,
        start: Vec2,
        end: Vec2,
        agent_radius: f32,
        query: &mut NavMeshQuery,
    ) -> Result<NavPath, PathError> {
        let mut search = SearchPath::default();
        find_corridor_into(&self.mesh, start, end, query, &mut search)?;

        let mut raw_path = Vec::new();
        string_pull_into(
            &search.portals,
            start,
            end,
            self.config.narrowness_threshold,
            &mut raw_path,
        );
        let smoothed_path = inflate(&raw_path, agent_radius);
        debug!(
            triangles = search.triangles.len(),
            waypoints = raw_path.len(),
            narrow = raw_path.iter().filter(|w| w.narrow).count(),
            "path found"
        );

        Ok(NavPath {
            raw_path,
            smoothed_path,
        })
    }

    /// Triangle corridor between two points plus its unsmoothed funnel corners.
    pub fn corridor(&self, start: Vec2, end: Vec2) -> Option<NavCorridor> {
        let mut query = self.query();
        let mut search = SearchPath::default();
        find_corridor_into(&self.mesh, start, end, &mut query, &mut search).ok()?;

        let mut corners: Vec<Waypoint> = Vec::new();
        string_pull_into(&search.portals, start, end, 0.0, &mut corners);

        Some(NavCorridor {
            portals: search.portals.iter().map(|p| (p.left, p.right)).collect(),
            triangles: search.triangles,
            corners: corners.into_iter().map(|w| w.point).collect(),
        })
    }

    /// Scratch buffers sized for this mesh's search limit.
    pub fn query(&self) -> NavMeshQuery {
        NavMeshQuery::new(self.config.search_iteration_limit)
    }
}

impl Navigator for TileNavMesh {
    fn find_path(&self, start: Vec2, end: Vec2) -> Option<NavPath> {
        self.get_path(start, end, self.config.agent_radius_default)
    }

    fn corridor(&self, start: Vec2, end: Vec2) -> Option<NavCorridor> {
        TileNavMesh::corridor(self, start, end)
    }
}
