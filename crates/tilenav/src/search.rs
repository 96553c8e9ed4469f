use core::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::warn;

use crate::error::PathError;
use crate::math::Vec2;
use crate::mesh::{NavMesh, Portal, TriangleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u64,
    g: u64,
    tri: TriangleId,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u64, u64, u64) {
        (self.f, self.g, self.tie)
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Triangles crossed from the start triangle to the end triangle, with the portal crossed between
/// each consecutive pair (`portals.len() == triangles.len() - 1`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPath {
    pub triangles: Vec<TriangleId>,
    pub portals: Vec<Portal>,
}

impl SearchPath {
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.portals.clear();
    }
}

/// Reusable scratch buffers for corridor searches.
///
/// Keeping one around avoids per-query allocations when many paths are requested against the
/// same mesh.
#[derive(Debug)]
pub struct NavMeshQuery {
    open: BinaryHeap<OpenNode>,
    g_score: Vec<u64>,
    came_from: Vec<Option<TriangleId>>,
    iteration_limit: usize,
}

impl Default for NavMeshQuery {
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl NavMeshQuery {
    pub fn new(iteration_limit: usize) -> Self {
        Self {
            open: BinaryHeap::new(),
            g_score: Vec::new(),
            came_from: Vec::new(),
            iteration_limit,
        }
    }

    pub fn iteration_limit(&self) -> usize {
        self.iteration_limit
    }
}

/// A* over the triangle adjacency graph. See [`find_corridor_into`].
pub fn find_corridor(mesh: &NavMesh, start: Vec2, end: Vec2) -> Result<SearchPath, PathError> {
    let mut query = NavMeshQuery::default();
    let mut out = SearchPath::default();
    find_corridor_into(mesh, start, end, &mut query, &mut out)?;
    Ok(out)
}

/// Find the triangle corridor from the triangle containing `start` to the one containing `end`.
///
/// Step cost and heuristic are both centroid-to-centroid distances, the heuristic measured to the
/// end triangle's centroid. Costs are quantized so the heap orders on integers; equal priorities
/// pop in insertion order.
pub fn find_corridor_into(
    mesh: &NavMesh,
    start: Vec2,
    end: Vec2,
    query: &mut NavMeshQuery,
    out: &mut SearchPath,
) -> Result<(), PathError> {
    out.clear();

    let start_tri = mesh.find_triangle(start).ok_or(PathError::OutOfMesh)?;
    let end_tri = mesh.find_triangle(end).ok_or(PathError::OutOfMesh)?;
    if start_tri == end_tri {
        out.triangles.push(start_tri);
        return Ok(());
    }

    let goal = mesh.centroid(end_tri);
    let quant = |d: f32| -> u64 { (f64::from(d.max(0.0)) * 1024.0) as u64 };
    let heuristic = |tri: TriangleId| -> u64 { quant(mesh.centroid(tri).distance(goal)) };
    let edge_cost = |a: TriangleId, b: TriangleId| -> u64 {
        quant(mesh.centroid_distance(a, b)).saturating_add(1)
    };

    let NavMeshQuery {
        open,
        g_score,
        came_from,
        iteration_limit,
    } = query;

    let n = mesh.triangle_count();
    open.clear();
    g_score.clear();
    g_score.resize(n, u64::MAX);
    came_from.clear();
    came_from.resize(n, None);

    g_score[start_tri.index()] = 0;
    open.push(OpenNode {
        f: heuristic(start_tri),
        g: 0,
        tri: start_tri,
        tie: 0,
    });
    let mut tie: u64 = 1;
    let mut pops = 0usize;

    while let Some(node) = open.pop() {
        pops += 1;
        if pops > *iteration_limit {
            warn!(
                limit = *iteration_limit,
                start = start_tri.0,
                end = end_tri.0,
                "path search hit its iteration limit"
            );
            return Err(PathError::Unreachable);
        }

        if node.tri == end_tri {
            out.triangles.push(end_tri);
            let mut current = end_tri;
            while let Some(prev) = came_from[current.index()] {
                current = prev;
                out.triangles.push(current);
            }
            out.triangles.reverse();

            for pair in out.triangles.windows(2) {
                let portal = mesh
                    .triangle(pair[0])
                    .and_then(|t| t.portal_to(pair[1]))
                    .ok_or(PathError::Unreachable)?;
                out.portals.push(*portal);
            }
            return Ok(());
        }

        // Stale entry: a cheaper route to this triangle was pushed after it.
        if node.g != g_score[node.tri.index()] {
            continue;
        }

        for next in mesh.neighbors_of(node.tri) {
            let tentative_g = node.g.saturating_add(edge_cost(node.tri, next));
            if tentative_g >= g_score[next.index()] {
                continue;
            }

            came_from[next.index()] = Some(node.tri);
            g_score[next.index()] = tentative_g;
            open.push(OpenNode {
                f: tentative_g.saturating_add(heuristic(next)),
                g: tentative_g,
                tri: next,
                tie,
            });
            tie += 1;
        }
    }

    Err(PathError::Unreachable)
}
