//! Nested region discovery: blocked hulls containing walkable holes containing blocked islands.
//!
//! Depth parity carries the meaning. Even depths are blocked regions, odd depths are walkable
//! holes inside their parent. Every level is found by tracing contours with the predicate of the
//! level, restricted to the parent's interior and excluding siblings already traced.

use tracing::debug;

use crate::contour::{trace_from, Contour};
use crate::error::{BuildError, Result};
use crate::grid::{GridView, TileSource};
use crate::math::{tri_area2, GridEdge, GridPoint, GridRect, Vec2};

#[derive(Debug, Clone)]
pub struct Cluster {
    contour: Contour,
    edges: Vec<GridEdge>,
    depth: usize,
    children: Vec<Cluster>,
}

impl Cluster {
    fn new(contour: Contour, depth: usize, children: Vec<Cluster>) -> Self {
        let edges = consolidate_edges(contour.edges());
        Self {
            contour,
            edges,
            depth,
            children,
        }
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    /// Boundary edges with collinear runs merged.
    pub fn edges(&self) -> &[GridEdge] {
        &self.edges
    }

    pub fn bounds(&self) -> GridRect {
        self.contour.bounds()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_blocking(&self) -> bool {
        self.depth % 2 == 0
    }

    pub fn children(&self) -> &[Cluster] {
        &self.children
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.contour.contains(p)
    }

    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        self.contour.contains_cell(x, y)
    }

    /// Pre-order walk over this cluster and all of its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Cluster> + '_ {
        let mut stack = vec![self];
        core::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Trace every top-level blocked region of the grid and, recursively, everything nested in it.
pub fn build_clusters<G>(view: &GridView<'_, G>, max_clusters: usize) -> Result<Vec<Cluster>>
where
    G: TileSource + ?Sized,
{
    let mut budget = Budget {
        used: 0,
        limit: max_clusters,
        step_limit: view.contour_step_limit(),
    };
    discover(view, view.bounds(), None, 0, &mut budget)
}

struct Budget {
    used: usize,
    limit: usize,
    step_limit: usize,
}

fn discover<G>(
    view: &GridView<'_, G>,
    area: GridRect,
    parent: Option<&Contour>,
    depth: usize,
    budget: &mut Budget,
) -> Result<Vec<Cluster>>
where
    G: TileSource + ?Sized,
{
    let want_blocked = depth % 2 == 0;
    let width = area.width().max(0) as usize;
    let cell_count = width * area.height().max(0) as usize;

    // Row-major masks over `area`: the parent's interior and the cells already claimed by a
    // cluster of this level.
    let inside = parent.map(|p| {
        let mut mask = vec![false; cell_count];
        p.fill_cells(area, &mut mask);
        mask
    });
    let mut covered = vec![false; cell_count];
    let cell_of = |i: usize| {
        (
            area.min.x + (i % width) as i32,
            area.min.y + (i / width) as i32,
        )
    };

    let mut found: Vec<Cluster> = Vec::new();
    // Cells before the cursor are non-targets or already covered, and stay that way.
    let mut cursor = 0;

    loop {
        let slot = |x: i32, y: i32| {
            area.contains_cell(x, y)
                .then(|| (y - area.min.y) as usize * width + (x - area.min.x) as usize)
        };
        let is_target = |x: i32, y: i32| {
            slot(x, y).is_some_and(|i| {
                !covered[i]
                    && inside.as_ref().is_none_or(|mask| mask[i])
                    && view.blocked_at(x, y) == Some(want_blocked)
            })
        };

        let Some(next) = (cursor..cell_count).find(|&i| {
            let (x, y) = cell_of(i);
            is_target(x, y)
        }) else {
            break;
        };
        cursor = next + 1;
        let (x, y) = cell_of(next);
        let start = GridPoint::new(x, y);
        let contour = trace_from(&is_target, start, budget.step_limit)?;

        budget.used += 1;
        if budget.used > budget.limit {
            return Err(BuildError::ClusterLimit {
                limit: budget.limit,
            });
        }

        debug!(
            depth,
            perimeter = contour.perimeter(),
            start_x = start.x,
            start_y = start.y,
            "traced cluster"
        );

        contour.fill_cells(area, &mut covered);
        let children = discover(view, contour.bounds(), Some(&contour), depth + 1, budget)?;
        found.push(Cluster::new(contour, depth, children));
    }

    Ok(found)
}

/// Merge consecutive edges that continue in the same direction.
///
/// The closing pair (last, first) is merged too when the outline starts mid-run.
pub fn consolidate_edges(edges: &[GridEdge]) -> Vec<GridEdge> {
    let continues = |a: &GridEdge, b: &GridEdge| {
        let (ax, ay) = a.delta();
        let (bx, by) = b.delta();
        a.end == b.start
            && tri_area2(a.start.as_vec2(), a.end.as_vec2(), b.end.as_vec2()) == 0.0
            && ax * bx + ay * by > 0
    };

    let mut merged: Vec<GridEdge> = Vec::with_capacity(edges.len());
    for edge in edges {
        match merged.last_mut() {
            Some(last) if continues(last, edge) => last.end = edge.end,
            _ => merged.push(*edge),
        }
    }

    if merged.len() > 2 {
        let last = merged[merged.len() - 1];
        if continues(&last, &merged[0]) {
            merged[0].start = last.start;
            merged.pop();
        }
    }

    merged
}
