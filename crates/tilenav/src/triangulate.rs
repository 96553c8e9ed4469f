//! Constrained Delaunay triangulation of the walkable regions of a cluster tree.
//!
//! Each walkable region is triangulated on its own: the grid rectangle minus the top-level hulls,
//! then every odd-depth hole minus its islands. All boundaries nested below a region are passed
//! as constraint edges, and only triangles whose centroid lies on the walkable side are kept.

use std::collections::HashMap;

use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation};
use tracing::{debug, warn};

use crate::cluster::Cluster;
use crate::error::{BuildError, Result};
use crate::grid::{GridView, TileSource};
use crate::math::{tri_area2, tri_centroid, GridPoint, Vec2};

pub type Triangle = [Vec2; 3];

/// Points deduplicated by exact coordinate.
#[derive(Default)]
struct PointSet {
    points: Vec<Vec2>,
    lookup: HashMap<(u32, u32), usize>,
}

impl PointSet {
    fn insert(&mut self, p: Vec2) -> usize {
        // `+ 0.0` folds -0.0 into 0.0 so both spellings share a key.
        let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
        *self.lookup.entry(key).or_insert_with(|| {
            self.points.push(p);
            self.points.len() - 1
        })
    }
}

/// Triangulate `boundary_points` plus the endpoints of `constraint_edges`, keeping every
/// constraint edge as a triangle side.
///
/// Returns every finite triangle of the convex hull; interior/exterior filtering is up to the
/// caller. Constraints that would cross an earlier constraint are skipped with a warning.
pub fn triangulate(constraint_edges: &[(Vec2, Vec2)], boundary_points: &[Vec2]) -> Result<Vec<Triangle>> {
    let mut set = PointSet::default();
    for &p in boundary_points {
        set.insert(p);
    }
    let edges: Vec<(usize, usize)> = constraint_edges
        .iter()
        .map(|&(a, b)| (set.insert(a), set.insert(b)))
        .collect();

    let mut cdt = ConstrainedDelaunayTriangulation::<Point2<f64>>::new();
    let mut handles = Vec::with_capacity(set.points.len());
    for p in &set.points {
        if !p.is_finite() {
            return Err(BuildError::Triangulation(format!("non-finite vertex {p:?}")));
        }
        let handle = cdt
            .insert(Point2::new(f64::from(p.x), f64::from(p.y)))
            .map_err(|err| BuildError::Triangulation(format!("{err:?}")))?;
        handles.push(handle);
    }

    for (a, b) in edges {
        if a == b {
            continue;
        }
        let (from, to) = (handles[a], handles[b]);
        if cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        } else {
            warn!(
                from = ?set.points[a],
                to = ?set.points[b],
                "constraint edge crosses an existing constraint, skipped"
            );
        }
    }

    let to_vec2 = |p: Point2<f64>| Vec2::new(p.x as f32, p.y as f32);
    Ok(cdt
        .inner_faces()
        .map(|face| {
            let [a, b, c] = face.vertices();
            [
                to_vec2(a.position()),
                to_vec2(b.position()),
                to_vec2(c.position()),
            ]
        })
        .filter(|t| tri_area2(t[0], t[1], t[2]) != 0.0)
        .collect())
}

/// Triangulate every walkable region described by `clusters` and return the union, in world
/// coordinates.
pub fn triangulate_clusters<G>(view: &GridView<'_, G>, clusters: &[Cluster]) -> Result<Vec<Triangle>>
where
    G: TileSource + ?Sized,
{
    let mut out = Vec::new();

    let bounds = view.bounds();
    let corners = [
        bounds.min,
        GridPoint::new(bounds.max.x, bounds.min.y),
        bounds.max,
        GridPoint::new(bounds.min.x, bounds.max.y),
    ]
    .map(|p| view.to_world(p));

    let mut constraints = Vec::new();
    for cluster in clusters {
        collect_constraints(view, cluster, &mut constraints);
    }
    let tris = triangulate(&constraints, &corners)?;
    let kept = keep_walkable(view, tris, &mut out, |p| {
        bounds.contains_point(p) && !clusters.iter().any(|c| c.contains(p))
    });
    debug!(depth = -1, triangles = kept, "triangulated grid region");

    for hole in clusters
        .iter()
        .flat_map(Cluster::descendants)
        .filter(|c| !c.is_blocking())
    {
        let mut constraints = Vec::new();
        collect_constraints(view, hole, &mut constraints);
        let tris = triangulate(&constraints, &[])?;
        let kept = keep_walkable(view, tris, &mut out, |p| {
            hole.contains(p) && !hole.children().iter().any(|c| c.contains(p))
        });
        debug!(depth = hole.depth() as i64, triangles = kept, "triangulated hole region");
    }

    Ok(out)
}

/// Boundary edges of `cluster` and everything nested in it, in world space.
fn collect_constraints<G>(view: &GridView<'_, G>, cluster: &Cluster, out: &mut Vec<(Vec2, Vec2)>)
where
    G: TileSource + ?Sized,
{
    for c in cluster.descendants() {
        out.extend(
            c.edges()
                .iter()
                .map(|e| (view.to_world(e.start), view.to_world(e.end))),
        );
    }
}

fn keep_walkable<G>(
    view: &GridView<'_, G>,
    tris: Vec<Triangle>,
    out: &mut Vec<Triangle>,
    is_walkable: impl Fn(Vec2) -> bool,
) -> usize
where
    G: TileSource + ?Sized,
{
    let before = out.len();
    out.extend(
        tris.into_iter()
            .filter(|t| is_walkable(view.to_grid(tri_centroid(*t)))),
    );
    out.len() - before
}
