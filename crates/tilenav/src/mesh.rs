use std::collections::BTreeMap;

use crate::math::{angle_difference, point_in_triangle, tri_centroid, Vec2};
use crate::triangulate::Triangle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Index of a triangle in its [`NavMesh`]. Only meaningful for the mesh that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleId(pub u32);

impl TriangleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shared edge between two triangles, oriented for a funnel walking out of the owning triangle.
///
/// Seen from the owner's centroid, `left` is the endpoint clockwise of the other one. With the
/// grid's y-down world axes that is the endpoint on the walker's left hand. The neighbour's copy
/// of the same edge has `left` and `right` swapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub left: Vec2,
    pub right: Vec2,
    pub midpoint: Vec2,
    pub length: f32,
}

impl Portal {
    pub fn new(left: Vec2, right: Vec2) -> Self {
        Self {
            left,
            right,
            midpoint: left.midpoint(right),
            length: left.distance(right),
        }
    }

    /// Zero-width portal, used for the start and end of a funnel.
    pub fn point(p: Vec2) -> Self {
        Self::new(p, p)
    }

    /// A zero-length portal is never narrow; it is an exact point already.
    pub fn is_narrow(&self, threshold: f32) -> bool {
        self.length > 0.0 && self.length < threshold
    }

    /// Orient edge `(a, b)` as seen from `centroid`.
    ///
    /// Both endpoints are compared by angle against the edge's canonical first endpoint (lowest
    /// `x`, then lowest `y`); the one with the larger angular difference becomes `left`.
    pub fn from_edge(centroid: Vec2, a: Vec2, b: Vec2) -> Self {
        let (first, second) = canonical_edge(a, b);
        let reference = (first - centroid).angle();
        let d_first = angle_difference(reference, (first - centroid).angle());
        let d_second = angle_difference(reference, (second - centroid).angle());
        if d_first > d_second {
            Self::new(first, second)
        } else {
            Self::new(second, first)
        }
    }

    /// Same endpoints, ignoring orientation.
    pub fn same_edge(&self, other: &Portal) -> bool {
        (self.left == other.left && self.right == other.right)
            || (self.left == other.right && self.right == other.left)
    }
}

fn canonical_edge(a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    if b.x < a.x || (b.x == a.x && b.y < a.y) {
        (b, a)
    } else {
        (a, b)
    }
}

#[derive(Debug, Clone)]
pub struct NavTriangle {
    id: TriangleId,
    vertices: Triangle,
    centroid: Vec2,
    radius: f32,
    neighbors: Vec<TriangleId>,
    /// `portals[i]` is the edge shared with `neighbors[i]`.
    portals: Vec<Portal>,
}

impl NavTriangle {
    fn new(id: TriangleId, vertices: Triangle) -> Self {
        let centroid = tri_centroid(vertices);
        let radius = vertices
            .iter()
            .map(|v| centroid.distance(*v))
            .fold(0.0, f32::max);
        Self {
            id,
            vertices,
            centroid,
            radius,
            neighbors: Vec::new(),
            portals: Vec::new(),
        }
    }

    pub fn id(&self) -> TriangleId {
        self.id
    }

    pub fn vertices(&self) -> &Triangle {
        &self.vertices
    }

    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Largest centroid-to-vertex distance.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn edges(&self) -> [(Vec2, Vec2); 3] {
        tri_edges(&self.vertices)
    }

    pub fn neighbors(&self) -> &[TriangleId] {
        &self.neighbors
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    pub fn portal_to(&self, neighbor: TriangleId) -> Option<&Portal> {
        let i = self.neighbors.iter().position(|&n| n == neighbor)?;
        self.portals.get(i)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        point_in_triangle(p, self.vertices)
    }

    /// Bounding circles touch or overlap.
    pub fn overlaps_radius(&self, other: &NavTriangle) -> bool {
        self.centroid.distance(other.centroid) <= self.radius + other.radius
    }

    /// Centroid-to-centroid distance, the step cost of the corridor search.
    pub fn distance_to(&self, other: &NavTriangle) -> f32 {
        self.centroid.distance(other.centroid)
    }
}

/// Uniform bins over the mesh bounds, each listing the triangles whose bounding box touches it.
#[derive(Debug, Clone, Default)]
struct ContainmentIndex {
    min: Vec2,
    max: Vec2,
    bin_size: Vec2,
    cols: usize,
    rows: usize,
    bins: Vec<Vec<TriangleId>>,
}

impl ContainmentIndex {
    fn build(tris: &[NavTriangle]) -> Self {
        let mut vertices = tris.iter().flat_map(|t| t.vertices.iter().copied());
        let Some(first) = vertices.next() else {
            return Self::default();
        };
        let (mut min, mut max) = (first, first);
        for v in vertices {
            min = Vec2::new(min.x.min(v.x), min.y.min(v.y));
            max = Vec2::new(max.x.max(v.x), max.y.max(v.y));
        }

        let side = ((tris.len() as f32).sqrt().ceil() as usize).max(1);
        let extent = |lo: f32, hi: f32| if hi > lo { (hi - lo) / side as f32 } else { 1.0 };
        let mut index = Self {
            min,
            max,
            bin_size: Vec2::new(extent(min.x, max.x), extent(min.y, max.y)),
            cols: side,
            rows: side,
            bins: vec![Vec::new(); side * side],
        };

        for tri in tris {
            let [a, b, c] = tri.vertices;
            let lo = Vec2::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y));
            let hi = Vec2::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y));
            let (c0, r0) = index.bin_of(lo);
            let (c1, r1) = index.bin_of(hi);
            for row in r0..=r1 {
                for col in c0..=c1 {
                    index.bins[row * index.cols + col].push(tri.id);
                }
            }
        }
        index
    }

    fn bin_of(&self, p: Vec2) -> (usize, usize) {
        let col = ((p.x - self.min.x) / self.bin_size.x).floor().max(0.0) as usize;
        let row = ((p.y - self.min.y) / self.bin_size.y).floor().max(0.0) as usize;
        (col.min(self.cols - 1), row.min(self.rows - 1))
    }

    fn candidates(&self, p: Vec2) -> &[TriangleId] {
        if self.bins.is_empty()
            || p.x < self.min.x
            || p.y < self.min.y
            || p.x > self.max.x
            || p.y > self.max.y
        {
            return &[];
        }
        let (col, row) = self.bin_of(p);
        &self.bins[row * self.cols + col]
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavMesh {
    tris: Vec<NavTriangle>,
    index: ContainmentIndex,
}

impl NavMesh {
    /// Build a navmesh from a set of non-overlapping triangles.
    ///
    /// Two triangles are neighbours when they share an edge with bit-identical endpoints, in
    /// either order. No tolerance is applied: shared vertices come from the same lattice point
    /// scaled by the same factors, so they are equal exactly, and an epsilon would let nearly
    /// touching triangles change the topology.
    pub fn from_triangles(tris: Vec<Triangle>) -> Self {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        struct VertexKey(u32, u32);

        impl VertexKey {
            fn from_vec2(p: Vec2) -> Self {
                Self((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
            }
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        struct EdgeKey(VertexKey, VertexKey);

        impl EdgeKey {
            fn new(a: Vec2, b: Vec2) -> Self {
                let ka = VertexKey::from_vec2(a);
                let kb = VertexKey::from_vec2(b);
                if ka <= kb {
                    Self(ka, kb)
                } else {
                    Self(kb, ka)
                }
            }
        }

        let mut nav: Vec<NavTriangle> = tris
            .into_iter()
            .enumerate()
            .map(|(i, t)| NavTriangle::new(TriangleId(i as u32), t))
            .collect();

        let mut edge_map: BTreeMap<EdgeKey, usize> = BTreeMap::new();
        for tri_idx in 0..nav.len() {
            for (a, b) in nav[tri_idx].edges() {
                let key = EdgeKey::new(a, b);
                let Some(other) = edge_map.remove(&key) else {
                    edge_map.insert(key, tri_idx);
                    continue;
                };

                // Each side orients the portal from its own centroid.
                let here = Portal::from_edge(nav[tri_idx].centroid, a, b);
                let there = Portal::from_edge(nav[other].centroid, a, b);

                nav[tri_idx].neighbors.push(TriangleId(other as u32));
                nav[tri_idx].portals.push(here);
                nav[other].neighbors.push(TriangleId(tri_idx as u32));
                nav[other].portals.push(there);
            }
        }

        let index = ContainmentIndex::build(&nav);
        Self { tris: nav, index }
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    pub fn triangles(&self) -> &[NavTriangle] {
        &self.tris
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&NavTriangle> {
        self.tris.get(id.index())
    }

    /// Triangle containing `p` (boundary inclusive). On a shared edge the lowest id wins.
    pub fn find_triangle(&self, p: Vec2) -> Option<TriangleId> {
        self.index
            .candidates(p)
            .iter()
            .copied()
            .find(|&id| self.tris[id.index()].contains(p))
    }

    pub(crate) fn neighbors_of(&self, id: TriangleId) -> impl Iterator<Item = TriangleId> + '_ {
        self.tris[id.index()].neighbors.iter().copied()
    }

    pub(crate) fn centroid(&self, id: TriangleId) -> Vec2 {
        self.tris[id.index()].centroid
    }

    pub(crate) fn centroid_distance(&self, a: TriangleId, b: TriangleId) -> f32 {
        self.tris[a.index()].distance_to(&self.tris[b.index()])
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct NavMeshSerde {
    tris: Vec<Triangle>,
}

#[cfg(feature = "serde")]
impl Serialize for NavMesh {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NavMeshSerde {
            tris: self.tris.iter().map(|t| t.vertices).collect(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for NavMesh {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = NavMeshSerde::deserialize(deserializer)?;
        Ok(NavMesh::from_triangles(data.tris))
    }
}

fn tri_edges(tri: &Triangle) -> [(Vec2, Vec2); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}
