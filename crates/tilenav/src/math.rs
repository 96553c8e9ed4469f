use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// World-space 2D vector.
///
/// World space uses the grid's orientation: `x` grows with the column index and `y` grows with
/// the row index (screen-style, y pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            self / len
        }
    }

    /// Rotate counter-clockwise (in the `x`/`y` axes as written) by `angle` radians.
    pub fn rotate(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Angle of this vector measured from the +x axis, in `(-PI, PI]`.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn midpoint(self, other: Self) -> Self {
        (self + other) * 0.5
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A point on the grid lattice. Lattice point `(x, y)` is the upper-left corner of cell `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, step: (i32, i32)) -> Self {
        Self::new(self.x + step.0, self.y + step.1)
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Directed lattice segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridEdge {
    pub start: GridPoint,
    pub end: GridPoint,
}

impl GridEdge {
    pub const fn new(start: GridPoint, end: GridPoint) -> Self {
        Self { start, end }
    }

    pub fn delta(&self) -> (i64, i64) {
        (
            i64::from(self.end.x) - i64::from(self.start.x),
            i64::from(self.end.y) - i64::from(self.start.y),
        )
    }

    /// Lattice length (edges produced by tracing are axis-aligned).
    pub fn length(&self) -> f32 {
        self.start.as_vec2().distance(self.end.as_vec2())
    }
}

/// Half-open rectangle of cells: `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub min: GridPoint,
    pub max: GridPoint,
}

impl GridRect {
    pub const fn new(min: GridPoint, max: GridPoint) -> Self {
        Self { min, max }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            GridPoint::new(0, 0),
            GridPoint::new(width as i32, height as i32),
        )
    }

    /// Tightest lattice rectangle around `points`.
    pub fn bounding(points: &[GridPoint]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min, max))
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        x >= self.min.x && y >= self.min.y && x < self.max.x && y < self.max.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x as f32
            && p.y >= self.min.y as f32
            && p.x <= self.max.x as f32
            && p.y <= self.max.y as f32
    }

    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.min.y..self.max.y).flat_map(move |y| (self.min.x..self.max.x).map(move |x| (x, y)))
    }
}

pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of `abc`; positive when `c` lies counter-clockwise of `ab`.
pub fn tri_area2(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    cross(b - a, c - a)
}

/// Smallest signed difference `x - y` between two angles, wrapped to `[-PI, PI)`.
pub fn angle_difference(x: f32, y: f32) -> f32 {
    use core::f32::consts::{PI, TAU};
    let shifted = x - y + PI;
    shifted - (shifted / TAU).floor() * TAU - PI
}

pub fn point_in_triangle(p: Vec2, tri: [Vec2; 3]) -> bool {
    let eps = 1e-6;
    let a = tri[0];
    let b = tri[1];
    let c = tri[2];
    let ab = tri_area2(a, b, p);
    let bc = tri_area2(b, c, p);
    let ca = tri_area2(c, a, p);
    let has_neg = ab < -eps || bc < -eps || ca < -eps;
    let has_pos = ab > eps || bc > eps || ca > eps;
    !(has_neg && has_pos)
}

/// Even-odd ray test against a closed lattice polygon.
///
/// The closing vertex may or may not be repeated. Points exactly on the outline have no
/// defined answer; callers sample cell centres or triangle centroids, which never are.
pub fn point_in_polygon(p: Vec2, polygon: &[GridPoint]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i].as_vec2();
        let b = polygon[j].as_vec2();
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

pub fn tri_centroid(tri: [Vec2; 3]) -> Vec2 {
    (tri[0] + tri[1] + tri[2]) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    #[test]
    fn angle_difference_wraps_around_the_seam() {
        let d = angle_difference(PI - 0.1, -PI + 0.1);
        assert!((d + 0.2).abs() < 1e-5, "got {d}");
        let d = angle_difference(0.3, 0.1);
        assert!((d - 0.2).abs() < 1e-5, "got {d}");
    }

    #[test]
    fn polygon_test_samples_cell_centres() {
        let square = [
            GridPoint::new(1, 1),
            GridPoint::new(1, 3),
            GridPoint::new(3, 3),
            GridPoint::new(3, 1),
            GridPoint::new(1, 1),
        ];
        assert!(point_in_polygon(Vec2::new(1.5, 1.5), &square));
        assert!(point_in_polygon(Vec2::new(2.5, 2.5), &square));
        assert!(!point_in_polygon(Vec2::new(0.5, 1.5), &square));
        assert!(!point_in_polygon(Vec2::new(3.5, 2.5), &square));
    }
}
