//! Marching-squares perimeter tracing over a cell predicate.
//!
//! The cursor sits on lattice points. At each point the 2x2 block of cells around it is packed
//! into a 4-bit code (upper-left = 1, upper = 2, left = 4, current = 8) and the code picks the
//! next step. The walk keeps target cells on one side and stops once it is back at the start.

use crate::error::{BuildError, Result};
use crate::math::{point_in_polygon, GridEdge, GridPoint, GridRect, Vec2};

type Step = (i32, i32);

const NONE: Step = (0, 0);
const UP: Step = (0, -1);
const DOWN: Step = (0, 1);
const LEFT: Step = (-1, 0);
const RIGHT: Step = (1, 0);

/// Closed outline of one connected region, in lattice coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Visited lattice points; the first and last entries are equal.
    points: Vec<GridPoint>,
    /// Unit steps between consecutive points.
    edges: Vec<GridEdge>,
    bounds: GridRect,
}

impl Contour {
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn edges(&self) -> &[GridEdge] {
        &self.edges
    }

    pub fn start(&self) -> GridPoint {
        self.points[0]
    }

    /// Number of unit steps around the outline.
    pub fn perimeter(&self) -> usize {
        self.edges.len()
    }

    pub fn bounds(&self) -> GridRect {
        self.bounds
    }

    /// Whether the lattice-space point lies inside the outline.
    pub fn contains(&self, p: Vec2) -> bool {
        self.bounds.contains_point(p) && point_in_polygon(p, &self.points)
    }

    /// Whether cell `(x, y)` lies inside the outline (tested at the cell centre).
    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        self.bounds.contains_cell(x, y)
            && point_in_polygon(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), &self.points)
    }

    /// Set `mask` for every cell of `area` that [`contains_cell`](Self::contains_cell) accepts.
    ///
    /// `mask` is row-major over `area`; cells already set stay set. Each row is filled between
    /// pairs of vertical edge crossings, so the cost is the bounding box plus the perimeter.
    pub fn fill_cells(&self, area: GridRect, mask: &mut [bool]) {
        let width = area.width().max(0) as usize;
        let rows = self.bounds.height().max(0) as usize;
        let mut crossings: Vec<Vec<i32>> = vec![Vec::new(); rows];
        for edge in &self.edges {
            if edge.start.x == edge.end.x {
                let row = edge.start.y.min(edge.end.y) - self.bounds.min.y;
                if let Some(xs) = usize::try_from(row).ok().and_then(|r| crossings.get_mut(r)) {
                    xs.push(edge.start.x);
                }
            }
        }

        for (row, xs) in crossings.iter_mut().enumerate() {
            let y = self.bounds.min.y + row as i32;
            if y < area.min.y || y >= area.max.y {
                continue;
            }
            xs.sort_unstable();
            let offset = (y - area.min.y) as usize * width;
            for span in xs.chunks_exact(2) {
                let from = span[0].max(area.min.x);
                let to = span[1].min(area.max.x);
                for x in from..to {
                    mask[offset + (x - area.min.x) as usize] = true;
                }
            }
        }
    }
}

fn square_value(is_target: &impl Fn(i32, i32) -> bool, p: GridPoint) -> u8 {
    let mut value = 0;
    if is_target(p.x - 1, p.y - 1) {
        value += 1;
    }
    if is_target(p.x, p.y - 1) {
        value += 2;
    }
    if is_target(p.x - 1, p.y) {
        value += 4;
    }
    if is_target(p.x, p.y) {
        value += 8;
    }
    value
}

fn next_step(value: u8, previous: Step) -> Option<Step> {
    match value {
        1 | 5 | 13 => Some(UP),
        8 | 10 | 11 => Some(DOWN),
        4 | 12 | 14 => Some(LEFT),
        2 | 3 | 7 => Some(RIGHT),
        // Saddles: upper + left cells set.
        6 => Some(if previous == UP { LEFT } else { RIGHT }),
        // Saddles: upper-left + current cells set.
        9 => Some(if previous == RIGHT { UP } else { DOWN }),
        // 0 and 15 mean the cursor left the boundary.
        _ => None,
    }
}

/// Trace the outline of the first target cell found in `area` (row-major scan).
///
/// Returns `Ok(None)` when no cell in `area` satisfies `is_target`. The predicate is also queried
/// one cell outside `area`, so it must answer `false` for anything that isn't part of the region.
pub fn walk_perimeter<F>(is_target: F, area: GridRect, step_limit: usize) -> Result<Option<Contour>>
where
    F: Fn(i32, i32) -> bool,
{
    let Some((x, y)) = area.cells().find(|&(x, y)| is_target(x, y)) else {
        return Ok(None);
    };
    trace_from(&is_target, GridPoint::new(x, y), step_limit).map(Some)
}

/// Trace the outline that starts at the upper-left corner of cell `start`.
///
/// The cells above and to the left of `start` must not be targets, which holds for the first
/// target cell of a row-major scan.
pub fn trace_from<F>(is_target: &F, start: GridPoint, step_limit: usize) -> Result<Contour>
where
    F: Fn(i32, i32) -> bool,
{
    let mut points = vec![start];
    let mut edges = Vec::new();
    let mut current = start;
    let mut previous = NONE;

    loop {
        if edges.len() >= step_limit {
            return Err(BuildError::MalformedContour {
                start,
                steps: edges.len(),
            });
        }

        let value = square_value(is_target, current);
        let step = next_step(value, previous).ok_or(BuildError::MalformedContour {
            start,
            steps: edges.len(),
        })?;

        let next = current.offset(step);
        edges.push(GridEdge::new(current, next));
        points.push(next);
        previous = step;
        current = next;

        if current == start {
            break;
        }
    }

    let bounds = GridRect::bounding(&points).unwrap_or(GridRect::new(start, start));
    Ok(Contour {
        points,
        edges,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saddle_codes_follow_previous_step() {
        assert_eq!(next_step(6, UP), Some(LEFT));
        assert_eq!(next_step(6, DOWN), Some(RIGHT));
        assert_eq!(next_step(9, RIGHT), Some(UP));
        assert_eq!(next_step(9, LEFT), Some(DOWN));
        assert_eq!(next_step(0, NONE), None);
        assert_eq!(next_step(15, UP), None);
    }
}
