//! Funnel string-pulling over a portal corridor, and agent-radius offsetting of the result.

use crate::math::{cross, tri_area2, Vec2};
use crate::mesh::Portal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    pub point: Vec2,
    /// Midpoint of a portal too narrow to funnel through; never offset.
    pub narrow: bool,
}

impl Waypoint {
    pub fn new(point: Vec2) -> Self {
        Self {
            point,
            narrow: false,
        }
    }

    pub fn narrow(point: Vec2) -> Self {
        Self {
            point,
            narrow: true,
        }
    }
}

fn push_waypoint(out: &mut Vec<Waypoint>, waypoint: Waypoint) {
    if out.last().map(|w| w.point) != Some(waypoint.point) {
        out.push(waypoint);
    }
}

/// Pull a taut path from `start` to `end` through `portals`.
///
/// Portals shorter than `narrowness_threshold` are not funnelled: their midpoint is emitted as a
/// narrow waypoint and the funnel restarts from it. The result starts at `start`, ends at `end`,
/// and never repeats a point twice in a row.
pub fn string_pull(
    portals: &[Portal],
    start: Vec2,
    end: Vec2,
    narrowness_threshold: f32,
) -> Vec<Waypoint> {
    let mut out = Vec::new();
    string_pull_into(portals, start, end, narrowness_threshold, &mut out);
    out
}

pub fn string_pull_into(
    portals: &[Portal],
    start: Vec2,
    end: Vec2,
    narrowness_threshold: f32,
    out: &mut Vec<Waypoint>,
) {
    out.clear();
    out.push(Waypoint::new(start));

    let funnel: Vec<Portal> = core::iter::once(Portal::point(start))
        .chain(portals.iter().copied())
        .chain(core::iter::once(Portal::point(end)))
        .collect();

    let mut apex = start;
    let mut left = start;
    let mut right = start;
    let mut left_index: usize = 0;
    let mut right_index: usize = 0;

    let mut i: usize = 1;
    while i < funnel.len() {
        let portal = funnel[i];

        if portal.is_narrow(narrowness_threshold) {
            push_waypoint(out, Waypoint::narrow(portal.midpoint));
            apex = portal.midpoint;
            left = apex;
            right = apex;
            left_index = i;
            right_index = i;
            i += 1;
            continue;
        }

        // Update right vertex.
        if tri_area2(apex, right, portal.right) <= 0.0 {
            if apex == right || tri_area2(apex, left, portal.right) > 0.0 {
                right = portal.right;
                right_index = i;
            } else {
                push_waypoint(out, Waypoint::new(left));
                apex = left;
                right = apex;
                right_index = left_index;
                i = left_index + 1;
                continue;
            }
        }

        // Update left vertex.
        if tri_area2(apex, left, portal.left) >= 0.0 {
            if apex == left || tri_area2(apex, right, portal.left) < 0.0 {
                left = portal.left;
                left_index = i;
            } else {
                push_waypoint(out, Waypoint::new(right));
                apex = right;
                left = apex;
                left_index = right_index;
                i = right_index + 1;
                continue;
            }
        }

        i += 1;
    }

    push_waypoint(out, Waypoint::new(end));
}

/// Push every interior corner of `path` away from the corner it wraps around by `radius`.
///
/// The outgoing leg is rotated about the corner by half the turn angle and the corner is moved
/// back along it. Endpoints, narrow waypoints and corners with a zero-length leg are kept as is.
pub fn inflate(path: &[Waypoint], radius: f32) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = path.iter().map(|w| w.point).collect();
    if radius == 0.0 || path.len() < 3 {
        return out;
    }

    for (i, window) in path.windows(3).enumerate() {
        let [previous, current, next] = [window[0].point, window[1].point, window[2].point];
        if window[1].narrow {
            continue;
        }
        let to_previous = previous - current;
        let to_next = next - current;
        if to_previous.length() == 0.0 || to_next.length() == 0.0 {
            continue;
        }

        let turn = cross(current - previous, current - next);
        let dot = to_previous
            .normalize_or_zero()
            .dot(to_next.normalize_or_zero())
            .clamp(-1.0, 1.0);
        let angle = dot.acos() * if turn >= 0.0 { -1.0 } else { 1.0 };

        let bisector = to_next.rotate(angle / 2.0).normalize_or_zero();
        out[i + 1] = current - bisector * radius;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflate_moves_corner_away_from_the_inside_of_the_bend() {
        let path = [
            Waypoint::new(Vec2::new(0.0, 0.0)),
            Waypoint::new(Vec2::new(1.0, 0.0)),
            Waypoint::new(Vec2::new(1.0, 1.0)),
        ];
        let out = inflate(&path, 0.5);
        assert_eq!(out[0], path[0].point);
        assert_eq!(out[2], path[2].point);
        // The bend wraps around the region towards (0, 1); the corner moves to +x / -y.
        assert!(out[1].x > 1.0, "{:?}", out[1]);
        assert!(out[1].y < 0.0, "{:?}", out[1]);
        assert!((out[1].distance(path[1].point) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn straight_corridor_pulls_to_a_single_segment() {
        let portals = [
            Portal::new(Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0)),
            Portal::new(Vec2::new(4.0, -1.0), Vec2::new(4.0, 1.0)),
        ];
        let path = string_pull(&portals, Vec2::new(0.0, 0.0), Vec2::new(6.0, 0.0), 0.0);
        let points: Vec<Vec2> = path.iter().map(|w| w.point).collect();
        assert_eq!(points, vec![Vec2::new(0.0, 0.0), Vec2::new(6.0, 0.0)]);
    }
}
