//! Plane geometry over board cells: triangle area and perimeter, the cells a
//! straight link passes through, and segment crossing.

use crate::board::quadrant;
use crate::location::*;
use itertools::Itertools;

/// Twice the signed shoelace area. Exact in integers.
fn doubled_signed_area(a: Location, b: Location, c: Location) -> i32 {
    let (x1, y1) = (a.x() as i32, a.y() as i32);
    let (x2, y2) = (b.x() as i32, b.y() as i32);
    let (x3, y3) = (c.x() as i32, c.y() as i32);

    x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2)
}

/// Shoelace area `|x1(y2-y3) + x2(y3-y1) + x3(y1-y2)| / 2`.
pub fn triangle_area(a: Location, b: Location, c: Location) -> f32 {
    doubled_signed_area(a, b, c).unsigned_abs() as f32 / 2.0
}

/// Total Manhattan length of the triangle's three edges.
pub fn triangle_perimeter(a: Location, b: Location, c: Location) -> u32 {
    a.manhattan_distance_to(b) + b.manhattan_distance_to(c) + c.manhattan_distance_to(a)
}

/// Number of distinct board quadrants touched by a set of points.
pub fn quadrant_span(points: &[Location]) -> usize {
    points.iter().map(|p| quadrant(*p)).unique().count()
}

/// Cells strictly between `a` and `b` on the rasterised straight line
/// (Bresenham), endpoints excluded.
pub fn interior_line(a: Location, b: Location) -> Vec<Location> {
    let (mut x, mut y) = (a.x() as i32, a.y() as i32);
    let (x1, y1) = (b.x() as i32, b.y() as i32);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::new();
    while (x, y) != (x1, y1) {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        if (x, y) != (x1, y1) {
            if let Some(loc) = Location::checked(x as i64, y as i64) {
                cells.push(loc);
            }
        }
    }

    cells
}

fn orientation(a: Location, b: Location, c: Location) -> i32 {
    doubled_signed_area(a, b, c).signum()
}

/// Whether segments `a1-a2` and `b1-b2` properly cross. Segments that share an
/// endpoint, or only touch, do not count as crossing.
pub fn segments_cross(a1: Location, a2: Location, b1: Location, b2: Location) -> bool {
    if a1 == b1 || a1 == b2 || a2 == b1 || a2 == b2 {
        return false;
    }

    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    o1 * o2 < 0 && o3 * o4 < 0
}
