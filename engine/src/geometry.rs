//! Rasterizing circles and polygons, and ordering orbit points by polar angle.

use std::collections::HashSet;
use std::f64::consts::PI;

use crate::coord::Coord;

/// Rasterizes the border of a circle of the given `radius` around `center` using the
/// midpoint (Bresenham) algorithm. Radius 0 yields the singleton `center`. The result is
/// deduplicated and in no particular order; see [`sort_by_angle`] for the traversal order.
pub fn circle_coords(radius: i32, center: Coord) -> Vec<Coord> {
    if radius == 0 {
        return vec![center];
    }

    let mut circle = HashSet::new();
    let mut x = 0i32;
    let mut y = radius;
    let mut d = 1 - radius;

    while x <= y {
        let points = [
            Coord::new(center.y + y, center.x + x),
            Coord::new(center.y - y, center.x + x),
            Coord::new(center.y + y, center.x - x),
            Coord::new(center.y - y, center.x - x),
            Coord::new(center.y + x, center.x + y),
            Coord::new(center.y - x, center.x + y),
            Coord::new(center.y + x, center.x - y),
            Coord::new(center.y - x, center.x - y),
        ];
        for p in points {
            circle.insert(p);
        }
        if d < 0 {
            d += 2 * x + 3;
        } else {
            d += 2 * (x - y) + 5;
            y -= 1;
        }
        x += 1;
    }

    circle.into_iter().collect()
}

/// Sorts points around `center` by `atan2(dy, dx)` normalized to `[0, 2*pi)`, ascending.
/// This is the canonical order a planet steps through as it orbits.
pub fn sort_by_angle(center: Coord, coords: impl IntoIterator<Item = Coord>) -> Vec<Coord> {
    let mut with_angle: Vec<(f64, Coord)> = coords
        .into_iter()
        .map(|c| {
            let dy = (c.y - center.y) as f64;
            let dx = (c.x - center.x) as f64;
            let mut angle = dy.atan2(dx);
            if angle < 0.0 {
                angle += 2.0 * PI;
            }
            (angle, c)
        })
        .collect();
    with_angle.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    with_angle.into_iter().map(|(_, c)| c).collect()
}

/// Rasterizes the border of a regular `n`-gon (`n >= 3`) inscribed in a circle of the
/// given `radius` and `center`, starting at `angle_degrees` from the positive x axis.
/// Vertices are connected (wrapping) with Bresenham line segments. Triangles round their
/// vertices with `ceil` (keeps them visually centered on the tile grid); all other
/// polygons use `round`. Result is deduplicated.
pub fn ngon_coords(n: u32, radius: i32, angle_degrees: f64, center: Coord) -> Vec<Coord> {
    assert!(n >= 3, "polygon must have at least 3 points");
    if radius == 0 {
        return vec![center];
    }

    let angle = angle_degrees / 180.0 * PI;
    let mut vertices = Vec::with_capacity(n as usize);
    for i in 0..n {
        let theta = 2.0 * PI * (i as f64) / (n as f64) + angle;
        let (y, x) = if n == 3 {
            (
                (center.y as f64 + radius as f64 * theta.sin()).ceil() as i32,
                (center.x as f64 + radius as f64 * theta.cos()).ceil() as i32,
            )
        } else {
            (
                (center.y as f64 + radius as f64 * theta.sin()).round() as i32,
                (center.x as f64 + radius as f64 * theta.cos()).round() as i32,
            )
        };
        vertices.push(Coord::new(y, x));
    }

    let mut coords = HashSet::new();
    let len = vertices.len();
    for i in 0..len {
        let (y1, x1) = (vertices[(len + i - 1) % len].y, vertices[(len + i - 1) % len].x);
        let (y2, x2) = (vertices[i].y, vertices[i].x);
        for c in bresenham_line(y1, x1, y2, x2) {
            coords.insert(c);
        }
    }

    coords.into_iter().collect()
}

/// Bresenham line segment between two points, inclusive of both endpoints.
fn bresenham_line(y1: i32, x1: i32, y2: i32, x2: i32) -> Vec<Coord> {
    let (mut y1, mut x1) = (y1, x1);
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut points = Vec::new();
    loop {
        points.push(Coord::new(y1, x1));
        if x1 == x2 && y1 == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x1 += sx;
        }
        if e2 < dx {
            err += dx;
            y1 += sy;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_is_singleton() {
        assert_eq!(circle_coords(0, Coord::new(5, 5)), vec![Coord::new(5, 5)]);
    }

    #[test]
    fn circle_is_symmetric_around_center() {
        let center = Coord::new(10, 10);
        let points = circle_coords(4, center);
        for p in &points {
            let mirrored = Coord::new(2 * center.y - p.y, p.x);
            assert!(points.contains(&mirrored), "missing vertical mirror of {:?}", p);
        }
    }

    #[test]
    fn sort_by_angle_is_monotonic() {
        let center = Coord::new(0, 0);
        let points = circle_coords(5, center);
        let sorted = sort_by_angle(center, points);
        let mut last = -1.0;
        for p in &sorted {
            let dy = (p.y - center.y) as f64;
            let dx = (p.x - center.x) as f64;
            let mut angle = dy.atan2(dx);
            if angle < 0.0 {
                angle += 2.0 * PI;
            }
            assert!(angle >= last - 1e-9);
            last = angle;
        }
    }

    #[test]
    fn triangle_has_three_rounded_vertices_among_border() {
        let border = ngon_coords(3, 5, 0.0, Coord::new(0, 0));
        assert!(!border.is_empty());
    }

    #[test]
    fn hexagon_border_nonempty_and_deduped() {
        let border = ngon_coords(6, 6, 30.0, Coord::new(3, 3));
        let set: HashSet<_> = border.iter().copied().collect();
        assert_eq!(border.len(), set.len());
    }
}
