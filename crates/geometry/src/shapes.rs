use crate::point::Point;
use crate::EPSILON;
use geo::line_measures::Distance;
use geo::{Area, Coord, Euclidean, Intersects, Line, LineString};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in detector format: center, width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
        }
    }

    /// Box spanning two opposite corners
    #[must_use]
    pub fn from_corners(min: Point, max: Point) -> Self {
        Self::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (max.x - min.x).abs(),
            (max.y - min.y).abs(),
        )
    }

    /// Top-left corner
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.cx - self.width / 2.0, self.cy - self.height / 2.0)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    /// Four corners in fixed winding: top-left, bottom-left, bottom-right, top-right.
    ///
    /// Every polygon built from a box goes through this order; mixing windings
    /// produces bow-tie outlines that [`Polygon::new`] rejects.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let Point { x: x1, y: y1 } = self.origin();
        [
            Point::new(x1, y1),
            Point::new(x1, y1 + self.height),
            Point::new(x1 + self.width, y1 + self.height),
            Point::new(x1 + self.width, y1),
        ]
    }

    /// Outline polygon, `None` for zero-area boxes
    #[must_use]
    pub fn polygon(&self) -> Option<Polygon> {
        Polygon::new(self.corners().to_vec())
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let origin = self.origin();
        point.x >= origin.x
            && point.x <= origin.x + self.width
            && point.y >= origin.y
            && point.y <= origin.y + self.height
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cx.is_finite()
            && self.cy.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// Rotated box produced by the link detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians, as reported by the detector
    pub rotation: f64,
    pub corners: [Point; 4],
}

impl OrientedBox {
    /// Line drawn by the link: topmost corner to bottommost corner
    #[must_use]
    pub fn endpoints(&self) -> Segment {
        let mut top = self.corners[0];
        let mut bottom = self.corners[0];
        for corner in &self.corners[1..] {
            if corner.y < top.y {
                top = *corner;
            }
            if corner.y > bottom.y {
                bottom = *corner;
            }
        }
        Segment::new(top, bottom)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cx.is_finite()
            && self.cy.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.rotation.is_finite()
            && self.corners.iter().all(|c| c.is_finite())
    }
}

/// Closed line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    #[must_use]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub fn line(&self) -> Line<f64> {
        Line::new(self.a, self.b)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    /// Closed-segment intersection test, collinear overlaps included
    #[must_use]
    pub fn intersects(&self, other: &Segment) -> bool {
        self.line().intersects(&other.line())
    }

    /// Shortest distance between two segments (0 when they touch)
    #[must_use]
    pub fn distance(&self, other: &Segment) -> f64 {
        Euclidean.distance(&self.line(), &other.line())
    }
}

/// Simple polygon with a validated outline
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    inner: geo::Polygon<f64>,
}

impl Polygon {
    /// Build a polygon, rejecting degenerate outlines.
    ///
    /// Returns `None` for fewer than three vertices, non-finite coordinates,
    /// zero-length edges, zero area, or edges that cross each other.
    #[must_use]
    pub fn new(vertices: Vec<Point>) -> Option<Self> {
        if vertices.len() < 3 || vertices.iter().any(|p| !p.is_finite()) {
            return None;
        }

        let ring: LineString<f64> = vertices.into_iter().map(Coord::<f64>::from).collect();
        let inner = geo::Polygon::new(ring, vec![]);
        let polygon = Self { inner };
        if polygon.edges().any(|edge| edge_length(&edge) <= EPSILON) {
            return None;
        }
        if polygon.inner.unsigned_area() <= EPSILON {
            return None;
        }
        if polygon.is_self_intersecting() {
            return None;
        }

        Some(polygon)
    }

    /// Closed outline ring
    #[must_use]
    pub fn exterior(&self) -> &LineString<f64> {
        self.inner.exterior()
    }

    /// Boundary edges, closing the ring
    pub fn edges(&self) -> impl Iterator<Item = Line<f64>> + '_ {
        self.inner.exterior().lines()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.inner.unsigned_area()
    }

    fn is_self_intersecting(&self) -> bool {
        let edges: Vec<Line<f64>> = self.edges().collect();
        let n = edges.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if !adjacent && edges[i].intersects(&edges[j]) {
                    return true;
                }
            }
        }
        false
    }
}

fn edge_length(edge: &Line<f64>) -> f64 {
    let delta = edge.delta();
    delta.x.hypot(delta.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn box_corners_follow_fixed_winding() {
        let bbox = BoundingBox::new(10.0, 20.0, 4.0, 6.0);
        assert_eq!(
            bbox.corners(),
            [
                Point::new(8.0, 17.0),
                Point::new(8.0, 23.0),
                Point::new(12.0, 23.0),
                Point::new(12.0, 17.0),
            ]
        );
        let polygon = bbox.polygon().expect("valid box");
        assert!((polygon.area() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn zero_area_box_has_no_polygon() {
        assert!(BoundingBox::new(5.0, 5.0, 0.0, 10.0).polygon().is_none());
        assert!(BoundingBox::new(5.0, 5.0, 10.0, 0.0).polygon().is_none());
    }

    #[test]
    fn bow_tie_is_rejected() {
        let bow_tie = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        assert!(Polygon::new(bow_tie).is_none());
    }

    #[test]
    fn too_few_or_repeated_vertices_are_rejected() {
        assert!(Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_none());
        let repeated = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
        ];
        assert!(Polygon::new(repeated).is_none());
    }

    #[test]
    fn outline_ring_is_closed() {
        let polygon = BoundingBox::new(5.0, 5.0, 10.0, 10.0).polygon().expect("valid box");
        let ring = polygon.exterior();
        assert_eq!(ring.0.len(), 5);
        assert_eq!(ring.0.first(), ring.0.last());
        assert_eq!(polygon.edges().count(), 4);
    }

    #[test]
    fn collinear_outline_is_rejected() {
        let flat = vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        assert!(Polygon::new(flat).is_none());
    }

    #[test]
    fn oriented_box_endpoints_pick_top_and_bottom_corners() {
        let obb = OrientedBox {
            cx: 50.0,
            cy: 50.0,
            width: 4.0,
            height: 100.0,
            rotation: 0.3,
            corners: [
                Point::new(48.0, 30.0),
                Point::new(70.0, 2.0),
                Point::new(52.0, 98.0),
                Point::new(30.0, 70.0),
            ],
        };
        let segment = obb.endpoints();
        assert_eq!(segment.a, Point::new(70.0, 2.0));
        assert_eq!(segment.b, Point::new(52.0, 98.0));
    }

    #[test]
    fn segment_distances() {
        let horizontal = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let crossing = Segment::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0));
        let parallel = Segment::new(Point::new(0.0, 3.0), Point::new(10.0, 3.0));
        let beyond = Segment::new(Point::new(13.0, 4.0), Point::new(20.0, 4.0));

        assert_eq!(horizontal.distance(&crossing), 0.0);
        assert!((horizontal.distance(&parallel) - 3.0).abs() < 1e-9);
        assert!((horizontal.distance(&beyond) - 5.0).abs() < 1e-9);
        assert!((horizontal.length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_touching_segments_intersect() {
        let a = Segment::new(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        let b = Segment::new(Point::new(5.0, 0.0), Point::new(9.0, 0.0));
        assert!(a.intersects(&b));
        let c = Segment::new(Point::new(6.0, 0.0), Point::new(9.0, 0.0));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn contains_is_inclusive() {
        let bbox = BoundingBox::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(bbox.contains(Point::new(0.0, 10.0)));
        assert!(bbox.contains(Point::new(5.0, 5.0)));
        assert!(!bbox.contains(Point::new(10.1, 5.0)));
    }
}
