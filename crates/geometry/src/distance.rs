use crate::shapes::{Polygon, Segment};
use geo::line_measures::Distance;
use geo::Euclidean;

/// Shortest distance between a polygon's boundary and a segment.
///
/// Measured against the exterior ring, so a segment lying wholly inside the
/// polygon gets a positive distance.
#[must_use]
pub fn boundary_distance_to_segment(polygon: &Polygon, segment: &Segment) -> f64 {
    let line = segment.line();
    polygon
        .edges()
        .map(|edge| Euclidean.distance(&edge, &line))
        .fold(f64::INFINITY, f64::min)
}

/// Shortest distance between the boundaries of two polygons
#[must_use]
pub fn boundary_distance(a: &Polygon, b: &Polygon) -> f64 {
    a.edges()
        .flat_map(|edge| b.edges().map(move |other| Euclidean.distance(&edge, &other)))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, Point};
    use proptest::prelude::*;

    fn square(cx: f64, cy: f64, side: f64) -> Polygon {
        BoundingBox::new(cx, cy, side, side)
            .polygon()
            .expect("valid square")
    }

    #[test]
    fn segment_touching_outline_has_zero_distance() {
        let zone = square(50.0, 50.0, 20.0);
        let link = Segment::new(Point::new(60.0, 50.0), Point::new(200.0, 50.0));
        assert_eq!(boundary_distance_to_segment(&zone, &link), 0.0);
    }

    #[test]
    fn segment_inside_is_measured_to_outline() {
        let zone = square(50.0, 50.0, 20.0);
        let inner = Segment::new(Point::new(48.0, 50.0), Point::new(52.0, 50.0));
        assert!((boundary_distance_to_segment(&zone, &inner) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn gap_between_boxes() {
        let left = square(10.0, 10.0, 10.0);
        let right = square(30.0, 10.0, 10.0);
        assert!((boundary_distance(&left, &right) - 10.0).abs() < 1e-9);
        assert!((boundary_distance(&right, &left) - 10.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn horizontal_gap_matches_offset(gap in 0.0f64..500.0, side in 1.0f64..80.0) {
            let zone = square(0.0, 0.0, side);
            let start = side / 2.0 + gap;
            let link = Segment::new(Point::new(start, 0.0), Point::new(start + 40.0, 0.0));
            let distance = boundary_distance_to_segment(&zone, &link);
            prop_assert!((distance - gap).abs() < 1e-6);
        }
    }
}
