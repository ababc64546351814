use geo::line_measures::Distance;
use geo::{Coord, Euclidean};
use serde::{Deserialize, Serialize};

/// Point in image space (pixels, y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        Euclidean.distance(&geo::Point::<f64>::from(self), &geo::Point::<f64>::from(other))
    }

    /// Translate by an offset expressed as a point (e.g. a region origin)
    #[must_use]
    pub fn offset(self, origin: Self) -> Self {
        Self::new(self.x + origin.x, self.y + origin.y)
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(p: Point) -> Self {
        geo::Point::new(p.x, p.y)
    }
}

impl From<Coord<f64>> for Point {
    fn from(c: Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}
