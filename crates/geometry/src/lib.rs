//! # Netsketch Geometry
//!
//! Planar primitives used to reason about detections on a diagram image.
//!
//! ## Features
//!
//! - **Boxes** - axis-aligned `(cx, cy, w, h)` boxes and oriented link boxes
//! - **Polygons** - validated outlines (degenerate shapes are rejected, not errors)
//! - **Distances** - shortest distance between polygon boundaries and segments
//!
//! Polygons and segments are thin wrappers over [`geo`] types; distances use
//! its `Euclidean` metric and crossing tests use `Intersects`.
//!
//! ## Architecture
//!
//! ```text
//! BoundingBox (cx, cy, w, h)
//!     │
//!     ├──> corners() ── fixed winding ──> Polygon::new ──> Option<Polygon>
//!     │
//! OrientedBox (cx, cy, w, h, r, corners)
//!     │
//!     └──> endpoints() ──> Segment (topmost corner, bottommost corner)
//!
//! boundary_distance_to_segment(Polygon, Segment) -> f64
//! boundary_distance(Polygon, Polygon)            -> f64
//! ```
//!
//! ## Example
//!
//! ```rust
//! use netsketch_geometry::{boundary_distance_to_segment, BoundingBox, Point, Segment};
//!
//! let zone = BoundingBox::new(50.0, 50.0, 20.0, 20.0);
//! let outline = zone.polygon().expect("non-degenerate box");
//! let link = Segment::new(Point::new(60.0, 50.0), Point::new(120.0, 50.0));
//!
//! assert_eq!(boundary_distance_to_segment(&outline, &link), 0.0);
//! ```

mod distance;
mod point;
mod shapes;

pub use distance::{boundary_distance, boundary_distance_to_segment};
pub use point::Point;
pub use shapes::{BoundingBox, OrientedBox, Polygon, Segment};

/// Tolerance used for area and orientation tests
pub const EPSILON: f64 = 1e-9;
