//! Core traits for pointclass

use crate::point::Point3f;
use crate::point_set::PointSet;

/// A read-only source of point positions that a spatial index can be built over
pub trait SpatialSource {
    /// Number of points available
    fn point_count(&self) -> usize;

    /// Coordinates of the point at `idx`
    fn point_coords(&self, idx: usize) -> [f32; 3];
}

/// Trait for nearest neighbor search functionality
///
/// Distances are squared euclidean distances, sorted ascending. When the query
/// point is itself part of the index it is returned at rank 0.
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to a query point
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;

    /// Find all neighbors within a given radius
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;
}

/// Trait for objects with a spatial extent
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f;
}

impl SpatialSource for [Point3f] {
    fn point_count(&self) -> usize {
        self.len()
    }

    fn point_coords(&self, idx: usize) -> [f32; 3] {
        let p = &self[idx];
        [p.x, p.y, p.z]
    }
}

impl Drawable for PointSet {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.points[0];
        let mut max = self.points[0];

        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }

    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}
