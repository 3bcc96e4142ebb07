//! Nearest neighbor search implementations

use std::num::NonZero;

use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use pointclass_core::{squared_distance, NearestNeighborSearch, Point3f, SpatialSource};

type Tree = ImmutableKdTree<f32, u32, 3, 32>;

/// KD-Tree over point positions, keyed by squared euclidean distance
///
/// The tree is balanced once at build time, so duplicate and coplanar
/// positions of any multiplicity are accepted.
pub struct KdTree {
    tree: Tree,
    num_points: usize,
}

impl KdTree {
    /// Build a tree over every point of `source`
    pub fn build<S: SpatialSource + ?Sized>(source: &S) -> Self {
        let num_points = source.point_count();
        let coords: Vec<[f32; 3]> = (0..num_points).map(|idx| source.point_coords(idx)).collect();
        let tree = ImmutableKdTree::new_from_slice(&coords);

        Self { tree, num_points }
    }

    pub fn len(&self) -> usize {
        self.num_points
    }

    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }
}

impl NearestNeighborSearch for KdTree {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        if self.is_empty() {
            return Vec::new();
        }

        let Some(k) = NonZero::new(k) else {
            return Vec::new();
        };

        self.tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance))
            .collect()
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if self.is_empty() || radius < 0.0 {
            return Vec::new();
        }

        // The tree query is strict, so widen it and filter inclusively
        let radius_sq = radius * radius;
        let mut results: Vec<(usize, f32)> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[query.x, query.y, query.z], radius_sq + f32::EPSILON)
            .into_iter()
            .filter(|nn| nn.distance <= radius_sq)
            .map(|nn| (nn.item as usize, nn.distance))
            .collect();
        results.sort_by(|a, b| a.1.total_cmp(&b.1));
        results
    }
}

/// Simple brute force nearest neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut distances: Vec<(usize, f32)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, squared_distance(point, query)))
            .collect();

        // Sort by distance and take k nearest
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        distances.truncate(k);
        distances
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let radius_squared = radius * radius;
        let mut found: Vec<(usize, f32)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, squared_distance(point, query)))
            .filter(|&(_, d)| d <= radius_squared)
            .collect();

        found.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointclass_core::PointSet;

    fn line_points() -> Vec<Point3f> {
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(3.0, 0.0, 0.0),
            Point3f::new(7.0, 0.0, 0.0),
            Point3f::new(15.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_knn_includes_query_at_rank_zero() {
        let set = PointSet::from_points(line_points());
        let tree = KdTree::build(&set);
        assert_eq!(tree.len(), 5);

        let result = tree.find_k_nearest(&set.points[1], 3);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], (1, 0.0));
        assert_eq!(result[1], (0, 1.0));
        assert_eq!(result[2], (2, 4.0));
    }

    #[test]
    fn test_knn_caps_at_point_count() {
        let points = line_points();
        let tree = KdTree::build(points.as_slice());
        let result = tree.find_k_nearest(&Point3f::new(2.0, 0.0, 0.0), 10);
        assert_eq!(result.len(), 5);
        assert!(tree.find_k_nearest(&Point3f::origin(), 0).is_empty());
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(PointSet::new().points.as_slice());
        assert!(tree.is_empty());
        assert!(tree.find_k_nearest(&Point3f::origin(), 3).is_empty());
        assert!(tree.find_radius_neighbors(&Point3f::origin(), 1.0).is_empty());
    }

    #[test]
    fn test_radius_neighbors() {
        let points = line_points();
        let tree = KdTree::build(points.as_slice());
        let mut found = tree.find_radius_neighbors(&Point3f::new(0.5, 0.0, 0.0), 3.0);
        found.sort_by_key(|&(idx, _)| idx);
        let indices: Vec<usize> = found.iter().map(|&(idx, _)| idx).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_many_identical_points() {
        let mut points = vec![Point3f::new(1.0, 2.0, 3.0); 300];
        points.push(Point3f::new(1.5, 2.0, 3.0));
        let tree = KdTree::build(points.as_slice());
        assert_eq!(tree.len(), 301);

        let result = tree.find_k_nearest(&Point3f::new(1.0, 2.0, 3.0), 4);
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|&(idx, d)| idx < 300 && d == 0.0));

        let found = tree.find_radius_neighbors(&Point3f::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(found.len(), 301);
        assert_eq!(found.last().map(|&(idx, _)| idx), Some(300));
    }

    #[test]
    fn test_planar_grid_neighbors() {
        let points: Vec<Point3f> = (0..1600)
            .map(|i| Point3f::new((i % 40) as f32 * 0.5, (i / 40) as f32 * 0.5, 0.0))
            .collect();
        let tree = KdTree::build(points.as_slice());

        // Interior point: itself, then four neighbors at one step
        let query = points[20 * 40 + 20];
        let result = tree.find_k_nearest(&query, 5);
        assert_eq!(result[0].1, 0.0);
        for &(_, d) in &result[1..] {
            approx::assert_relative_eq!(d, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_kdtree_matches_brute_force() {
        let points: Vec<Point3f> = (0..200)
            .map(|i| {
                let t = i as f32 * 0.37;
                Point3f::new(t.sin() * 5.0, t.cos() * 3.0, (t * 0.5).sin() * 2.0)
            })
            .collect();

        let tree = KdTree::build(points.as_slice());
        let brute = BruteForceSearch::new(&points);

        for query in points.iter().step_by(17) {
            let a = tree.find_k_nearest(query, 6);
            let b = brute.find_k_nearest(query, 6);
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b.iter()) {
                approx::assert_relative_eq!(x.1, y.1, epsilon = 1e-5);
            }
        }
    }
}
