//! Point spacing estimation
//!
//! The spacing of a point set is the most common RMS distance from a point to
//! its nearest neighbors, measured on a random sample and quantized into
//! centimeter-wide histogram buckets. Taking the histogram mode instead of the
//! mean keeps sparse outlier regions from dragging the estimate.
//!
//! # Neighbor window
//!
//! Each sampled point queries its `k + 1` nearest neighbors (rank 0 is the
//! point itself). By default only ranks `1..k` are summed while the sum is
//! still divided by `k`, so the outermost neighbor is queried but ignored. On a
//! regular grid with step `d` this settles on `(k - 1) / k * d`. Set
//! [`SpacingOptions::include_outermost`] to sum ranks `1..=k` and get `d`
//! instead.

use crate::nearest_neighbor::KdTree;
use pointclass_core::{Error, NearestNeighborSearch, Point3f, PointSet, Result, SpatialSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::debug;

/// Default number of neighbors measured per sample
pub const DEFAULT_NEIGHBORS: usize = 3;

/// Default upper bound on the number of sampled points
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Smallest spacing ever reported
pub const MIN_SPACING: f64 = 0.01;

/// Histogram buckets per unit of distance
const BUCKETS_PER_UNIT: f32 = 100.0;

/// Options for spacing estimation
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingOptions {
    /// Number of neighbors `k`; values below 2 measure nothing and yield
    /// [`MIN_SPACING`]
    pub neighbors: usize,
    /// Maximum number of points sampled (with replacement)
    pub max_samples: usize,
    /// Seed for the sampler; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Sum neighbor ranks `1..=k` instead of `1..k`
    pub include_outermost: bool,
}

impl Default for SpacingOptions {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            seed: None,
            include_outermost: false,
        }
    }
}

impl SpacingOptions {
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_outermost_neighbor(mut self, include: bool) -> Self {
        self.include_outermost = include;
        self
    }
}

/// Extension trait adding memoized spacing estimation to [`PointSet`]
pub trait PointSetSpacing {
    /// Estimated spacing using [`DEFAULT_NEIGHBORS`] neighbors
    ///
    /// The first successful call fixes the value for the lifetime of the set.
    fn spacing(&self) -> Result<f64>;

    /// Estimated spacing with explicit options
    ///
    /// Options only take effect on the first successful call; afterwards the
    /// cached value is returned.
    fn spacing_with(&self, options: &SpacingOptions) -> Result<f64>;
}

impl PointSetSpacing for PointSet {
    fn spacing(&self) -> Result<f64> {
        self.spacing_with(&SpacingOptions::default())
    }

    fn spacing_with(&self, options: &SpacingOptions) -> Result<f64> {
        self.spacing_or_try_init(|set| {
            if set.is_empty() {
                return Err(empty_set_error());
            }
            let index = set.index_or_build(|s| Box::new(KdTree::build(s)));
            let mut rng = match options.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            estimate_spacing(set, index, options, &mut rng)
        })
    }
}

/// Estimate the spacing of `source` using a prebuilt `index`
///
/// `index` must have been built over the points of `source`. Nothing is
/// cached; every call samples afresh from `rng`.
pub fn estimate_spacing<S, I, R>(
    source: &S,
    index: &I,
    options: &SpacingOptions,
    rng: &mut R,
) -> Result<f64>
where
    S: SpatialSource + ?Sized,
    I: NearestNeighborSearch + ?Sized,
    R: Rng + ?Sized,
{
    let np = source.point_count();
    if np == 0 {
        return Err(empty_set_error());
    }

    let k = options.neighbors;
    let samples = np.min(options.max_samples);
    let last_rank = if options.include_outermost { k + 1 } else { k };

    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();

    for _ in 0..samples {
        let idx = rng.gen_range(0..np);
        let [x, y, z] = source.point_coords(idx);
        let neighbors = index.find_k_nearest(&Point3f::new(x, y, z), k + 1);

        let end = last_rank.min(neighbors.len());
        let mut sum = 0.0f32;
        for &(_, sqr_dist) in neighbors.iter().take(end).skip(1) {
            sum += sqr_dist.sqrt();
        }
        if k > 0 {
            sum /= k as f32;
        }

        let bucket = (sum * BUCKETS_PER_UNIT).ceil() as usize;
        *histogram.entry(bucket).or_insert(0) += 1;
    }

    // Ascending iteration with a strict comparison keeps the smallest bucket on ties
    let mut best_bucket = 0;
    let mut best_count = 0;
    for (&bucket, &count) in &histogram {
        if count > best_count {
            best_bucket = bucket;
            best_count = count;
        }
    }

    let spacing = (best_bucket as f64 / BUCKETS_PER_UNIT as f64).max(MIN_SPACING);
    debug!(
        samples,
        neighbors = k,
        buckets = histogram.len(),
        spacing,
        "Estimated point spacing"
    );
    Ok(spacing)
}

fn empty_set_error() -> Error {
    Error::Algorithm("cannot estimate the spacing of an empty point set".to_string())
}
