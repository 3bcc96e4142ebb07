//! Point set data structure and functionality

use crate::error::{Error, Result};
use crate::point::{Color, Point3f, Vector3f};
use crate::traits::{NearestNeighborSearch, SpatialSource};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;

/// A point cloud with optional per-point attributes
///
/// `points` is always present and defines [`PointSet::count`]. Every other
/// attribute is either empty or holds exactly one entry per point. Colors are
/// always stored as `[red, green, blue]`, and labels hold training codes once a
/// reader has returned the set.
///
/// The spatial index and the spacing estimate are computed on first use and
/// kept for the lifetime of the set. Mutating `points` afterwards does not
/// invalidate them; build a new set instead.
#[derive(Serialize, Deserialize, Default)]
pub struct PointSet {
    pub points: Vec<Point3f>,
    pub colors: Vec<Color>,
    pub normals: Vec<Vector3f>,
    pub views: Vec<u8>,
    pub labels: Vec<u8>,

    #[serde(skip)]
    index: OnceCell<Box<dyn NearestNeighborSearch>>,
    #[serde(skip)]
    spacing: OnceCell<f64>,
}

impl PointSet {
    /// Create a new empty point set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new point set with room for `capacity` positions
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Create a point set holding only positions
    pub fn from_points(points: Vec<Point3f>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Number of points in the set
    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    pub fn has_views(&self) -> bool {
        !self.views.is_empty()
    }

    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Check that every non-empty attribute has one entry per point
    pub fn validate(&self) -> Result<()> {
        let count = self.count();
        let lengths = [
            ("colors", self.colors.len()),
            ("normals", self.normals.len()),
            ("views", self.views.len()),
            ("labels", self.labels.len()),
        ];

        for (name, len) in lengths {
            if len != 0 && len != count {
                return Err(Error::invalid_data(format!(
                    "{} has {} entries but the set has {} points",
                    name, len, count
                )));
            }
        }

        Ok(())
    }

    /// Copy the point at `idx` of `src`, with every attribute `src` carries,
    /// to the end of this set. Returns the index of the copied point.
    ///
    /// An empty set takes the attribute layout of `src`; a non-empty one
    /// must already carry exactly the same attributes.
    pub fn append_point(&mut self, src: &PointSet, idx: usize) -> Result<usize> {
        if idx >= src.count() {
            return Err(Error::invalid_data(format!(
                "index {} out of range for a set of {} points",
                idx,
                src.count()
            )));
        }
        if !self.is_empty() && !self.same_layout(src) {
            return Err(Error::invalid_data(
                "cannot append a point whose attribute layout differs from the target set",
            ));
        }

        self.points.push(src.points[idx]);
        if src.has_colors() {
            self.colors.push(src.colors[idx]);
        }
        if src.has_normals() {
            self.normals.push(src.normals[idx]);
        }
        if src.has_views() {
            self.views.push(src.views[idx]);
        }
        if src.has_labels() {
            self.labels.push(src.labels[idx]);
        }
        Ok(self.points.len() - 1)
    }

    fn same_layout(&self, other: &PointSet) -> bool {
        self.has_normals() == other.has_normals()
            && self.has_colors() == other.has_colors()
            && self.has_views() == other.has_views()
            && self.has_labels() == other.has_labels()
    }

    /// Build a new set from the points at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Result<PointSet> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.count()) {
            return Err(Error::invalid_data(format!(
                "index {} out of range for a set of {} points",
                bad,
                self.count()
            )));
        }

        let mut out = PointSet::with_capacity(indices.len());
        for &idx in indices {
            out.append_point(self, idx)?;
        }
        Ok(out)
    }

    /// Return the spatial index, building it with `build` if it does not exist yet
    pub fn index_or_build<F>(&self, build: F) -> &dyn NearestNeighborSearch
    where
        F: FnOnce(&PointSet) -> Box<dyn NearestNeighborSearch>,
    {
        self.index.get_or_init(|| build(self)).as_ref()
    }

    pub fn has_index(&self) -> bool {
        self.index.get().is_some()
    }

    /// The memoized spacing estimate, if one has been computed
    pub fn cached_spacing(&self) -> Option<f64> {
        self.spacing.get().copied()
    }

    /// Return the memoized spacing, computing it with `estimate` on first use
    ///
    /// A failed estimate is not cached.
    pub fn spacing_or_try_init<F>(&self, estimate: F) -> Result<f64>
    where
        F: FnOnce(&PointSet) -> Result<f64>,
    {
        if let Some(spacing) = self.spacing.get() {
            return Ok(*spacing);
        }
        let value = estimate(self)?;
        Ok(*self.spacing.get_or_init(|| value))
    }
}

impl SpatialSource for PointSet {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn point_coords(&self, idx: usize) -> [f32; 3] {
        let p = &self.points[idx];
        [p.x, p.y, p.z]
    }
}

impl Clone for PointSet {
    /// Clones the attributes and the cached spacing. The spatial index is
    /// rebuilt lazily by the clone.
    fn clone(&self) -> Self {
        let spacing = OnceCell::new();
        if let Some(value) = self.spacing.get() {
            let _ = spacing.set(*value);
        }

        Self {
            points: self.points.clone(),
            colors: self.colors.clone(),
            normals: self.normals.clone(),
            views: self.views.clone(),
            labels: self.labels.clone(),
            index: OnceCell::new(),
            spacing,
        }
    }
}

impl PartialEq for PointSet {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
            && self.colors == other.colors
            && self.normals == other.normals
            && self.views == other.views
            && self.labels == other.labels
    }
}

impl fmt::Debug for PointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointSet")
            .field("count", &self.count())
            .field("has_colors", &self.has_colors())
            .field("has_normals", &self.has_normals())
            .field("has_views", &self.has_views())
            .field("has_labels", &self.has_labels())
            .field("has_index", &self.has_index())
            .field("spacing", &self.cached_spacing())
            .finish()
    }
}
