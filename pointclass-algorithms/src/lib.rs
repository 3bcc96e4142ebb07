//! # pointclass algorithms
//!
//! Spatial indexing and density statistics for point sets.
//!
//! - [`nearest_neighbor`]: kd-tree and brute force k-nearest-neighbor search
//! - [`spacing`]: histogram-mode point spacing estimation

pub mod nearest_neighbor;
pub mod spacing;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use spacing::*;
