//! # pointclass
//!
//! Point set I/O and density statistics for point cloud classification
//! pipelines.
//!
//! This is the umbrella crate that provides convenient access to all pointclass
//! functionality. You can use this crate to get everything in one place, or use
//! individual crates for more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: the point set model, canonical label tables and capability traits
//! - **Algorithms**: kd-tree nearest neighbor search and spacing estimation
//! - **I/O**: PLY reading and writing, sidecar class mappings, label remapping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pointclass::prelude::*;
//!
//! # fn main() -> pointclass::Result<()> {
//! let set = read_point_set("scan.ply")?;
//! println!("{} points, spacing {}", set.count(), set.spacing()?);
//! write_point_set(&set, "scan_copy.ply")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms and io
//! - `algorithms`: Spatial index and spacing estimation
//! - `io`: PLY support and label remapping
//! - `pasture`: LAS/LAZ reading through pasture
//! - `all`: Enables all features

// Re-export core functionality
pub use pointclass_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use pointclass_algorithms as algorithms;

#[cfg(feature = "io")]
pub use pointclass_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use pointclass_core::*;

    #[cfg(feature = "algorithms")]
    pub use pointclass_algorithms::*;

    #[cfg(feature = "io")]
    pub use pointclass_io::*;
}
