//! Core data structures and traits for pointclass
//!
//! This crate provides the in-memory point set model, the canonical
//! classification tables, and the capability traits shared by the I/O and
//! algorithm crates.

pub mod point;
pub mod point_set;
pub mod traits;
pub mod labels;
pub mod error;

pub use point::*;
pub use point_set::*;
pub use traits::*;
pub use labels::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
