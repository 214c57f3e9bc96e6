//! Core data structures for shapefit
//!
//! This crate provides the fundamental types shared by the shapefit
//! workspace: typed point/vector aliases, the generic point cloud
//! container, the common error type, and a small set of shared traits.

pub mod error;
pub mod point;
pub mod point_cloud;
pub mod traits;

pub use error::*;
pub use point::*;
pub use point_cloud::*;
pub use traits::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
