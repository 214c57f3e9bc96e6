//! # shapefit
//!
//! Geometric primitive fitting for 3D point clouds.
//!
//! This is the umbrella crate that provides convenient access to the
//! shapefit workspace in one place; depend on the individual crates for
//! more granular control over dependencies.
//!
//! - **Core**: point cloud container, typed aliases, errors
//! - **Geometry**: plane and cone primitives with point-to-surface
//!   distances
//! - **Fitting**: constrained plane fit, cone distance-minimization fit,
//!   shape-proximity filters
//!
//! ## Quick Start
//!
//! ```rust
//! use shapefit::prelude::*;
//!
//! let cloud = PointCloud::from_points(vec![
//!     Point3d::new(0.0, 0.0, 1.0),
//!     Point3d::new(1.0, 0.0, 1.0),
//!     Point3d::new(0.0, 1.0, 1.0),
//!     Point3d::new(1.0, 1.0, 1.0),
//! ]);
//!
//! let result = fit_plane(&cloud).unwrap();
//! assert!(result.plane.c.abs() > 0.99);
//! ```

// Re-export core functionality
pub use shapefit_core::*;

// Re-export sub-crates
#[cfg(feature = "geometry")]
pub use shapefit_geometry as geometry;

#[cfg(feature = "fitting")]
pub use shapefit_fitting as fitting;

/// Convenient imports for common use cases
pub mod prelude {
    pub use shapefit_core::*;

    #[cfg(feature = "geometry")]
    pub use shapefit_geometry::*;

    #[cfg(feature = "fitting")]
    pub use shapefit_fitting::*;
}
