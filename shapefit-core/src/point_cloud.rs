//! Point cloud container

use crate::error::{Error, Result};
use crate::point::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A generic point cloud container
///
/// Points are stored in insertion order but the cloud is interpreted as an
/// unordered collection: none of the algorithms in this workspace attach
/// meaning to point indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with double precision 3D points, the fitting input type
pub type PointCloud3d = PointCloud<Point3d>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<T> {
        self.points.iter()
    }

    /// View the points as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.points
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl<T> Extend<T> for PointCloud<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl PointCloud<Point3d> {
    /// Build a cloud from three equal-length coordinate slices
    ///
    /// This is the shape in which loaders hand over vertex data: one
    /// sequence per coordinate. The slices must have equal lengths.
    ///
    /// # Example
    /// ```rust
    /// use shapefit_core::PointCloud;
    ///
    /// let cloud = PointCloud::from_xyz(&[0.0, 1.0], &[0.0, 0.0], &[0.0, 2.0]).unwrap();
    /// assert_eq!(cloud.len(), 2);
    /// ```
    pub fn from_xyz(x: &[f64], y: &[f64], z: &[f64]) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(Error::InvalidData(format!(
                "coordinate slices must have equal lengths, got x: {}, y: {}, z: {}",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        let points = x
            .iter()
            .zip(y.iter())
            .zip(z.iter())
            .map(|((&px, &py), &pz)| Point3d::new(px, py, pz))
            .collect();
        Ok(Self { points })
    }

    /// Split the cloud back into per-coordinate vectors (x, y, z)
    pub fn xyz_vectors(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut x = Vec::with_capacity(self.points.len());
        let mut y = Vec::with_capacity(self.points.len());
        let mut z = Vec::with_capacity(self.points.len());
        for p in &self.points {
            x.push(p.x);
            y.push(p.y);
            z.push(p.z);
        }
        (x, y, z)
    }

    /// Arithmetic mean of the points
    ///
    /// Returns `None` for an empty cloud.
    pub fn centroid(&self) -> Option<Point3d> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Vector3d::zeros(), |acc, p| acc + p.coords);
        Some(Point3d::from(sum / self.points.len() as f64))
    }
}
