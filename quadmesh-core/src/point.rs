//! Point and vector types used by mesh buffers

use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// A 3D point with double precision coordinates, used for vertex positions
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A 2D vector with floating point components
pub type Vector2f = Vector2<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 4D vector with floating point components
pub type Vector4f = Vector4<f32>;
