//! Core data structures for quadmesh
//!
//! This crate provides the mesh buffer consumed and produced by the
//! decimation algorithms, its per-vertex attribute types, and recalculation
//! of smooth normals and tangents from triangle topology.

pub mod point;
pub mod bone_weight;
pub mod uv;
pub mod buffer;
pub mod recalculate;
pub mod error;

pub use point::*;
pub use bone_weight::*;
pub use uv::*;
pub use buffer::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector2, Vector3, Vector4};
