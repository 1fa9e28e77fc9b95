//! Mesh decimation for quadmesh
//!
//! This crate reduces the triangle count of a [`MeshBuffer`](quadmesh_core::MeshBuffer)
//! while keeping its shape and per-vertex attributes:
//! - Fast quadric mesh simplification driven by an error threshold schedule
//! - Lossless decimation that only removes redundant triangles
//! - Smart linking of coincident border vertices along UV seams
//!
//! The [`decimator`] functions cover the common case:
//!
//! ```no_run
//! use quadmesh_simplification::{decimate_mesh, Algorithm};
//! # fn run(mesh: &quadmesh_core::MeshBuffer) -> quadmesh_core::Result<()> {
//! let half = decimate_mesh(Algorithm::Default, mesh, mesh.triangle_count() as i64 / 2)?;
//! # Ok(())
//! # }
//! ```

pub mod algorithm;
pub mod decimator;
pub mod fast_quadric;
pub mod options;
pub mod status;
pub mod symmetric_matrix;

pub use algorithm::*;
pub use decimator::*;
pub use fast_quadric::*;
pub use options::*;
pub use status::*;
pub use symmetric_matrix::*;
