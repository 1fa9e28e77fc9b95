//! The contract every decimation algorithm implements

use crate::options::DecimationOptions;
use crate::status::StatusCallback;
use quadmesh_core::{Error, MeshBuffer, Result};
use std::fmt;

/// Where an algorithm instance is in its initialize/decimate/extract cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlgorithmState {
    #[default]
    Uninitialized,
    Initialized,
    Decimated,
    Extracted,
}

impl AlgorithmState {
    /// Fail with [`Error::InvalidState`] unless the state is one of `allowed`
    pub fn require(self, operation: &'static str, allowed: &[AlgorithmState]) -> Result<()> {
        if allowed.contains(&self) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.to_string(),
            })
        }
    }
}

impl fmt::Display for AlgorithmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmState::Uninitialized => "uninitialized",
            AlgorithmState::Initialized => "initialized",
            AlgorithmState::Decimated => "decimated",
            AlgorithmState::Extracted => "extracted",
        };
        f.write_str(name)
    }
}

/// A mesh decimation algorithm.
///
/// An instance runs one mesh at a time: [`initialize`](Self::initialize)
/// loads the mesh, one of the decimation methods reduces it, and
/// [`to_mesh`](Self::to_mesh) extracts the result and discards the run.
/// Calling the steps out of order fails with [`Error::InvalidState`].
pub trait DecimationAlgorithm {
    fn options(&self) -> &DecimationOptions;

    fn options_mut(&mut self) -> &mut DecimationOptions;

    /// Install or remove the per-iteration status callback
    fn set_status_callback(&mut self, callback: Option<StatusCallback>);

    fn state(&self) -> AlgorithmState;

    /// Load a mesh, replacing any run in progress
    fn initialize(&mut self, mesh: &MeshBuffer) -> Result<()>;

    /// Reduce the loaded mesh towards `target_triangle_count` triangles
    fn decimate_mesh(&mut self, target_triangle_count: usize) -> Result<()>;

    /// Remove only triangles whose removal does not change the shape
    fn decimate_mesh_lossless(&mut self) -> Result<()>;

    /// Extract the decimated mesh
    fn to_mesh(&mut self) -> Result<MeshBuffer>;
}
