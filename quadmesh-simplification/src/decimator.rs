//! One-call decimation entry points

use crate::algorithm::DecimationAlgorithm;
use crate::fast_quadric::FastQuadricMeshSimplification;
use quadmesh_core::{Error, MeshBuffer, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available decimation algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// The recommended algorithm, currently fast quadric mesh simplification
    #[default]
    Default,
    FastQuadricMesh,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Default => f.write_str("default"),
            Algorithm::FastQuadricMesh => f.write_str("fast-quadric-mesh"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "default" => Ok(Algorithm::Default),
            "fast-quadric-mesh" => Ok(Algorithm::FastQuadricMesh),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Create a fresh instance of an algorithm with default options
pub fn create_algorithm(algorithm: Algorithm) -> Box<dyn DecimationAlgorithm + Send> {
    match algorithm {
        Algorithm::Default | Algorithm::FastQuadricMesh => Box::new(FastQuadricMeshSimplification::new()),
    }
}

/// Decimate a mesh towards `target_triangle_count` triangles.
///
/// The target is clamped into `0..=mesh.triangle_count()`.
pub fn decimate_mesh(algorithm: Algorithm, mesh: &MeshBuffer, target_triangle_count: i64) -> Result<MeshBuffer> {
    let mut algorithm = create_algorithm(algorithm);
    decimate_mesh_with(algorithm.as_mut(), mesh, target_triangle_count)
}

/// Decimate a mesh with a caller-configured algorithm instance
pub fn decimate_mesh_with(
    algorithm: &mut dyn DecimationAlgorithm,
    mesh: &MeshBuffer,
    target_triangle_count: i64,
) -> Result<MeshBuffer> {
    let current = mesh.triangle_count();
    let target = usize::try_from(target_triangle_count.max(0))
        .unwrap_or(usize::MAX)
        .min(current);

    algorithm.initialize(mesh)?;
    algorithm.decimate_mesh(target)?;
    algorithm.to_mesh()
}

/// Remove only the triangles whose removal leaves the surface unchanged
pub fn decimate_mesh_lossless(algorithm: Algorithm, mesh: &MeshBuffer) -> Result<MeshBuffer> {
    let mut algorithm = create_algorithm(algorithm);
    decimate_mesh_lossless_with(algorithm.as_mut(), mesh)
}

pub fn decimate_mesh_lossless_with(algorithm: &mut dyn DecimationAlgorithm, mesh: &MeshBuffer) -> Result<MeshBuffer> {
    algorithm.initialize(mesh)?;
    algorithm.decimate_mesh_lossless()?;
    algorithm.to_mesh()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::AlgorithmState;
    use quadmesh_core::Point3d;

    fn make_quad() -> MeshBuffer {
        MeshBuffer::new(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(1.0, 1.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!("default".parse::<Algorithm>().unwrap(), Algorithm::Default);
        assert_eq!("Fast-Quadric-Mesh".parse::<Algorithm>().unwrap(), Algorithm::FastQuadricMesh);
        assert_eq!("fast_quadric_mesh".parse::<Algorithm>().unwrap(), Algorithm::FastQuadricMesh);
    }

    #[test]
    fn test_parse_unknown_algorithm() {
        let err = "edge-collapse".parse::<Algorithm>().unwrap_err();
        assert_eq!(err, Error::UnsupportedAlgorithm("edge-collapse".to_string()));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_display_parses_back() {
        for algorithm in [Algorithm::Default, Algorithm::FastQuadricMesh] {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_created_algorithm_is_fresh() {
        let algorithm = create_algorithm(Algorithm::Default);
        assert_eq!(algorithm.state(), AlgorithmState::Uninitialized);
        assert!(algorithm.options().enable_smart_link);
    }

    #[test]
    fn test_full_target_keeps_triangles() {
        let mesh = make_quad();
        let result = decimate_mesh(Algorithm::Default, &mesh, 2).unwrap();
        assert_eq!(result.triangle_count(), 2);
        assert_eq!(result.vertex_count(), 4);
    }

    #[test]
    fn test_decimate_with_reuses_instance() {
        let mesh = make_quad();
        let mut algorithm = FastQuadricMeshSimplification::new();
        let first = decimate_mesh_with(&mut algorithm, &mesh, 10).unwrap();
        let second = decimate_mesh_with(&mut algorithm, &mesh, 10).unwrap();
        assert_eq!(first, second);
        assert_eq!(algorithm.state(), AlgorithmState::Extracted);
    }
}
