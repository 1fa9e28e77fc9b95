//! Skinning weights attached to vertices

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Up to four bone influences for a single vertex
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct BoneWeight {
    pub bone_indices: [u32; 4],
    pub weights: [f32; 4],
}

impl BoneWeight {
    /// Create a bone weight from explicit indices and weights
    pub fn new(bone_indices: [u32; 4], weights: [f32; 4]) -> Self {
        Self { bone_indices, weights }
    }

    /// A vertex fully bound to a single bone
    pub fn single(bone_index: u32) -> Self {
        Self {
            bone_indices: [bone_index, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Sum of all four weights
    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_bone() {
        let w = BoneWeight::single(7);
        assert_eq!(w.bone_indices[0], 7);
        assert_relative_eq!(w.total_weight(), 1.0);
    }

    #[test]
    fn test_pod_layout() {
        let w = BoneWeight::new([1, 2, 3, 4], [0.25; 4]);
        let bytes: &[u8] = bytemuck::bytes_of(&w);
        assert_eq!(bytes.len(), 32);
    }
}
