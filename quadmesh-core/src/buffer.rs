//! Mesh buffer consumed and produced by decimation algorithms
//!
//! Positions are the authoritative attribute. Every other per-vertex
//! attribute is an optional parallel array with exactly one entry per vertex.
//! Triangles are stored per sub-mesh as flat index lists.

use crate::bone_weight::BoneWeight;
use crate::error::{Error, Result};
use crate::point::*;
use crate::uv::{UvChannel, UV_CHANNEL_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A triangle mesh split into sub-meshes sharing one vertex pool
///
/// Deserialization runs the same checks as the constructors and setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeshBuffer")]
pub struct MeshBuffer {
    pub(crate) vertices: Vec<Point3d>,
    pub(crate) indices: Vec<Vec<u32>>,
    pub(crate) normals: Option<Vec<Vector3f>>,
    pub(crate) tangents: Option<Vec<Vector4f>>,
    pub(crate) uvs: [UvChannel; UV_CHANNEL_COUNT],
    colors: Option<Vec<Vector4f>>,
    bone_weights: Option<Vec<BoneWeight>>,
}

/// Unchecked serialized form of [`MeshBuffer`]
#[derive(Deserialize)]
struct RawMeshBuffer {
    vertices: Vec<Point3d>,
    indices: Vec<Vec<u32>>,
    #[serde(default)]
    normals: Option<Vec<Vector3f>>,
    #[serde(default)]
    tangents: Option<Vec<Vector4f>>,
    #[serde(default)]
    uvs: [UvChannel; UV_CHANNEL_COUNT],
    #[serde(default)]
    colors: Option<Vec<Vector4f>>,
    #[serde(default)]
    bone_weights: Option<Vec<BoneWeight>>,
}

impl TryFrom<RawMeshBuffer> for MeshBuffer {
    type Error = Error;

    fn try_from(raw: RawMeshBuffer) -> Result<Self> {
        let mut mesh = MeshBuffer::with_sub_meshes(raw.vertices, raw.indices)?;
        mesh.set_normals(raw.normals)?;
        mesh.set_tangents(raw.tangents)?;
        mesh.set_colors(raw.colors)?;
        mesh.set_bone_weights(raw.bone_weights)?;
        for (channel, uvs) in raw.uvs.into_iter().enumerate() {
            mesh.set_uvs(channel, uvs)?;
        }
        Ok(mesh)
    }
}

impl MeshBuffer {
    /// Create a mesh with a single sub-mesh
    pub fn new(vertices: Vec<Point3d>, indices: Vec<u32>) -> Result<Self> {
        check_index_count(&indices, None)?;
        Ok(Self::from_parts(vertices, vec![indices]))
    }

    /// Create a mesh with one index list per sub-mesh
    pub fn with_sub_meshes(vertices: Vec<Point3d>, indices: Vec<Vec<u32>>) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::InvalidSubMeshCount(0));
        }
        for (sub_mesh, group) in indices.iter().enumerate() {
            check_index_count(group, Some(sub_mesh))?;
        }
        Ok(Self::from_parts(vertices, indices))
    }

    fn from_parts(vertices: Vec<Point3d>, indices: Vec<Vec<u32>>) -> Self {
        Self {
            vertices,
            indices,
            normals: None,
            tangents: None,
            uvs: Default::default(),
            colors: None,
            bone_weights: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of sub-meshes
    pub fn sub_mesh_count(&self) -> usize {
        self.indices.len()
    }

    /// Resize the sub-mesh list. New sub-meshes start without triangles,
    /// shrinking drops the trailing sub-meshes.
    pub fn set_sub_mesh_count(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidSubMeshCount(count));
        }
        self.indices.resize_with(count, Vec::new);
        Ok(())
    }

    /// Total number of triangles across all sub-meshes
    pub fn triangle_count(&self) -> usize {
        self.indices.iter().map(|group| group.len() / 3).sum()
    }

    pub fn vertices(&self) -> &[Point3d] {
        &self.vertices
    }

    /// Replace the vertex positions.
    ///
    /// Normals, tangents, texture coordinates, colors and bone weights are
    /// cleared since they no longer correspond to the new geometry.
    pub fn set_vertices(&mut self, vertices: Vec<Point3d>) {
        self.vertices = vertices;
        self.clear_vertex_attributes();
    }

    fn clear_vertex_attributes(&mut self) {
        self.normals = None;
        self.tangents = None;
        self.uvs = Default::default();
        self.colors = None;
        self.bone_weights = None;
    }

    /// All indices of all sub-meshes, concatenated in sub-mesh order
    pub fn indices(&self) -> Vec<u32> {
        self.indices.concat()
    }

    /// Replace all triangles with a single sub-mesh
    pub fn set_indices(&mut self, indices: Vec<u32>) -> Result<()> {
        check_index_count(&indices, None)?;
        self.indices = vec![indices];
        Ok(())
    }

    /// Number of triangles in one sub-mesh
    pub fn sub_mesh_triangle_count(&self, sub_mesh: usize) -> Result<usize> {
        Ok(self.sub_mesh_indices(sub_mesh)?.len() / 3)
    }

    pub fn sub_mesh_indices(&self, sub_mesh: usize) -> Result<&[u32]> {
        self.check_sub_mesh(sub_mesh)?;
        Ok(&self.indices[sub_mesh])
    }

    pub fn set_sub_mesh_indices(&mut self, sub_mesh: usize, indices: Vec<u32>) -> Result<()> {
        self.check_sub_mesh(sub_mesh)?;
        check_index_count(&indices, Some(sub_mesh))?;
        self.indices[sub_mesh] = indices;
        Ok(())
    }

    /// Index lists of every sub-mesh
    pub fn all_sub_mesh_indices(&self) -> &[Vec<u32>] {
        &self.indices
    }

    fn check_sub_mesh(&self, sub_mesh: usize) -> Result<()> {
        if sub_mesh >= self.indices.len() {
            return Err(Error::SubMeshOutOfRange {
                index: sub_mesh,
                count: self.indices.len(),
            });
        }
        Ok(())
    }

    /// Check that every index refers to an existing vertex
    pub fn validate_indices(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        match self
            .indices
            .iter()
            .flatten()
            .find(|&&index| index as usize >= vertex_count)
        {
            Some(&index) => Err(Error::IndexOutOfBounds { index, vertex_count }),
            None => Ok(()),
        }
    }

    /// Check every buffer invariant: index counts, index bounds and
    /// attribute lengths
    pub fn validate(&self) -> Result<()> {
        if self.indices.is_empty() {
            return Err(Error::InvalidSubMeshCount(0));
        }
        for (sub_mesh, group) in self.indices.iter().enumerate() {
            check_index_count(group, Some(sub_mesh))?;
        }
        self.validate_indices()?;

        self.check_attribute("normals", self.normals.as_deref())?;
        self.check_attribute("tangents", self.tangents.as_deref())?;
        self.check_attribute("colors", self.colors.as_deref())?;
        self.check_attribute("bone weights", self.bone_weights.as_deref())?;
        for channel in &self.uvs {
            if !channel.is_empty() && channel.len() != self.vertices.len() {
                return Err(Error::AttributeLength {
                    attribute: "UVs",
                    assigned: channel.len(),
                    required: self.vertices.len(),
                });
            }
        }
        Ok(())
    }

    pub fn normals(&self) -> Option<&[Vector3f]> {
        self.normals.as_deref()
    }

    pub fn set_normals(&mut self, normals: Option<Vec<Vector3f>>) -> Result<()> {
        self.check_attribute("normals", normals.as_deref())?;
        self.normals = normals;
        Ok(())
    }

    pub fn tangents(&self) -> Option<&[Vector4f]> {
        self.tangents.as_deref()
    }

    pub fn set_tangents(&mut self, tangents: Option<Vec<Vector4f>>) -> Result<()> {
        self.check_attribute("tangents", tangents.as_deref())?;
        self.tangents = tangents;
        Ok(())
    }

    pub fn colors(&self) -> Option<&[Vector4f]> {
        self.colors.as_deref()
    }

    pub fn set_colors(&mut self, colors: Option<Vec<Vector4f>>) -> Result<()> {
        self.check_attribute("colors", colors.as_deref())?;
        self.colors = colors;
        Ok(())
    }

    pub fn bone_weights(&self) -> Option<&[BoneWeight]> {
        self.bone_weights.as_deref()
    }

    pub fn set_bone_weights(&mut self, bone_weights: Option<Vec<BoneWeight>>) -> Result<()> {
        self.check_attribute("bone weights", bone_weights.as_deref())?;
        self.bone_weights = bone_weights;
        Ok(())
    }

    fn check_attribute<T>(&self, attribute: &'static str, values: Option<&[T]>) -> Result<()> {
        match values {
            Some(values) if values.len() != self.vertices.len() => Err(Error::AttributeLength {
                attribute,
                assigned: values.len(),
                required: self.vertices.len(),
            }),
            _ => Ok(()),
        }
    }

    // ---- Texture coordinates ----

    pub fn uv1(&self) -> Option<&[Vector2f]> {
        self.uvs[0].as_2d()
    }

    pub fn set_uv1(&mut self, uvs: Vec<Vector2f>) -> Result<()> {
        self.set_uvs_2d(0, uvs)
    }

    pub fn uv2(&self) -> Option<&[Vector2f]> {
        self.uvs[1].as_2d()
    }

    pub fn set_uv2(&mut self, uvs: Vec<Vector2f>) -> Result<()> {
        self.set_uvs_2d(1, uvs)
    }

    pub fn uv3(&self) -> Option<&[Vector2f]> {
        self.uvs[2].as_2d()
    }

    pub fn set_uv3(&mut self, uvs: Vec<Vector2f>) -> Result<()> {
        self.set_uvs_2d(2, uvs)
    }

    pub fn uv4(&self) -> Option<&[Vector2f]> {
        self.uvs[3].as_2d()
    }

    pub fn set_uv4(&mut self, uvs: Vec<Vector2f>) -> Result<()> {
        self.set_uvs_2d(3, uvs)
    }

    /// Components per coordinate in a channel (2, 3 or 4), or 0 when unset
    pub fn uv_dimension(&self, channel: usize) -> Result<usize> {
        Ok(self.uv_channel(channel)?.dimension())
    }

    pub fn uv_channel(&self, channel: usize) -> Result<&UvChannel> {
        check_uv_channel(channel)?;
        Ok(&self.uvs[channel])
    }

    pub fn uvs_2d(&self, channel: usize) -> Result<Option<&[Vector2f]>> {
        Ok(self.uv_channel(channel)?.as_2d())
    }

    pub fn uvs_3d(&self, channel: usize) -> Result<Option<&[Vector3f]>> {
        Ok(self.uv_channel(channel)?.as_3d())
    }

    pub fn uvs_4d(&self, channel: usize) -> Result<Option<&[Vector4f]>> {
        Ok(self.uv_channel(channel)?.as_4d())
    }

    /// Clear `out` and fill it with the 2D coordinates of a channel
    pub fn copy_uvs_2d(&self, channel: usize, out: &mut Vec<Vector2f>) -> Result<()> {
        out.clear();
        out.extend_from_slice(self.uvs_2d(channel)?.unwrap_or_default());
        Ok(())
    }

    /// Clear `out` and fill it with the 3D coordinates of a channel
    pub fn copy_uvs_3d(&self, channel: usize, out: &mut Vec<Vector3f>) -> Result<()> {
        out.clear();
        out.extend_from_slice(self.uvs_3d(channel)?.unwrap_or_default());
        Ok(())
    }

    /// Clear `out` and fill it with the 4D coordinates of a channel
    pub fn copy_uvs_4d(&self, channel: usize, out: &mut Vec<Vector4f>) -> Result<()> {
        out.clear();
        out.extend_from_slice(self.uvs_4d(channel)?.unwrap_or_default());
        Ok(())
    }

    /// Replace a texture coordinate channel.
    ///
    /// The channel holds a single dimensionality, so any coordinates of a
    /// different dimensionality previously stored there are dropped. An
    /// empty channel clears it.
    pub fn set_uvs(&mut self, channel: usize, uvs: UvChannel) -> Result<()> {
        check_uv_channel(channel)?;
        if !uvs.is_empty() && uvs.len() != self.vertices.len() {
            return Err(Error::AttributeLength {
                attribute: "UVs",
                assigned: uvs.len(),
                required: self.vertices.len(),
            });
        }
        self.uvs[channel] = if uvs.is_empty() { UvChannel::Empty } else { uvs };
        Ok(())
    }

    pub fn set_uvs_2d(&mut self, channel: usize, uvs: impl Into<Vec<Vector2f>>) -> Result<()> {
        self.set_uvs(channel, UvChannel::from(uvs.into()))
    }

    pub fn set_uvs_3d(&mut self, channel: usize, uvs: impl Into<Vec<Vector3f>>) -> Result<()> {
        self.set_uvs(channel, UvChannel::from(uvs.into()))
    }

    pub fn set_uvs_4d(&mut self, channel: usize, uvs: impl Into<Vec<Vector4f>>) -> Result<()> {
        self.set_uvs(channel, UvChannel::from(uvs.into()))
    }

    /// All texture coordinate channels
    pub fn uv_channels(&self) -> &[UvChannel; UV_CHANNEL_COUNT] {
        &self.uvs
    }
}

impl fmt::Display for MeshBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vertices: {}, Triangles: {}, Sub-meshes: {}",
            self.vertex_count(),
            self.triangle_count(),
            self.sub_mesh_count()
        )
    }
}

fn check_index_count(indices: &[u32], sub_mesh: Option<usize>) -> Result<()> {
    if indices.len() % 3 != 0 {
        return Err(Error::InvalidIndexCount {
            count: indices.len(),
            sub_mesh,
        });
    }
    Ok(())
}

fn check_uv_channel(channel: usize) -> Result<()> {
    if channel >= UV_CHANNEL_COUNT {
        return Err(Error::UvChannelOutOfRange(channel));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_two_triangles() -> MeshBuffer {
        MeshBuffer::with_sub_meshes(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
                Point3d::new(0.0, 0.0, 1.0),
                Point3d::new(1.0, 0.0, 1.0),
                Point3d::new(0.0, 1.0, 1.0),
            ],
            vec![vec![0, 1, 2], vec![3, 4, 5]],
        )
        .unwrap()
    }

    fn uvs_2d(count: usize) -> Vec<Vector2f> {
        (0..count).map(|i| Vector2f::new(i as f32, 0.0)).collect()
    }

    // ---- Construction tests ----

    #[test]
    fn test_single_sub_mesh() {
        let mesh = MeshBuffer::new(
            vec![Point3d::origin(), Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0)],
            vec![0, 1, 2],
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.sub_mesh_count(), 1);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_invalid_index_count() {
        let err = MeshBuffer::new(vec![Point3d::origin(); 3], vec![0, 1]).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err, Error::InvalidIndexCount { count: 2, sub_mesh: None });

        let err = MeshBuffer::with_sub_meshes(vec![Point3d::origin(); 3], vec![vec![0, 1, 2], vec![0]])
            .unwrap_err();
        assert_eq!(err, Error::InvalidIndexCount { count: 1, sub_mesh: Some(1) });
    }

    #[test]
    fn test_no_sub_meshes_rejected() {
        let err = MeshBuffer::with_sub_meshes(vec![Point3d::origin()], vec![]).unwrap_err();
        assert_eq!(err, Error::InvalidSubMeshCount(0));
    }

    #[test]
    fn test_display() {
        let mesh = make_two_triangles();
        assert_eq!(mesh.to_string(), "Vertices: 6, Triangles: 2, Sub-meshes: 2");
    }

    // ---- Index tests ----

    #[test]
    fn test_indices_concatenate_sub_meshes() {
        let mesh = make_two_triangles();
        assert_eq!(mesh.indices(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_set_indices_collapses_sub_meshes() {
        let mut mesh = make_two_triangles();
        mesh.set_indices(vec![0, 1, 2]).unwrap();
        assert_eq!(mesh.sub_mesh_count(), 1);
        assert_eq!(mesh.triangle_count(), 1);

        assert!(mesh.set_indices(vec![0, 1, 2, 3]).is_err());
        assert_eq!(mesh.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_sub_mesh_count_resize() {
        let mut mesh = make_two_triangles();
        mesh.set_sub_mesh_count(4).unwrap();
        assert_eq!(mesh.sub_mesh_count(), 4);
        assert_eq!(mesh.sub_mesh_triangle_count(3).unwrap(), 0);
        assert_eq!(mesh.triangle_count(), 2);

        mesh.set_sub_mesh_count(1).unwrap();
        assert_eq!(mesh.indices(), vec![0, 1, 2]);

        let err = mesh.set_sub_mesh_count(0).unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(mesh.sub_mesh_count(), 1);
    }

    #[test]
    fn test_sub_mesh_access() {
        let mut mesh = make_two_triangles();
        assert_eq!(mesh.sub_mesh_indices(1).unwrap(), &[3, 4, 5]);
        assert_eq!(
            mesh.sub_mesh_indices(2).unwrap_err(),
            Error::SubMeshOutOfRange { index: 2, count: 2 }
        );
        assert!(mesh.sub_mesh_triangle_count(5).is_err());

        mesh.set_sub_mesh_indices(0, vec![0, 1, 2, 2, 1, 0]).unwrap();
        assert_eq!(mesh.sub_mesh_triangle_count(0).unwrap(), 2);
        assert!(mesh.set_sub_mesh_indices(0, vec![0, 1]).is_err());
        assert!(mesh.set_sub_mesh_indices(2, vec![0, 1, 2]).is_err());
        assert_eq!(mesh.all_sub_mesh_indices().len(), 2);
    }

    #[test]
    fn test_validate_indices() {
        let mesh = MeshBuffer::new(vec![Point3d::origin(); 3], vec![0, 1, 3]).unwrap();
        assert_eq!(
            mesh.validate_indices().unwrap_err(),
            Error::IndexOutOfBounds { index: 3, vertex_count: 3 }
        );
        assert!(make_two_triangles().validate_indices().is_ok());
    }

    // ---- Attribute tests ----

    #[test]
    fn test_attribute_length_mismatch() {
        let mut mesh = make_two_triangles();
        let err = mesh.set_normals(Some(vec![Vector3f::z(); 5])).unwrap_err();
        assert_eq!(
            err,
            Error::AttributeLength { attribute: "normals", assigned: 5, required: 6 }
        );
        assert!(mesh.normals().is_none());

        assert!(mesh.set_tangents(Some(vec![Vector4f::x(); 2])).is_err());
        assert!(mesh.set_colors(Some(vec![Vector4f::zeros(); 7])).is_err());
        assert!(mesh.set_bone_weights(Some(vec![BoneWeight::default(); 1])).is_err());
    }

    #[test]
    fn test_clearing_attribute() {
        let mut mesh = make_two_triangles();
        mesh.set_colors(Some(vec![Vector4f::repeat(1.0); 6])).unwrap();
        assert_eq!(mesh.colors().unwrap().len(), 6);
        mesh.set_colors(None).unwrap();
        assert!(mesh.colors().is_none());
    }

    #[test]
    fn test_set_vertices_clears_attributes() {
        let mut mesh = make_two_triangles();
        mesh.set_normals(Some(vec![Vector3f::z(); 6])).unwrap();
        mesh.set_tangents(Some(vec![Vector4f::x(); 6])).unwrap();
        mesh.set_colors(Some(vec![Vector4f::repeat(1.0); 6])).unwrap();
        mesh.set_bone_weights(Some(vec![BoneWeight::single(0); 6])).unwrap();
        mesh.set_uv1(uvs_2d(6)).unwrap();
        mesh.set_uvs_3d(1, vec![Vector3f::zeros(); 6]).unwrap();
        mesh.set_uvs_4d(2, vec![Vector4f::zeros(); 6]).unwrap();

        mesh.set_vertices(vec![Point3d::origin(); 6]);

        assert!(mesh.normals().is_none());
        assert!(mesh.tangents().is_none());
        assert!(mesh.colors().is_none());
        assert!(mesh.bone_weights().is_none());
        for channel in 0..UV_CHANNEL_COUNT {
            assert_eq!(mesh.uv_dimension(channel).unwrap(), 0);
        }
        assert_eq!(mesh.triangle_count(), 2);
    }

    // ---- UV tests ----

    #[test]
    fn test_uv_dimension_exclusive() {
        let mut mesh = make_two_triangles();
        mesh.set_uvs_2d(0, uvs_2d(6)).unwrap();
        assert_eq!(mesh.uv_dimension(0).unwrap(), 2);

        mesh.set_uvs_3d(0, vec![Vector3f::zeros(); 6]).unwrap();
        assert_eq!(mesh.uv_dimension(0).unwrap(), 3);
        assert!(mesh.uvs_2d(0).unwrap().is_none());
        assert!(mesh.uvs_3d(0).unwrap().is_some());

        mesh.set_uvs_4d(0, vec![Vector4f::zeros(); 6]).unwrap();
        assert_eq!(mesh.uv_dimension(0).unwrap(), 4);
        assert!(mesh.uvs_3d(0).unwrap().is_none());
    }

    #[test]
    fn test_uv_channels_are_independent() {
        let mut mesh = make_two_triangles();
        mesh.set_uv1(uvs_2d(6)).unwrap();
        mesh.set_uvs_3d(1, vec![Vector3f::zeros(); 6]).unwrap();
        assert_eq!(mesh.uv_dimension(0).unwrap(), 2);
        assert_eq!(mesh.uv_dimension(1).unwrap(), 3);
        assert!(mesh.uv2().is_none());
        assert!(mesh.uv1().is_some());
    }

    #[test]
    fn test_empty_uvs_clear_channel() {
        let mut mesh = make_two_triangles();
        mesh.set_uv2(uvs_2d(6)).unwrap();
        mesh.set_uvs_4d(1, Vec::new()).unwrap();
        assert_eq!(mesh.uv_dimension(1).unwrap(), 0);
    }

    #[test]
    fn test_uv_channel_out_of_range() {
        let mut mesh = make_two_triangles();
        assert_eq!(mesh.uv_dimension(4).unwrap_err(), Error::UvChannelOutOfRange(4));
        assert!(mesh.uvs_2d(4).is_err());
        assert!(mesh.set_uvs_2d(4, uvs_2d(6)).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_uv_length_mismatch() {
        let mut mesh = make_two_triangles();
        let err = mesh.set_uv3(uvs_2d(2)).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(mesh.uv_dimension(2).unwrap(), 0);
    }

    #[test]
    fn test_copy_uvs_into_list() {
        let mut mesh = make_two_triangles();
        mesh.set_uv4(uvs_2d(6)).unwrap();

        let mut out = vec![Vector2f::repeat(9.0)];
        mesh.copy_uvs_2d(3, &mut out).unwrap();
        assert_eq!(out, uvs_2d(6));

        let mut out3 = vec![Vector3f::zeros()];
        mesh.copy_uvs_3d(3, &mut out3).unwrap();
        assert!(out3.is_empty());

        let mut out4 = Vec::new();
        assert!(mesh.copy_uvs_4d(7, &mut out4).is_err());
    }

    #[test]
    fn test_set_uvs_from_slice() {
        let mut mesh = make_two_triangles();
        let uvs = [Vector2f::zeros(); 6];
        mesh.set_uvs_2d(0, &uvs[..]).unwrap();
        assert_eq!(mesh.uv1().unwrap().len(), 6);
    }

    // ---- Serialization tests ----

    fn make_json_with_normals() -> serde_json::Value {
        let mut mesh = make_two_triangles();
        mesh.set_normals(Some(vec![Vector3f::z(); 6])).unwrap();
        mesh.set_uv1(uvs_2d(6)).unwrap();
        serde_json::to_value(&mesh).unwrap()
    }

    #[test]
    fn test_deserialize_round_trip() {
        let json = make_json_with_normals();
        let mesh: MeshBuffer = serde_json::from_value(json).unwrap();
        assert_eq!(mesh.normals().unwrap().len(), 6);
        assert_eq!(mesh.uv_dimension(0).unwrap(), 2);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_deserialize_rejects_short_attribute() {
        let mut json = make_json_with_normals();
        json["normals"].as_array_mut().unwrap().truncate(2);

        let err = serde_json::from_value::<MeshBuffer>(json).unwrap_err();
        assert!(err.to_string().contains("normals"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_bad_index_count() {
        let mut json = make_json_with_normals();
        json["indices"][1].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<MeshBuffer>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_missing_sub_meshes() {
        let mut json = make_json_with_normals();
        json["indices"] = serde_json::json!([]);
        assert!(serde_json::from_value::<MeshBuffer>(json).is_err());
    }

    #[test]
    fn test_validate_checks_every_invariant() {
        let mut mesh = make_two_triangles();
        mesh.validate().unwrap();

        mesh.colors = Some(vec![Vector4f::zeros(); 5]);
        assert!(matches!(mesh.validate(), Err(Error::AttributeLength { attribute: "colors", .. })));

        mesh.colors = None;
        mesh.uvs[3] = UvChannel::Uv3(vec![Vector3f::zeros(); 2]);
        assert!(matches!(mesh.validate(), Err(Error::AttributeLength { attribute: "UVs", .. })));

        mesh.uvs[3] = UvChannel::Empty;
        mesh.indices[0].push(0);
        assert!(matches!(mesh.validate(), Err(Error::InvalidIndexCount { sub_mesh: Some(0), .. })));
    }
}
