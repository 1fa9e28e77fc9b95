//! Smooth normal and tangent recalculation from triangle topology

use crate::buffer::MeshBuffer;
use crate::error::Result;
use crate::point::*;
use itertools::Itertools;

/// Vectors shorter than this are left unnormalized
const ZERO_TOLERANCE: f32 = 1e-6;

fn normalize_or_keep(v: Vector3f) -> Vector3f {
    v.try_normalize(ZERO_TOLERANCE).unwrap_or(v)
}

fn triangles(indices: &[Vec<u32>]) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    indices
        .iter()
        .flat_map(|group| group.iter().tuples::<(_, _, _)>())
        .map(|(&i0, &i1, &i2)| (i0 as usize, i1 as usize, i2 as usize))
}

impl MeshBuffer {
    /// Recompute smooth vertex normals.
    ///
    /// Every triangle adds its unit face normal to its three vertices, then
    /// each vertex normal is normalized. Vertices not referenced by any
    /// triangle end up with a zero normal.
    pub fn recalculate_normals(&mut self) -> Result<()> {
        self.validate_indices()?;

        let positions: Vec<Vector3f> = self.vertices.iter().map(|p| p.coords.cast::<f32>()).collect();
        let mut normals = vec![Vector3f::zeros(); positions.len()];

        for (i0, i1, i2) in triangles(&self.indices) {
            let v0 = positions[i0];
            let edge1 = positions[i1] - v0;
            let edge2 = positions[i2] - v0;
            let normal = normalize_or_keep(edge1.cross(&edge2));

            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }

        for normal in &mut normals {
            *normal = normalize_or_keep(*normal);
        }

        self.normals = Some(normals);
        Ok(())
    }

    /// Recompute vertex tangents from the normals and the first UV channel.
    ///
    /// Does nothing when the mesh has no normals or no coordinates in UV
    /// channel 0. Triangles with a degenerate UV mapping (zero area in
    /// texture space) are skipped. The tangent `w` component holds the
    /// bitangent handedness, `1.0` or `-1.0`.
    pub fn recalculate_tangents(&mut self) -> Result<()> {
        let Some(normals) = self.normals.as_deref() else {
            return Ok(());
        };
        let uvs = &self.uvs[0];
        if uvs.is_empty() {
            return Ok(());
        }
        self.validate_indices()?;

        let vertex_count = self.vertices.len();
        let mut tan1 = vec![Vector3f::zeros(); vertex_count];
        let mut tan2 = vec![Vector3f::zeros(); vertex_count];

        for (i0, i1, i2) in triangles(&self.indices) {
            let (Some(w0), Some(w1), Some(w2)) = (uvs.st(i0), uvs.st(i1), uvs.st(i2)) else {
                continue;
            };
            let s1 = w1.0 - w0.0;
            let s2 = w2.0 - w0.0;
            let t1 = w1.1 - w0.1;
            let t2 = w2.1 - w0.1;

            let r = 1.0 / (s1 * t2 - s2 * t1);
            if !r.is_finite() {
                continue;
            }

            let v0 = self.vertices[i0];
            let e1 = (self.vertices[i1] - v0).cast::<f32>();
            let e2 = (self.vertices[i2] - v0).cast::<f32>();

            let sdir = (e1 * t2 - e2 * t1) * r;
            let tdir = (e2 * s1 - e1 * s2) * r;

            for i in [i0, i1, i2] {
                tan1[i] += sdir;
                tan2[i] += tdir;
            }
        }

        let tangents = normals
            .iter()
            .zip(tan1.iter().zip(&tan2))
            .map(|(n, (t, t2))| {
                // Gram-Schmidt orthogonalize
                let tangent = normalize_or_keep(t - n * n.dot(t));
                let w = if n.cross(&tangent).dot(t2) < 0.0 { -1.0 } else { 1.0 };
                Vector4f::new(tangent.x, tangent.y, tangent.z, w)
            })
            .collect();

        self.tangents = Some(tangents);
        Ok(())
    }
}
