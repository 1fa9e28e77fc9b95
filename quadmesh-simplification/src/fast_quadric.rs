//! Fast quadric mesh simplification
//!
//! Garland-Heckbert quadric error metrics driven by Forstmann's iterative
//! threshold scheme. Instead of keeping a priority queue of edge costs, every
//! iteration sweeps all triangles and collapses any edge whose error is below
//! a threshold that grows with the iteration number. Vertex references are
//! rebuilt only every few iterations, which keeps each sweep cheap.
//!
//! Triangles store two index triples: `v` points at the vertex carrying the
//! position and quadric, `va` at the vertex carrying the attributes (normal,
//! UVs, ...). They are equal until smart linking merges coincident border
//! vertices, after which seams keep their own attributes while sharing one
//! position.

use crate::algorithm::{AlgorithmState, DecimationAlgorithm};
use crate::options::DecimationOptions;
use crate::status::{StatusCallback, StatusReport};
use crate::symmetric_matrix::SymmetricMatrix;
use itertools::Itertools;
use quadmesh_core::{
    BoneWeight, MeshBuffer, Point3d, Result, UvChannel, Vector3d, Vector3f, Vector4f,
    UV_CHANNEL_COUNT,
};
use std::fmt;
use std::ops::{Add, Mul};
use tracing::{debug, info, trace};

/// References are rebuilt every this many iterations of a targeted run
const REFRESH_INTERVAL: usize = 5;

/// Error threshold of lossless runs
const LOSSLESS_THRESHOLD: f64 = 1.0e-3;

const LOSSLESS_MAX_ITERATIONS: usize = 9999;

/// Face normals shorter than this are left unnormalized
const NORMAL_TOLERANCE: f64 = 1.0e-12;

/// Collapse is rejected when a surviving face edge pair gets this parallel
const DEGENERATE_DOT: f64 = 0.999;

/// Collapse is rejected when a surviving face normal turns this far
const FLIP_DOT: f64 = 0.2;

// ============================================================
// Working data
// ============================================================

#[derive(Debug, Clone, Copy)]
struct Triangle {
    /// Position vertex of each corner
    v: [usize; 3],
    /// Attribute vertex of each corner
    va: [usize; 3],
    sub_mesh: usize,
    /// Collapse error of the edges starting at each corner
    err: [f64; 3],
    min_err: f64,
    deleted: bool,
    dirty: bool,
    n: Vector3d,
}

impl Triangle {
    fn new(v: [usize; 3], sub_mesh: usize) -> Self {
        Self {
            v,
            va: v,
            sub_mesh,
            err: [0.0; 3],
            min_err: 0.0,
            deleted: false,
            dirty: false,
            n: Vector3d::zeros(),
        }
    }

    fn update_errors(&mut self, vertices: &[Vertex]) {
        for edge in 0..3 {
            let v0 = &vertices[self.v[edge]];
            let v1 = &vertices[self.v[(edge + 1) % 3]];
            self.err[edge] = calculate_error(v0, v1).0;
        }
        self.min_err = self.err[0].min(self.err[1]).min(self.err[2]);
    }
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    p: Vector3d,
    /// Start of this vertex's slice in the reference list
    tstart: usize,
    tcount: usize,
    q: SymmetricMatrix,
    border: bool,
    seam: bool,
    foldover: bool,
}

impl Vertex {
    fn new(p: Vector3d) -> Self {
        Self {
            p,
            tstart: 0,
            tcount: 0,
            q: SymmetricMatrix::default(),
            border: true,
            seam: false,
            foldover: false,
        }
    }
}

/// A triangle corner touching a vertex
#[derive(Debug, Clone, Copy, Default)]
struct Ref {
    tid: usize,
    tvertex: usize,
}

/// What happens to the surviving vertex's attributes after a collapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collapse {
    /// Result sits on the first endpoint, attributes stay
    KeepFirst,
    /// Result sits on the second endpoint, its attributes are taken over
    TakeSecond,
    /// Result sits between the endpoints, attributes are averaged
    Blend,
}

/// Best collapse position of an edge and its quadric error
fn calculate_error(v0: &Vertex, v1: &Vertex) -> (f64, Vector3d, Collapse) {
    let q = v0.q + v1.q;
    let border = v0.border && v1.border;

    if !border {
        if let Some(p) = q.optimal_point() {
            return (q.vertex_error(&p), p, Collapse::Blend);
        }
    }

    let p1 = v0.p;
    let p2 = v1.p;
    let p3 = (p1 + p2) * 0.5;
    let error1 = q.vertex_error(&p1);
    let error2 = q.vertex_error(&p2);
    let error3 = q.vertex_error(&p3);
    let error = error1.min(error2).min(error3);

    if error == error3 {
        (error, p3, Collapse::Blend)
    } else if error == error2 {
        (error, p2, Collapse::TakeSecond)
    } else if error == error1 {
        (error, p1, Collapse::KeepFirst)
    } else {
        (error, p3, Collapse::Blend)
    }
}

fn normalize_or_keep(v: Vector3d) -> Vector3d {
    v.try_normalize(NORMAL_TOLERANCE).unwrap_or(v)
}

fn copy_value<T: Copy>(values: &mut Option<Vec<T>>, dst: usize, src: usize) {
    if let Some(values) = values {
        values[dst] = values[src];
    }
}

fn blend_value<T>(values: &mut Option<Vec<T>>, dst: usize, src: usize)
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    if let Some(values) = values {
        values[dst] = (values[dst] + values[src]) * 0.5;
    }
}

/// Per-vertex attributes, indexed by attribute vertex
#[derive(Debug, Clone, Default)]
struct VertexAttributes {
    normals: Option<Vec<Vector3f>>,
    tangents: Option<Vec<Vector4f>>,
    uvs: [UvChannel; UV_CHANNEL_COUNT],
    colors: Option<Vec<Vector4f>>,
    bone_weights: Option<Vec<BoneWeight>>,
}

impl VertexAttributes {
    fn from_mesh(mesh: &MeshBuffer) -> Self {
        Self {
            normals: mesh.normals().map(<[_]>::to_vec),
            tangents: mesh.tangents().map(<[_]>::to_vec),
            uvs: mesh.uv_channels().clone(),
            colors: mesh.colors().map(<[_]>::to_vec),
            bone_weights: mesh.bone_weights().map(<[_]>::to_vec),
        }
    }

    /// Overwrite every attribute of `dst` with those of `src`
    fn move_vertex(&mut self, dst: usize, src: usize) {
        copy_value(&mut self.normals, dst, src);
        copy_value(&mut self.tangents, dst, src);
        for channel in &mut self.uvs {
            channel.copy_value(dst, src);
        }
        copy_value(&mut self.colors, dst, src);
        copy_value(&mut self.bone_weights, dst, src);
    }

    /// Average the attributes of `dst` and `src` into `dst`. Bone weights
    /// cannot be blended and stay as they are.
    fn merge_vertex(&mut self, dst: usize, src: usize) {
        blend_value(&mut self.normals, dst, src);
        blend_value(&mut self.tangents, dst, src);
        for channel in &mut self.uvs {
            channel.blend_values(dst, src);
        }
        blend_value(&mut self.colors, dst, src);
    }

    fn copy_bone_weight(&mut self, dst: usize, src: usize) {
        copy_value(&mut self.bone_weights, dst, src);
    }

    fn uv0_equal(&self, a: usize, b: usize) -> bool {
        self.uvs[0].values_equal(a, b)
    }

    fn truncate(&mut self, len: usize) {
        if let Some(normals) = &mut self.normals {
            normals.truncate(len);
        }
        for values in [&mut self.tangents, &mut self.colors].into_iter().flatten() {
            values.truncate(len);
        }
        if let Some(bone_weights) = &mut self.bone_weights {
            bone_weights.truncate(len);
        }
        for channel in &mut self.uvs {
            channel.truncate(len);
        }
    }

    fn apply_to(self, mesh: &mut MeshBuffer) -> Result<()> {
        mesh.set_normals(self.normals)?;
        mesh.set_tangents(self.tangents)?;
        mesh.set_colors(self.colors)?;
        mesh.set_bone_weights(self.bone_weights)?;
        for (channel, uvs) in self.uvs.into_iter().enumerate() {
            mesh.set_uvs(channel, uvs)?;
        }
        Ok(())
    }
}

// ============================================================
// Algorithm
// ============================================================

/// Fast quadric mesh simplification.
///
/// ```no_run
/// use quadmesh_simplification::{DecimationAlgorithm, FastQuadricMeshSimplification};
/// # fn run(mesh: &quadmesh_core::MeshBuffer) -> quadmesh_core::Result<()> {
/// let mut algorithm = FastQuadricMeshSimplification::new();
/// algorithm.options_mut().preserve_borders = true;
/// algorithm.initialize(mesh)?;
/// algorithm.decimate_mesh(mesh.triangle_count() / 2)?;
/// let decimated = algorithm.to_mesh()?;
/// # Ok(())
/// # }
/// ```
pub struct FastQuadricMeshSimplification {
    options: DecimationOptions,
    status_callback: Option<StatusCallback>,
    state: AlgorithmState,
    sub_mesh_count: usize,
    triangles: Vec<Triangle>,
    vertices: Vec<Vertex>,
    refs: Vec<Ref>,
    attributes: VertexAttributes,
    remaining_vertices: usize,
}

impl Default for FastQuadricMeshSimplification {
    fn default() -> Self {
        Self::with_options(DecimationOptions::default())
    }
}

impl fmt::Debug for FastQuadricMeshSimplification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastQuadricMeshSimplification")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("triangles", &self.triangles.len())
            .field("vertices", &self.vertices.len())
            .finish_non_exhaustive()
    }
}

impl FastQuadricMeshSimplification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecimationOptions) -> Self {
        Self {
            options,
            status_callback: None,
            state: AlgorithmState::Uninitialized,
            sub_mesh_count: 0,
            triangles: Vec::new(),
            vertices: Vec::new(),
            refs: Vec::new(),
            attributes: VertexAttributes::default(),
            remaining_vertices: 0,
        }
    }

    fn clear(&mut self) {
        self.sub_mesh_count = 0;
        self.triangles.clear();
        self.vertices.clear();
        self.refs.clear();
        self.attributes = VertexAttributes::default();
        self.remaining_vertices = 0;
    }

    fn max_vertex_count(&self) -> usize {
        self.options.max_vertex_count.filter(|&count| count > 0).unwrap_or(usize::MAX)
    }

    fn report_status(&mut self, iteration: usize, original: usize, current: usize, target: Option<usize>) {
        if let Some(callback) = self.status_callback.as_mut() {
            callback(&StatusReport {
                iteration,
                original_triangle_count: original,
                current_triangle_count: current,
                target_triangle_count: target,
            });
        }
    }

    // ---- Collapse ----

    /// Check whether moving `vertex` to `p` flips or degenerates one of its
    /// faces. Faces shared with `other` are marked in `deleted`, since the
    /// collapse removes them.
    fn flipped(&self, p: &Vector3d, other: usize, vertex: &Vertex, deleted: &mut [bool]) -> bool {
        for k in 0..vertex.tcount {
            let r = self.refs[vertex.tstart + k];
            let triangle = &self.triangles[r.tid];
            if triangle.deleted {
                continue;
            }

            let id1 = triangle.v[(r.tvertex + 1) % 3];
            let id2 = triangle.v[(r.tvertex + 2) % 3];
            if id1 == other || id2 == other {
                deleted[k] = true;
                continue;
            }

            let d1 = normalize_or_keep(self.vertices[id1].p - p);
            let d2 = normalize_or_keep(self.vertices[id2].p - p);
            if d1.dot(&d2).abs() > DEGENERATE_DOT {
                return true;
            }

            let n = normalize_or_keep(d1.cross(&d2));
            deleted[k] = false;
            if n.dot(&triangle.n) < FLIP_DOT {
                return true;
            }
        }
        false
    }

    /// Point the faces of `vertex` at `i0`, dropping the ones marked in
    /// `deleted`, and append the survivors to the reference list
    fn update_triangles(
        &mut self,
        i0: usize,
        ia0: Option<usize>,
        vertex: Vertex,
        deleted: &[bool],
        deleted_triangles: &mut usize,
    ) {
        for k in 0..vertex.tcount {
            let r = self.refs[vertex.tstart + k];
            let mut triangle = self.triangles[r.tid];
            if triangle.deleted {
                continue;
            }
            if deleted[k] {
                self.triangles[r.tid].deleted = true;
                *deleted_triangles += 1;
                continue;
            }

            triangle.v[r.tvertex] = i0;
            if let Some(ia0) = ia0 {
                triangle.va[r.tvertex] = ia0;
            }
            triangle.dirty = true;
            triangle.update_errors(&self.vertices);
            self.triangles[r.tid] = triangle;
            self.refs.push(r);
        }
    }

    /// One sweep over all triangles, collapsing edges under `threshold`.
    /// Returns the number of collapses performed.
    fn remove_vertex_pass(
        &mut self,
        start_triangle_count: usize,
        target_triangle_count: usize,
        threshold: f64,
        deleted0: &mut Vec<bool>,
        deleted1: &mut Vec<bool>,
        deleted_triangles: &mut usize,
    ) -> usize {
        let max_vertex_count = self.max_vertex_count();
        let mut collapses = 0;

        for tid in 0..self.triangles.len() {
            let triangle = self.triangles[tid];
            if triangle.dirty || triangle.deleted || triangle.min_err > threshold {
                continue;
            }

            for edge in 0..3 {
                if triangle.err[edge] > threshold {
                    continue;
                }

                let next = (edge + 1) % 3;
                let i0 = triangle.v[edge];
                let i1 = triangle.v[next];
                let v0 = self.vertices[i0];
                let v1 = self.vertices[i1];

                if v0.border != v1.border || v0.seam != v1.seam || v0.foldover != v1.foldover {
                    continue;
                }
                if (self.options.preserve_borders && v0.border)
                    || (self.options.preserve_seams && v0.seam)
                    || (self.options.preserve_foldovers && v0.foldover)
                {
                    continue;
                }

                let (_, p, collapse) = calculate_error(&v0, &v1);

                deleted0.clear();
                deleted0.resize(v0.tcount, false);
                deleted1.clear();
                deleted1.resize(v1.tcount, false);

                if self.flipped(&p, i1, &v0, deleted0) || self.flipped(&p, i0, &v1, deleted1) {
                    continue;
                }

                let ia0 = triangle.va[edge];
                let ia1 = triangle.va[next];
                match collapse {
                    Collapse::KeepFirst => {}
                    Collapse::TakeSecond => self.attributes.move_vertex(ia0, ia1),
                    Collapse::Blend => self.attributes.merge_vertex(ia0, ia1),
                }

                let survivor = {
                    let vertex = &mut self.vertices[i0];
                    vertex.p = p;
                    vertex.q += v1.q;
                    *vertex
                };
                // Seam vertices keep their own attribute vertices
                let ia0 = (!survivor.seam).then_some(ia0);

                let tstart = self.refs.len();
                self.update_triangles(i0, ia0, survivor, deleted0, deleted_triangles);
                self.update_triangles(i0, ia0, v1, deleted1, deleted_triangles);
                let tcount = self.refs.len() - tstart;

                let vertex = &mut self.vertices[i0];
                if tcount <= vertex.tcount {
                    // Reuse the old slice
                    if tcount > 0 {
                        self.refs.copy_within(tstart..tstart + tcount, vertex.tstart);
                    }
                } else {
                    vertex.tstart = tstart;
                }
                vertex.tcount = tcount;

                self.remaining_vertices = self.remaining_vertices.saturating_sub(1);
                collapses += 1;
                break;
            }

            let current = start_triangle_count.saturating_sub(*deleted_triangles);
            if current <= target_triangle_count && self.remaining_vertices < max_vertex_count {
                break;
            }
        }

        collapses
    }

    // ---- Mesh bookkeeping ----

    /// Drop deleted triangles and rebuild references. The first iteration
    /// also classifies vertices and builds the quadrics.
    fn update_mesh(&mut self, iteration: usize) {
        if iteration > 0 {
            self.triangles.retain(|t| !t.deleted);
        }
        self.update_references();

        if iteration == 0 {
            let (min_x, max_x) = self.identify_borders();
            if self.options.enable_smart_link {
                self.link_border_vertices(min_x, max_x);
                self.update_references();
            }
            self.initialize_quadrics();
        }
    }

    /// Number of vertices used by at least one live triangle
    fn referenced_vertex_count(&self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for triangle in self.triangles.iter().filter(|t| !t.deleted) {
            for &v in &triangle.v {
                used[v] = true;
            }
        }
        used.into_iter().filter(|&u| u).count()
    }

    fn update_references(&mut self) {
        for vertex in &mut self.vertices {
            vertex.tstart = 0;
            vertex.tcount = 0;
        }
        for triangle in &self.triangles {
            for &v in &triangle.v {
                self.vertices[v].tcount += 1;
            }
        }

        let mut tstart = 0;
        self.remaining_vertices = 0;
        for vertex in &mut self.vertices {
            vertex.tstart = tstart;
            if vertex.tcount > 0 {
                tstart += vertex.tcount;
                vertex.tcount = 0;
                self.remaining_vertices += 1;
            }
        }

        self.refs.clear();
        self.refs.resize(tstart, Ref::default());
        for (tid, triangle) in self.triangles.iter().enumerate() {
            for (tvertex, &v) in triangle.v.iter().enumerate() {
                let vertex = &mut self.vertices[v];
                self.refs[vertex.tstart + vertex.tcount] = Ref { tid, tvertex };
                vertex.tcount += 1;
            }
        }
    }

    /// Flag vertices on open borders: a border vertex shares an edge with a
    /// neighbour that appears in only one of its faces. Returns the x range
    /// of the border vertices.
    fn identify_borders(&mut self) -> (f64, f64) {
        for vertex in &mut self.vertices {
            vertex.border = false;
            vertex.seam = false;
            vertex.foldover = false;
        }

        let mut neighbours: Vec<(usize, usize)> = Vec::new();
        let mut min_x = f64::MAX;
        let mut max_x = f64::MIN;

        for i in 0..self.vertices.len() {
            let Vertex { tstart, tcount, .. } = self.vertices[i];
            neighbours.clear();
            for r in &self.refs[tstart..tstart + tcount] {
                for &id in &self.triangles[r.tid].v {
                    match neighbours.iter_mut().find(|(v, _)| *v == id) {
                        Some((_, count)) => *count += 1,
                        None => neighbours.push((id, 1)),
                    }
                }
            }

            for &(id, count) in &neighbours {
                if count == 1 {
                    let vertex = &mut self.vertices[id];
                    vertex.border = true;
                    min_x = min_x.min(vertex.p.x);
                    max_x = max_x.max(vertex.p.x);
                }
            }
        }

        (min_x, max_x)
    }

    /// Merge coincident border vertices so that meshes split along UV seams
    /// decimate as one surface. Linked vertices share a position vertex and
    /// are flagged as foldover when their first UVs match, seam otherwise.
    fn link_border_vertices(&mut self, min_x: f64, max_x: f64) {
        let width = max_x - min_x;
        // Border vertices are bucketed by their x coordinate mapped onto the i32 range
        let hash_of = |x: f64| (((x - min_x) / width * 2.0 - 1.0) * i32::MAX as f64) as i32 as i64;

        let mut border: Vec<(Option<usize>, i64)> = self
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.border)
            .map(|(i, v)| (Some(i), hash_of(v.p.x)))
            .collect();
        if border.is_empty() {
            return;
        }
        border.sort_by_key(|&(_, hash)| hash);

        let link_distance_sqr = self.options.vertex_link_distance_sqr;
        let max_hash_distance =
            (((link_distance_sqr.sqrt() / width) * i32::MAX as f64) as i32).max(1) as i64;

        let mut linked = 0usize;
        for i in 0..border.len() {
            let (Some(my_index), my_hash) = border[i] else {
                continue;
            };
            let my_point = self.vertices[my_index].p;

            for j in i + 1..border.len() {
                let (Some(other_index), other_hash) = border[j] else {
                    continue;
                };
                if other_hash - my_hash > max_hash_distance {
                    break;
                }

                let other_point = self.vertices[other_index].p;
                if (my_point - other_point).norm_squared() > link_distance_sqr {
                    continue;
                }

                border[j].0 = None;
                let foldover = self.attributes.uv0_equal(my_index, other_index);
                for index in [my_index, other_index] {
                    let vertex = &mut self.vertices[index];
                    vertex.border = false;
                    if foldover {
                        vertex.foldover = true;
                    } else {
                        vertex.seam = true;
                    }
                }

                let Vertex { tstart, tcount, .. } = self.vertices[other_index];
                for r in &self.refs[tstart..tstart + tcount] {
                    self.triangles[r.tid].v[r.tvertex] = my_index;
                }
                linked += 1;
            }
        }

        trace!(linked, border_vertices = border.len(), "Linked coincident border vertices");
    }

    fn initialize_quadrics(&mut self) {
        for vertex in &mut self.vertices {
            vertex.q = SymmetricMatrix::default();
        }

        for triangle in &mut self.triangles {
            let [v0, v1, v2] = triangle.v;
            let p0 = self.vertices[v0].p;
            let p1 = self.vertices[v1].p;
            let p2 = self.vertices[v2].p;
            let n = normalize_or_keep((p1 - p0).cross(&(p2 - p0)));
            triangle.n = n;

            let plane = SymmetricMatrix::from_plane(n.x, n.y, n.z, -n.dot(&p0));
            for v in [v0, v1, v2] {
                self.vertices[v].q += plane;
            }
        }

        for triangle in &mut self.triangles {
            triangle.update_errors(&self.vertices);
        }
    }

    /// Finalize a run: resolve attribute vertices, drop unused vertices and
    /// remap triangles onto the compacted vertex list
    fn compact_mesh(&mut self) {
        for vertex in &mut self.vertices {
            vertex.tcount = 0;
        }
        self.triangles.retain(|t| !t.deleted);

        for triangle in &mut self.triangles {
            for corner in 0..3 {
                let (dst, src) = (triangle.va[corner], triangle.v[corner]);
                if dst != src {
                    self.vertices[dst].p = self.vertices[src].p;
                    self.attributes.copy_bone_weight(dst, src);
                    triangle.v[corner] = dst;
                }
            }
            for &v in &triangle.v {
                self.vertices[v].tcount = 1;
            }
        }

        let mut dst = 0;
        for i in 0..self.vertices.len() {
            if self.vertices[i].tcount > 0 {
                // tstart now holds the compacted index
                self.vertices[i].tstart = dst;
                if dst != i {
                    self.vertices[dst].p = self.vertices[i].p;
                    self.attributes.move_vertex(dst, i);
                }
                dst += 1;
            }
        }

        for triangle in &mut self.triangles {
            for v in &mut triangle.v {
                *v = self.vertices[*v].tstart;
            }
            triangle.va = triangle.v;
        }

        self.vertices.truncate(dst);
        self.attributes.truncate(dst);

        debug!(
            vertices = self.vertices.len(),
            triangles = self.triangles.len(),
            "Compacted decimated mesh"
        );
    }
}

impl DecimationAlgorithm for FastQuadricMeshSimplification {
    fn options(&self) -> &DecimationOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut DecimationOptions {
        &mut self.options
    }

    fn set_status_callback(&mut self, callback: Option<StatusCallback>) {
        self.status_callback = callback;
    }

    fn state(&self) -> AlgorithmState {
        self.state
    }

    fn initialize(&mut self, mesh: &MeshBuffer) -> Result<()> {
        mesh.validate()?;
        self.clear();

        self.sub_mesh_count = mesh.sub_mesh_count();
        self.vertices = mesh.vertices().iter().map(|p| Vertex::new(p.coords)).collect();
        self.triangles = mesh
            .all_sub_mesh_indices()
            .iter()
            .enumerate()
            .flat_map(|(sub_mesh, group)| {
                group
                    .iter()
                    .tuples::<(_, _, _)>()
                    .map(move |(&a, &b, &c)| Triangle::new([a as usize, b as usize, c as usize], sub_mesh))
            })
            .collect();
        self.attributes = VertexAttributes::from_mesh(mesh);
        self.state = AlgorithmState::Initialized;

        debug!(
            vertices = self.vertices.len(),
            triangles = self.triangles.len(),
            sub_meshes = self.sub_mesh_count,
            "Initialized decimation"
        );
        Ok(())
    }

    fn decimate_mesh(&mut self, target_triangle_count: usize) -> Result<()> {
        self.state
            .require("decimate", &[AlgorithmState::Initialized, AlgorithmState::Decimated])?;

        let start_triangle_count = self.triangles.len();
        let max_vertex_count = self.max_vertex_count();
        self.remaining_vertices = self.referenced_vertex_count();
        let mut deleted_triangles = 0;
        let mut collapses = 0;
        let mut deleted0 = Vec::with_capacity(20);
        let mut deleted1 = Vec::with_capacity(20);

        info!(
            original = start_triangle_count,
            target = target_triangle_count,
            "Starting mesh decimation"
        );

        for iteration in 0..self.options.max_iteration_count {
            let current = start_triangle_count.saturating_sub(deleted_triangles);
            self.report_status(iteration, start_triangle_count, current, Some(target_triangle_count));
            if current <= target_triangle_count && self.remaining_vertices < max_vertex_count {
                break;
            }

            if iteration % REFRESH_INTERVAL == 0 {
                self.update_mesh(iteration);
            }
            for triangle in &mut self.triangles {
                triangle.dirty = false;
            }

            // Edges under this error get collapsed. The exponent trades
            // quality for speed.
            let threshold = 1.0e-9 * ((iteration + 3) as f64).powf(self.options.aggressiveness);

            if iteration % REFRESH_INTERVAL == 0 {
                debug!(iteration, triangles = current, threshold, "Decimation iteration");
            }

            collapses += self.remove_vertex_pass(
                start_triangle_count,
                target_triangle_count,
                threshold,
                &mut deleted0,
                &mut deleted1,
                &mut deleted_triangles,
            );
        }

        self.compact_mesh();
        self.state = AlgorithmState::Decimated;

        info!(
            final_triangles = self.triangles.len(),
            collapses,
            "Decimation complete"
        );
        Ok(())
    }

    fn decimate_mesh_lossless(&mut self) -> Result<()> {
        self.state.require(
            "decimate losslessly",
            &[AlgorithmState::Initialized, AlgorithmState::Decimated],
        )?;

        let start_triangle_count = self.triangles.len();
        let mut deleted_triangles = 0;
        let mut collapses = 0;
        let mut deleted0 = Vec::new();
        let mut deleted1 = Vec::new();

        info!(original = start_triangle_count, "Starting lossless mesh decimation");

        for iteration in 0..LOSSLESS_MAX_ITERATIONS {
            self.update_mesh(iteration);
            self.report_status(iteration, start_triangle_count, self.triangles.len(), None);

            for triangle in &mut self.triangles {
                triangle.dirty = false;
            }

            debug!(iteration, triangles = self.triangles.len(), "Lossless decimation iteration");

            collapses += self.remove_vertex_pass(
                start_triangle_count,
                0,
                LOSSLESS_THRESHOLD,
                &mut deleted0,
                &mut deleted1,
                &mut deleted_triangles,
            );

            if deleted_triangles == 0 {
                break;
            }
            deleted_triangles = 0;
        }

        self.compact_mesh();
        self.state = AlgorithmState::Decimated;

        info!(
            final_triangles = self.triangles.len(),
            collapses,
            "Lossless decimation complete"
        );
        Ok(())
    }

    fn to_mesh(&mut self) -> Result<MeshBuffer> {
        self.state.require("extract the mesh", &[AlgorithmState::Decimated])?;

        let vertices: Vec<Point3d> = self.vertices.iter().map(|v| Point3d::from(v.p)).collect();
        let mut indices = vec![Vec::new(); self.sub_mesh_count.max(1)];
        for triangle in &self.triangles {
            indices[triangle.sub_mesh].extend(triangle.v.iter().map(|&v| v as u32));
        }

        let mut mesh = MeshBuffer::with_sub_meshes(vertices, indices)?;
        std::mem::take(&mut self.attributes).apply_to(&mut mesh)?;

        self.clear();
        self.state = AlgorithmState::Extracted;
        Ok(mesh)
    }
}
