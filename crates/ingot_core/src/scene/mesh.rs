//! Mesh geometry representation for the imported scene.
//!
//! Meshes keep polygon faces as authored by the source format. Post-process
//! steps such as triangulation and normal generation rewrite them in place.

use ingot_math::{Aabb, Vec2, Vec3};

/// Primitive kind of a single face, derived from its index count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveType {
    Point,
    Line,
    Triangle,
    Polygon,
}

/// A single face referencing vertices of its mesh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
    /// Vertex indices in winding order
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self {
            indices: vec![a, b, c],
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        match self.indices.len() {
            0 | 1 => PrimitiveType::Point,
            2 => PrimitiveType::Line,
            3 => PrimitiveType::Triangle,
            _ => PrimitiveType::Polygon,
        }
    }
}

/// Geometry payload of the scene.
///
/// Attribute arrays (`normals`, every entry of `uv_channels`) are
/// per-vertex and must match `positions.len()`.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Mesh name (from the source file, may be empty)
    pub name: String,

    /// Vertex positions
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - generated by the `gen_normals` step)
    pub normals: Option<Vec<Vec3>>,

    /// UV channels; channel N is sampled by texture slots with `uv_channel == N`
    pub uv_channels: Vec<Vec<Vec2>>,

    /// Polygon faces
    pub faces: Vec<Face>,

    /// Index into `Scene::materials`
    pub material_index: usize,

    /// Axis-aligned bounding box of `positions`
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and faces.
    ///
    /// Bounds are computed immediately; normals are NOT generated.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, faces: Vec<Face>) -> Self {
        let bounds = Aabb::from_points(&positions);
        Self {
            name: name.into(),
            positions,
            normals: None,
            uv_channels: Vec::new(),
            faces,
            material_index: 0,
            bounds,
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Append a UV channel.
    pub fn with_uv_channel(mut self, uvs: Vec<Vec2>) -> Self {
        self.uv_channels.push(uvs);
        self
    }

    pub fn with_material(mut self, material_index: usize) -> Self {
        self.material_index = material_index;
        self
    }

    /// Recompute `bounds` from the current positions.
    pub fn update_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.positions);
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Polygons contribute through their fan triangles, counter-clockwise
    /// winding is front-facing. Points and lines contribute nothing.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }

            let idx = &face.indices;
            if idx.iter().any(|&i| i as usize >= vertex_count) {
                continue;
            }

            let p0 = self.positions[idx[0] as usize];
            let mut face_normal = Vec3::ZERO;
            for i in 1..idx.len() - 1 {
                let p1 = self.positions[idx[i] as usize];
                let p2 = self.positions[idx[i + 1] as usize];
                face_normal += (p1 - p0).cross(p2 - p0);
            }

            for &i in idx {
                normals[i as usize] += face_normal;
            }
        }

        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y; // Default up normal for degenerate cases
            }
        }

        self.normals = Some(normals);
    }

    /// Ensure the mesh has normals, computing them if necessary.
    /// Also recomputes if existing normals don't match the vertex count.
    pub fn ensure_normals(&mut self) {
        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if should_compute {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Mesh '{}': {} normals for {} vertices, computing smooth normals",
                    self.name,
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uv_channels.is_empty()
    }

    /// True when no face has more than three indices.
    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(|f| f.len() <= 3)
    }

    /// Number of triangles this mesh renders as (polygons counted by fan).
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|f| f.len().saturating_sub(2))
            .sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the mesh center (center of bounding box).
    pub fn center(&self) -> Vec3 {
        self.bounds.centroid()
    }
}
