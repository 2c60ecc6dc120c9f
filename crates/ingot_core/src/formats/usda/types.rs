//! USD prim types for the intermediate representation.
//!
//! These hold parsed USDA prims before they are converted into a
//! [`Scene`](crate::scene::Scene).

use ingot_math::{Mat4, Vec2, Vec3};

use crate::scene::Face;

/// A parsed USD prim.
#[derive(Clone, Debug)]
pub enum UsdPrim {
    /// A transform node (also used for `Scope`)
    Xform(UsdXform),

    Mesh(UsdMesh),

    Material(UsdMaterial),

    Shader(UsdShader),

    /// An unsupported prim type; its block was skipped
    Unknown(String),
}

/// A USD Xform (or Scope) prim.
#[derive(Clone, Debug, Default)]
pub struct UsdXform {
    /// Prim path (e.g., "/World/Model")
    pub path: String,

    /// Prim name (last component of path)
    pub name: String,

    /// Combined transform matrix from xformOps
    pub transform: Mat4,

    /// `rel material:binding` target, inherited by descendants
    pub material_binding: Option<String>,

    pub children: Vec<UsdPrim>,
}

/// A USD Mesh prim.
#[derive(Clone, Debug, Default)]
pub struct UsdMesh {
    pub path: String,

    pub name: String,

    /// Vertex positions
    pub points: Vec<Vec3>,

    /// Number of vertices per face
    pub face_vertex_counts: Vec<i32>,

    /// Vertex indices for each face, concatenated
    pub face_vertex_indices: Vec<i32>,

    /// Vertex normals (optional)
    pub normals: Option<Vec<Vec3>>,

    /// `primvars:st` texture coordinates (optional)
    pub st: Option<Vec<Vec2>>,

    /// `orientation = "leftHanded"` (clockwise front faces)
    pub left_handed: bool,

    /// `rel material:binding` target
    pub material_binding: Option<String>,

    /// Local transform
    pub transform: Mat4,
}

impl UsdMesh {
    /// Split the flat index list into polygon faces.
    ///
    /// Left-handed meshes are rewound to counter-clockwise.
    pub fn faces(&self) -> Result<Vec<Face>, String> {
        let mut faces = Vec::with_capacity(self.face_vertex_counts.len());
        let mut offset = 0usize;

        for &count in &self.face_vertex_counts {
            let count = usize::try_from(count)
                .map_err(|_| format!("negative face vertex count {count}"))?;
            let end = offset + count;

            let slice = self
                .face_vertex_indices
                .get(offset..end)
                .ok_or_else(|| {
                    format!(
                        "faceVertexCounts needs {} indices, faceVertexIndices has {}",
                        end,
                        self.face_vertex_indices.len()
                    )
                })?;

            let mut indices = Vec::with_capacity(count);
            for &index in slice {
                match u32::try_from(index) {
                    Ok(i) if (i as usize) < self.points.len() => indices.push(i),
                    _ => {
                        return Err(format!(
                            "face vertex index {} out of range for {} points",
                            index,
                            self.points.len()
                        ))
                    }
                }
            }

            if self.left_handed {
                indices.reverse();
            }
            faces.push(Face::new(indices));
            offset = end;
        }

        Ok(faces)
    }
}

/// A USD Material prim with its shader network.
#[derive(Clone, Debug, Default)]
pub struct UsdMaterial {
    pub path: String,

    pub name: String,

    pub shaders: Vec<UsdShader>,
}

impl UsdMaterial {
    /// The `UsdPreviewSurface` shader, or the first shader if none says so.
    pub fn surface(&self) -> Option<&UsdShader> {
        self.shaders
            .iter()
            .find(|s| s.shader_id.as_deref() == Some("UsdPreviewSurface"))
            .or_else(|| self.shaders.iter().find(|s| s.input("file").is_none()))
    }

    /// Shader by prim path.
    pub fn shader(&self, path: &str) -> Option<&UsdShader> {
        self.shaders.iter().find(|s| s.path == path)
    }
}

/// A USD Shader prim.
#[derive(Clone, Debug, Default)]
pub struct UsdShader {
    pub path: String,

    pub name: String,

    /// `info:id`, e.g. "UsdPreviewSurface" or "UsdUVTexture"
    pub shader_id: Option<String>,

    /// `inputs:*` in declaration order
    pub inputs: Vec<(String, UsdValue)>,
}

impl UsdShader {
    pub fn input(&self, name: &str) -> Option<&UsdValue> {
        self.inputs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Value of a shader input.
#[derive(Clone, Debug, PartialEq)]
pub enum UsdValue {
    Float(f32),

    Color(Vec3),

    /// `@path@` asset reference
    Asset(String),

    /// Quoted token or string
    Token(String),

    /// `.connect = </Prim.outputs:rgb>`; holds the source prim path
    Connection(String),
}

/// Transform operation types found in USD xformOps.
#[derive(Clone, Debug)]
pub enum XformOp {
    /// Translation (xformOp:translate)
    Translate(Vec3),

    /// Rotation in degrees around X axis
    RotateX(f32),

    /// Rotation in degrees around Y axis
    RotateY(f32),

    /// Rotation in degrees around Z axis
    RotateZ(f32),

    /// Euler rotation XYZ in degrees
    RotateXYZ(Vec3),

    /// Scale (uniform or non-uniform)
    Scale(Vec3),
}

impl XformOp {
    /// Convert this operation to a transformation matrix.
    pub fn to_matrix(&self) -> Mat4 {
        match self {
            XformOp::Translate(t) => Mat4::from_translation(*t),
            XformOp::RotateX(deg) => Mat4::from_rotation_x(deg.to_radians()),
            XformOp::RotateY(deg) => Mat4::from_rotation_y(deg.to_radians()),
            XformOp::RotateZ(deg) => Mat4::from_rotation_z(deg.to_radians()),
            XformOp::RotateXYZ(euler) => {
                Mat4::from_rotation_x(euler.x.to_radians())
                    * Mat4::from_rotation_y(euler.y.to_radians())
                    * Mat4::from_rotation_z(euler.z.to_radians())
            }
            XformOp::Scale(s) => Mat4::from_scale(*s),
        }
    }
}

/// Combine a list of xformOps into a single matrix.
pub fn compose_xform_ops(ops: &[XformOp]) -> Mat4 {
    ops.iter()
        .fold(Mat4::IDENTITY, |result, op| result * op.to_matrix())
}
