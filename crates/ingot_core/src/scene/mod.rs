//! Scene graph types produced by an import.
//!
//! A [`Scene`] owns everything it references: the node arena, meshes,
//! materials and embedded textures. Cross references are plain indices,
//! checked once by [`validate::validate_scene`] before the scene is handed
//! to the caller.

use std::ops::BitOr;

use ingot_math::{Aabb, Mat4, Vec3};

mod material;
mod mesh;
mod node;
mod texture;
pub mod validate;

pub use material::{
    AlphaMode, Material, MaterialKey, MaterialValue, PropertyValue, ShadingModel, TextureFlags,
    TextureFlagsError, TextureMapMode, TextureOp, TextureSlot, TextureType, UvTransform,
};
pub use mesh::{Face, Mesh, PrimitiveType};
pub use node::{Node, NodeId};
pub use texture::{Texture, TextureData, TextureError, TextureResult};

/// Scene-level status bits set by format workers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SceneFlags(u32);

impl SceneFlags {
    pub const NONE: SceneFlags = SceneFlags(0);
    /// The file held no geometry (only hierarchy, materials, ...)
    pub const INCOMPLETE: SceneFlags = SceneFlags(0x1);
    /// Vertices are shared between faces
    pub const NON_VERBOSE_FORMAT: SceneFlags = SceneFlags(0x2);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: SceneFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: SceneFlags) {
        self.0 |= other.0;
    }
}

impl BitOr for SceneFlags {
    type Output = SceneFlags;

    fn bitor(self, rhs: SceneFlags) -> SceneFlags {
        SceneFlags(self.0 | rhs.0)
    }
}

/// Light source kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Directional,
    Point,
    Spot { inner_cone: f32, outer_cone: f32 },
    Ambient,
}

/// A light attached to a node by name.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    /// Name of the node carrying the light transform
    pub node_name: String,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
}

/// A camera attached to a node by name.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Name of the node carrying the camera transform
    pub node_name: String,
    /// Horizontal field of view in radians
    pub horizontal_fov: f32,
    pub clip_near: f32,
    pub clip_far: f32,
    pub aspect: f32,
}

/// Keyframes for one animated node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeChannel {
    pub node_name: String,
    /// (time, value) pairs in ticks
    pub position_keys: Vec<(f64, Vec3)>,
    pub scaling_keys: Vec<(f64, Vec3)>,
}

/// A named animation clip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    pub name: String,
    /// Duration in ticks
    pub duration: f64,
    pub ticks_per_second: f64,
    pub channels: Vec<NodeChannel>,
}

/// The result of one import.
///
/// Nodes are stored in an arena addressed by [`NodeId`]. `Scene::new`
/// creates the single root node; further nodes are attached with
/// [`Scene::add_node`], which keeps the parent/child links in sync.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Scene name (usually from filename)
    pub name: String,

    pub flags: SceneFlags,

    /// Node arena; `root` indexes into it
    pub nodes: Vec<Node>,

    pub root: NodeId,

    pub meshes: Vec<Mesh>,

    pub materials: Vec<Material>,

    /// Embedded textures, referenced by `*N` slot paths
    pub textures: Vec<Texture>,

    pub animations: Vec<Animation>,

    pub lights: Vec<Light>,

    pub cameras: Vec<Camera>,
}

impl Scene {
    /// Create an empty scene whose root node carries the scene name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            nodes: vec![Node::new(name.clone())],
            root: NodeId(0),
            name,
            flags: SceneFlags::NONE,
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            animations: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
        }
    }

    /// Attach `node` under `parent` and return its id.
    ///
    /// Any `parent`/`children` already set on `node` are overwritten.
    pub fn add_node(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
        }
        id
    }

    /// Add a mesh to the scene and return its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Add a material to the scene and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add an embedded texture and return its index.
    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.node(self.root)
    }

    /// Find the first node (in arena order) with the given name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Depth-first, pre-order walk starting at `start`.
    ///
    /// Visits each node at most once, so a malformed hierarchy cannot make
    /// it loop.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }

        order
    }

    /// Accumulated transform from the root down to `id`, following parent links.
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        let mut steps = 0;

        while let Some(node) = current.and_then(|c| self.nodes.get(c.0)) {
            matrix = node.transform * matrix;
            current = node.parent;
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }

        matrix
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn has_meshes(&self) -> bool {
        !self.meshes.is_empty()
    }

    /// Get total triangle count across all node mesh references.
    pub fn total_triangle_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.meshes.iter())
            .filter_map(|&m| self.meshes.get(m))
            .map(Mesh::triangle_count)
            .sum()
    }

    /// Compute the world-space bounding box of all referenced meshes.
    pub fn world_bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;

        for id in self.descendants(self.root) {
            let node = &self.nodes[id.0];
            if node.meshes.is_empty() {
                continue;
            }

            let matrix = self.world_transform(id);
            for mesh in node.meshes.iter().filter_map(|&m| self.meshes.get(m)) {
                bounds = Aabb::surrounding(&bounds, &mesh.bounds.transformed(&matrix));
            }
        }

        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            "tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Face::triangle(0, 1, 2)],
        )
    }

    #[test]
    fn test_scene_creation() {
        let mut scene = Scene::new("test");
        let mesh = scene.add_mesh(triangle());
        scene.add_material(Material::new("default"));

        let child = scene.add_node(scene.root, Node::new("child").with_meshes([mesh]));
        scene.add_node(
            child,
            Node::new("grandchild")
                .with_transform(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)))
                .with_meshes([mesh]),
        );

        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.total_triangle_count(), 2);
        assert_eq!(scene.root_node().unwrap().name, "test");
        assert_eq!(scene.node(child).unwrap().parent, Some(scene.root));
        assert_eq!(scene.root_node().unwrap().children, vec![child]);
    }

    #[test]
    fn test_descendants_preorder() {
        let mut scene = Scene::new("s");
        let a = scene.add_node(scene.root, Node::new("a"));
        let b = scene.add_node(scene.root, Node::new("b"));
        let a1 = scene.add_node(a, Node::new("a1"));

        assert_eq!(scene.descendants(scene.root), vec![scene.root, a, a1, b]);
        assert_eq!(scene.find_node("a1"), Some(a1));
        assert_eq!(scene.find_node("missing"), None);
    }

    #[test]
    fn test_world_transform_and_bounds() {
        let mut scene = Scene::new("s");
        let mesh = scene.add_mesh(triangle());
        let parent = scene.add_node(
            scene.root,
            Node::new("parent").with_transform(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0))),
        );
        let child = scene.add_node(
            parent,
            Node::new("child")
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)))
                .with_meshes([mesh]),
        );

        let origin = scene.world_transform(child).transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(10.0, 5.0, 0.0)).length() < 0.001);

        let bounds = scene.world_bounds();
        assert!((bounds.min - Vec3::new(10.0, 5.0, 0.0)).length() < 0.001);
        assert!((bounds.max - Vec3::new(11.0, 6.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_scene_flags() {
        let mut flags = SceneFlags::NONE;
        flags.insert(SceneFlags::INCOMPLETE);
        assert!(flags.contains(SceneFlags::INCOMPLETE));
        assert!(!flags.contains(SceneFlags::NON_VERBOSE_FORMAT));
        assert_eq!((flags | SceneFlags::NON_VERBOSE_FORMAT).bits(), 0x3);
    }
}
