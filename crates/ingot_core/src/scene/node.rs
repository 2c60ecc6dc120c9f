//! Transform hierarchy nodes.

use std::fmt;

use ingot_math::Mat4;

/// Index of a [`Node`] inside its owning [`Scene`](super::Scene).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Position of the node in `Scene::nodes`.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of the scene hierarchy.
///
/// Nodes live in the scene's node arena. A parent owns its children through
/// `children`; `parent` is a back-reference used for upward traversal only.
#[derive(Clone, Debug)]
pub struct Node {
    /// Node name (unique names are not required)
    pub name: String,

    /// Transform relative to the parent node
    pub transform: Mat4,

    /// Indices into `Scene::meshes`
    pub meshes: Vec<usize>,

    /// Owned child nodes, in declaration order
    pub children: Vec<NodeId>,

    /// Parent node, `None` only for the root
    pub parent: Option<NodeId>,
}

impl Node {
    /// Create a detached node with an identity transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            meshes: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Set the local transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Attach meshes by scene index.
    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = usize>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
