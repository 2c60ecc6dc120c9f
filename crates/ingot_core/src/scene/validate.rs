//! Structural validation of a finished scene.
//!
//! This is the final gate before an import is committed. A failure here
//! means a format worker or post-process step produced an inconsistent
//! scene, not that the input file was malformed.

use std::collections::HashSet;

use thiserror::Error;

use super::{NodeId, Scene};

/// A broken structural invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("root node {0} is out of range")]
    RootOutOfRange(NodeId),

    #[error("root node {0} has a parent")]
    RootHasParent(NodeId),

    #[error("node {node} has no parent but is not the root")]
    SecondRoot { node: NodeId },

    #[error("node {node} lists child {child}, which does not exist")]
    ChildOutOfRange { node: NodeId, child: NodeId },

    #[error("node {child} is listed as child of {node} but its parent is {parent:?}")]
    ParentMismatch {
        node: NodeId,
        child: NodeId,
        parent: Option<NodeId>,
    },

    #[error("node {0} is reachable more than once (cycle or shared child)")]
    Cycle(NodeId),

    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),

    #[error("node {node} references mesh {mesh}, but the scene has {count} meshes")]
    MeshIndexOutOfRange { node: NodeId, mesh: usize, count: usize },

    #[error("mesh {mesh} references material {material}, but the scene has {count} materials")]
    MaterialIndexOutOfRange {
        mesh: usize,
        material: usize,
        count: usize,
    },

    #[error("mesh {mesh} face {face} references vertex {vertex} of {count}")]
    FaceIndexOutOfRange {
        mesh: usize,
        face: usize,
        vertex: u32,
        count: usize,
    },

    #[error("mesh {mesh} has {actual} {attribute} entries for {expected} vertices")]
    AttributeLength {
        mesh: usize,
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("mesh {mesh} exists but the scene has no materials")]
    MissingMaterial { mesh: usize },

    #[error("material {material} references embedded texture {texture}, but the scene has {count}")]
    EmbeddedTextureOutOfRange {
        material: usize,
        texture: usize,
        count: usize,
    },

    #[error("{kind} references node '{name}', which does not exist")]
    UnknownNodeName { kind: &'static str, name: String },
}

/// Validate every structural invariant of `scene`.
pub fn validate_scene(scene: &Scene) -> Result<(), ValidationError> {
    validate_hierarchy(scene)?;
    validate_node_meshes(scene)?;
    validate_meshes(scene)?;
    validate_materials(scene)?;
    validate_named_references(scene)?;
    Ok(())
}

/// Single root, consistent parent/child links, acyclic, fully reachable.
fn validate_hierarchy(scene: &Scene) -> Result<(), ValidationError> {
    let root = scene.root;
    let root_node = scene
        .node(root)
        .ok_or(ValidationError::RootOutOfRange(root))?;
    if root_node.parent.is_some() {
        return Err(ValidationError::RootHasParent(root));
    }

    for (i, node) in scene.nodes.iter().enumerate() {
        let id = NodeId(i);
        if node.parent.is_none() && id != root {
            return Err(ValidationError::SecondRoot { node: id });
        }
    }

    let mut visited = vec![false; scene.nodes.len()];
    let mut stack = vec![root];
    visited[root.0] = true;

    while let Some(id) = stack.pop() {
        let node = &scene.nodes[id.0];
        for &child in &node.children {
            let child_node = scene
                .node(child)
                .ok_or(ValidationError::ChildOutOfRange { node: id, child })?;

            if child_node.parent != Some(id) {
                return Err(ValidationError::ParentMismatch {
                    node: id,
                    child,
                    parent: child_node.parent,
                });
            }

            if std::mem::replace(&mut visited[child.0], true) {
                return Err(ValidationError::Cycle(child));
            }
            stack.push(child);
        }
    }

    match visited.iter().position(|v| !v) {
        Some(i) => Err(ValidationError::Unreachable(NodeId(i))),
        None => Ok(()),
    }
}

fn validate_node_meshes(scene: &Scene) -> Result<(), ValidationError> {
    let count = scene.meshes.len();
    for (i, node) in scene.nodes.iter().enumerate() {
        if let Some(&mesh) = node.meshes.iter().find(|&&m| m >= count) {
            return Err(ValidationError::MeshIndexOutOfRange {
                node: NodeId(i),
                mesh,
                count,
            });
        }
    }
    Ok(())
}

fn validate_meshes(scene: &Scene) -> Result<(), ValidationError> {
    let material_count = scene.materials.len();

    for (i, mesh) in scene.meshes.iter().enumerate() {
        let vertex_count = mesh.positions.len();

        if material_count == 0 {
            return Err(ValidationError::MissingMaterial { mesh: i });
        }
        if mesh.material_index >= material_count {
            return Err(ValidationError::MaterialIndexOutOfRange {
                mesh: i,
                material: mesh.material_index,
                count: material_count,
            });
        }

        for (f, face) in mesh.faces.iter().enumerate() {
            if let Some(&vertex) = face.indices.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(ValidationError::FaceIndexOutOfRange {
                    mesh: i,
                    face: f,
                    vertex,
                    count: vertex_count,
                });
            }
        }

        if let Some(normals) = &mesh.normals {
            check_length(i, "normal", vertex_count, normals.len())?;
        }
        for uvs in &mesh.uv_channels {
            check_length(i, "uv", vertex_count, uvs.len())?;
        }
    }

    Ok(())
}

fn check_length(
    mesh: usize,
    attribute: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ValidationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::AttributeLength {
            mesh,
            attribute,
            expected,
            actual,
        })
    }
}

fn validate_materials(scene: &Scene) -> Result<(), ValidationError> {
    let count = scene.textures.len();
    for (i, material) in scene.materials.iter().enumerate() {
        for slot in material.textures() {
            if let Some(texture) = slot.embedded_index().filter(|&t| t >= count) {
                return Err(ValidationError::EmbeddedTextureOutOfRange {
                    material: i,
                    texture,
                    count,
                });
            }
        }
    }
    Ok(())
}

/// Lights, cameras and animation channels must name an existing node.
fn validate_named_references(scene: &Scene) -> Result<(), ValidationError> {
    let names: HashSet<&str> = scene.nodes.iter().map(|n| n.name.as_str()).collect();

    let check = |kind: &'static str, name: &str| {
        if names.contains(name) {
            Ok(())
        } else {
            Err(ValidationError::UnknownNodeName {
                kind,
                name: name.to_string(),
            })
        }
    };

    for light in &scene.lights {
        check("light", &light.node_name)?;
    }
    for camera in &scene.cameras {
        check("camera", &camera.node_name)?;
    }
    for channel in scene.animations.iter().flat_map(|a| a.channels.iter()) {
        check("animation channel", &channel.node_name)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Camera, Face, Material, Mesh, Node, TextureSlot, TextureType};
    use ingot_math::Vec3;

    fn valid_scene() -> Scene {
        let mut scene = Scene::new("valid");
        scene.add_material(Material::new("default"));
        let mesh = scene.add_mesh(Mesh::new(
            "tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Face::triangle(0, 1, 2)],
        ));
        let child = scene.add_node(scene.root, Node::new("child"));
        scene.add_node(child, Node::new("leaf").with_meshes([mesh]));
        scene
    }

    #[test]
    fn test_valid_scene_passes() {
        assert_eq!(validate_scene(&valid_scene()), Ok(()));
        assert_eq!(validate_scene(&Scene::new("empty")), Ok(()));
    }

    #[test]
    fn test_material_index_out_of_range() {
        let mut scene = valid_scene();
        scene.meshes[0].material_index = 3;

        assert!(matches!(
            validate_scene(&scene),
            Err(ValidationError::MaterialIndexOutOfRange { material: 3, count: 1, .. })
        ));
    }

    #[test]
    fn test_faceless_mesh_needs_material_in_range() {
        let mut scene = Scene::new("points");
        let mut mesh = Mesh::new("pts", vec![Vec3::ZERO], vec![]);
        mesh.material_index = 7;
        let mesh = scene.add_mesh(mesh);
        scene.add_node(scene.root, Node::new("pts").with_meshes([mesh]));

        assert_eq!(
            validate_scene(&scene),
            Err(ValidationError::MissingMaterial { mesh: 0 })
        );

        scene.add_material(Material::new("default"));
        assert!(matches!(
            validate_scene(&scene),
            Err(ValidationError::MaterialIndexOutOfRange { material: 7, count: 1, .. })
        ));
    }

    #[test]
    fn test_node_mesh_out_of_range() {
        let mut scene = valid_scene();
        scene.nodes[1].meshes.push(7);

        assert!(matches!(
            validate_scene(&scene),
            Err(ValidationError::MeshIndexOutOfRange { mesh: 7, .. })
        ));
    }

    #[test]
    fn test_second_root_rejected() {
        let mut scene = valid_scene();
        scene.nodes.push(Node::new("orphan"));

        assert_eq!(
            validate_scene(&scene),
            Err(ValidationError::SecondRoot { node: NodeId(3) })
        );
    }

    #[test]
    fn test_cycle_rejected() {
        let mut scene = valid_scene();
        // leaf claims the intermediate node as its child: child -> leaf -> child
        scene.nodes[2].children.push(NodeId(1));
        scene.nodes[1].parent = Some(NodeId(2));
        scene.nodes[0].children.clear();

        assert!(validate_scene(&scene).is_err());
    }

    #[test]
    fn test_face_and_attribute_checks() {
        let mut scene = valid_scene();
        scene.meshes[0].faces.push(Face::triangle(0, 1, 9));
        assert!(matches!(
            validate_scene(&scene),
            Err(ValidationError::FaceIndexOutOfRange { vertex: 9, .. })
        ));

        let mut scene = valid_scene();
        scene.meshes[0].normals = Some(vec![Vec3::Z]);
        assert!(matches!(
            validate_scene(&scene),
            Err(ValidationError::AttributeLength { attribute: "normal", .. })
        ));
    }

    #[test]
    fn test_embedded_texture_reference() {
        let mut scene = valid_scene();
        scene.materials[0].set_texture(TextureSlot::new(TextureType::Diffuse, 0, "*0"));

        assert!(matches!(
            validate_scene(&scene),
            Err(ValidationError::EmbeddedTextureOutOfRange { texture: 0, count: 0, .. })
        ));
    }

    #[test]
    fn test_camera_must_name_a_node() {
        let mut scene = valid_scene();
        scene.cameras.push(Camera {
            node_name: "nowhere".to_string(),
            horizontal_fov: 1.0,
            clip_near: 0.1,
            clip_far: 100.0,
            aspect: 1.0,
        });

        assert!(matches!(
            validate_scene(&scene),
            Err(ValidationError::UnknownNodeName { kind: "camera", .. })
        ));
    }
}
