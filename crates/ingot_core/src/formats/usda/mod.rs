//! USD ASCII worker.
//!
//! Parsing produces an intermediate prim tree ([`types`]), which is then
//! converted into a [`Scene`]: Xform and Scope prims become nodes, each Mesh
//! becomes a node carrying one mesh, and Material prims become scene
//! materials bound through `material:binding`.

use std::collections::HashMap;
use std::path::Path;

use ingot_math::Vec3;

use super::{scene_name, DEFAULT_MATERIAL_NAME};
use crate::config::ImportSettings;
use crate::importer::{check_magic_token, has_extension, FormatError, FormatWorker};
use crate::io::{self, IoSystem};
use crate::scene::{
    Material, MaterialKey, Mesh, Node, NodeId, Scene, SceneFlags, ShadingModel, TextureMapMode,
    TextureSlot, TextureType,
};

pub mod parser;
pub mod types;

pub use parser::{parse_usda, ParseError, UsdaParser};
pub use types::*;

const EXTENSIONS: &[&str] = &["usda"];

/// USD ASCII format worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct UsdaWorker;

impl FormatWorker for UsdaWorker {
    fn name(&self) -> &str {
        "usda"
    }

    fn extensions(&self) -> &[&str] {
        EXTENSIONS
    }

    fn can_read(&self, path: &Path, io: &dyn IoSystem, check_signature: bool) -> bool {
        if !check_signature {
            return has_extension(path, EXTENSIONS);
        }
        check_magic_token(io, path, 0, &[b"#usda".as_slice()])
    }

    fn read(
        &self,
        path: &Path,
        io: &dyn IoSystem,
        _settings: &ImportSettings,
    ) -> Result<Scene, FormatError> {
        let content = io::read_to_string(io, path)?;
        let prims = parse_usda(&content)?;

        log::debug!("USDA {}: {} root prims", path.display(), prims.len());

        let mut builder = SceneBuilder::new(scene_name(path));
        builder.collect_materials(&prims);
        let root = builder.scene.root;
        builder.add_prims(&prims, root, None)?;

        Ok(builder.finish())
    }
}

struct SceneBuilder {
    scene: Scene,
    /// Material prim path to scene material index
    materials: HashMap<String, usize>,
    default_material: Option<usize>,
}

impl SceneBuilder {
    fn new(name: String) -> Self {
        Self {
            scene: Scene::new(name),
            materials: HashMap::new(),
            default_material: None,
        }
    }

    /// Register every Material prim up front so bindings resolve regardless
    /// of declaration order.
    fn collect_materials(&mut self, prims: &[UsdPrim]) {
        for prim in prims {
            match prim {
                UsdPrim::Material(material) => {
                    let index = self.scene.add_material(convert_material(material));
                    self.materials.insert(material.path.clone(), index);
                }
                UsdPrim::Xform(xform) => self.collect_materials(&xform.children),
                _ => {}
            }
        }
    }

    fn add_prims(
        &mut self,
        prims: &[UsdPrim],
        parent: NodeId,
        inherited_binding: Option<&str>,
    ) -> Result<(), FormatError> {
        for prim in prims {
            match prim {
                UsdPrim::Xform(xform) => {
                    let node = self.scene.add_node(
                        parent,
                        Node::new(xform.name.clone()).with_transform(xform.transform),
                    );
                    let binding = xform.material_binding.as_deref().or(inherited_binding);
                    self.add_prims(&xform.children, node, binding)?;
                }
                UsdPrim::Mesh(usd_mesh) => {
                    let binding = usd_mesh.material_binding.as_deref().or(inherited_binding);
                    let mut mesh = convert_mesh(usd_mesh)?;
                    mesh.material_index = self.resolve_binding(&usd_mesh.path, binding);

                    let mesh_index = self.scene.add_mesh(mesh);
                    self.scene.add_node(
                        parent,
                        Node::new(usd_mesh.name.clone())
                            .with_transform(usd_mesh.transform)
                            .with_meshes([mesh_index]),
                    );
                }
                UsdPrim::Material(_) | UsdPrim::Shader(_) | UsdPrim::Unknown(_) => {}
            }
        }

        Ok(())
    }

    fn resolve_binding(&mut self, mesh_path: &str, binding: Option<&str>) -> usize {
        if let Some(target) = binding {
            if let Some(&index) = self.materials.get(target) {
                return index;
            }
            log::warn!(
                "Mesh {} binds unknown material {}, using default material",
                mesh_path,
                target
            );
        }

        let scene = &mut self.scene;
        *self.default_material.get_or_insert_with(|| {
            scene.add_material(
                Material::new(DEFAULT_MATERIAL_NAME)
                    .with(MaterialKey::DiffuseColor, Vec3::splat(0.6))
                    .with(MaterialKey::ShadingModel, ShadingModel::Gouraud),
            )
        })
    }

    fn finish(mut self) -> Scene {
        if self.scene.meshes.is_empty() {
            self.scene.flags.insert(SceneFlags::INCOMPLETE);
        } else {
            self.scene.flags.insert(SceneFlags::NON_VERBOSE_FORMAT);
        }
        self.scene
    }
}

fn convert_mesh(usd_mesh: &UsdMesh) -> Result<Mesh, FormatError> {
    let faces = usd_mesh
        .faces()
        .map_err(|e| FormatError::Malformed(format!("mesh {}: {}", usd_mesh.path, e)))?;

    let mut mesh = Mesh::new(usd_mesh.name.clone(), usd_mesh.points.clone(), faces);
    let vertex_count = mesh.vertex_count();

    if let Some(normals) = &usd_mesh.normals {
        if normals.len() == vertex_count {
            mesh.normals = Some(normals.clone());
        } else {
            // Face-varying normals are left for gen_normals to rebuild
            log::debug!(
                "Mesh {}: ignoring {} normals for {} points",
                usd_mesh.path,
                normals.len(),
                vertex_count
            );
        }
    }

    if let Some(st) = &usd_mesh.st {
        if st.len() == vertex_count {
            mesh.uv_channels.push(st.clone());
        } else {
            log::warn!(
                "Mesh {}: ignoring {} texture coordinates for {} points",
                usd_mesh.path,
                st.len(),
                vertex_count
            );
        }
    }

    Ok(mesh)
}

/// Texture role of a `UsdPreviewSurface` input.
fn texture_type_for_input(input: &str) -> TextureType {
    match input {
        "diffuseColor" => TextureType::Diffuse,
        "emissiveColor" => TextureType::Emissive,
        "specularColor" => TextureType::Specular,
        "normal" => TextureType::Normals,
        "metallic" => TextureType::Metalness,
        "roughness" => TextureType::DiffuseRoughness,
        "opacity" => TextureType::Opacity,
        "occlusion" => TextureType::AmbientOcclusion,
        "displacement" => TextureType::Displacement,
        _ => TextureType::Unknown,
    }
}

fn wrap_mode(shader: &UsdShader, input: &str) -> TextureMapMode {
    match shader.input(input) {
        Some(UsdValue::Token(mode)) => match mode.as_str() {
            "clamp" => TextureMapMode::Clamp,
            "mirror" => TextureMapMode::Mirror,
            "black" => TextureMapMode::Decal,
            _ => TextureMapMode::Wrap,
        },
        _ => TextureMapMode::Wrap,
    }
}

fn convert_material(usd_material: &UsdMaterial) -> Material {
    let mut material = Material::new(usd_material.name.clone());

    let Some(surface) = usd_material.surface() else {
        log::debug!("Material {} has no surface shader", usd_material.path);
        material.set(MaterialKey::ShadingModel, ShadingModel::Gouraud);
        return material;
    };

    material.set(MaterialKey::ShadingModel, ShadingModel::PbrMetallicRoughness);

    for (input, value) in &surface.inputs {
        match (input.as_str(), value) {
            ("diffuseColor", UsdValue::Color(c)) => {
                material.set(MaterialKey::DiffuseColor, *c);
                material.set(MaterialKey::BaseColor, *c);
            }
            ("emissiveColor", UsdValue::Color(c)) => material.set(MaterialKey::EmissiveColor, *c),
            ("specularColor", UsdValue::Color(c)) => material.set(MaterialKey::SpecularColor, *c),
            ("metallic", UsdValue::Float(v)) => material.set(MaterialKey::Metallic, *v),
            ("roughness", UsdValue::Float(v)) => material.set(MaterialKey::Roughness, *v),
            ("opacity", UsdValue::Float(v)) => material.set(MaterialKey::Opacity, *v),
            ("ior", UsdValue::Float(v)) => material.set(MaterialKey::RefractiveIndex, *v),
            (_, UsdValue::Connection(source)) => {
                let Some(texture) = usd_material.shader(source) else {
                    log::warn!(
                        "Material {}: input {} connects to unknown shader {}",
                        usd_material.path,
                        input,
                        source
                    );
                    continue;
                };
                let Some(UsdValue::Asset(file)) = texture.input("file") else {
                    continue;
                };

                let texture_type = texture_type_for_input(input);
                let index = material.texture_count(texture_type) as u32;
                let slot = TextureSlot::new(texture_type, index, file.clone()).with_map_mode([
                    wrap_mode(texture, "wrapS"),
                    wrap_mode(texture, "wrapT"),
                    TextureMapMode::Wrap,
                ]);
                material.set_texture(slot);
            }
            _ => log::debug!(
                "Material {}: ignoring input {}",
                usd_material.path,
                input
            ),
        }
    }

    material
}
