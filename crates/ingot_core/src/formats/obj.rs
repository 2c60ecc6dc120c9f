//! Wavefront OBJ worker built on `tobj`.
//!
//! Each OBJ object becomes one mesh under its own node below the root.
//! Materials come from the referenced MTL libraries, read through the same
//! I/O system as the OBJ file itself.

use std::io::{BufReader, Cursor};
use std::path::Path;

use ingot_math::{Vec2, Vec3};

use super::{scene_name, DEFAULT_MATERIAL_NAME};
use crate::config::ImportSettings;
use crate::importer::{
    has_extension, search_file_header_for_tokens, FormatError, FormatWorker, SIGNATURE_SEARCH_BYTES,
};
use crate::io::{self, IoSystem};
use crate::scene::{
    Face, Material, MaterialKey, Mesh, Node, Scene, SceneFlags, ShadingModel, TextureSlot,
    TextureType,
};

const EXTENSIONS: &[&str] = &["obj"];

const HEADER_TOKENS: &[&str] = &["mtllib", "usemtl", "v ", "vt ", "vn ", "o ", "g ", "f "];

/// Wavefront OBJ format worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjWorker;

impl FormatWorker for ObjWorker {
    fn name(&self) -> &str {
        "obj"
    }

    fn extensions(&self) -> &[&str] {
        EXTENSIONS
    }

    fn can_read(&self, path: &Path, io: &dyn IoSystem, check_signature: bool) -> bool {
        if !check_signature {
            return has_extension(path, EXTENSIONS);
        }
        search_file_header_for_tokens(io, path, HEADER_TOKENS, SIGNATURE_SEARCH_BYTES)
    }

    fn read(
        &self,
        path: &Path,
        io: &dyn IoSystem,
        settings: &ImportSettings,
    ) -> Result<Scene, FormatError> {
        let bytes = io::read_to_end(io, path)?;
        let mut reader = BufReader::new(Cursor::new(bytes));

        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: settings.obj_triangulate_on_load,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let (models, materials) = tobj::load_obj_buf(&mut reader, &options, |mtl_path| {
            let mtl_bytes = io::read_to_end(io, &base_dir.join(mtl_path))
                .map_err(|_| tobj::LoadError::OpenFileFailed)?;
            tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl_bytes)))
        })
        .map_err(|e| FormatError::Malformed(e.to_string()))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!(
                "{}: material library not loaded ({}), using default material",
                path.display(),
                e
            );
            Vec::new()
        });

        let mut scene = Scene::new(scene_name(path));
        for material in &materials {
            scene.add_material(convert_material(material));
        }

        let mut default_material = None;
        for model in &models {
            let mut mesh = convert_mesh(model)?;

            mesh.material_index = match model.mesh.material_id {
                Some(id) if id < scene.materials.len() => id,
                other => {
                    if let Some(id) = other {
                        log::warn!("Mesh '{}' references unknown material {}", model.name, id);
                    }
                    *default_material.get_or_insert_with(|| {
                        scene.add_material(
                            Material::new(DEFAULT_MATERIAL_NAME)
                                .with(MaterialKey::DiffuseColor, Vec3::splat(0.6))
                                .with(MaterialKey::ShadingModel, ShadingModel::Gouraud),
                        )
                    })
                }
            };

            let mesh_index = scene.add_mesh(mesh);
            scene.add_node(scene.root, Node::new(model.name.clone()).with_meshes([mesh_index]));
        }

        if scene.meshes.is_empty() {
            scene.flags.insert(SceneFlags::INCOMPLETE);
        } else {
            scene.flags.insert(SceneFlags::NON_VERBOSE_FORMAT);
        }

        log::debug!(
            "OBJ {}: {} objects, {} materials",
            path.display(),
            models.len(),
            materials.len()
        );

        Ok(scene)
    }
}

fn convert_mesh(model: &tobj::Model) -> Result<Mesh, FormatError> {
    let source = &model.mesh;

    let positions: Vec<Vec3> = source
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    let mut faces = Vec::new();
    if source.face_arities.is_empty() {
        faces.extend(
            source
                .indices
                .chunks_exact(3)
                .map(|t| Face::triangle(t[0], t[1], t[2])),
        );
    } else {
        let mut start = 0usize;
        for &arity in &source.face_arities {
            let end = start + arity as usize;
            let indices = source.indices.get(start..end).ok_or_else(|| {
                FormatError::Malformed(format!(
                    "object '{}' has fewer indices than its face sizes require",
                    model.name
                ))
            })?;
            faces.push(Face::new(indices.to_vec()));
            start = end;
        }
    }

    let mut mesh = Mesh::new(model.name.clone(), positions, faces);

    if !source.normals.is_empty() {
        let normals: Vec<Vec3> = source
            .normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect();
        if normals.len() == mesh.vertex_count() {
            mesh.normals = Some(normals);
        } else {
            log::warn!(
                "Object '{}': ignoring {} normals for {} vertices",
                model.name,
                normals.len(),
                mesh.vertex_count()
            );
        }
    }

    if !source.texcoords.is_empty() {
        let uvs: Vec<Vec2> = source
            .texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect();
        if uvs.len() == mesh.vertex_count() {
            mesh.uv_channels.push(uvs);
        } else {
            log::warn!(
                "Object '{}': ignoring {} texture coordinates for {} vertices",
                model.name,
                uvs.len(),
                mesh.vertex_count()
            );
        }
    }

    Ok(mesh)
}

fn convert_material(source: &tobj::Material) -> Material {
    let mut material = Material::new(source.name.clone());

    if let Some(c) = source.diffuse {
        material.set(MaterialKey::DiffuseColor, Vec3::from(c));
    }
    if let Some(c) = source.specular {
        material.set(MaterialKey::SpecularColor, Vec3::from(c));
    }
    if let Some(c) = source.ambient {
        material.set(MaterialKey::AmbientColor, Vec3::from(c));
    }
    if let Some(s) = source.shininess {
        material.set(MaterialKey::Shininess, s);
    }
    if let Some(d) = source.dissolve {
        material.set(MaterialKey::Opacity, d);
    }
    if let Some(ior) = source.optical_density {
        material.set(MaterialKey::RefractiveIndex, ior);
    }

    let shading = source
        .illumination_model
        .map(ShadingModel::from_illumination_model)
        .unwrap_or(ShadingModel::Gouraud);
    material.set(MaterialKey::ShadingModel, shading);

    let maps = [
        (TextureType::Diffuse, &source.diffuse_texture),
        (TextureType::Specular, &source.specular_texture),
        (TextureType::Ambient, &source.ambient_texture),
        (TextureType::Normals, &source.normal_texture),
        (TextureType::Shininess, &source.shininess_texture),
        (TextureType::Opacity, &source.dissolve_texture),
    ];
    for (texture_type, map) in maps {
        if let Some(file) = map.as_deref().filter(|f| !f.is_empty()) {
            material.set_texture(TextureSlot::new(texture_type, 0, file));
        }
    }

    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryIoSystem;

    const CUBE_FACE_OBJ: &str = "\
mtllib quad.mtl
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl red
f 1/1 2/2 3/3 4/4
";

    const QUAD_MTL: &str = "\
newmtl red
Kd 1 0 0
d 0.5
illum 2
map_Kd red.png
";

    fn io() -> MemoryIoSystem {
        MemoryIoSystem::new()
            .with_file("models/quad.obj", CUBE_FACE_OBJ)
            .with_file("models/quad.mtl", QUAD_MTL)
    }

    #[test]
    fn test_can_read() {
        let io = io();
        let worker = ObjWorker;

        assert!(worker.can_read(Path::new("models/quad.obj"), &io, false));
        assert!(!worker.can_read(Path::new("models/quad.mtl"), &io, false));
        assert!(worker.can_read(Path::new("models/quad.obj"), &io, true));
        assert!(!worker.can_read(Path::new("missing.obj"), &io, true));
    }

    #[test]
    fn test_read_quad_with_material() {
        let scene = ObjWorker
            .read(Path::new("models/quad.obj"), &io(), &ImportSettings::default())
            .unwrap();

        assert_eq!(scene.name, "quad");
        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.node_count(), 2);

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0].len(), 4);
        assert_eq!(mesh.uv_channels.len(), 1);

        let material = &scene.materials[mesh.material_index];
        assert_eq!(material.name(), "red");
        assert_eq!(material.diffuse_color(), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(material.opacity(), Some(0.5));
        assert_eq!(material.shading_model(), Some(ShadingModel::Phong));
        assert_eq!(
            material.texture(TextureType::Diffuse, 0).map(|s| s.path.as_str()),
            Some("red.png")
        );
    }

    #[test]
    fn test_triangulate_on_load() {
        let settings = ImportSettings {
            obj_triangulate_on_load: true,
            ..Default::default()
        };
        let scene = ObjWorker
            .read(Path::new("models/quad.obj"), &io(), &settings)
            .unwrap();

        assert_eq!(scene.meshes[0].faces.len(), 2);
        assert!(scene.meshes[0].is_triangulated());
    }

    #[test]
    fn test_missing_mtl_falls_back_to_default_material() {
        let io = MemoryIoSystem::new().with_file("quad.obj", CUBE_FACE_OBJ);
        let scene = ObjWorker
            .read(Path::new("quad.obj"), &io, &ImportSettings::default())
            .unwrap();

        assert_eq!(scene.material_count(), 1);
        assert_eq!(scene.materials[0].name(), DEFAULT_MATERIAL_NAME);
        assert_eq!(scene.meshes[0].material_index, 0);
    }
}
