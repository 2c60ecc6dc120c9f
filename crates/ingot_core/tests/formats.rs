//! The built-in USDA and OBJ workers driven through the full importer.

mod common;

use std::io::Cursor;

use common::init_logging;
use ingot_core::scene::SceneFlags;
use ingot_core::{ImportError, Importer, MemoryIoSystem, PostProcess, TextureType};

const CUBE_OBJ: &str = "\
# unit cube, one quad per side
mtllib cube.mtl
o cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
usemtl wood
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

const CUBE_MTL: &str = "\
newmtl unused
Kd 1 1 1

newmtl wood
Kd 0.5 0.3 0.1
map_Kd tex/wood.png
";

const QUAD_USDA: &str = r#"#usda 1.0
(
    upAxis = "Y"
)

def Xform "World"
{
    def Mesh "Quad"
    {
        point3f[] points = [(0, 0, 0), (1, 0, 0), (1, 1, 0), (0, 1, 0)]
        int[] faceVertexCounts = [4]
        int[] faceVertexIndices = [0, 1, 2, 3]
    }
}
"#;

fn png() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([40, 90, 20, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn io() -> MemoryIoSystem {
    MemoryIoSystem::new()
        .with_file("assets/cube.obj", CUBE_OBJ)
        .with_file("assets/cube.mtl", CUBE_MTL)
        .with_file("assets/tex/wood.png", png())
        .with_file("assets/quad.usda", QUAD_USDA)
        .with_file("lonely/cube.obj", CUBE_OBJ)
        .with_file("lonely/cube.mtl", CUBE_MTL)
}

fn full_flags() -> PostProcess {
    PostProcess::TRIANGULATE
        | PostProcess::GEN_NORMALS
        | PostProcess::FLIP_UVS
        | PostProcess::REMOVE_REDUNDANT_MATERIALS
        | PostProcess::EMBED_TEXTURES
        | PostProcess::GEN_BOUNDING_BOXES
}

#[test]
fn test_obj_full_pipeline() {
    init_logging();
    let mut importer = Importer::new().with_io_system(io());

    let scene = importer.read_file("assets/cube.obj", full_flags()).unwrap();

    assert_eq!(scene.name, "cube");
    assert!(scene.flags.contains(SceneFlags::NON_VERBOSE_FORMAT));
    assert_eq!(scene.mesh_count(), 1);

    let mesh = &scene.meshes[0];
    assert!(mesh.is_triangulated());
    assert_eq!(mesh.face_count(), 12);
    assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(mesh.vertex_count()));
    assert!((mesh.bounds.max - ingot_math::Vec3::ONE).length() < 0.001);

    // "unused" is dropped, "wood" embedded once
    assert_eq!(scene.material_count(), 1);
    let wood = &scene.materials[mesh.material_index];
    assert_eq!(wood.name(), "wood");
    assert_eq!(wood.texture(TextureType::Diffuse, 0).unwrap().path, "*0");
    assert_eq!(scene.texture_count(), 1);
    assert_eq!(scene.textures[0].width, 2);
}

#[test]
fn test_missing_texture_fails_embed_step() {
    init_logging();
    let mut importer = Importer::new().with_io_system(io());

    let err = importer
        .try_read_file("lonely/cube.obj", PostProcess::EMBED_TEXTURES)
        .unwrap_err();

    match err {
        ImportError::PostProcess { step, message } => {
            assert_eq!(step, "embed_textures");
            assert!(message.contains("wood.png"));
        }
        other => panic!("unexpected error {:?}", other),
    }

    // Without the step the same file imports fine
    assert!(importer.read_file("lonely/cube.obj", PostProcess::empty()).is_some());
}

#[test]
fn test_usda_through_importer() {
    init_logging();
    let mut importer = Importer::new().with_io_system(io());

    let scene = importer
        .read_file("assets/quad.usda", PostProcess::TRIANGULATE | PostProcess::GEN_NORMALS)
        .unwrap();

    assert_eq!(scene.name, "quad");
    assert_eq!(scene.node_count(), 3);
    assert_eq!(scene.meshes[0].face_count(), 2);
    assert!(scene.meshes[0].has_normals());
    assert_eq!(scene.materials[0].name(), "DefaultMaterial");
}

#[test]
fn test_read_from_memory_usda() {
    init_logging();
    let mut importer = Importer::new();

    let scene = importer
        .read_from_memory(QUAD_USDA.as_bytes(), "usda", PostProcess::empty())
        .unwrap();
    assert_eq!(scene.mesh_count(), 1);

    // Unknown hint and no signature match
    assert!(importer.read_from_memory(b"\x00\x01\x02", "bin", PostProcess::empty()).is_none());
    assert!(matches!(
        importer.last_error(),
        Some(ImportError::NoSuitableImporter { .. })
    ));
}

#[test]
fn test_imports_are_idempotent() {
    init_logging();
    let import = || {
        let mut importer = Importer::new().with_io_system(io());
        let dump = importer
            .read_file("assets/cube.obj", full_flags())
            .map(|scene| format!("{:?}", scene));
        dump
    };

    let first = import().unwrap();
    let second = import().unwrap();
    assert_eq!(first, second);
}
