//! Example: Import a 3D file and print what came out.
//!
//! Run with: cargo run --example inspect -- model.obj [settings.json]

use std::env;

use anyhow::{bail, Context, Result};
use ingot_core::{ImportSettings, Importer, PostProcess};
use ingot_math::Vec3;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: inspect <path-to-model> [settings.json]");
        println!("\nExamples:");
        println!("  cargo run --example inspect -- assets/cube.usda");
        println!("  cargo run --example inspect -- assets/teapot.obj settings.json");
        return Ok(());
    }

    let settings = match args.get(2) {
        Some(path) => ImportSettings::from_json_file(path)
            .with_context(|| format!("loading settings from {}", path))?,
        None => ImportSettings::default(),
    };

    let mut importer = Importer::new().with_settings(settings);
    println!("Supported: {}", importer.extension_list());

    let path = &args[1];
    println!("Importing: {}", path);

    let flags = PostProcess::TRIANGULATE
        | PostProcess::GEN_NORMALS
        | PostProcess::REMOVE_REDUNDANT_MATERIALS
        | PostProcess::GEN_BOUNDING_BOXES;

    let Some(scene) = importer.read_file(path, flags) else {
        bail!("import failed: {}", importer.error_string());
    };

    println!("\n=== Scene: {} ===", scene.name);
    println!("Nodes: {}", scene.node_count());
    println!("Meshes: {}", scene.mesh_count());
    println!("Materials: {}", scene.material_count());
    println!("Embedded textures: {}", scene.texture_count());
    println!("Total triangles: {}", scene.total_triangle_count());

    println!("\n--- Nodes ---");
    for id in scene.descendants(scene.root) {
        let node = &scene.nodes[id.index()];
        let pos = scene.world_transform(id).transform_point3(Vec3::ZERO);
        println!(
            "  {} {} at ({:.2}, {:.2}, {:.2}) meshes {:?}",
            id, node.name, pos.x, pos.y, pos.z, node.meshes
        );
    }

    println!("\n--- Meshes ---");
    for (i, mesh) in scene.meshes.iter().enumerate() {
        println!(
            "  [{}] {} - {} vertices, {} faces, material {}",
            i,
            mesh.name,
            mesh.vertex_count(),
            mesh.face_count(),
            scene.materials[mesh.material_index].name()
        );
    }

    println!("\n--- Materials ---");
    for material in &scene.materials {
        println!("  {}", material.name());
        for slot in material.textures() {
            println!("       {:?}[{}]: {}", slot.texture_type(), slot.index(), slot.path);
        }
    }

    let bounds = scene.world_bounds();
    println!("\n--- World Bounds ---");
    println!("  Min: ({:.2}, {:.2}, {:.2})", bounds.min.x, bounds.min.y, bounds.min.z);
    println!("  Max: ({:.2}, {:.2}, {:.2})", bounds.max.x, bounds.max.y, bounds.max.z);

    Ok(())
}
