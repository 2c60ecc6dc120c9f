use std::collections::HashMap;
use std::io;
use std::path::Path;

use super::{PostProcessStep, StepContext, StepError};
use crate::importer::PostProcess;
use crate::io::read_to_end;
use crate::scene::{Scene, Texture};

/// Loads file-referenced textures into the scene.
///
/// Paths resolve relative to the imported file's directory, through the
/// importer's I/O system. Each distinct path is embedded once; every slot
/// that names it is rewritten to `*N`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbedTextures;

impl PostProcessStep for EmbedTextures {
    fn id(&self) -> &str {
        "embed_textures"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::EMBED_TEXTURES
    }

    /// Textures of dropped materials are not loaded.
    fn dependencies(&self) -> &[&str] {
        &["remove_redundant_materials"]
    }

    fn execute(&self, scene: &mut Scene, ctx: &StepContext<'_>) -> Result<(), StepError> {
        let base_dir = ctx.path.parent().unwrap_or_else(|| Path::new(""));
        let mut embedded: HashMap<String, usize> = HashMap::new();

        for material in &mut scene.materials {
            for slot in material.textures_mut() {
                if slot.path.starts_with('*') {
                    continue;
                }

                let index = match embedded.get(&slot.path) {
                    Some(&index) => index,
                    None => {
                        let file = base_dir.join(&slot.path);
                        let bytes = read_to_end(ctx.io, &file).map_err(|e| {
                            io::Error::new(e.kind(), format!("{}: {}", file.display(), e))
                        })?;
                        let texture = Texture::from_compressed(slot.path.clone(), bytes)?;

                        log::debug!(
                            "Embedded {} ({}x{} {})",
                            file.display(),
                            texture.width,
                            texture.height,
                            texture.format_hint
                        );

                        scene.textures.push(texture);
                        let index = scene.textures.len() - 1;
                        embedded.insert(slot.path.clone(), index);
                        index
                    }
                };

                slot.path = format!("*{index}");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::io::MemoryIoSystem;
    use crate::postprocess::testing;
    use crate::scene::{Material, TextureSlot, TextureType};
    use crate::test_support::png_bytes;

    fn scene(paths: &[&str]) -> Scene {
        let mut scene = Scene::new("s");
        for (i, path) in paths.iter().enumerate() {
            let slot = TextureSlot::new(TextureType::Diffuse, 0, *path);
            scene.add_material(Material::new(format!("m{i}")).with_texture(slot));
        }
        scene
    }

    #[test]
    fn test_embeds_and_rewrites_paths() {
        // testing::run_with resolves relative to "scene.test", i.e. the current dir
        let io = MemoryIoSystem::new()
            .with_file("wood.png", png_bytes(4, 2))
            .with_file("tex/metal.png", png_bytes(1, 1));
        let mut scene = scene(&["wood.png", "tex/metal.png", "wood.png", "*0"]);

        testing::run_with(&EmbedTextures, &mut scene, &io, &ImportSettings::default()).unwrap();

        assert_eq!(scene.texture_count(), 2);
        assert_eq!((scene.textures[0].width, scene.textures[0].height), (4, 2));
        assert_eq!(scene.textures[0].format_hint, "png");
        assert_eq!(scene.textures[1].filename, "tex/metal.png");

        let paths: Vec<_> = scene
            .materials
            .iter()
            .map(|m| m.texture(TextureType::Diffuse, 0).unwrap().path.clone())
            .collect();
        assert_eq!(paths, vec!["*0", "*1", "*0", "*0"]);
    }

    #[test]
    fn test_missing_texture_fails() {
        let mut scene = scene(&["missing.png"]);
        let err = testing::run(&EmbedTextures, &mut scene).unwrap_err();

        assert!(matches!(&err, StepError::Io(e) if e.kind() == io::ErrorKind::NotFound));
        assert!(err.to_string().contains("missing.png"));
        assert_eq!(scene.texture_count(), 0);
    }

    #[test]
    fn test_undecodable_texture_fails() {
        let io = MemoryIoSystem::new().with_file("junk.png", b"definitely not an image".to_vec());
        let mut scene = scene(&["junk.png"]);

        let err = testing::run_with(&EmbedTextures, &mut scene, &io, &ImportSettings::default())
            .unwrap_err();
        assert!(matches!(err, StepError::Texture(_)));
    }
}
