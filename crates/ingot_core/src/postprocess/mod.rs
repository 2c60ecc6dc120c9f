//! Post-process steps applied to a freshly parsed scene.
//!
//! Each step owns one [`PostProcess`] bit. The importer runs the steps
//! selected by the request flags in dependency order (see
//! [`Registry::schedule`](crate::importer::Registry::schedule)). A step must
//! leave the scene structurally valid or fail with a [`StepError`].

use std::path::Path;

use thiserror::Error;

use crate::config::ImportSettings;
use crate::importer::PostProcess;
use crate::io::IoSystem;
use crate::scene::Scene;

mod bounding_boxes;
mod embed_textures;
mod flip;
mod gen_normals;
mod remove_redundant_materials;
mod transform_uv;
mod triangulate;

pub use bounding_boxes::GenBoundingBoxes;
pub use embed_textures::EmbedTextures;
pub use flip::{FlipUvs, FlipWindingOrder};
pub use gen_normals::GenNormals;
pub use remove_redundant_materials::RemoveRedundantMaterials;
pub use transform_uv::TransformUvCoords;
pub use triangulate::Triangulate;

/// Failure of a single step.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Texture error: {0}")]
    Texture(#[from] crate::scene::TextureError),

    #[error("{0}")]
    Unsupported(String),
}

/// Read-only view of the import a step runs in.
pub struct StepContext<'a> {
    /// Path of the file being imported
    pub path: &'a Path,

    pub io: &'a dyn IoSystem,

    pub settings: &'a ImportSettings,
}

/// A transformation applied to a raw scene.
pub trait PostProcessStep: Send + Sync {
    /// Unique identifier, referenced by other steps' dependencies.
    fn id(&self) -> &str;

    /// The single request bit that selects this step.
    fn flag(&self) -> PostProcess;

    /// Ids of steps that must run strictly before this one when both are active.
    fn dependencies(&self) -> &[&str] {
        &[]
    }

    fn is_active(&self, flags: PostProcess) -> bool {
        flags.contains(self.flag())
    }

    fn execute(&self, scene: &mut Scene, ctx: &StepContext<'_>) -> Result<(), StepError>;
}

/// The built-in steps in registration order.
pub fn builtin_steps() -> Vec<Box<dyn PostProcessStep>> {
    vec![
        Box::new(Triangulate),
        Box::new(FlipWindingOrder),
        Box::new(GenNormals),
        Box::new(TransformUvCoords),
        Box::new(FlipUvs),
        Box::new(RemoveRedundantMaterials),
        Box::new(EmbedTextures),
        Box::new(GenBoundingBoxes),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_steps_are_distinct() {
        let steps = builtin_steps();
        let ids: HashSet<_> = steps.iter().map(|s| s.id().to_string()).collect();
        let bits = steps.iter().fold(0u32, |acc, s| acc | s.flag().bits());

        assert_eq!(steps.len(), 8);
        assert_eq!(ids.len(), 8);
        assert_eq!(bits, 0xff);
        assert!(steps.iter().all(|s| s.flag().is_single_bit()));
    }
}
