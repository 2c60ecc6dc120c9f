use super::{PostProcessStep, StepContext, StepError};
use crate::importer::PostProcess;
use crate::scene::Scene;

/// Recomputes each mesh's axis-aligned bounds from its positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenBoundingBoxes;

impl PostProcessStep for GenBoundingBoxes {
    fn id(&self) -> &str {
        "gen_bounding_boxes"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::GEN_BOUNDING_BOXES
    }

    fn dependencies(&self) -> &[&str] {
        &["triangulate"]
    }

    fn execute(&self, scene: &mut Scene, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        for mesh in &mut scene.meshes {
            mesh.update_bounds();
        }
        Ok(())
    }
}
