use super::{PostProcessStep, StepContext, StepError};
use crate::importer::PostProcess;
use crate::scene::Scene;

/// Generates smooth vertex normals.
///
/// Meshes that already carry a matching normal array keep it unless
/// `force_gen_normals` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenNormals;

impl PostProcessStep for GenNormals {
    fn id(&self) -> &str {
        "gen_normals"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::GEN_NORMALS
    }

    fn dependencies(&self) -> &[&str] {
        &["triangulate", "flip_winding_order"]
    }

    fn execute(&self, scene: &mut Scene, ctx: &StepContext<'_>) -> Result<(), StepError> {
        let force = ctx.settings.force_gen_normals;

        for mesh in &mut scene.meshes {
            if force {
                mesh.compute_normals();
            } else {
                mesh.ensure_normals();
            }
        }

        Ok(())
    }
}
