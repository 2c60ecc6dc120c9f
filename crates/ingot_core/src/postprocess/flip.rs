//! Winding and texture-space flips.

use super::{PostProcessStep, StepContext, StepError};
use crate::importer::PostProcess;
use crate::scene::Scene;

/// Reverses the index order of every face, turning CCW into CW and back.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlipWindingOrder;

impl PostProcessStep for FlipWindingOrder {
    fn id(&self) -> &str {
        "flip_winding_order"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::FLIP_WINDING_ORDER
    }

    fn execute(&self, scene: &mut Scene, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        for face in scene.meshes.iter_mut().flat_map(|m| m.faces.iter_mut()) {
            face.indices.reverse();
        }
        Ok(())
    }
}

/// Mirrors every UV channel vertically (`v = 1 - v`).
#[derive(Clone, Copy, Debug, Default)]
pub struct FlipUvs;

impl PostProcessStep for FlipUvs {
    fn id(&self) -> &str {
        "flip_uvs"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::FLIP_UVS
    }

    /// UV transforms are authored in the unflipped space.
    fn dependencies(&self) -> &[&str] {
        &["transform_uv_coords"]
    }

    fn execute(&self, scene: &mut Scene, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        for uv in scene
            .meshes
            .iter_mut()
            .flat_map(|m| m.uv_channels.iter_mut())
            .flat_map(|channel| channel.iter_mut())
        {
            uv.y = 1.0 - uv.y;
        }
        Ok(())
    }
}
