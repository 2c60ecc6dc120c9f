use super::{PostProcessStep, StepContext, StepError};
use crate::importer::PostProcess;
use crate::scene::Scene;

/// Drops materials no mesh uses and remaps the mesh material indices.
///
/// Materials named in `keep_materials` survive regardless. A mesh pointing
/// past the material list fails the step instead of being remapped.
#[derive(Clone, Copy, Debug, Default)]
pub struct RemoveRedundantMaterials;

impl PostProcessStep for RemoveRedundantMaterials {
    fn id(&self) -> &str {
        "remove_redundant_materials"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::REMOVE_REDUNDANT_MATERIALS
    }

    fn execute(&self, scene: &mut Scene, ctx: &StepContext<'_>) -> Result<(), StepError> {
        let count = scene.materials.len();
        if let Some(mesh) = scene.meshes.iter().find(|m| m.material_index >= count) {
            return Err(StepError::Unsupported(format!(
                "mesh '{}' references material {}, but the scene has {} materials",
                mesh.name, mesh.material_index, count
            )));
        }

        let mut keep: Vec<bool> = scene
            .materials
            .iter()
            .map(|m| ctx.settings.keeps_material(&m.name()))
            .collect();
        for mesh in &scene.meshes {
            keep[mesh.material_index] = true;
        }

        let mut remap = Vec::with_capacity(keep.len());
        let mut next = 0usize;
        for &kept in &keep {
            remap.push(kept.then(|| {
                next += 1;
                next - 1
            }));
        }

        let before = scene.materials.len();
        let mut index = 0;
        scene.materials.retain(|_| {
            index += 1;
            keep[index - 1]
        });

        for mesh in &mut scene.meshes {
            if let Some(index) = remap[mesh.material_index] {
                mesh.material_index = index;
            }
        }

        log::debug!(
            "Removed {} unreferenced materials, {} remain",
            before - scene.materials.len(),
            scene.materials.len()
        );

        Ok(())
    }
}
