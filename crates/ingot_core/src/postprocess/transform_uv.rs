use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::{PostProcessStep, StepContext, StepError};
use crate::importer::PostProcess;
use crate::scene::{Scene, UvTransform};

/// Bakes texture-slot UV transforms into the mesh UV channels.
///
/// Afterwards no slot carries a transform. Two slots that sample the same
/// channel of one mesh with different transforms cannot both be baked, so
/// that case is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransformUvCoords;

impl PostProcessStep for TransformUvCoords {
    fn id(&self) -> &str {
        "transform_uv_coords"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::TRANSFORM_UV_COORDS
    }

    fn execute(&self, scene: &mut Scene, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        // (mesh, uv channel) -> transform to bake
        let mut plan: HashMap<(usize, u32), UvTransform> = HashMap::new();

        for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
            let Some(material) = scene.materials.get(mesh.material_index) else {
                continue;
            };

            for slot in material.textures() {
                let Some(transform) = slot.uv_transform.filter(|t| !t.is_identity()) else {
                    continue;
                };

                match plan.entry((mesh_index, slot.uv_channel)) {
                    Entry::Vacant(entry) => {
                        entry.insert(transform);
                    }
                    Entry::Occupied(entry) if *entry.get() != transform => {
                        return Err(StepError::Unsupported(format!(
                            "mesh '{}' samples UV channel {} with conflicting transforms",
                            mesh.name, slot.uv_channel
                        )));
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }

        for ((mesh_index, channel), transform) in plan {
            let mesh = &mut scene.meshes[mesh_index];
            match mesh.uv_channels.get_mut(channel as usize) {
                Some(uvs) => {
                    for uv in uvs.iter_mut() {
                        *uv = transform.apply(*uv);
                    }
                }
                None => log::warn!(
                    "Mesh '{}' has no UV channel {}, transform dropped",
                    mesh.name,
                    channel
                ),
            }
        }

        for slot in scene.materials.iter_mut().flat_map(|m| m.textures_mut()) {
            slot.uv_transform = None;
        }

        Ok(())
    }
}
