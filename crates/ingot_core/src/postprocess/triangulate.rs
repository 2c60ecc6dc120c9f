use super::{PostProcessStep, StepContext, StepError};
use crate::importer::PostProcess;
use crate::scene::{Face, Scene};

/// Splits every polygon into a triangle fan.
///
/// Points, lines and triangles pass through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Triangulate;

impl PostProcessStep for Triangulate {
    fn id(&self) -> &str {
        "triangulate"
    }

    fn flag(&self) -> PostProcess {
        PostProcess::TRIANGULATE
    }

    fn execute(&self, scene: &mut Scene, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        for mesh in &mut scene.meshes {
            if mesh.is_triangulated() {
                continue;
            }

            let before = mesh.faces.len();
            let mut faces = Vec::with_capacity(mesh.triangle_count());
            for face in mesh.faces.drain(..) {
                if face.len() <= 3 {
                    faces.push(face);
                    continue;
                }
                let first = face.indices[0];
                faces.extend(
                    face.indices
                        .windows(2)
                        .skip(1)
                        .map(|pair| Face::triangle(first, pair[0], pair[1])),
                );
            }
            mesh.faces = faces;

            log::debug!(
                "Triangulated mesh '{}': {} faces -> {}",
                mesh.name,
                before,
                mesh.faces.len()
            );
        }

        Ok(())
    }
}
