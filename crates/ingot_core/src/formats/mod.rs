//! Built-in format workers.
//!
//! - [`usda::UsdaWorker`]: USD ASCII (`.usda`)
//! - [`obj::ObjWorker`]: Wavefront OBJ (`.obj`) with MTL materials
//!
//! Both implement the public [`FormatWorker`] trait; third-party workers
//! are registered the same way through [`RegistryBuilder`](crate::RegistryBuilder).

use std::path::Path;

use crate::importer::FormatWorker;

pub mod obj;
pub mod usda;

/// Name of the material added when a file defines none.
pub const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

/// Built-in workers in registration order.
pub fn builtin_workers() -> Vec<Box<dyn FormatWorker>> {
    vec![Box::new(usda::UsdaWorker), Box::new(obj::ObjWorker)]
}

/// Scene name for an imported file: its stem, or "unnamed".
pub(crate) fn scene_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string()
}
