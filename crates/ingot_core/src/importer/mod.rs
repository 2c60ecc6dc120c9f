//! The import pipeline.
//!
//! An [`Importer`] turns a file into a validated [`Scene`]:
//!
//! 1. reject request flags no registered step maps to
//! 2. check that the file exists
//! 3. select a format worker from the registry
//! 4. parse
//! 5. run the selected post-process steps in dependency order
//! 6. validate the finished scene
//!
//! Only when every stage succeeds is the scene committed. On failure the
//! previously committed scene stays in place and the error is recorded.
//!
//! # Example
//!
//! ```ignore
//! use ingot_core::{Importer, PostProcess};
//!
//! let mut importer = Importer::new();
//! let flags = PostProcess::TRIANGULATE | PostProcess::GEN_NORMALS;
//! if importer.read_file("assets/cube.obj", flags).is_none() {
//!     eprintln!("{}", importer.error_string());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::config::ImportSettings;
use crate::io::{FileSystem, IoSystem, MemoryIoSystem};
use crate::postprocess::StepContext;
use crate::scene::validate::validate_scene;
use crate::scene::Scene;

mod flags;
mod registry;
mod worker;

pub use flags::PostProcess;
pub use registry::{Registry, RegistryBuilder, RegistryError};
pub use worker::{
    check_magic_token, has_extension, search_file_header_for_tokens, FormatError, FormatWorker,
    SIGNATURE_SEARCH_BYTES,
};

/// Why an import failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid post-process flags: unknown bits {unknown:#x}")]
    InvalidFlags { unknown: u32 },

    #[error("No suitable importer for {path}")]
    NoSuitableImporter { path: PathBuf },

    #[error("{worker} failed to parse file: {message}")]
    FormatParse { worker: String, message: String },

    #[error("Post-process step '{step}' failed: {message}")]
    PostProcess { step: String, message: String },

    #[error("Scene failed validation: {detail}")]
    InvariantViolation { detail: String },
}

/// Stateful import façade.
///
/// Holds at most one scene: each successful import replaces the previous
/// one. An importer is not synchronized; use one per thread and share the
/// [`Registry`] between them.
pub struct Importer {
    registry: Arc<Registry>,
    io: Box<dyn IoSystem>,
    settings: ImportSettings,
    scene: Option<Scene>,
    last_error: Option<ImportError>,
    error_string: String,
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

impl Importer {
    /// Importer over the built-in registry and the real file system.
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin())
    }

    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            io: Box::new(FileSystem::new()),
            settings: ImportSettings::default(),
            scene: None,
            last_error: None,
            error_string: String::new(),
        }
    }

    pub fn with_io_system(mut self, io: impl IoSystem + 'static) -> Self {
        self.io = Box::new(io);
        self
    }

    pub fn with_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ImportSettings {
        &mut self.settings
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Import `path`. Returns `None` on failure; see [`Importer::error_string`].
    pub fn read_file(&mut self, path: impl AsRef<Path>, flags: PostProcess) -> Option<&Scene> {
        self.try_read_file(path, flags).ok()
    }

    /// Import `path`, returning the typed error on failure.
    pub fn try_read_file(
        &mut self,
        path: impl AsRef<Path>,
        flags: PostProcess,
    ) -> Result<&Scene, ImportError> {
        let path = path.as_ref();
        let result = self.run(path, flags, self.io.as_ref());
        self.commit(path, result)
    }

    /// Import from a byte buffer.
    ///
    /// `hint` is the extension used for worker selection (`"obj"`, `"usda"`).
    /// The buffer is served under the name `$$memory.<hint>`, so formats that
    /// reference side files cannot resolve them.
    pub fn read_from_memory(
        &mut self,
        bytes: &[u8],
        hint: &str,
        flags: PostProcess,
    ) -> Option<&Scene> {
        let path = PathBuf::from(format!("$$memory.{}", hint.trim_start_matches('.')));
        let io = MemoryIoSystem::new().with_file(path.clone(), bytes.to_vec());
        let result = self.run(&path, flags, &io);
        self.commit(&path, result).ok()
    }

    /// The currently committed scene.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Move the committed scene out. The importer no longer owns it.
    pub fn take_scene(&mut self) -> Option<Scene> {
        self.scene.take()
    }

    /// Drop the committed scene.
    pub fn free_scene(&mut self) {
        self.scene = None;
    }

    /// Message of the last failed call; empty after a success.
    pub fn error_string(&self) -> &str {
        &self.error_string
    }

    pub fn last_error(&self) -> Option<&ImportError> {
        self.last_error.as_ref()
    }

    /// Whether any registered worker claims `ext` (with or without the dot).
    pub fn is_extension_supported(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches("*.").trim_start_matches('.');
        self.registry
            .workers()
            .any(|w| w.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// All claimed extensions as `*.a;*.b`, in registration order.
    pub fn extension_list(&self) -> String {
        let mut seen = Vec::new();
        for ext in self.registry.workers().flat_map(|w| w.extensions().iter()) {
            let ext = ext.to_ascii_lowercase();
            if !seen.contains(&ext) {
                seen.push(ext);
            }
        }
        seen.iter()
            .map(|e| format!("*.{e}"))
            .collect::<Vec<_>>()
            .join(";")
    }

    fn run(
        &self,
        path: &Path,
        flags: PostProcess,
        io: &dyn IoSystem,
    ) -> Result<Scene, ImportError> {
        let unknown = self.registry.unknown_flags(flags);
        if !unknown.is_empty() {
            return Err(ImportError::InvalidFlags {
                unknown: unknown.bits(),
            });
        }

        if !io.exists(path) {
            return Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let worker = self
            .registry
            .select_worker(path, io)
            .ok_or_else(|| ImportError::NoSuitableImporter {
                path: path.to_path_buf(),
            })?;

        log::info!(
            "Importing {} with {} (flags {})",
            path.display(),
            worker.name(),
            flags
        );
        let start = Instant::now();

        let mut scene = worker
            .read(path, io, &self.settings)
            .map_err(|e| ImportError::FormatParse {
                worker: worker.name().to_string(),
                message: e.to_string(),
            })?;

        let ctx = StepContext {
            path,
            io,
            settings: &self.settings,
        };

        for step in self.registry.schedule(flags) {
            log::debug!("Running post-process step '{}'", step.id());
            step.execute(&mut scene, &ctx)
                .map_err(|e| ImportError::PostProcess {
                    step: step.id().to_string(),
                    message: e.to_string(),
                })?;

            if self.settings.validate_each_step {
                validate_scene(&scene).map_err(|e| ImportError::InvariantViolation {
                    detail: format!("after step '{}': {}", step.id(), e),
                })?;
            }
        }

        validate_scene(&scene).map_err(|e| ImportError::InvariantViolation {
            detail: e.to_string(),
        })?;

        log::info!(
            "Imported {} in {:.2?}: {} nodes, {} meshes, {} materials, {} textures",
            path.display(),
            start.elapsed(),
            scene.node_count(),
            scene.mesh_count(),
            scene.material_count(),
            scene.texture_count()
        );

        Ok(scene)
    }

    fn commit(
        &mut self,
        path: &Path,
        result: Result<Scene, ImportError>,
    ) -> Result<&Scene, ImportError> {
        match result {
            Ok(scene) => {
                self.last_error = None;
                self.error_string.clear();
                // The previous scene is released here
                Ok(self.scene.insert(scene))
            }
            Err(err) => {
                log::error!("Import of {} failed: {}", path.display(), err);
                self.error_string = err.to_string();
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn memory_importer() -> Importer {
        Importer::new().with_io_system(MemoryIoSystem::new().with_file("tri.obj", TRIANGLE_OBJ))
    }

    #[test]
    fn test_error_string_lifecycle() {
        let mut importer = memory_importer();
        assert_eq!(importer.error_string(), "");

        assert!(importer.read_file("missing.obj", PostProcess::empty()).is_none());
        assert!(importer.error_string().contains("missing.obj"));
        assert!(matches!(
            importer.last_error(),
            Some(ImportError::FileNotFound { .. })
        ));

        assert!(importer.read_file("tri.obj", PostProcess::empty()).is_some());
        assert_eq!(importer.error_string(), "");
        assert!(importer.last_error().is_none());
    }

    #[test]
    fn test_unknown_flags_checked_first() {
        let mut importer = memory_importer();
        let err = importer
            .try_read_file("missing.obj", PostProcess::from_bits_retain(1 << 20))
            .unwrap_err();

        assert_eq!(err, ImportError::InvalidFlags { unknown: 1 << 20 });
    }

    #[test]
    fn test_take_and_free_scene() {
        let mut importer = memory_importer();
        importer.read_file("tri.obj", PostProcess::empty());

        let scene = importer.take_scene().unwrap();
        assert_eq!(scene.mesh_count(), 1);
        assert!(importer.scene().is_none());

        importer.read_file("tri.obj", PostProcess::empty());
        importer.free_scene();
        assert!(importer.scene().is_none());
    }

    #[test]
    fn test_read_from_memory() {
        let mut importer = Importer::new();
        let scene = importer
            .read_from_memory(TRIANGLE_OBJ.as_bytes(), ".obj", PostProcess::GEN_NORMALS)
            .unwrap();

        assert_eq!(scene.mesh_count(), 1);
        assert!(scene.meshes[0].has_normals());
    }

    #[test]
    fn test_extension_queries() {
        let importer = Importer::new();

        assert!(importer.is_extension_supported("obj"));
        assert!(importer.is_extension_supported(".USDA"));
        assert!(importer.is_extension_supported("*.obj"));
        assert!(!importer.is_extension_supported("fbx"));
        assert_eq!(importer.extension_list(), "*.usda;*.obj");
    }
}
