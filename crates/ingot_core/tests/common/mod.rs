//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ingot_core::importer::{check_magic_token, has_extension};
use ingot_core::scene::Face;
use ingot_core::{
    FormatError, FormatWorker, ImportSettings, IoSystem, Material, Mesh, Node, PostProcess,
    PostProcessStep, Scene, StepContext, StepError,
};
use ingot_math::Vec3;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One triangle with one material under a single child node.
pub fn triangle_scene(name: &str) -> Scene {
    let mut scene = Scene::new(name);
    let material = scene.add_material(Material::new("fake"));
    let mesh = scene.add_mesh(
        Mesh::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![Face::triangle(0, 1, 2)])
            .with_material(material),
    );
    scene.add_node(scene.root, Node::new("tri").with_meshes([mesh]));
    scene
}

/// Worker that claims fixed extensions and, optionally, a magic prefix.
///
/// Its scene is named after the worker so tests can tell who imported.
pub struct FakeWorker {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub magic: Option<&'static [u8]>,
    /// Produce a scene with a dangling material index
    pub broken: bool,
    /// Number of `can_read` calls, shared with clones of the handle
    pub can_read_calls: Arc<AtomicUsize>,
}

impl FakeWorker {
    pub fn new(name: &'static str, extensions: &'static [&'static str]) -> Self {
        Self {
            name,
            extensions,
            magic: None,
            broken: false,
            can_read_calls: Arc::default(),
        }
    }

    pub fn with_magic(mut self, magic: &'static [u8]) -> Self {
        self.magic = Some(magic);
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    /// Handle to the `can_read` counter, usable after the worker is registered.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.can_read_calls)
    }
}

impl FormatWorker for FakeWorker {
    fn name(&self) -> &str {
        self.name
    }

    fn extensions(&self) -> &[&str] {
        self.extensions
    }

    fn can_read(&self, path: &Path, io: &dyn IoSystem, check_signature: bool) -> bool {
        self.can_read_calls.fetch_add(1, Ordering::SeqCst);
        if !check_signature {
            return has_extension(path, self.extensions);
        }
        match self.magic {
            Some(magic) => check_magic_token(io, path, 0, &[magic]),
            None => false,
        }
    }

    fn read(
        &self,
        _path: &Path,
        _io: &dyn IoSystem,
        _settings: &ImportSettings,
    ) -> Result<Scene, FormatError> {
        let mut scene = triangle_scene(self.name);
        if self.broken {
            scene.meshes[0].material_index = 7;
        }
        Ok(scene)
    }
}

pub type Trace = Arc<Mutex<Vec<String>>>;

/// Step that records when it starts and finishes.
pub struct RecordingStep {
    pub id: &'static str,
    pub bit: u32,
    pub deps: &'static [&'static str],
    pub trace: Trace,
}

impl PostProcessStep for RecordingStep {
    fn id(&self) -> &str {
        self.id
    }

    fn flag(&self) -> PostProcess {
        PostProcess::from_bits_retain(self.bit)
    }

    fn dependencies(&self) -> &[&str] {
        self.deps
    }

    fn execute(&self, scene: &mut Scene, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        let mut trace = self.trace.lock().unwrap();
        trace.push(format!("start {}", self.id));
        scene.name.push('+');
        trace.push(format!("end {}", self.id));
        Ok(())
    }
}

/// Step that always fails.
pub struct FailingStep {
    pub id: &'static str,
    pub bit: u32,
}

impl PostProcessStep for FailingStep {
    fn id(&self) -> &str {
        self.id
    }

    fn flag(&self) -> PostProcess {
        PostProcess::from_bits_retain(self.bit)
    }

    fn execute(&self, _scene: &mut Scene, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        Err(StepError::Unsupported("refusing on purpose".to_string()))
    }
}
