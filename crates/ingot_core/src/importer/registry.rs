//! The immutable collection of format workers and post-process steps.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use super::{FormatWorker, PostProcess};
use crate::formats;
use crate::io::IoSystem;
use crate::postprocess::{self, PostProcessStep};

/// Configuration errors detected while assembling a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("format worker '{0}' is registered twice")]
    DuplicateWorker(String),

    #[error("post-process step '{0}' is registered twice")]
    DuplicateStep(String),

    #[error("step '{step}' flag {bits:#x} must be exactly one bit")]
    InvalidStepFlag { step: String, bits: u32 },

    #[error("steps '{first}' and '{second}' share flag bit {bits:#x}")]
    FlagOverlap {
        first: String,
        second: String,
        bits: u32,
    },

    #[error("step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("dependency cycle among steps: {}", steps.join(", "))]
    DependencyCycle { steps: Vec<String> },
}

/// Ordered workers and steps, frozen after [`RegistryBuilder::build`].
///
/// Registration order is the priority order: the first-registered worker
/// wins each selection pass, and the first-registered step wins scheduling
/// ties.
pub struct Registry {
    workers: Vec<Box<dyn FormatWorker>>,
    steps: Vec<Box<dyn PostProcessStep>>,
    /// For each step, indices of the steps it depends on
    dependencies: Vec<Vec<usize>>,
    known_flags: PostProcess,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Process-wide registry with the built-in workers and steps.
    pub fn builtin() -> Arc<Registry> {
        static BUILTIN: OnceLock<Arc<Registry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let registry = Registry::builder()
                    .with_workers(formats::builtin_workers())
                    .with_steps(postprocess::builtin_steps())
                    .build()
                    .expect("built-in registry is consistent");
                Arc::new(registry)
            })
            .clone()
    }

    pub fn workers(&self) -> impl Iterator<Item = &dyn FormatWorker> {
        self.workers.iter().map(|w| w.as_ref())
    }

    pub fn steps(&self) -> impl Iterator<Item = &dyn PostProcessStep> {
        self.steps.iter().map(|s| s.as_ref())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Union of all registered step bits.
    pub fn known_flags(&self) -> PostProcess {
        self.known_flags
    }

    /// Bits of `flags` no registered step maps to.
    pub fn unknown_flags(&self, flags: PostProcess) -> PostProcess {
        flags.difference(self.known_flags)
    }

    pub fn find_worker(&self, name: &str) -> Option<&dyn FormatWorker> {
        self.workers().find(|w| w.name() == name)
    }

    /// Pick the worker for `path`.
    ///
    /// Phase one asks every worker for a cheap name-based match. A single
    /// candidate is taken as is. Several candidates are narrowed by a
    /// signature check in registration order; no candidate at all falls
    /// back to a signature check over every worker.
    pub fn select_worker(
        &self,
        path: &Path,
        io: &dyn IoSystem,
    ) -> Option<&dyn FormatWorker> {
        let candidates: Vec<&dyn FormatWorker> = self
            .workers()
            .filter(|w| w.can_read(path, io, false))
            .collect();

        match candidates.as_slice() {
            [only] => {
                log::debug!("'{}' claimed by {} (extension)", path.display(), only.name());
                Some(*only)
            }
            [] => {
                log::debug!(
                    "No extension match for '{}', checking signatures of all workers",
                    path.display()
                );
                self.workers().find(|w| w.can_read(path, io, true))
            }
            tied => {
                log::debug!(
                    "'{}' claimed by {} workers, checking signatures",
                    path.display(),
                    tied.len()
                );
                tied.iter().copied().find(|w| w.can_read(path, io, true))
            }
        }
    }

    /// Active steps for `flags`, ordered so every step follows its active
    /// dependencies. Ties go to the lower registration index.
    pub fn schedule(&self, flags: PostProcess) -> Vec<&dyn PostProcessStep> {
        let active: Vec<bool> = self.steps.iter().map(|s| s.is_active(flags)).collect();
        topological_order(&self.dependencies, &active)
            .unwrap_or_default()
            .into_iter()
            .map(|i| self.steps[i].as_ref())
            .collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("workers", &self.workers().map(|w| w.name()).collect::<Vec<_>>())
            .field("steps", &self.steps().map(|s| s.id()).collect::<Vec<_>>())
            .field("known_flags", &self.known_flags)
            .finish()
    }
}

/// Kahn's algorithm over the nodes with `active[i]`.
///
/// Edges to inactive nodes are ignored. Returns `Err` with the nodes left
/// over when the active subgraph has a cycle.
fn topological_order(
    dependencies: &[Vec<usize>],
    active: &[bool],
) -> Result<Vec<usize>, Vec<usize>> {
    let count = dependencies.len();
    let mut in_degree = vec![0usize; count];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

    for (step, deps) in dependencies.iter().enumerate() {
        if !active[step] {
            continue;
        }
        for &dep in deps.iter().filter(|&&d| active[d]) {
            in_degree[step] += 1;
            dependents[dep].push(step);
        }
    }

    let mut ready: BTreeSet<usize> = (0..count)
        .filter(|&i| active[i] && in_degree[i] == 0)
        .collect();
    let mut order = Vec::with_capacity(count);

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    let active_count = active.iter().filter(|&&a| a).count();
    if order.len() == active_count {
        Ok(order)
    } else {
        let placed: HashSet<usize> = order.into_iter().collect();
        Err((0..count).filter(|i| active[*i] && !placed.contains(i)).collect())
    }
}

/// Collects workers and steps in priority order.
#[derive(Default)]
pub struct RegistryBuilder {
    workers: Vec<Box<dyn FormatWorker>>,
    steps: Vec<Box<dyn PostProcessStep>>,
}

impl RegistryBuilder {
    pub fn worker(mut self, worker: impl FormatWorker + 'static) -> Self {
        self.workers.push(Box::new(worker));
        self
    }

    pub fn with_workers(
        mut self,
        workers: impl IntoIterator<Item = Box<dyn FormatWorker>>,
    ) -> Self {
        self.workers.extend(workers);
        self
    }

    pub fn step(mut self, step: impl PostProcessStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn with_steps(mut self, steps: impl IntoIterator<Item = Box<dyn PostProcessStep>>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Validate and freeze.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut worker_names = HashSet::new();
        for worker in &self.workers {
            if !worker_names.insert(worker.name().to_string()) {
                return Err(RegistryError::DuplicateWorker(worker.name().to_string()));
            }
        }

        let mut step_index: HashMap<&str, usize> = HashMap::new();
        let mut bit_owner: HashMap<u32, &str> = HashMap::new();
        let mut known_flags = PostProcess::empty();

        for (i, step) in self.steps.iter().enumerate() {
            let id = step.id();
            if step_index.insert(id, i).is_some() {
                return Err(RegistryError::DuplicateStep(id.to_string()));
            }

            let flag = step.flag();
            if !flag.is_single_bit() {
                return Err(RegistryError::InvalidStepFlag {
                    step: id.to_string(),
                    bits: flag.bits(),
                });
            }
            if let Some(first) = bit_owner.insert(flag.bits(), id) {
                return Err(RegistryError::FlagOverlap {
                    first: first.to_string(),
                    second: id.to_string(),
                    bits: flag.bits(),
                });
            }
            known_flags |= flag;
        }

        let mut dependencies = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let mut deps = Vec::new();
            for &dependency in step.dependencies() {
                let index = step_index.get(dependency).copied().ok_or_else(|| {
                    RegistryError::UnknownDependency {
                        step: step.id().to_string(),
                        dependency: dependency.to_string(),
                    }
                })?;
                deps.push(index);
            }
            dependencies.push(deps);
        }

        // Any cycle among a subset of steps is also a cycle with every step active
        let all_active = vec![true; self.steps.len()];
        if let Err(stuck) = topological_order(&dependencies, &all_active) {
            return Err(RegistryError::DependencyCycle {
                steps: stuck
                    .into_iter()
                    .map(|i| self.steps[i].id().to_string())
                    .collect(),
            });
        }

        Ok(Registry {
            workers: self.workers,
            steps: self.steps,
            dependencies,
            known_flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::{StepContext, StepError};
    use crate::scene::Scene;

    struct Named {
        id: &'static str,
        bit: u32,
        deps: &'static [&'static str],
    }

    impl PostProcessStep for Named {
        fn id(&self) -> &str {
            self.id
        }

        fn flag(&self) -> PostProcess {
            PostProcess::from_bits_retain(self.bit)
        }

        fn dependencies(&self) -> &[&str] {
            self.deps
        }

        fn execute(&self, _: &mut Scene, _: &StepContext<'_>) -> Result<(), StepError> {
            Ok(())
        }
    }

    fn step(id: &'static str, bit: u32, deps: &'static [&'static str]) -> Named {
        Named { id, bit, deps }
    }

    fn ids(steps: &[&dyn PostProcessStep]) -> Vec<String> {
        steps.iter().map(|s| s.id().to_string()).collect()
    }

    #[test]
    fn test_schedule_respects_dependencies_and_ties() {
        let registry = Registry::builder()
            .step(step("late", 1, &["early"]))
            .step(step("free", 2, &[]))
            .step(step("early", 4, &[]))
            .build()
            .unwrap();

        let all = PostProcess::from_bits_retain(0x7);
        assert_eq!(ids(&registry.schedule(all)), ["free", "early", "late"]);

        // Inactive dependency imposes nothing
        let late_only = PostProcess::from_bits_retain(0x1);
        assert_eq!(ids(&registry.schedule(late_only)), ["late"]);

        assert!(registry.schedule(PostProcess::empty()).is_empty());
    }

    #[test]
    fn test_cycle_rejected_at_build() {
        let err = Registry::builder()
            .step(step("a", 1, &["b"]))
            .step(step("b", 2, &["a"]))
            .step(step("c", 4, &[]))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::DependencyCycle {
                steps: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_flag_errors() {
        let overlap = Registry::builder()
            .step(step("a", 1, &[]))
            .step(step("b", 1, &[]))
            .build()
            .unwrap_err();
        assert!(matches!(overlap, RegistryError::FlagOverlap { bits: 1, .. }));

        let wide = Registry::builder().step(step("a", 3, &[])).build().unwrap_err();
        assert!(matches!(wide, RegistryError::InvalidStepFlag { bits: 3, .. }));

        let unknown = Registry::builder()
            .step(step("a", 1, &["missing"]))
            .build()
            .unwrap_err();
        assert!(matches!(unknown, RegistryError::UnknownDependency { .. }));

        let dup = Registry::builder()
            .step(step("a", 1, &[]))
            .step(step("a", 2, &[]))
            .build()
            .unwrap_err();
        assert_eq!(dup, RegistryError::DuplicateStep("a".to_string()));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::builtin();

        assert_eq!(registry.known_flags().bits(), 0xff);
        assert!(registry.find_worker("usda").is_some());
        assert!(registry.find_worker("obj").is_some());
        assert!(Arc::ptr_eq(&registry, &Registry::builtin()));

        let order = ids(&registry.schedule(PostProcess::from_bits_retain(0xff)));
        let pos = |id: &str| order.iter().position(|s| s == id).unwrap();
        assert!(pos("triangulate") < pos("gen_normals"));
        assert!(pos("flip_winding_order") < pos("gen_normals"));
        assert!(pos("transform_uv_coords") < pos("flip_uvs"));
        assert!(pos("remove_redundant_materials") < pos("embed_textures"));
        assert!(pos("triangulate") < pos("gen_bounding_boxes"));
    }
}
