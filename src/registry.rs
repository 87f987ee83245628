// THEORY:
// The `registry` module is the in-process surface a binding layer (FFI, RPC,
// or otherwise) builds on. It maps opaque integer handles to shared pipeline
// instances so that a foreign host never holds a raw pointer into the crate.
//
// The map is an explicit object rather than ambient global state: the binding
// layer owns exactly one `PipelineRegistry` and every operation goes through
// it. Each pipeline sits behind its own mutex, which serializes calls per
// handle; configuration mutation concurrent with an in-progress frame on the
// same handle is thereby excluded at the instance boundary.
//
// Handle misuse is harmless by contract: operations on an unknown handle
// return `false`/`None` and never panic.

use crate::core_modules::color::ColorBand;
use crate::pipeline::{DetectionResult, DoughVisionPipeline, RegionOfInterest};
use image::RgbImage;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub type Handle = u64;

/// Mutex-guarded table of live pipeline instances, keyed by opaque handle.
pub struct PipelineRegistry {
    inner: Mutex<RegistryState>,
}

struct RegistryState {
    next_handle: Handle,
    pipelines: HashMap<Handle, Arc<Mutex<DoughVisionPipeline>>>,
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryState {
                next_handle: 1,
                pipelines: HashMap::new(),
            }),
        }
    }

    /// Creates a fresh pipeline and returns its handle. Handles start at 1
    /// and are never reused within one registry.
    pub fn create(&self) -> Handle {
        let mut state = self.lock();
        let handle = state.next_handle;
        state.next_handle += 1;
        state
            .pipelines
            .insert(handle, Arc::new(Mutex::new(DoughVisionPipeline::new())));
        debug!(handle, "pipeline created");
        handle
    }

    /// Removes the mapping for `handle`. Returns false if it was unknown.
    pub fn destroy(&self, handle: Handle) -> bool {
        let removed = self.lock().pipelines.remove(&handle).is_some();
        if removed {
            debug!(handle, "pipeline destroyed");
        }
        removed
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.lock().pipelines.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.lock().pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pipelines.is_empty()
    }

    /// `initialize` on the addressed pipeline; false for unknown handles.
    pub fn initialize(&self, handle: Handle, config_path: Option<&Path>) -> bool {
        self.with_pipeline(handle, |p| p.initialize(config_path))
            .unwrap_or(false)
    }

    /// Updates the color band from six raw scalar components.
    pub fn update_color_band(&self, handle: Handle, lower: [f64; 3], upper: [f64; 3]) -> bool {
        self.with_pipeline(handle, |p| {
            p.set_color_band(ColorBand::from_scalars(lower, upper));
        })
        .is_some()
    }

    /// Updates the region of interest from four raw integers.
    pub fn update_roi(&self, handle: Handle, x: i32, y: i32, width: u32, height: u32) -> bool {
        self.with_pipeline(handle, |p| {
            p.set_roi(RegionOfInterest::new(x, y, width, height));
        })
        .is_some()
    }

    /// Runs one frame through the addressed pipeline.
    pub fn process_frame(&self, handle: Handle, frame: &RgbImage) -> Option<DetectionResult> {
        self.with_pipeline(handle, |p| p.process_frame(frame))
    }

    /// Looks up a handle and runs `f` against its pipeline while holding the
    /// instance lock. `None` for unknown handles.
    pub fn with_pipeline<R>(
        &self,
        handle: Handle,
        f: impl FnOnce(&mut DoughVisionPipeline) -> R,
    ) -> Option<R> {
        let pipeline = self.lock().pipelines.get(&handle).cloned()?;
        let mut guard = pipeline.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(f(&mut guard))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_start_at_one_and_are_unique() {
        let registry = PipelineRegistry::new();
        let first = registry.create();
        let second = registry.create();
        assert_eq!(first, 1);
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_handles_are_noops() {
        let registry = PipelineRegistry::new();
        assert!(!registry.initialize(99, None));
        assert!(!registry.update_color_band(99, [0.0; 3], [255.0; 3]));
        assert!(!registry.update_roi(99, 0, 0, 10, 10));
        assert!(registry.process_frame(99, &RgbImage::new(8, 8)).is_none());
        assert!(!registry.destroy(99));
    }

    #[test]
    fn destroy_removes_the_mapping() {
        let registry = PipelineRegistry::new();
        let handle = registry.create();
        assert!(registry.contains(handle));
        assert!(registry.destroy(handle));
        assert!(!registry.contains(handle));
        assert!(!registry.destroy(handle));
    }

    #[test]
    fn frames_flow_through_a_registered_pipeline() {
        let registry = PipelineRegistry::new();
        let handle = registry.create();
        assert!(registry.initialize(handle, None));

        let result = registry.process_frame(handle, &RgbImage::new(32, 32)).unwrap();
        assert_eq!(result.dough_count, 0);
        assert!(!result.is_valid);
    }
}
