//! Deferred module loading.
//!
//! A module is a loader function registered in a [`ModuleManifest`] under a
//! path. `require` only remembers which path provides a name; the loader runs
//! the first time the name is needed and is expected to register that name
//! on the container it is given.

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, info};

use trellis_protocols::ContainerError;

use crate::container::Container;
use crate::reflect::strip_marker;

/// Loader run when a module is first needed.
pub type ModuleLoader = Arc<dyn Fn(&Container) -> Result<(), ContainerError> + Send + Sync>;

/// Static table mapping module paths to their loaders.
#[derive(Clone, Default)]
pub struct ModuleManifest {
    modules: HashMap<String, ModuleLoader>,
}

impl ModuleManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, builder style.
    pub fn module<F>(mut self, path: impl Into<String>, loader: F) -> Self
    where
        F: Fn(&Container) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        self.insert(path, loader);
        self
    }

    pub fn insert<F>(&mut self, path: impl Into<String>, loader: F)
    where
        F: Fn(&Container) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        self.modules.insert(path.into(), Arc::new(loader));
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<ModuleLoader> {
        self.modules.get(path).cloned()
    }

    /// Module paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for ModuleManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleManifest")
            .field("paths", &self.paths())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Loading,
    Loaded,
}

/// Result of binding a name to a module path.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BindOutcome {
    New,
    Unchanged,
    Replaced { previous: String },
}

/// Name to module path bindings and per-path load state.
pub(crate) struct ModuleBindings {
    manifest: RwLock<ModuleManifest>,
    bindings: DashMap<String, String>,
    loaded: DashMap<String, LoadState>,
}

impl ModuleBindings {
    pub fn new(manifest: ModuleManifest) -> Self {
        Self {
            manifest: RwLock::new(manifest),
            bindings: DashMap::new(),
            loaded: DashMap::new(),
        }
    }

    pub fn bind(
        &self,
        name: &str,
        path: &str,
        allow_override: bool,
    ) -> Result<BindOutcome, ContainerError> {
        match self.bindings.entry(name.to_string()) {
            MapEntry::Vacant(vacant) => {
                vacant.insert(path.to_string());
                Ok(BindOutcome::New)
            }
            MapEntry::Occupied(occupied) if occupied.get() == path => Ok(BindOutcome::Unchanged),
            MapEntry::Occupied(occupied) if !allow_override => Err(ContainerError::DuplicateModule {
                name: name.to_string(),
                existing: occupied.get().clone(),
                requested: path.to_string(),
            }),
            MapEntry::Occupied(mut occupied) => {
                let previous = occupied.insert(path.to_string());
                Ok(BindOutcome::Replaced { previous })
            }
        }
    }

    pub fn binding(&self, name: &str) -> Option<String> {
        self.bindings.get(name).map(|path| path.clone())
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn bound_names(&self) -> Vec<String> {
        self.bindings.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn loader(&self, path: &str) -> Option<ModuleLoader> {
        self.manifest.read().get(path)
    }

    pub fn add_module(&self, path: String, loader: ModuleLoader) {
        self.manifest.write().modules.insert(path, loader);
    }

    /// Mark `path` as loading. Returns false if it is loading or loaded.
    pub fn start_loading(&self, path: &str) -> bool {
        match self.loaded.entry(path.to_string()) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(vacant) => {
                vacant.insert(LoadState::Loading);
                true
            }
        }
    }

    pub fn finish_loading(&self, path: &str) {
        self.loaded.insert(path.to_string(), LoadState::Loaded);
    }

    /// Forget that `path` ran so the next use executes it again.
    pub fn forget_loaded(&self, path: &str) {
        self.loaded.remove(path);
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.loaded
            .get(path)
            .map(|state| *state == LoadState::Loaded)
            .unwrap_or(false)
    }
}

impl Container {
    /// Declare that `name` is registered by the module at `path`.
    ///
    /// Binding a name to a second, different path fails with
    /// [`ContainerError::DuplicateModule`] unless override mode is on, in
    /// which case the new path replaces the old one and any cached
    /// resolution of `name` is dropped.
    pub fn require(&self, name: &str, path: &str) -> Result<(), ContainerError> {
        self.bind_module(strip_marker(name), path)
    }

    /// Add a module to the manifest after construction.
    pub fn add_module<F>(&self, path: impl Into<String>, loader: F)
    where
        F: Fn(&Container) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        self.modules.add_module(path.into(), Arc::new(loader));
    }

    /// Path `name` is bound to, if any.
    pub fn module_path(&self, name: &str) -> Option<String> {
        self.modules.binding(strip_marker(name))
    }

    /// Whether the module bound to `name` has been loaded.
    pub fn is_module_loaded(&self, name: &str) -> bool {
        self.module_path(name)
            .map(|path| self.modules.is_loaded(&path))
            .unwrap_or(false)
    }

    pub(crate) fn bind_module(&self, key: &str, path: &str) -> Result<(), ContainerError> {
        match self
            .modules
            .bind(key, path, self.override_required_modules())?
        {
            BindOutcome::New => debug!(name = key, path, "Required module"),
            BindOutcome::Unchanged => {}
            BindOutcome::Replaced { previous } => {
                info!("Module for {} overridden: {} -> {}", key, previous, path);
                self.modules.forget_loaded(path);
                self.invalidate(key);
                self.rebind_public(key, path);
            }
        }
        Ok(())
    }

    /// Run the module bound to `key` unless it already ran.
    pub(crate) fn ensure_loaded(&self, key: &str) -> Result<(), ContainerError> {
        let Some(path) = self.modules.binding(key) else {
            return Ok(());
        };
        if !self.modules.start_loading(&path) {
            return Ok(());
        }

        let Some(loader) = self.modules.loader(&path) else {
            self.modules.forget_loaded(&path);
            if self.registrations.contains_key(key) {
                debug!(name = key, path = %path, "Module not in manifest, using direct registration");
                return Ok(());
            }
            return Err(ContainerError::ModuleNotFound {
                name: key.to_string(),
                path,
            });
        };

        info!("Loading module {} for {}", path, key);
        self.loading.fetch_add(1, Ordering::SeqCst);
        let result = loader(self);
        self.loading.fetch_sub(1, Ordering::SeqCst);
        match result {
            Ok(()) => {
                self.modules.finish_loading(&path);
                Ok(())
            }
            Err(e) => {
                self.modules.forget_loaded(&path);
                Err(e)
            }
        }
    }
}
