//! The component container.

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use tracing::{debug, warn};

use trellis_protocols::{
    downcast, Component, ComponentClass, ContainerError, Dependencies, Injectable, Instance,
};

use crate::commands::{is_command_key, CommandTree};
use crate::lifecycle::{ContainerState, Lifecycle};
use crate::loader::{ModuleBindings, ModuleManifest};
use crate::public::PublicEntry;
use crate::reflect::{parameter_names, strip_marker};
use crate::registry::{Entry, Lifetime, Overrides, Registration, ResolutionState, Source};

/// Container construction options.
#[derive(Debug, Clone, Default)]
pub struct ContainerOptions {
    /// Let a later `require` of a name replace an earlier binding, and a later
    /// registration of a name replace an earlier one.
    pub override_required_modules: bool,
}

/// Registry of named components, deferred modules, public api entries, and
/// commands.
///
/// Create one at startup and pass it by reference to everything that needs
/// to register or resolve components.
///
/// Resolution is meant for a single logical thread. Cycles are tracked per
/// thread; a singleton that another thread is still constructing fails with
/// [`ContainerError::ResolutionInProgress`] instead of blocking.
pub struct Container {
    pub(crate) registrations: DashMap<String, Entry>,
    pub(crate) modules: ModuleBindings,
    pub(crate) public: DashMap<String, Arc<PublicEntry>>,
    pub(crate) commands: CommandTree,
    /// Number of module loaders currently running.
    pub(crate) loading: AtomicUsize,
    resolution_chains: DashMap<ThreadId, Vec<String>>,
    override_required_modules: AtomicBool,
    resolved_seq: AtomicU64,
    lifecycle: Lifecycle,
}

impl Container {
    /// Create an empty container with no modules.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default(), ModuleManifest::new())
    }

    /// Create a container that loads modules from `manifest`.
    pub fn with_manifest(manifest: ModuleManifest) -> Self {
        Self::with_options(ContainerOptions::default(), manifest)
    }

    pub fn with_options(options: ContainerOptions, manifest: ModuleManifest) -> Self {
        Self {
            registrations: DashMap::new(),
            modules: ModuleBindings::new(manifest),
            public: DashMap::new(),
            commands: CommandTree::new(),
            loading: AtomicUsize::new(0),
            resolution_chains: DashMap::new(),
            override_required_modules: AtomicBool::new(options.override_required_modules),
            resolved_seq: AtomicU64::new(0),
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn override_required_modules(&self) -> bool {
        self.override_required_modules.load(Ordering::SeqCst)
    }

    pub fn set_override_required_modules(&self, enabled: bool) {
        self.override_required_modules
            .store(enabled, Ordering::SeqCst);
    }

    pub fn state(&self) -> ContainerState {
        self.lifecycle.state()
    }

    /// Bind `name` to a registration.
    ///
    /// Returns an error if `name` is already registered, unless override mode
    /// is on, in which case the new registration replaces the old one. A
    /// module that runs again after an override keeps the cached instances
    /// of the names it registered before.
    pub fn register(&self, name: &str, registration: Registration) -> Result<(), ContainerError> {
        let name = strip_marker(name);
        let kind = registration.source().kind();
        match self.registrations.entry(name.to_string()) {
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(registration));
                debug!(component = name, kind, "Registered component");
            }
            MapEntry::Occupied(_) if !self.override_required_modules() => {
                return Err(ContainerError::AlreadyRegistered(name.to_string()));
            }
            MapEntry::Occupied(occupied)
                if self.loading.load(Ordering::SeqCst) > 0 && occupied.get().instance.is_some() =>
            {
                debug!(component = name, "Kept resolved component during module reload");
            }
            MapEntry::Occupied(mut occupied) => {
                occupied.insert(Entry::new(registration));
                debug!(component = name, kind, "Replaced component registration");
            }
        }
        Ok(())
    }

    /// Register a pre-built value. Resolving `name` returns this exact `Arc`.
    pub fn register_value<T: Component>(&self, name: &str, value: Arc<T>) -> Result<(), ContainerError> {
        self.register(name, Registration::value(value))
    }

    pub fn register_instance(&self, name: &str, instance: Instance) -> Result<(), ContainerError> {
        self.register(name, Registration::instance(instance))
    }

    /// Register a zero-argument factory, invoked once on first resolution.
    pub fn register_factory<T, F>(&self, name: &str, factory: F) -> Result<(), ContainerError>
    where
        T: Component,
        F: Fn() -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.register(name, Registration::factory(factory))
    }

    /// Register a constructible class whose dependencies are injected.
    pub fn register_class(&self, name: &str, class: ComponentClass) -> Result<(), ContainerError> {
        self.register(name, Registration::class(class))
    }

    /// Register a class that is constructed anew on every resolution.
    pub fn register_transient_class(
        &self,
        name: &str,
        class: ComponentClass,
    ) -> Result<(), ContainerError> {
        self.register(name, Registration::class(class).transient())
    }

    pub fn register_injectable<T: Injectable>(&self, name: &str) -> Result<(), ContainerError> {
        self.register(name, Registration::injectable::<T>())
    }

    /// Whether `name` is registered or bound to a module.
    pub fn is_registered(&self, name: &str) -> bool {
        let name = strip_marker(name);
        self.registrations.contains_key(name) || self.modules.is_bound(name)
    }

    /// Names of registered or required components, sorted. Commands are
    /// not included.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registrations
            .iter()
            .map(|entry| entry.key().clone())
            .chain(self.modules.bound_names())
            .filter(|name| !is_command_key(name))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Resolution state of `name`, `None` if it is not registered.
    pub fn resolution_state(&self, name: &str) -> Option<ResolutionState> {
        self.registrations
            .get(strip_marker(name))
            .map(|entry| entry.state)
    }

    /// Resolve `name` to its instance.
    pub fn resolve(&self, name: &str) -> Result<Instance, ContainerError> {
        self.resolve_with(name, &Overrides::default())
    }

    /// Resolve `name` and downcast it to `T`.
    pub fn resolve_as<T: Component>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let instance = self.resolve(name)?;
        downcast::<T>(&instance).ok_or_else(|| ContainerError::DependencyType {
            name: strip_marker(name).to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Resolve `name`, taking constructor dependencies from `overrides` where
    /// present.
    ///
    /// A singleton that is already resolved is returned from the cache and
    /// `overrides` is ignored.
    pub fn resolve_with(&self, name: &str, overrides: &Overrides) -> Result<Instance, ContainerError> {
        let name = strip_marker(name);
        self.ensure_loaded(name)?;

        let registration = {
            let mut entry = self
                .registrations
                .get_mut(name)
                .ok_or_else(|| ContainerError::UnknownComponent(name.to_string()))?;
            if let Some(instance) = &entry.instance {
                return Ok(instance.clone());
            }
            if self.in_chain(name) {
                drop(entry);
                return Err(self.cycle_error(name));
            }
            if entry.state == ResolutionState::Resolving {
                return Err(ContainerError::ResolutionInProgress(name.to_string()));
            }
            if entry.registration.lifetime() == Lifetime::Singleton {
                entry.state = ResolutionState::Resolving;
            }
            entry.registration.clone()
        };

        let result = {
            let _chain = self.enter(name);
            self.build(registration.source(), overrides)
        };

        if registration.lifetime() == Lifetime::Transient {
            return result;
        }

        if let Some(mut entry) = self.registrations.get_mut(name) {
            match &result {
                Ok(instance) => {
                    entry.instance = Some(instance.clone());
                    entry.state = ResolutionState::Resolved;
                    entry.resolved_seq = Some(self.resolved_seq.fetch_add(1, Ordering::SeqCst));
                    debug!(component = name, "Resolved component");
                }
                Err(_) => entry.state = ResolutionState::Unresolved,
            }
        }
        result
    }

    /// Construct an unregistered class, injecting its dependencies.
    ///
    /// The result is never cached: every call builds a new instance.
    pub fn resolve_class(
        &self,
        class: &ComponentClass,
        overrides: &Overrides,
    ) -> Result<Instance, ContainerError> {
        self.construct(class, overrides)
    }

    /// Construct an unregistered injectable type.
    pub fn resolve_injectable<T: Injectable>(
        &self,
        overrides: &Overrides,
    ) -> Result<Arc<T>, ContainerError> {
        let class = T::component_class();
        let instance = self.construct(&class, overrides)?;
        downcast::<T>(&instance).ok_or_else(|| ContainerError::DependencyType {
            name: class.name().to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Run teardown on every resolved singleton that has one.
    ///
    /// Instances are torn down in reverse resolution order. Registrations are
    /// kept. A second call is a no-op.
    pub fn dispose(&self) -> Result<(), ContainerError> {
        if !self.lifecycle.begin_dispose() {
            debug!("Container already disposed");
            return Ok(());
        }

        let mut resolved: Vec<(u64, String, Instance)> = self
            .registrations
            .iter()
            .filter_map(|entry| match (&entry.instance, entry.resolved_seq) {
                (Some(instance), Some(seq)) => Some((seq, entry.key().clone(), instance.clone())),
                _ => None,
            })
            .collect();
        resolved.sort_by(|a, b| b.0.cmp(&a.0));

        let mut seen = HashSet::new();
        let mut failures = 0;
        for (_, name, instance) in resolved {
            if !seen.insert(Arc::as_ptr(&instance) as *const () as usize) {
                continue;
            }
            match instance.dispose() {
                None => {}
                Some(Ok(())) => debug!(component = %name, "Disposed component"),
                Some(Err(e)) => {
                    warn!("Failed to dispose {}: {}", name, e);
                    failures += 1;
                }
            }
        }

        self.lifecycle.finish_dispose();
        if failures == 0 {
            Ok(())
        } else {
            Err(ContainerError::DisposeFailed(failures))
        }
    }

    /// Drop the registration of `key` so the next resolution loads it again.
    pub(crate) fn invalidate(&self, key: &str) {
        if self.registrations.remove(key).is_some() {
            debug!(component = key, "Invalidated registration");
        }
    }

    fn build(&self, source: &Source, overrides: &Overrides) -> Result<Instance, ContainerError> {
        match source {
            Source::Value(instance) => Ok(instance.clone()),
            Source::Factory(factory) => factory(),
            Source::Class(class) => self.construct(class, overrides),
        }
    }

    fn construct(
        &self,
        class: &ComponentClass,
        overrides: &Overrides,
    ) -> Result<Instance, ContainerError> {
        let names = parameter_names(class.signature())?;
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let instance = match overrides.get(&name) {
                Some(value) => value.clone(),
                None => self.resolve(&name)?,
            };
            entries.push((name, instance));
        }
        debug!(
            class = class.name(),
            dependencies = entries.len(),
            "Constructing component"
        );
        class.construct(Dependencies::new(class.name(), entries))
    }

    fn in_chain(&self, name: &str) -> bool {
        self.resolution_chains
            .get(&thread::current().id())
            .map(|chain| chain.iter().any(|n| n == name))
            .unwrap_or(false)
    }

    fn enter(&self, name: &str) -> ChainGuard<'_> {
        let thread = thread::current().id();
        self.resolution_chains
            .entry(thread)
            .or_default()
            .push(name.to_string());
        ChainGuard {
            chains: &self.resolution_chains,
            thread,
        }
    }

    fn cycle_error(&self, name: &str) -> ContainerError {
        let mut chain = self
            .resolution_chains
            .get(&thread::current().id())
            .map(|chain| chain.clone())
            .unwrap_or_default();
        let start = chain.iter().position(|n| n == name).unwrap_or(0);
        let mut chain = chain.split_off(start);
        chain.push(name.to_string());
        ContainerError::CircularDependency { chain }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

/// Pops this thread's resolution chain when a resolution finishes.
struct ChainGuard<'a> {
    chains: &'a DashMap<ThreadId, Vec<String>>,
    thread: ThreadId,
}

impl Drop for ChainGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut chain) = self.chains.get_mut(&self.thread) {
            chain.pop();
        }
        self.chains.remove_if(&self.thread, |_, chain| chain.is_empty());
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
