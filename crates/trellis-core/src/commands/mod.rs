//! Command registration and hierarchical command resolution.
//!
//! A command is a component stored under a `command:` key whose name is a
//! path of `|`-separated segments (`device|*list`). Paths registered under
//! the same base form a tree that a command line is matched against.

mod dispatch;
mod hierarchy;
mod path;

pub use hierarchy::HierarchicalCommand;
pub use path::{
    command_key, CommandNames, CommandPath, Segment, COMMAND_SEPARATOR, DEFAULT_COMMAND_MARKER,
    DEV_COMMAND_PREFIX,
};

pub(crate) use hierarchy::CommandTree;
pub(crate) use path::is_command_key;

use std::sync::Arc;

use tracing::debug;

use trellis_protocols::{Command, ComponentClass, ContainerError, Injectable};

use crate::container::Container;
use crate::registry::Registration;

impl Container {
    /// Register a command implementation under one or more names.
    pub fn register_command(
        &self,
        names: impl Into<CommandNames>,
        class: ComponentClass,
    ) -> Result<(), ContainerError> {
        self.add_command(names.into(), Registration::class(class))
    }

    pub fn register_injectable_command<T: Injectable>(
        &self,
        names: impl Into<CommandNames>,
    ) -> Result<(), ContainerError> {
        self.add_command(names.into(), Registration::injectable::<T>())
    }

    /// Register an already constructed command.
    pub fn register_command_instance<T: Command>(
        &self,
        names: impl Into<CommandNames>,
        command: Arc<T>,
    ) -> Result<(), ContainerError> {
        self.add_command(names.into(), Registration::value(command))
    }

    /// Declare that the module at `path` registers the command `names`.
    pub fn require_command(
        &self,
        names: impl Into<CommandNames>,
        path: &str,
    ) -> Result<(), ContainerError> {
        for name in names.into().iter() {
            let parsed = CommandPath::parse(name)?;
            self.bind_module(&command_key(name), path)?;
            self.commands
                .add(parsed, false, self.override_required_modules())?;
        }
        Ok(())
    }

    /// Resolve a command by its registered name.
    ///
    /// Returns `None` if `name` was never registered or required. Errors
    /// raised while constructing the command propagate.
    pub fn resolve_command(&self, name: &str) -> Result<Option<Arc<dyn Command>>, ContainerError> {
        let key = command_key(name);
        if !self.is_registered(&key) {
            return Ok(None);
        }
        let instance = self.resolve(&key)?;
        instance
            .as_command()
            .map(Some)
            .ok_or_else(|| ContainerError::NotACommand(name.to_string()))
    }

    /// Match `tokens` against the commands registered under `base`.
    ///
    /// Returns `None` when `tokens` is empty or no hierarchical command under
    /// `base` matches.
    pub fn build_hierarchical_command(
        &self,
        base: &str,
        tokens: &[String],
    ) -> Option<HierarchicalCommand> {
        self.commands.find(base, tokens)
    }

    pub fn is_valid_hierarchical_command(&self, base: &str, tokens: &[String]) -> bool {
        self.build_hierarchical_command(base, tokens).is_some()
    }

    /// Registered command names, sorted. Names starting with
    /// [`DEV_COMMAND_PREFIX`] are left out unless `include_dev` is set.
    pub fn registered_command_names(&self, include_dev: bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .names()
            .into_iter()
            .filter(|name| include_dev || !name.starts_with(DEV_COMMAND_PREFIX))
            .collect();
        names.sort_unstable();
        names
    }

    /// Hierarchical command names under `base`, in registration order.
    pub fn child_command_names(&self, base: &str) -> Vec<String> {
        self.commands.children(base)
    }

    pub fn is_default_command(&self, name: &str) -> bool {
        CommandPath::parse(name)
            .map(|path| path.is_default())
            .unwrap_or(false)
    }

    pub fn is_command(&self, name: &str) -> bool {
        self.commands.contains(name)
    }

    fn add_command(
        &self,
        names: CommandNames,
        registration: Registration,
    ) -> Result<(), ContainerError> {
        let allow_override = self.override_required_modules();
        for name in names.iter() {
            let parsed = CommandPath::parse(name)?;
            self.commands.check(&parsed, true, allow_override)?;
            self.register(&command_key(name), registration.clone())?;
            self.commands.add(parsed, true, allow_override)?;
            debug!(command = name, "Registered command");
        }
        Ok(())
    }
}
