//! Built-in commands.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use trellis_core::{Container, ResolutionState, COMMAND_SEPARATOR, DEFAULT_COMMAND_MARKER};
use trellis_macros::injectable;
use trellis_protocols::{Command, CommandError, Component, ComponentError};

use crate::components::{Injector, Output, Settings};

/// `device|*list` as typed on the command line: `device list`.
pub(crate) fn display_name(name: &str) -> String {
    name.split(COMMAND_SEPARATOR)
        .map(|segment| segment.trim_start_matches(DEFAULT_COMMAND_MARKER))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `help`: list the available commands.
pub(crate) struct HelpCommand {
    output: Arc<Output>,
    injector: Arc<Injector>,
    settings: Arc<Settings>,
}

#[injectable]
impl HelpCommand {
    #[inject]
    pub fn new(output: Arc<Output>, injector: Arc<Injector>, settings: Arc<Settings>) -> Self {
        Self {
            output,
            injector,
            settings,
        }
    }
}

impl Component for HelpCommand {
    fn as_command(self: Arc<Self>) -> Option<Arc<dyn Command>> {
        Some(self)
    }
}

#[async_trait]
impl Command for HelpCommand {
    async fn execute(&self, _args: Vec<String>) -> Result<(), CommandError> {
        let container = self.injector.container()?;

        let host = container.public_api().class("hostInfo")?;
        let info = host.call("describe", Value::Null).await?;
        self.output.line(format!(
            "trellis {} ({}/{})",
            info["version"].as_str().unwrap_or_default(),
            info["os"].as_str().unwrap_or_default(),
            info["arch"].as_str().unwrap_or_default(),
        ));
        self.output.line("");
        self.output.line("Commands:");

        let include_dev = self.settings.config.container.include_dev_commands;
        for name in container.registered_command_names(include_dev) {
            let description = match container.resolve_command(&name)? {
                Some(command) => command.description().to_string(),
                None => String::new(),
            };
            self.output
                .line(format!("  {:<24} {}", display_name(&name), description));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Show available commands"
    }
}

/// `component list [prefix]`: registered components and their state.
pub(crate) struct ComponentListCommand {
    output: Arc<Output>,
    injector: Arc<Injector>,
}

#[injectable]
impl ComponentListCommand {
    #[inject]
    pub fn new(output: Arc<Output>, injector: Arc<Injector>) -> Self {
        Self { output, injector }
    }
}

impl Component for ComponentListCommand {
    fn as_command(self: Arc<Self>) -> Option<Arc<dyn Command>> {
        Some(self)
    }
}

#[async_trait]
impl Command for ComponentListCommand {
    async fn execute(&self, args: Vec<String>) -> Result<(), CommandError> {
        let container = self.injector.container()?;
        let prefix = args.first().map(String::as_str).unwrap_or("");

        for name in container.registered_names() {
            if !name.starts_with(prefix) {
                continue;
            }
            self.output
                .line(format!("{:<16} {}", name, component_status(&container, &name)));
        }
        Ok(())
    }

    async fn can_execute(&self, args: &[String]) -> Result<bool, CommandError> {
        Ok(args.len() <= 1)
    }

    fn description(&self) -> &str {
        "List registered components"
    }
}

fn component_status(container: &Container, name: &str) -> String {
    match container.resolution_state(name) {
        Some(ResolutionState::Resolved) => "resolved".to_string(),
        Some(ResolutionState::Resolving) => "resolving".to_string(),
        Some(ResolutionState::Unresolved) => "registered".to_string(),
        None => match container.module_path(name) {
            Some(path) => format!("deferred ({})", path),
            None => "unknown".to_string(),
        },
    }
}

/// `config show`, also plain `config`: print the effective configuration.
pub(crate) struct ConfigShowCommand {
    output: Arc<Output>,
    settings: Arc<Settings>,
}

#[injectable]
impl ConfigShowCommand {
    #[inject]
    pub fn new(output: Arc<Output>, settings: Arc<Settings>) -> Self {
        Self { output, settings }
    }
}

impl Component for ConfigShowCommand {
    fn as_command(self: Arc<Self>) -> Option<Arc<dyn Command>> {
        Some(self)
    }
}

#[async_trait]
impl Command for ConfigShowCommand {
    async fn execute(&self, _args: Vec<String>) -> Result<(), CommandError> {
        let text =
            serde_json::to_string_pretty(&self.settings.config).map_err(ComponentError::from)?;
        self.output
            .line(format!("# source: {}", self.settings.source_label()));
        self.output.line(text);
        Ok(())
    }

    async fn can_execute(&self, args: &[String]) -> Result<bool, CommandError> {
        Ok(args.is_empty())
    }

    fn description(&self) -> &str {
        "Print the effective configuration"
    }
}

/// `echo <words...>`.
pub(crate) struct EchoCommand {
    output: Arc<Output>,
}

#[injectable]
impl EchoCommand {
    #[inject]
    pub fn new(output: Arc<Output>) -> Self {
        Self { output }
    }
}

impl Component for EchoCommand {
    fn as_command(self: Arc<Self>) -> Option<Arc<dyn Command>> {
        Some(self)
    }
}

#[async_trait]
impl Command for EchoCommand {
    async fn execute(&self, args: Vec<String>) -> Result<(), CommandError> {
        self.output.line(args.join(" "));
        Ok(())
    }

    fn description(&self) -> &str {
        "Print the arguments"
    }
}

/// `dev-container dump`: the container's state as JSON.
pub(crate) struct ContainerDumpCommand {
    output: Arc<Output>,
    injector: Arc<Injector>,
}

#[injectable]
impl ContainerDumpCommand {
    #[inject]
    pub fn new(output: Arc<Output>, injector: Arc<Injector>) -> Self {
        Self { output, injector }
    }
}

impl Component for ContainerDumpCommand {
    fn as_command(self: Arc<Self>) -> Option<Arc<dyn Command>> {
        Some(self)
    }
}

#[async_trait]
impl Command for ContainerDumpCommand {
    async fn execute(&self, _args: Vec<String>) -> Result<(), CommandError> {
        let container = self.injector.container()?;
        let public = container.public_api();

        let components: Vec<Value> = container
            .registered_names()
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "module": container.module_path(name),
                    "status": component_status(&container, name),
                })
            })
            .collect();
        let public_names: Vec<Value> = public
            .names()
            .iter()
            .map(|name| json!({ "name": name, "resolved": public.is_resolved(name) }))
            .collect();

        let dump = json!({
            "state": format!("{:?}", container.state()),
            "overrideRequiredModules": container.override_required_modules(),
            "components": components,
            "commands": container.registered_command_names(true),
            "public": public_names,
        });
        let text = serde_json::to_string_pretty(&dump).map_err(ComponentError::from)?;
        self.output.line(text);
        Ok(())
    }

    fn description(&self) -> &str {
        "Dump container state"
    }
}
