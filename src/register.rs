//! Built-in module manifest and container bootstrap.

use std::sync::Arc;

use tracing::debug;

use trellis_core::{Container, ContainerOptions, ModuleManifest};
use trellis_protocols::ContainerError;

use crate::commands::{
    ComponentListCommand, ConfigShowCommand, ContainerDumpCommand, EchoCommand, HelpCommand,
};
use crate::components::{HostInfo, Injector, Output, Settings};

/// Modules that register the lazily loaded built-ins.
pub(crate) fn manifest() -> ModuleManifest {
    ModuleManifest::new()
        .module("./host-info", |c: &Container| {
            c.register_injectable::<HostInfo>("hostInfo")
        })
        .module("./commands/help", |c: &Container| {
            c.register_injectable_command::<HelpCommand>("help")
        })
        .module("./commands/component", |c: &Container| {
            c.register_injectable_command::<ComponentListCommand>("component|list")
        })
        .module("./commands/config", |c: &Container| {
            c.register_injectable_command::<ConfigShowCommand>("config|*show")
        })
        .module("./commands/echo", |c: &Container| {
            c.register_injectable_command::<EchoCommand>("echo")
        })
        .module("./commands/container", |c: &Container| {
            c.register_injectable_command::<ContainerDumpCommand>("dev-container|dump")
        })
}

/// Build the container with every built-in registered or required.
///
/// `settings` and `output` are registered directly; everything else loads on
/// first use.
pub(crate) fn build_container(
    settings: Settings,
    output: Arc<Output>,
) -> Result<Arc<Container>, ContainerError> {
    let options = ContainerOptions {
        override_required_modules: settings.config.container.override_required_modules,
    };
    let container = Arc::new(Container::with_options(options, manifest()));

    container.register_value("injector", Arc::new(Injector::new(&container)))?;
    container.register_value("settings", Arc::new(settings))?;
    container.register_value("output", output)?;

    container.require_public_class("hostInfo", "./host-info")?;

    container.require_command("help", "./commands/help")?;
    container.require_command("component|list", "./commands/component")?;
    container.require_command("config|*show", "./commands/config")?;
    container.require_command("echo", "./commands/echo")?;
    container.require_command("dev-container|dump", "./commands/container")?;

    debug!(
        commands = container.registered_command_names(true).len(),
        "Container ready"
    );
    Ok(container)
}
