//! Running a typed command line.

use tracing::info;

use trellis_protocols::CommandError;

use crate::container::Container;

impl Container {
    /// Find the command `name` refers to, with its arguments.
    ///
    /// A hierarchical match on `args` wins, then a command registered as
    /// exactly `name`, then the default sub-command of `name` with all of
    /// `args`.
    pub fn find_command(
        &self,
        name: &str,
        args: Vec<String>,
    ) -> Result<(String, Vec<String>), CommandError> {
        if let Some(found) = self.build_hierarchical_command(name, &args) {
            return Ok((found.command_name, found.remaining_arguments));
        }
        if let Some(direct) = self.commands.direct(name) {
            return Ok((direct, args));
        }
        if let Some(default) = self.commands.default_child(name) {
            return Ok((default, args));
        }
        Err(CommandError::NotFound {
            name: name.to_string(),
            available: self.child_command_names(name),
        })
    }

    /// Resolve and run the command `name` with `args`.
    pub async fn execute_command(&self, name: &str, args: Vec<String>) -> Result<(), CommandError> {
        let (command_name, args) = self.find_command(name, args)?;
        let command = self
            .resolve_command(&command_name)?
            .ok_or_else(|| CommandError::NotFound {
                name: command_name.clone(),
                available: Vec::new(),
            })?;

        if command.is_disabled() {
            return Err(CommandError::Disabled(command_name));
        }
        if !command.can_execute(&args).await? {
            return Err(CommandError::CannotExecute(command_name));
        }

        info!("Executing command {} with {} arguments", command_name, args.len());
        command.execute(args).await
    }
}
