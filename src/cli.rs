//! CLI definitions for trellis.

use std::path::PathBuf;

use clap::Parser;

/// trellis CLI.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(about = "Lazy component container with hierarchical commands")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path. Defaults to ~/.trellis/config.toml if present
    #[arg(short, long, env = "TRELLIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Let later module bindings replace earlier ones
    #[arg(long)]
    pub override_modules: bool,

    /// Include dev- commands in listings
    #[arg(long)]
    pub include_dev: bool,

    /// Command to run, e.g. `component list`. Defaults to `help`
    pub command: Option<String>,

    /// Remaining command tokens and arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// The command name and its argument tokens.
    pub fn command_line(&self) -> (String, Vec<String>) {
        match &self.command {
            Some(command) => (command.clone(), self.args.clone()),
            None => ("help".to_string(), Vec::new()),
        }
    }
}
