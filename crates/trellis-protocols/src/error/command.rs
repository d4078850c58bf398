//! Command dispatch errors.

use thiserror::Error;

use super::{ComponentError, ContainerError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command '{name}'{}", format_available(.available))]
    NotFound { name: String, available: Vec<String> },

    #[error("Command {0} is disabled")]
    Disabled(String),

    #[error("Command {0} cannot be executed with the given arguments")]
    CannotExecute(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error("{0}")]
    Custom(String),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(", available: {}", available.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_available() {
        let err = CommandError::NotFound {
            name: "device".to_string(),
            available: vec!["device|list".to_string(), "device|stop".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown command 'device', available: device|list, device|stop"
        );
    }

    #[test]
    fn test_not_found_without_children() {
        let err = CommandError::NotFound {
            name: "nope".to_string(),
            available: Vec::new(),
        };
        assert_eq!(err.to_string(), "Unknown command 'nope'");
    }

    #[test]
    fn test_container_error_is_transparent() {
        let err = CommandError::from(ContainerError::UnknownComponent("x".to_string()));
        assert_eq!(err.to_string(), "Unable to resolve component: x");
    }
}
