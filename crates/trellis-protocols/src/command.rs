//! Command protocol definitions.

use async_trait::async_trait;

use crate::component::Component;
use crate::error::CommandError;

/// A component that can be run from the command line.
///
/// Implementors also override [`Component::as_command`] to return
/// `Some(self)` so the container can hand them out as commands.
#[async_trait]
pub trait Command: Component {
    /// Run the command with the arguments left after command resolution.
    async fn execute(&self, args: Vec<String>) -> Result<(), CommandError>;

    /// Custom argument validation. Defaults to accepting anything.
    async fn can_execute(&self, _args: &[String]) -> Result<bool, CommandError> {
        Ok(true)
    }

    fn is_disabled(&self) -> bool {
        false
    }

    /// One line shown in command listings.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::component::Instance;

    struct Noop;

    impl Component for Noop {
        fn as_command(self: Arc<Self>) -> Option<Arc<dyn Command>> {
            Some(self)
        }
    }

    #[async_trait]
    impl Command for Noop {
        async fn execute(&self, _args: Vec<String>) -> Result<(), CommandError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_command_from_instance() {
        let instance: Instance = Arc::new(Noop);
        let command = instance.as_command().unwrap();
        assert!(!command.is_disabled());
        assert!(command.can_execute(&[]).await.unwrap());
        command.execute(vec!["x".to_string()]).await.unwrap();
    }
}
