//! Resolved constructor arguments.

use std::sync::Arc;

use super::{downcast, Component, Instance};
use crate::error::ContainerError;

/// Ordered dependencies handed to a [`ComponentClass`](super::ComponentClass)
/// constructor, one per declared parameter.
#[derive(Clone, Default)]
pub struct Dependencies {
    component: String,
    entries: Vec<(String, Instance)>,
}

impl Dependencies {
    pub fn new(component: impl Into<String>, entries: Vec<(String, Instance)>) -> Self {
        Self {
            component: component.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dependency names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// The raw instance at `index`.
    pub fn instance(&self, index: usize) -> Result<Instance, ContainerError> {
        self.entries
            .get(index)
            .map(|(_, instance)| instance.clone())
            .ok_or_else(|| {
                ContainerError::MissingDependency(format!(
                    "#{} of {}",
                    index, self.component
                ))
            })
    }

    /// The raw instance declared under `name`.
    pub fn named_instance(&self, name: &str) -> Result<Instance, ContainerError> {
        self.entries
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, instance)| instance.clone())
            .ok_or_else(|| {
                ContainerError::MissingDependency(format!("{} of {}", name, self.component))
            })
    }

    /// The dependency at `index`, downcast to `T`.
    pub fn get<T: Component>(&self, index: usize) -> Result<Arc<T>, ContainerError> {
        let instance = self.instance(index)?;
        let name = &self.entries[index].0;
        downcast::<T>(&instance).ok_or_else(|| ContainerError::DependencyType {
            name: name.clone(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// The dependency declared under `name`, downcast to `T`.
    pub fn named<T: Component>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let instance = self.named_instance(name)?;
        downcast::<T>(&instance).ok_or_else(|| ContainerError::DependencyType {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dependencies {
        Dependencies::new(
            "Sample",
            vec![
                ("x".to_string(), Arc::new("foo".to_string()) as Instance),
                ("y".to_string(), Arc::new(123i64) as Instance),
            ],
        )
    }

    #[test]
    fn test_positional_access() {
        let deps = sample();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps.get::<String>(0).unwrap().as_str(), "foo");
        assert_eq!(*deps.get::<i64>(1).unwrap(), 123);
    }

    #[test]
    fn test_named_access() {
        let deps = sample();
        assert_eq!(*deps.named::<i64>("y").unwrap(), 123);
        assert_eq!(deps.names().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_wrong_type() {
        let deps = sample();
        let err = deps.get::<bool>(0).err().unwrap();
        match err {
            ContainerError::DependencyType { name, expected } => {
                assert_eq!(name, "x");
                assert_eq!(expected, "bool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_entry() {
        let deps = sample();
        assert!(matches!(
            deps.get::<String>(5),
            Err(ContainerError::MissingDependency(_))
        ));
        assert!(matches!(
            deps.named::<String>("z"),
            Err(ContainerError::MissingDependency(_))
        ));
    }
}
