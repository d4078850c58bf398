//! Built-in components.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::{json, Value};

use trellis_config::Config;
use trellis_core::Container;
use trellis_macros::injectable;
use trellis_protocols::{CommandError, Component, ExportedMethod, Initialization};

/// Line-oriented console output.
///
/// A captured output keeps its lines in memory instead of printing them.
pub(crate) struct Output {
    captured: Option<Mutex<Vec<String>>>,
}

impl Output {
    pub fn stdout() -> Self {
        Self { captured: None }
    }

    #[cfg(test)]
    pub fn captured() -> Self {
        Self {
            captured: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn line(&self, text: impl Into<String>) {
        let text = text.into();
        match &self.captured {
            Some(lines) => lines.lock().push(text),
            None => println!("{}", text),
        }
    }

    /// Captured lines. Always empty for stdout.
    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|lines| lines.lock().clone())
            .unwrap_or_default()
    }
}

impl Component for Output {}

/// The loaded configuration and where it came from.
pub(crate) struct Settings {
    pub config: Config,
    pub source: Option<PathBuf>,
}

impl Settings {
    pub fn new(config: Config, source: Option<PathBuf>) -> Self {
        Self { config, source }
    }

    /// Config file path for display, `defaults` when none was read.
    pub fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    }
}

impl Component for Settings {}

/// Facts about the running binary, published as a public class.
pub(crate) struct HostInfo {
    version: &'static str,
    os: &'static str,
    arch: &'static str,
    config: String,
    ready: AtomicBool,
}

#[injectable(name = "HostInfo")]
impl HostInfo {
    #[inject]
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            config: settings.source_label(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn describe(&self) -> Value {
        json!({
            "name": "trellis",
            "version": self.version,
            "os": self.os,
            "arch": self.arch,
            "config": self.config,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl Component for HostInfo {
    fn initialize(self: Arc<Self>) -> Option<Initialization> {
        self.ready.store(true, Ordering::SeqCst);
        Some(Initialization::done())
    }

    fn exports(&self) -> Vec<ExportedMethod> {
        vec![
            ExportedMethod::from_fn("describe", |host: &HostInfo, _args| Ok(host.describe())),
            ExportedMethod::from_fn("isReady", |host: &HostInfo, _args| {
                Ok(Value::Bool(host.is_ready()))
            }),
        ]
    }
}

/// Handle to the container for commands that inspect it.
///
/// Holds a weak reference so the container does not own itself.
pub(crate) struct Injector {
    container: Weak<Container>,
}

impl Injector {
    pub fn new(container: &Arc<Container>) -> Self {
        Self {
            container: Arc::downgrade(container),
        }
    }

    pub fn container(&self) -> Result<Arc<Container>, CommandError> {
        self.container
            .upgrade()
            .ok_or_else(|| CommandError::Custom("Container is no longer available".to_string()))
    }
}

impl Component for Injector {}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_protocols::Injectable;

    #[test]
    fn test_captured_output() {
        let output = Output::captured();
        output.line("one");
        output.line(String::from("two"));
        assert_eq!(output.lines(), vec!["one", "two"]);
        assert!(Output::stdout().lines().is_empty());
    }

    #[test]
    fn test_settings_source_label() {
        let settings = Settings::new(Config::default(), None);
        assert_eq!(settings.source_label(), "defaults");
        let settings = Settings::new(Config::default(), Some(PathBuf::from("/etc/trellis.toml")));
        assert_eq!(settings.source_label(), "/etc/trellis.toml");
    }

    #[test]
    fn test_host_info_class() {
        let class = HostInfo::component_class();
        assert_eq!(class.name(), "HostInfo");
        assert_eq!(class.signature(), "fn new(settings)");
    }

    #[test]
    fn test_host_info_describe() {
        let host = HostInfo::new(Arc::new(Settings::new(Config::default(), None)));
        let described = host.describe();
        assert_eq!(described["name"], "trellis");
        assert_eq!(described["config"], "defaults");
        assert!(!host.is_ready());
    }

    #[test]
    fn test_injector_outlived_by_container() {
        let container = Arc::new(Container::new());
        let injector = Injector::new(&container);
        assert!(injector.container().is_ok());
        drop(container);
        assert!(injector.container().is_err());
    }
}
