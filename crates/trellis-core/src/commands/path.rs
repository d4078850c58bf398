//! Command names and their segments.

use std::fmt;

use trellis_protocols::ContainerError;

/// Separates the segments of a hierarchical command name.
pub const COMMAND_SEPARATOR: char = '|';

/// Marks a segment that also matches when its token is absent.
pub const DEFAULT_COMMAND_MARKER: char = '*';

/// Commands whose name starts with this prefix are hidden from listings.
pub const DEV_COMMAND_PREFIX: &str = "dev-";

const COMMAND_KEY_PREFIX: &str = "command:";

/// Registry key a command is stored under.
pub fn command_key(name: &str) -> String {
    format!("{}{}", COMMAND_KEY_PREFIX, name)
}

pub(crate) fn is_command_key(key: &str) -> bool {
    key.starts_with(COMMAND_KEY_PREFIX)
}

/// One segment of a command path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches a token equal to it, ignoring case.
    Literal(String),
    /// Matches a token equal to it, or no token at all.
    Default(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Literal(text) | Segment::Default(text) => text,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Segment::Default(_))
    }

    pub fn matches(&self, token: &str) -> bool {
        self.text().to_lowercase() == token.to_lowercase()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Default(text) => write!(f, "{}{}", DEFAULT_COMMAND_MARKER, text),
        }
    }
}

/// A parsed command name such as `device|*list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPath {
    name: String,
    segments: Vec<Segment>,
}

impl CommandPath {
    pub fn parse(name: &str) -> Result<Self, ContainerError> {
        let invalid = |reason: &str| ContainerError::InvalidCommandName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        for (index, raw) in name.split(COMMAND_SEPARATOR).enumerate() {
            let (text, default) = match raw.strip_prefix(DEFAULT_COMMAND_MARKER) {
                Some(text) => (text, true),
                None => (raw, false),
            };
            if text.trim().is_empty() {
                return Err(invalid("empty segment"));
            }
            if text.contains(DEFAULT_COMMAND_MARKER) {
                return Err(invalid("default marker inside a segment"));
            }
            if text.chars().any(char::is_whitespace) {
                return Err(invalid("whitespace inside a segment"));
            }
            if default && index == 0 {
                return Err(invalid("the base segment cannot be a default segment"));
            }
            segments.push(if default {
                Segment::Default(text.to_string())
            } else {
                Segment::Literal(text.to_string())
            });
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first segment.
    pub fn base(&self) -> &str {
        self.segments[0].text()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_hierarchical(&self) -> bool {
        self.segments.len() > 1
    }

    /// Whether the last segment is a default segment.
    pub fn is_default(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_default)
    }

    pub fn is_dev(&self) -> bool {
        self.name.starts_with(DEV_COMMAND_PREFIX)
    }

    pub fn has_base(&self, base: &str) -> bool {
        self.segments[0].matches(base)
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One or more names a command is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNames(Vec<String>);

impl CommandNames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The first name.
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl From<&str> for CommandNames {
    fn from(name: &str) -> Self {
        CommandNames(vec![name.to_string()])
    }
}

impl From<String> for CommandNames {
    fn from(name: String) -> Self {
        CommandNames(vec![name])
    }
}

impl From<Vec<&str>> for CommandNames {
    fn from(names: Vec<&str>) -> Self {
        CommandNames(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for CommandNames {
    fn from(names: Vec<String>) -> Self {
        CommandNames(names)
    }
}

impl<const N: usize> From<[&str; N]> for CommandNames {
    fn from(names: [&str; N]) -> Self {
        CommandNames(names.iter().map(|n| n.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let path = CommandPath::parse("echo").unwrap();
        assert_eq!(path.base(), "echo");
        assert_eq!(path.depth(), 1);
        assert!(!path.is_hierarchical());
        assert!(!path.is_default());
    }

    #[test]
    fn test_parse_hierarchical_with_default() {
        let path = CommandPath::parse("device|*list").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Literal("device".to_string()),
                Segment::Default("list".to_string())
            ]
        );
        assert!(path.is_hierarchical());
        assert!(path.is_default());
        assert_eq!(path.to_string(), "device|*list");
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        for name in ["", "a||b", "a|", "|a", "*a|b", "a|b*c", "a|*", "a b|c"] {
            assert!(
                matches!(
                    CommandPath::parse(name),
                    Err(ContainerError::InvalidCommandName { .. })
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_segment_matches_ignoring_case() {
        let segment = Segment::Literal("command".to_string());
        assert!(segment.matches("CoMmanD"));
        assert!(!segment.matches("commands"));
    }

    #[test]
    fn test_dev_and_key() {
        assert!(CommandPath::parse("dev-container|dump").unwrap().is_dev());
        assert_eq!(command_key("a|b"), "command:a|b");
        assert!(is_command_key("command:a|b"));
        assert!(!is_command_key("fs"));
    }

    #[test]
    fn test_command_names_conversions() {
        let one = CommandNames::from("list");
        assert_eq!(one.primary(), Some("list"));
        let many = CommandNames::from(["ls", "list"]);
        assert_eq!(many.iter().collect::<Vec<_>>(), vec!["ls", "list"]);
    }
}
