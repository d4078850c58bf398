//! Registered command paths and hierarchical matching.

use parking_lot::RwLock;

use trellis_protocols::ContainerError;

use super::path::{CommandPath, Segment};

/// A command line resolved to a registered hierarchical command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchicalCommand {
    /// Registered name of the matched command.
    pub command_name: String,
    /// Tokens left after the segments of the command.
    pub remaining_arguments: Vec<String>,
}

#[derive(Debug, Clone)]
struct CommandRecord {
    path: CommandPath,
    /// Registered directly rather than only bound to a module.
    implemented: bool,
}

/// Command paths in registration order.
pub(crate) struct CommandTree {
    records: RwLock<Vec<CommandRecord>>,
}

impl CommandTree {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Record `path`.
    ///
    /// Binding a path to a module and then registering it is one command.
    /// Registering the same path twice fails unless `allow_override` is set.
    pub fn add(
        &self,
        path: CommandPath,
        implemented: bool,
        allow_override: bool,
    ) -> Result<(), ContainerError> {
        let mut records = self.records.write();
        match records.iter_mut().find(|r| r.path.name() == path.name()) {
            Some(existing) if implemented && existing.implemented && !allow_override => {
                Err(ContainerError::DuplicateCommand(path.name().to_string()))
            }
            Some(existing) => {
                existing.implemented |= implemented;
                Ok(())
            }
            None => {
                records.push(CommandRecord { path, implemented });
                Ok(())
            }
        }
    }

    /// Fails like [`add`](Self::add) would, without recording anything.
    pub fn check(
        &self,
        path: &CommandPath,
        implemented: bool,
        allow_override: bool,
    ) -> Result<(), ContainerError> {
        let duplicate = implemented
            && !allow_override
            && self
                .records
                .read()
                .iter()
                .any(|r| r.implemented && r.path.name() == path.name());
        if duplicate {
            Err(ContainerError::DuplicateCommand(path.name().to_string()))
        } else {
            Ok(())
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.read().iter().any(|r| r.path.name() == name)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.records
            .read()
            .iter()
            .map(|r| r.path.name().to_string())
            .collect()
    }

    /// Registered name of the single-segment command `base`, ignoring case.
    pub fn direct(&self, base: &str) -> Option<String> {
        self.records
            .read()
            .iter()
            .find(|r| !r.path.is_hierarchical() && r.path.has_base(base))
            .map(|r| r.path.name().to_string())
    }

    /// Hierarchical names under `base`, in registration order.
    pub fn children(&self, base: &str) -> Vec<String> {
        self.records
            .read()
            .iter()
            .filter(|r| r.path.is_hierarchical() && r.path.has_base(base))
            .map(|r| r.path.name().to_string())
            .collect()
    }

    /// The shallowest command under `base` whose second segment is a default
    /// segment.
    pub fn default_child(&self, base: &str) -> Option<String> {
        self.records
            .read()
            .iter()
            .filter(|r| {
                r.path.has_base(base) && r.path.segments().get(1).is_some_and(Segment::is_default)
            })
            .min_by_key(|r| r.path.depth())
            .map(|r| r.path.name().to_string())
    }

    /// Match `tokens` against the paths registered under `base`.
    ///
    /// Every path whose segments after the base can be satisfied by a prefix
    /// of `tokens` is a candidate. The candidate consuming the most tokens
    /// wins, then the deepest, then the first registered.
    pub fn find(&self, base: &str, tokens: &[String]) -> Option<HierarchicalCommand> {
        if tokens.is_empty() {
            return None;
        }

        let records = self.records.read();
        let mut best: Option<(usize, usize, &CommandRecord)> = None;
        for record in records
            .iter()
            .filter(|r| r.path.is_hierarchical() && r.path.has_base(base))
        {
            let Some(used) = consumed(&record.path.segments()[1..], tokens) else {
                continue;
            };
            let depth = record.path.depth();
            let better = match best {
                None => true,
                Some((best_used, best_depth, _)) => (used, depth) > (best_used, best_depth),
            };
            if better {
                best = Some((used, depth, record));
            }
        }

        best.map(|(used, _, record)| HierarchicalCommand {
            command_name: record.path.name().to_string(),
            remaining_arguments: tokens[used..].to_vec(),
        })
    }
}

/// Tokens consumed when `segments` match the start of `tokens`, `None` if
/// they cannot.
///
/// A default segment consumes an equal token when it can, otherwise none.
fn consumed(segments: &[Segment], tokens: &[String]) -> Option<usize> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(0);
    };

    let literal = match tokens.split_first() {
        Some((token, remaining)) if segment.matches(token) => {
            consumed(rest, remaining).map(|used| used + 1)
        }
        _ => None,
    };
    if segment.is_default() {
        literal.max(consumed(rest, tokens))
    } else {
        literal
    }
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
