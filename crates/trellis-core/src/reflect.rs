//! Parameter reflection for constructible components.
//!
//! A [`ComponentClass`](trellis_protocols::ComponentClass) declares its
//! constructor signature as text. This module extracts the ordered dependency
//! names from that text. Three shapes are accepted:
//!
//! - function form: `pub fn new($fs, logger: Arc<Logger>) -> Self { .. }`
//! - bare parameter list: `(fs, logger)`
//! - closure form: `move |fs, logger| Service::new(fs, logger)`

use trellis_protocols::{ContainerError, DEPENDENCY_MARKER};

/// Extract the declared dependency names of a signature, in order.
///
/// Type annotations, `mut`/`&` prefixes and receivers are ignored; a leading
/// [`DEPENDENCY_MARKER`] is stripped from every name.
pub fn parameter_names(signature: &str) -> Result<Vec<String>, ContainerError> {
    let trimmed = signature.trim();
    if trimmed.is_empty() {
        return Err(ContainerError::signature(signature, "empty signature"));
    }

    let params = match closure_parameters(trimmed) {
        Some(params) => params.map_err(|reason| ContainerError::signature(signature, reason))?,
        None => function_parameters(trimmed)
            .map_err(|reason| ContainerError::signature(signature, reason))?,
    };

    split_top_level(params)
        .map_err(|reason| ContainerError::signature(signature, reason))?
        .into_iter()
        .enumerate()
        .filter_map(|(index, param)| parameter_name(param, index).transpose())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| ContainerError::signature(signature, reason))
}

/// Strip the dependency marker from a component name.
pub fn strip_marker(name: &str) -> &str {
    name.strip_prefix(DEPENDENCY_MARKER).unwrap_or(name)
}

/// Parameter text of a closure signature, or `None` if this is not one.
fn closure_parameters(text: &str) -> Option<Result<&str, String>> {
    let rest = strip_keyword(text, "move").unwrap_or(text);
    let inner = rest.strip_prefix('|')?;
    Some(
        inner
            .find('|')
            .map(|end| &inner[..end])
            .ok_or_else(|| "unterminated closure parameter list".to_string()),
    )
}

/// Parameter text of a function or bare-list signature.
fn function_parameters(text: &str) -> Result<&str, String> {
    let mut rest = strip_visibility(text);
    loop {
        match ["const", "async", "unsafe", "fn"]
            .iter()
            .find_map(|kw| strip_keyword(rest, kw))
        {
            Some(next) => rest = next,
            None => break,
        }
    }

    if !rest.starts_with('(') {
        let ident_len = rest
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if ident_len == 0 {
            return Err("expected a parameter list".to_string());
        }
        rest = rest[ident_len..].trim_start();
        if rest.starts_with('<') {
            let close = matching_close(rest).ok_or("unbalanced generic parameters")?;
            rest = rest[close + 1..].trim_start();
        }
        if !rest.starts_with('(') {
            return Err("expected a parameter list".to_string());
        }
    }

    let close = matching_close(rest).ok_or("unbalanced parameter list")?;
    let tail = rest[close + 1..].trim();
    if !(tail.is_empty()
        || tail.starts_with("->")
        || tail.starts_with('{')
        || tail.starts_with("where"))
    {
        return Err(format!("unexpected text after parameter list: {}", tail));
    }
    Ok(&rest[1..close])
}

/// Name declared by one parameter, `None` for a receiver or a trailing comma.
fn parameter_name(param: &str, index: usize) -> Result<Option<String>, String> {
    let param = param.trim();
    if param.is_empty() {
        return Err(format!("empty parameter at position {}", index));
    }

    let pattern = param.split_once(':').map(|(p, _)| p).unwrap_or(param).trim();
    let pattern = pattern.strip_prefix('&').map(str::trim_start).unwrap_or(pattern);
    let pattern = strip_keyword(pattern, "mut").unwrap_or(pattern);
    if pattern == "self" {
        return Ok(None);
    }

    let name = strip_marker(pattern);
    let name = name.strip_prefix("r#").unwrap_or(name);
    if !is_identifier(name) {
        return Err(format!("invalid parameter name `{}`", pattern));
    }
    Ok(Some(name.to_string()))
}

/// Split on commas that are not nested in brackets.
///
/// A single trailing comma is dropped.
fn split_top_level(params: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let bytes = params.as_bytes();

    for (i, c) in params.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if i > 0 && bytes[i - 1] == b'-' => {}
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        if depth < 0 {
            return Err("unbalanced delimiters in parameter list".to_string());
        }
    }
    if depth != 0 {
        return Err("unbalanced delimiters in parameter list".to_string());
    }

    parts.push(&params[start..]);
    if parts.last().is_some_and(|last| last.trim().is_empty()) {
        parts.pop();
    }
    Ok(parts)
}

/// Byte index of the delimiter closing the one `text` starts with.
fn matching_close(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if i > 0 && bytes[i - 1] == b'-' => {}
            '>' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            return Some(i);
        }
        if depth < 0 {
            return None;
        }
    }
    None
}

fn strip_visibility(text: &str) -> &str {
    match strip_keyword(text, "pub") {
        Some(rest) if rest.starts_with('(') => match matching_close(rest) {
            Some(close) => rest[close + 1..].trim_start(),
            None => rest,
        },
        Some(rest) => rest,
        None => text,
    }
}

/// Strip `keyword` when it stands alone as the first token.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if is_ident_char(c) => None,
        _ => Some(rest.trim_start()),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name != "_" && chars.all(is_ident_char)
}

#[cfg(test)]
#[path = "reflect_tests.rs"]
mod tests;
