//! Path normalization and template parsing.
//!
//! Registration and resolution share the same normalization: surrounding
//! whitespace is trimmed, backslashes become slashes and leading/trailing
//! slashes are dropped before splitting on `/`.

use crate::error::{RouteError, RouteResult};

/// One parsed segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A lower-cased literal token.
    Literal(String),
    /// A named parameter, brace-stripped, case preserved.
    Parameter(String),
}

/// Normalizes a request path or route template.
///
/// ```rust
/// use ferrule_router::normalize_path;
///
/// assert_eq!(normalize_path("  /Users/42/ "), "Users/42");
/// assert_eq!(normalize_path("\\items\\7"), "items/7");
/// assert_eq!(normalize_path("/"), "");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/").trim_matches('/').to_string()
}

/// Splits a normalized path into its raw segments.
///
/// An empty path yields a single empty segment, which resolves to the root.
pub(crate) fn split(normalized: &str) -> Vec<&str> {
    normalized.split('/').collect()
}

/// Parses a route template into trie segments.
///
/// A path of just `/` yields no segments.
pub(crate) fn parse_template(template: &str) -> RouteResult<Vec<Segment>> {
    let normalized = normalize_path(template);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    split(&normalized)
        .into_iter()
        .map(|part| {
            if part.is_empty() {
                return Err(RouteError::EmptySegment {
                    path: template.to_string(),
                });
            }
            Ok(match parameter_name(part) {
                Some(name) => Segment::Parameter(name.to_string()),
                None => Segment::Literal(part.to_lowercase()),
            })
        })
        .collect()
}

/// Returns the parameter name if `part` has the form `{identifier}`.
fn parameter_name(part: &str) -> Option<&str> {
    let name = part.strip_prefix('{')?.strip_suffix('}')?;
    let is_identifier =
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_identifier.then_some(name)
}
