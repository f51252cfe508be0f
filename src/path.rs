use regex::Regex;
use std::sync::LazyLock;

/// Runs of characters that may not appear in a store path.
pub const FORBIDDEN_CHARS: &str = r"[^._\-/ :!#$%&()+=@^{}|~\p{Ll}\p{Lu}\p{Nd}]+";

static DEFAULT_FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(FORBIDDEN_CHARS).unwrap_or_else(|e| panic!("built-in pattern is invalid: {e}"))
});

pub fn default_forbidden_chars() -> Regex {
    DEFAULT_FORBIDDEN.clone()
}

/// Replaces every run of forbidden characters with a single `_`.
pub fn sanitize(raw: &str, forbidden: &Regex) -> String {
    forbidden.replace_all(raw, "_").into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub path: String,
    pub leaf: String,
    pub root: String,
}

impl PathParts {
    /// Splits an already sanitized path. Drops one trailing `.`.
    pub fn split(cleaned: &str) -> Option<Self> {
        let path = cleaned.strip_suffix('.').unwrap_or(cleaned);
        let (root, leaf) = match path.rsplit_once('.') {
            Some((root, leaf)) => (root, leaf),
            None => ("", path),
        };
        if leaf.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_string(),
            leaf: leaf.to_string(),
            root: root.to_string(),
        })
    }

    pub fn parse(raw: &str, forbidden: &Regex) -> Option<Self> {
        Self::split(&sanitize(raw, forbidden))
    }
}

/// True if `name` ends with any of `endings`, ignoring case.
pub fn has_ending(name: &str, endings: &[String]) -> bool {
    if name.is_empty() {
        return false;
    }
    let name = name.to_lowercase();
    endings
        .iter()
        .filter(|e| !e.is_empty())
        .any(|e| name.ends_with(&e.to_lowercase()))
}

/// True if `path` is `prefix` itself or lies below it.
pub fn is_within(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}
