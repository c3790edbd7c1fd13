//! Name filtering and display paths for overlay walks.

use glob::Pattern;

/// Pattern value that turns name filtering off.
pub const MATCH_ALL: &str = "-";

/// Base-name filter applied to non-directory nodes.
#[derive(Debug, Clone)]
pub(crate) enum NameFilter {
    All,
    Patterns(Vec<Pattern>),
}

impl NameFilter {
    /// Build a filter. An empty list or a leading [`MATCH_ALL`] matches everything.
    ///
    /// Malformed patterns never match.
    pub(crate) fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        match patterns.first() {
            None => NameFilter::All,
            Some(first) if first.as_ref() == MATCH_ALL => NameFilter::All,
            Some(_) => NameFilter::Patterns(
                patterns
                    .iter()
                    .filter_map(|p| compile(p.as_ref()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn matches(&self, base_name: &str) -> bool {
        match self {
            NameFilter::All => true,
            NameFilter::Patterns(patterns) => patterns.iter().any(|p| p.matches(base_name)),
        }
    }
}

/// Compile a loader pattern into a [`glob::Pattern`].
///
/// `[^...]` negates a class like `[!...]`, and `\` outside a class escapes
/// the next character. A trailing `\` is malformed.
fn compile(pattern: &str) -> Option<Pattern> {
    let mut translated = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' if !in_class => {
                let escaped = chars.next()?;
                translated.push_str(&Pattern::escape(escaped.encode_utf8(&mut [0; 4])));
            }
            '[' if !in_class => {
                in_class = true;
                translated.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    translated.push('!');
                }
            }
            ']' if in_class => {
                in_class = false;
                translated.push(']');
            }
            _ => translated.push(c),
        }
    }

    Pattern::new(&translated).ok()
}

/// Display path handed to walk visitors.
///
/// `walk_root` is the normalized walk root relative to the overlay root and
/// `relative` the node's path below it. The result is `/`-separated and
/// relative to the overlay root; the overlay root itself is shown as `/`.
pub(crate) fn display_path(walk_root: &str, relative: &str) -> String {
    match (walk_root.is_empty(), relative.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => relative.to_string(),
        (false, true) => walk_root.to_string(),
        (false, false) => format!("{}/{}", walk_root, relative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_empty_matches_all() {
        let filter = NameFilter::new::<&str>(&[]);
        assert!(filter.matches("anything.bin"));
    }

    #[test]
    fn test_filter_sentinel_matches_all() {
        let filter = NameFilter::new(&["-", "*.json"]);
        assert!(filter.matches("a.yao"));
    }

    #[test]
    fn test_filter_patterns() {
        let filter = NameFilter::new(&["*.json", "model?.yao", "[ab].txt"]);
        assert!(filter.matches("user.json"));
        assert!(filter.matches("model1.yao"));
        assert!(filter.matches("a.txt"));
        assert!(!filter.matches("model12.yao"));
        assert!(!filter.matches("c.txt"));
        assert!(!filter.matches("user.yao"));
    }

    #[test]
    fn test_malformed_pattern_never_matches() {
        let filter = NameFilter::new(&["[unclosed"]);
        assert!(!filter.matches("[unclosed"));
        assert!(!filter.matches("anything"));
    }

    #[test]
    fn test_caret_negates_class() {
        let filter = NameFilter::new(&["[^_]*.yao"]);
        assert!(filter.matches("user.yao"));
        assert!(!filter.matches("_draft.yao"));

        let bang = NameFilter::new(&["[!_]*.yao"]);
        assert!(bang.matches("user.yao"));
        assert!(!bang.matches("_draft.yao"));
    }

    #[test]
    fn test_backslash_escapes_metacharacters() {
        let filter = NameFilter::new(&["\\*.json", "a\\?.txt"]);
        assert!(filter.matches("*.json"));
        assert!(!filter.matches("user.json"));
        assert!(filter.matches("a?.txt"));
        assert!(!filter.matches("ab.txt"));
    }

    #[test]
    fn test_trailing_backslash_never_matches() {
        let filter = NameFilter::new(&["user\\"]);
        assert!(!filter.matches("user\\"));
        assert!(!filter.matches("user"));
    }

    #[test]
    fn test_display_path() {
        assert_eq!(display_path("", ""), "/");
        assert_eq!(display_path("", "models/user.json"), "models/user.json");
        assert_eq!(display_path("models", ""), "models");
        assert_eq!(display_path("models", "user.json"), "models/user.json");
    }
}
