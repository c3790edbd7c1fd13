//! Exclusion rules for source trees.

/// Paths never packaged: local state, vendored dependencies and VCS/CI files.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "/data",
    "/db",
    "/logs",
    "/tmp",
    "/vendor",
    ".github",
    ".git",
    "/.gitignore",
    "/.gitmodules",
    "/.gitattributes",
    "/.gitkeep",
    "/.gitlab-ci.yml",
];

/// Ordered list of root-anchored path prefixes.
///
/// A relative path is excluded when it equals a rule or lies beneath one.
/// A leading `/` on a rule is ignored, so `/data` and `data` are the same rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    rules: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS.iter().copied())
    }
}

impl ExclusionPolicy {
    /// Create a policy from rule strings.
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .map(|r| r.as_ref().trim_matches('/').to_string())
            .filter(|r| !r.is_empty())
            .collect();
        Self { rules }
    }

    /// A policy that excludes nothing.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: impl AsRef<str>) -> Self {
        let rule = rule.as_ref().trim_matches('/');
        if !rule.is_empty() {
            self.rules.push(rule.to_string());
        }
        self
    }

    /// The normalized rules, in order.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Whether `relative` (a `/`-separated root-relative path) is excluded.
    pub fn excluded(&self, relative: &str) -> bool {
        let relative = relative.trim_start_matches('/');
        self.rules.iter().any(|rule| {
            relative
                .strip_prefix(rule.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}
