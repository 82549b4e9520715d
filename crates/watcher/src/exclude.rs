//! Directory exclusion rules
//!
//! The walker asks an [`ExclusionFilter`] about every child directory name
//! before watching it. The stock filter is a short list of substrings; any
//! closure `Fn(&str) -> bool` works as well.

use tracing::debug;

/// Maximum number of exclusion patterns; extras are dropped
pub const MAX_EXCLUDES: usize = 16;

/// Predicate deciding whether a directory (by name) stays unwatched
pub trait ExclusionFilter {
    /// Returns true if the directory called `name` (and its subtree) is skipped
    fn should_exclude(&self, name: &str) -> bool;
}

impl<F> ExclusionFilter for F
where
    F: Fn(&str) -> bool,
{
    fn should_exclude(&self, name: &str) -> bool {
        self(name)
    }
}

/// Excludes directory names containing any of a fixed list of substrings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstringExcludes {
    patterns: Vec<String>,
}

impl SubstringExcludes {
    /// Build from patterns, keeping at most [`MAX_EXCLUDES`] of them.
    ///
    /// Empty patterns would match every name and are skipped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept = Vec::new();
        for pattern in patterns.into_iter().map(Into::into) {
            if pattern.is_empty() {
                debug!("Skipping empty exclusion pattern");
                continue;
            }
            if kept.len() == MAX_EXCLUDES {
                debug!("Dropping exclusion pattern beyond limit: {}", pattern);
                continue;
            }
            kept.push(pattern);
        }
        Self { patterns: kept }
    }

    /// Active patterns
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether no pattern is active
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl ExclusionFilter for SubstringExcludes {
    fn should_exclude(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| name.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_match() {
        let excludes = SubstringExcludes::new(["____archive____", ".git"]);

        assert!(excludes.should_exclude("____archive____"));
        assert!(excludes.should_exclude("old____archive____2019"));
        assert!(excludes.should_exclude(".git"));
        assert!(excludes.should_exclude(".github"));
        assert!(!excludes.should_exclude("src"));
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let excludes = SubstringExcludes::default();
        assert!(excludes.is_empty());
        assert!(!excludes.should_exclude("anything"));
    }

    #[test]
    fn test_extra_patterns_silently_dropped() {
        let patterns: Vec<String> = (0..20).map(|i| format!("p{i:02}")).collect();
        let excludes = SubstringExcludes::new(patterns);

        assert_eq!(excludes.patterns().len(), MAX_EXCLUDES);
        assert!(excludes.should_exclude("p15"));
        assert!(!excludes.should_exclude("p16"));
    }

    #[test]
    fn test_empty_pattern_skipped() {
        let excludes = SubstringExcludes::new(["", "tmp"]);
        assert_eq!(excludes.patterns(), ["tmp".to_string()]);
        assert!(!excludes.should_exclude("src"));
    }

    #[test]
    fn test_closure_filter() {
        let hidden = |name: &str| name.starts_with('.');
        assert!(hidden.should_exclude(".cache"));
        assert!(!hidden.should_exclude("cache"));
    }
}
