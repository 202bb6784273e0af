use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, trace};
use regex::Regex;

use crate::config::{ConfigError, FilterPattern};
use crate::constants::{DEFAULT_EXCLUDE, DEFAULT_INCLUDE};

/// Path eligibility test built from include/exclude patterns.
///
/// A path is eligible when it matches at least one include pattern and no
/// exclude pattern. Defaults apply when a side is absent; an explicitly
/// empty include list admits nothing.
#[derive(Debug)]
pub struct PathFilter {
    include_globs: GlobSet,
    include_regexes: Vec<Regex>,
    exclude_globs: GlobSet,
    exclude_regexes: Vec<Regex>,
}

impl PathFilter {
    pub fn new(
        include: Option<&[FilterPattern]>,
        exclude: Option<&[FilterPattern]>,
    ) -> Result<Self, ConfigError> {
        let include = normalize(include, DEFAULT_INCLUDE);
        let exclude = normalize(exclude, DEFAULT_EXCLUDE);
        debug!("Building path filter: {} include, {} exclude patterns", include.len(), exclude.len());

        let (include_globs, include_regexes) = compile(&include)?;
        let (exclude_globs, exclude_regexes) = compile(&exclude)?;

        Ok(Self { include_globs, include_regexes, exclude_globs, exclude_regexes })
    }

    pub fn is_eligible(&self, path: &str) -> bool {
        let cleaned = path_clean::clean(path);
        let cleaned_str = cleaned.to_string_lossy();

        let included = self.include_globs.is_match(&cleaned)
            || self.include_regexes.iter().any(|re| re.is_match(&cleaned_str));
        if !included {
            trace!("Path '{}' matches no include pattern", cleaned_str);
            return false;
        }

        let excluded = self.exclude_globs.is_match(&cleaned)
            || self.exclude_regexes.iter().any(|re| re.is_match(&cleaned_str));
        if excluded {
            trace!("Path '{}' matches an exclude pattern", cleaned_str);
            return false;
        }

        true
    }
}

/// Apply defaults when the side is absent, then deduplicate preserving order.
fn normalize(patterns: Option<&[FilterPattern]>, fallback: &[&str]) -> Vec<FilterPattern> {
    let raw: Vec<FilterPattern> = match patterns {
        Some(patterns) => patterns.to_vec(),
        None => fallback.iter().map(|p| FilterPattern::Glob(p.to_string())).collect(),
    };

    let mut unique: Vec<FilterPattern> = Vec::with_capacity(raw.len());
    for pattern in raw {
        if !unique.contains(&pattern) {
            unique.push(pattern);
        }
    }
    unique
}

fn compile(patterns: &[FilterPattern]) -> Result<(GlobSet, Vec<Regex>), ConfigError> {
    let mut globs = GlobSetBuilder::new();
    let mut regexes = Vec::new();

    for pattern in patterns {
        match pattern {
            FilterPattern::Glob(glob) => {
                let parsed = Glob::new(glob).map_err(|e| ConfigError::InvalidGlob {
                    pattern: glob.clone(),
                    message: e.to_string(),
                })?;
                globs.add(parsed);
            }
            FilterPattern::Regex(regex) => {
                let compiled = Regex::new(regex).map_err(|e| ConfigError::InvalidRegex {
                    pattern: regex.clone(),
                    message: e.to_string(),
                })?;
                regexes.push(compiled);
            }
        }
    }

    let globs = globs.build().map_err(|e| ConfigError::InvalidGlob {
        pattern: String::new(),
        message: e.to_string(),
    })?;
    Ok((globs, regexes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globs(patterns: &[&str]) -> Vec<FilterPattern> {
        patterns.iter().map(|p| FilterPattern::Glob(p.to_string())).collect()
    }

    #[test]
    fn test_defaults_admit_component_files_only() {
        let filter = PathFilter::new(None, None).unwrap();
        assert!(filter.is_eligible("src/components/Button.jsx"));
        assert!(filter.is_eligible("App.tsx"));
        assert!(!filter.is_eligible("src/index.ts"));
        assert!(!filter.is_eligible("src/util.js"));
    }

    #[test]
    fn test_default_exclude_covers_node_modules() {
        let filter = PathFilter::new(None, None).unwrap();
        assert!(!filter.is_eligible("node_modules/react/index.jsx"));
    }

    #[test]
    fn test_explicit_include_replaces_defaults() {
        let include = globs(&["lib/**/*.js"]);
        let filter = PathFilter::new(Some(&include), None).unwrap();
        assert!(filter.is_eligible("lib/widgets/menu.js"));
        assert!(!filter.is_eligible("src/App.jsx"));
    }

    #[test]
    fn test_empty_include_admits_nothing() {
        let filter = PathFilter::new(Some(&[]), None).unwrap();
        assert!(!filter.is_eligible("src/App.jsx"));
        assert!(!filter.is_eligible("anything.tsx"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let include = globs(&["**/*.jsx"]);
        let exclude = globs(&["test/fixtures/component.jsx"]);
        let filter = PathFilter::new(Some(&include), Some(&exclude)).unwrap();
        assert!(filter.is_eligible("src/component.jsx"));
        assert!(!filter.is_eligible("test/fixtures/component.jsx"));
    }

    #[test]
    fn test_regex_patterns_match() {
        let include = vec![FilterPattern::Regex("\\.(jsx|tsx)$".to_string())];
        let exclude = vec![FilterPattern::Regex("\\.story\\.".to_string())];
        let filter = PathFilter::new(Some(&include), Some(&exclude)).unwrap();
        assert!(filter.is_eligible("src/App.jsx"));
        assert!(filter.is_eligible("src/App.tsx"));
        assert!(!filter.is_eligible("src/App.story.jsx"));
        assert!(!filter.is_eligible("src/App.js"));
    }

    #[test]
    fn test_paths_are_cleaned_before_matching() {
        let filter = PathFilter::new(None, None).unwrap();
        assert!(filter.is_eligible("./src/App.jsx"));
        assert!(!filter.is_eligible("./node_modules/../node_modules/x/App.jsx"));
    }

    #[test]
    fn test_duplicate_patterns_are_collapsed() {
        let include = globs(&["**/*.jsx", "**/*.jsx"]);
        let normalized = normalize(Some(&include), DEFAULT_INCLUDE);
        assert_eq!(normalized.len(), 1);
    }

    #[test]
    fn test_invalid_glob_fails_construction() {
        let include = globs(&["a{b"]);
        let err = PathFilter::new(Some(&include), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { .. }));
    }

    #[test]
    fn test_invalid_regex_fails_construction() {
        let include = vec![FilterPattern::Regex("(".to_string())];
        let err = PathFilter::new(Some(&include), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }
}
