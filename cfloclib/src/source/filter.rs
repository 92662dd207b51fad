//! File filtering and discovery with suffix and glob pattern support.
//!
//! This module provides functionality to discover ColdFusion source files
//! (by file suffix) with support for include/exclude glob patterns.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::CflocError;
use crate::Result;

/// Comma-separated suffixes analyzed when none are configured.
pub const DEFAULT_SUFFIXES: &str = ".cfc,.cfm";

/// Configuration for file filtering.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Lowercased file suffixes, each with a leading dot
    pub suffixes: Vec<String>,
    /// Glob patterns to include (if empty, include all matching suffixes)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            suffixes: parse_suffixes(DEFAULT_SUFFIXES),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

/// Split a comma-separated suffix list into normalized suffixes.
///
/// Entries are trimmed, lowercased and given a leading dot; empty entries
/// are dropped.
pub fn parse_suffixes(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let s = s.to_lowercase();
            if s.starts_with('.') {
                s
            } else {
                format!(".{s}")
            }
        })
        .collect()
}

impl FilterConfig {
    /// Create a filter for the default ColdFusion suffixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the suffix list with a comma-separated list such as `.cfc,.cfm`.
    pub fn with_suffixes(mut self, list: &str) -> Result<Self> {
        let suffixes = parse_suffixes(list);
        if suffixes.is_empty() {
            return Err(CflocError::NoSuffixes);
        }
        self.suffixes = suffixes;
        Ok(self)
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern)?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Check whether the file name ends with one of the configured suffixes.
    pub fn has_suffix(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();
        self.suffixes.iter().any(|suffix| name.ends_with(suffix))
    }

    /// Check if a path matches the filter criteria.
    ///
    /// A path matches if:
    /// 1. It ends with one of the configured suffixes
    /// 2. It matches at least one include pattern (or include is empty)
    /// 3. It doesn't match any exclude pattern
    pub fn matches(&self, path: &Path) -> bool {
        if !self.has_suffix(path) {
            return false;
        }

        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| CflocError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Check if a directory should be skipped during traversal.
fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.')
}

/// Discover source files in a directory.
///
/// Walks the directory tree and returns all files that match the filter,
/// sorted. A root that is itself a file is returned if it matches.
pub fn discover_files(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(CflocError::PathNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();

    if root.is_file() {
        if filter.matches(root) {
            files.push(root.to_path_buf());
        }
        return Ok(files);
    }

    let walker = WalkDir::new(root).follow_links(true).into_iter();

    for entry in walker.filter_entry(|e| {
        // Always include the root directory
        if e.depth() == 0 {
            return true;
        }
        if e.file_type().is_dir() {
            let name = e.file_name().to_str().unwrap_or("");
            return !should_skip_dir(name);
        }
        true
    }) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {err}");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().is_file() && filter.matches(path) {
            files.push(path.to_path_buf());
        }
    }

    // Sort for deterministic output
    files.sort();

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_test_files(dir: &Path) {
        fs::create_dir_all(dir.join("app/components")).unwrap();
        fs::create_dir_all(dir.join("app/views")).unwrap();
        fs::create_dir_all(dir.join("tests")).unwrap();
        fs::create_dir_all(dir.join(".git/hooks")).unwrap();

        fs::write(dir.join("Application.cfc"), "component {}").unwrap();
        fs::write(dir.join("index.cfm"), "<cfoutput>hi</cfoutput>").unwrap();
        fs::write(dir.join("app/components/User.cfc"), "component {}").unwrap();
        fs::write(dir.join("app/views/show.CFM"), "<p>x</p>").unwrap();
        fs::write(dir.join("tests/UserTest.cfc"), "component {}").unwrap();
        fs::write(dir.join(".git/hooks/hook.cfm"), "hidden").unwrap();
        fs::write(dir.join("README.md"), "# Readme").unwrap();
        fs::write(dir.join("app/style.css"), "body {}").unwrap();
    }

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(parse_suffixes(".cfc,.cfm"), vec![".cfc", ".cfm"]);
        assert_eq!(parse_suffixes(" cfc , .CFM ,, "), vec![".cfc", ".cfm"]);
        assert!(parse_suffixes(" , ").is_empty());
    }

    #[test]
    fn test_filter_matches_default_suffixes() {
        let filter = FilterConfig::new();

        assert!(filter.matches(Path::new("app/User.cfc")));
        assert!(filter.matches(Path::new("index.cfm")));
        assert!(filter.matches(Path::new("views/Show.CFM")));
        assert!(!filter.matches(Path::new("README.md")));
        assert!(!filter.matches(Path::new("style.css")));
        assert!(!filter.matches(Path::new("cfm")));
    }

    #[test]
    fn test_custom_suffixes() {
        let filter = FilterConfig::new().with_suffixes("cfml").unwrap();

        assert!(filter.matches(Path::new("page.cfml")));
        assert!(!filter.matches(Path::new("page.cfm")));
    }

    #[test]
    fn test_empty_suffix_list_is_rejected() {
        let result = FilterConfig::new().with_suffixes(" , ");
        assert!(matches!(result, Err(CflocError::NoSuffixes)));
    }

    #[test]
    fn test_filter_with_include_pattern() {
        let filter = FilterConfig::new().include("**/components/*").unwrap();

        assert!(filter.matches(Path::new("app/components/User.cfc")));
        assert!(!filter.matches(Path::new("app/views/show.cfm")));
    }

    #[test]
    fn test_filter_with_exclude_pattern() {
        let filter = FilterConfig::new().exclude("**/tests/**").unwrap();

        assert!(filter.matches(Path::new("app/User.cfc")));
        assert!(!filter.matches(Path::new("project/tests/UserTest.cfc")));
    }

    #[test]
    fn test_filter_with_multiple_patterns() {
        let filter = FilterConfig::new()
            .include_many(&["**/app/**", "**/tests/**"])
            .unwrap()
            .exclude_many(&["**/views/**"])
            .unwrap();

        assert!(filter.matches(Path::new("p/app/components/User.cfc")));
        assert!(filter.matches(Path::new("p/tests/UserTest.cfc")));
        assert!(!filter.matches(Path::new("p/app/views/show.cfm")));
        assert!(!filter.matches(Path::new("p/index.cfm")));
    }

    #[test]
    fn test_discover_files() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());

        let files = discover_files(temp.path(), &FilterConfig::new()).unwrap();

        assert_eq!(files.len(), 5);
        assert!(files.iter().any(|p| p.ends_with("Application.cfc")));
        assert!(files.iter().any(|p| p.ends_with("index.cfm")));
        assert!(files.iter().any(|p| p.ends_with("app/components/User.cfc")));
        assert!(files.iter().any(|p| p.ends_with("app/views/show.CFM")));
        assert!(files.iter().any(|p| p.ends_with("tests/UserTest.cfc")));
        assert!(!files.iter().any(|p| p.to_string_lossy().contains(".git")));

        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_discover_files_with_filter() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());

        let filter = FilterConfig::new().exclude("**/tests/**").unwrap();
        let files = discover_files(temp.path(), &filter).unwrap();

        assert_eq!(files.len(), 4);
        assert!(!files.iter().any(|p| p.ends_with("tests/UserTest.cfc")));
    }

    #[test]
    fn test_discover_single_file() {
        let temp = tempdir().unwrap();
        let file_path = temp.path().join("one.cfm");
        fs::write(&file_path, "x").unwrap();

        let files = discover_files(&file_path, &FilterConfig::new()).unwrap();

        assert_eq!(files, vec![file_path]);
    }

    #[test]
    fn test_discover_files_nonexistent() {
        let result = discover_files("/nonexistent/path", &FilterConfig::new());

        assert!(matches!(result, Err(CflocError::PathNotFound(_))));
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let result = FilterConfig::new().include("[invalid");

        if let Err(CflocError::InvalidGlob { pattern, .. }) = result {
            assert_eq!(pattern, "[invalid");
        } else {
            panic!("Expected InvalidGlob error");
        }
    }
}
