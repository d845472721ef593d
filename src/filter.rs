//! Path filtering applied while selecting files.
//!
//! Combines the fixed ignore lists (directory names and path suffixes) with
//! optional user-supplied glob exclusions.

use crate::error::{Error, Result};
use crate::file::{DEFAULT_IGNORED_DIRS, DEFAULT_IGNORED_SUFFIXES};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;

/// Configuration for path filtering during file selection.
#[derive(Debug, Clone)]
pub struct FileFilterConfig {
    ignored_dirs: Vec<String>,
    ignored_suffixes: Vec<String>,
    exclude_globs: Vec<String>,
}

impl Default for FileFilterConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| (*s).to_string()).collect(),
            ignored_suffixes: DEFAULT_IGNORED_SUFFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_globs: Vec::new(),
        }
    }
}

impl FileFilterConfig {
    /// Creates a configuration with the default ignore lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the ignored directory names.
    #[must_use]
    pub fn ignored_dirs(mut self, names: Vec<String>) -> Self {
        self.ignored_dirs = names;
        self
    }

    /// Replaces the ignored path suffixes.
    #[must_use]
    pub fn ignored_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.ignored_suffixes = suffixes;
        self
    }

    /// Adds glob patterns for files and directories to skip.
    #[must_use]
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude_globs.extend(patterns);
        self
    }

    /// Returns the glob patterns added with [`Self::exclude`].
    #[must_use]
    pub fn exclude_globs(&self) -> &[String] {
        &self.exclude_globs
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FileFilter {
    ignored_dirs: HashSet<String>,
    ignored_suffixes: Vec<String>,
    excludes: GlobSet,
}

impl FileFilter {
    /// Compiles the configuration into a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if any exclusion glob is invalid.
    pub(crate) fn new(config: &FileFilterConfig) -> Result<Self> {
        Ok(Self {
            ignored_dirs: config.ignored_dirs.iter().cloned().collect(),
            ignored_suffixes: config.ignored_suffixes.clone(),
            excludes: Self::build_globset(&config.exclude_globs)?,
        })
    }

    pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob =
                Glob::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
            builder.add(glob);
        }

        builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build glob set: {e}")))
    }

    /// True when a directory with this exact name must not be descended into.
    pub(crate) fn is_ignored_dir_name(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.ignored_dirs.contains(name))
    }

    /// True when the path matches a user exclusion glob.
    pub(crate) fn is_excluded(&self, path: &Path) -> bool {
        self.excludes.is_match(path)
    }

    pub(crate) fn ignored_suffixes(&self) -> &[String] {
        &self.ignored_suffixes
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FileFilterConfig::default();
        Self {
            ignored_dirs: config.ignored_dirs.into_iter().collect(),
            ignored_suffixes: config.ignored_suffixes,
            excludes: GlobSet::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignore_lists() {
        let filter = FileFilter::new(&FileFilterConfig::default()).unwrap();

        assert!(filter.is_ignored_dir_name(OsStr::new(".git")));
        assert!(filter.is_ignored_dir_name(OsStr::new("node_modules")));
        assert!(!filter.is_ignored_dir_name(OsStr::new("src")));
        assert!(filter.ignored_suffixes().iter().any(|s| s == ".png"));
    }

    #[test]
    fn test_dir_names_are_case_sensitive() {
        let filter = FileFilter::new(&FileFilterConfig::default()).unwrap();

        assert!(!filter.is_ignored_dir_name(OsStr::new(".GIT")));
        assert!(!filter.is_ignored_dir_name(OsStr::new("Node_Modules")));
    }

    #[test]
    fn test_custom_dir_names() {
        let config = FileFilterConfig::new().ignored_dirs(vec!["target".to_string()]);
        let filter = FileFilter::new(&config).unwrap();

        assert!(filter.is_ignored_dir_name(OsStr::new("target")));
        assert!(!filter.is_ignored_dir_name(OsStr::new(".git")));
    }

    #[test]
    fn test_exclude_globs() {
        let config = FileFilterConfig::new().exclude(vec!["**/*.lock".to_string()]);
        let filter = FileFilter::new(&config).unwrap();

        assert!(filter.is_excluded(Path::new("project/Cargo.lock")));
        assert!(!filter.is_excluded(Path::new("project/Cargo.toml")));
    }

    #[test]
    fn test_invalid_glob() {
        let config = FileFilterConfig::new().exclude(vec!["[unclosed".to_string()]);
        let err = FileFilter::new(&config).unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("[unclosed"));
    }
}
