use crate::{
    config::Config,
    error::Result,
    file::is_text,
    filter::FileFilter,
};
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Counters collected during selection, reported at debug level.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScanStats {
    /// Candidate files seen
    pub(crate) candidates: usize,

    /// Files accepted as text
    pub(crate) selected: usize,

    /// Files rejected by the text check or an exclusion glob
    pub(crate) skipped: usize,

    /// Input paths that were neither files nor directories
    pub(crate) missing: usize,

    /// Walk errors (unreadable directories and the like)
    pub(crate) errors: usize,
}

/// Selects the text files to send from a list of input paths.
#[derive(Debug, Clone)]
pub(crate) struct Scanner {
    filter: FileFilter,
    respect_gitignore: bool,
    dedupe: bool,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclusion glob is invalid.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            filter: FileFilter::new(&config.file_filter_config)?,
            respect_gitignore: config.respect_gitignore,
            dedupe: config.dedupe_paths,
        })
    }

    /// Returns the selected files, sorted by their byte representation.
    ///
    /// Inputs that do not exist or cannot be inspected are skipped; the text
    /// check never fails the selection.
    pub(crate) fn select<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<PathBuf> {
        let mut stats = ScanStats::default();
        let mut files = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match fs::metadata(path) {
                Ok(meta) if meta.is_file() => {
                    stats.candidates += 1;
                    self.consider(path, &mut files, &mut stats);
                }
                Ok(meta) if meta.is_dir() => self.walk(path, &mut files, &mut stats),
                Ok(_) => {
                    debug!("Skipping special file: {}", path.display());
                    stats.missing += 1;
                }
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    stats.missing += 1;
                }
            }
        }

        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

        if self.dedupe {
            let before = files.len();
            files.dedup();
            if files.len() < before {
                debug!("Dropped {} duplicate path(s)", before - files.len());
            }
        }

        debug!(
            "Selection complete: {} candidates, {} selected, {} skipped, {} missing, {} errors",
            stats.candidates, stats.selected, stats.skipped, stats.missing, stats.errors
        );

        files
    }

    /// Walks a directory tree, pruning ignored directory names.
    fn walk(&self, root: &Path, files: &mut Vec<PathBuf>, stats: &mut ScanStats) {
        debug!("Walking {}", root.display());

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .parents(self.respect_gitignore)
            .require_git(false)
            .follow_links(false);

        let filter = self.filter.clone();
        builder.filter_entry(move |entry| keep_entry(&filter, entry));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if entry.depth() == 0 || entry.file_type().is_some_and(|ft| ft.is_dir()) {
                        continue;
                    }
                    // Symlinks are resolved here: links to files count, links to directories do not
                    if !entry.path().is_file() {
                        continue;
                    }
                    stats.candidates += 1;
                    self.consider(entry.path(), files, stats);
                }
                Err(e) => {
                    debug!("Walk error: {}", e);
                    stats.errors += 1;
                }
            }
        }
    }

    fn consider(&self, path: &Path, files: &mut Vec<PathBuf>, stats: &mut ScanStats) {
        if self.filter.is_excluded(path) {
            trace!("Excluded by glob: {}", path.display());
            stats.skipped += 1;
            return;
        }

        if is_text(path, self.filter.ignored_suffixes()) {
            trace!("Selected: {}", path.display());
            stats.selected += 1;
            files.push(path.to_path_buf());
        } else {
            trace!("Not text: {}", path.display());
            stats.skipped += 1;
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            filter: FileFilter::default(),
            respect_gitignore: false,
            dedupe: true,
        }
    }
}

fn keep_entry(filter: &FileFilter, entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
        return true;
    }

    if filter.is_ignored_dir_name(entry.file_name()) || filter.is_excluded(entry.path()) {
        trace!("Pruned directory: {}", entry.path().display());
        return false;
    }

    true
}

/// Selects text files from the given paths using the default ignore lists.
///
/// Directories are walked recursively; `.git`, `node_modules` and the other
/// default directory names are pruned, ignored suffixes and non-UTF-8 files
/// are dropped. The result is sorted and free of duplicates.
///
/// # Examples
///
/// ```no_run
/// let files = llm_read::select_files(&["./src", "Cargo.toml"]);
/// for file in &files {
///     println!("{}", file.display());
/// }
/// ```
#[must_use]
pub fn select_files<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    Scanner::default().select(paths)
}
