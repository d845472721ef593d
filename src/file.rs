use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::trace;

/// Number of leading bytes sampled when sniffing a file for UTF-8 text.
pub(crate) const TEXT_SNIFF_BYTES: usize = 1024;

/// Directory names pruned from every recursive walk.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".idea",
    ".vscode",
    ".DS_Store",
    ".pytest_cache",
    "node_modules",
    "venv",
    "env",
];

/// Path suffixes that are never treated as text.
///
/// Matched against the end of the full path string, so `README.md` also
/// excludes `docs/README.md`.
pub const DEFAULT_IGNORED_SUFFIXES: &[&str] = &[
    "README.md", "LICENSE", ".gitignore", ".env", ".jar", ".zip", ".tar", ".gz", ".tgz", ".bz2",
    ".xz", ".7z", ".rar", ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".svg", ".ico", ".webp", ".mp4",
    ".mkv", ".avi", ".mov", ".wmv", ".flv", ".mp3", ".wav", ".ogg", ".flac", ".pdf", ".doc",
    ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
];

/// Decides whether a path should be read as a text file.
///
/// # Algorithm
///
/// 1. Paths ending with an ignored suffix are rejected
/// 2. Paths whose guessed MIME type is `text/*` are accepted
/// 3. Otherwise the first 1024 bytes must decode as UTF-8
///
/// Any failure to open or read the file counts as "not text".
#[must_use]
pub(crate) fn is_text(path: &Path, ignored_suffixes: &[String]) -> bool {
    let name = path.to_string_lossy();
    if ignored_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
        trace!("Ignored by suffix: {}", name);
        return false;
    }

    if has_text_mime(path) {
        return true;
    }

    starts_with_utf8(path)
}

/// Checks if the MIME type guessed from the file name is `text/*`.
#[must_use]
pub(crate) fn has_text_mime(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_().as_str() == "text")
}

/// Reads up to [`TEXT_SNIFF_BYTES`] and reports whether they are valid UTF-8.
///
/// A multi-byte sequence cut off by the sample boundary is still accepted.
fn starts_with_utf8(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };

    let mut sample = Vec::with_capacity(TEXT_SNIFF_BYTES);
    if file
        .take(TEXT_SNIFF_BYTES as u64)
        .read_to_end(&mut sample)
        .is_err()
    {
        return false;
    }

    match std::str::from_utf8(&sample) {
        Ok(_) => true,
        // error_len() is None only for an incomplete sequence at the very end
        Err(e) => e.error_len().is_none(),
    }
}

/// Reads a whole file, replacing invalid UTF-8 sequences instead of failing.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub(crate) fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
