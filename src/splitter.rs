use crate::{error::Result, file::read_lossy};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Default upper bound on a chunk, in characters.
pub const MAX_CHUNK_SIZE: usize = 20 * 1024;

/// Ordered chunks of one file. Concatenating them yields the file content.
pub type ChunkSet = Vec<String>;

/// Insertion-ordered mapping from file path to its chunks.
///
/// Inserting a path that is already present replaces its chunks in place,
/// so the entry keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMap {
    entries: Vec<(PathBuf, ChunkSet)>,
    index: HashMap<PathBuf, usize>,
}

impl ChunkMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the chunks for `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, chunks: ChunkSet) {
        let path = path.into();
        if let Some(&position) = self.index.get(&path) {
            self.entries[position].1 = chunks;
        } else {
            self.index.insert(path.clone(), self.entries.len());
            self.entries.push((path, chunks));
        }
    }

    /// Returns the chunks for `path`, if present.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&ChunkSet> {
        self.index.get(path).map(|&position| &self.entries[position].1)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ChunkSet)> {
        self.entries
            .iter()
            .map(|(path, chunks)| (path.as_path(), chunks))
    }

    /// Returns the number of files in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of chunks across all files.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.entries.iter().map(|(_, chunks)| chunks.len()).sum()
    }
}

impl<P: Into<PathBuf>> FromIterator<(P, ChunkSet)> for ChunkMap {
    fn from_iter<I: IntoIterator<Item = (P, ChunkSet)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, chunks) in iter {
            map.insert(path, chunks);
        }
        map
    }
}

/// Splits text into consecutive segments of at most `max_chars` characters.
///
/// Text that fits is returned as a single segment (an empty string included).
/// Otherwise every segment but the last holds exactly `max_chars` characters.
/// Boundaries always fall between characters, never inside a UTF-8 sequence.
#[must_use]
pub fn split_text(text: &str, max_chars: usize) -> ChunkSet {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut rest = text;

    loop {
        match rest.char_indices().nth(max_chars) {
            Some((boundary, _)) => {
                let (head, tail) = rest.split_at(boundary);
                chunks.push(head.to_string());
                rest = tail;
            }
            None => {
                // Only an empty input yields an empty final piece
                if chunks.is_empty() || !rest.is_empty() {
                    chunks.push(rest.to_string());
                }
                break;
            }
        }
    }

    chunks
}

/// Reads a file and splits its content into chunks of `max_chars` characters.
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn chunk_file(path: &Path, max_chars: usize) -> Result<ChunkSet> {
    let content = read_lossy(path)?;
    let chunks = split_text(&content, max_chars);

    if chunks.len() > 1 {
        debug!("Split '{}' into {} chunks", path.display(), chunks.len());
    } else {
        trace!("'{}' fits in a single chunk", path.display());
    }

    Ok(chunks)
}

/// Chunks a file with the default [`MAX_CHUNK_SIZE`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn chunk(path: &Path) -> Result<ChunkSet> {
    chunk_file(path, MAX_CHUNK_SIZE)
}

/// Chunks every file in order, failing on the first unreadable one.
///
/// # Errors
///
/// Returns the first IO error encountered.
pub(crate) fn chunk_all(files: &[PathBuf], max_chars: usize) -> Result<ChunkMap> {
    let mut map = ChunkMap::new();
    for path in files {
        map.insert(path.clone(), chunk_file(path, max_chars)?);
    }
    Ok(map)
}
