//! Format worker contract and worker selection helpers.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

use crate::config::ImportSettings;
use crate::io::IoSystem;
use crate::scene::Scene;

/// Errors a format worker reports from [`FormatWorker::read`].
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Malformed file: {0}")]
    Malformed(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

/// A pluggable parser for one file format family.
///
/// Workers are registered once into a [`Registry`](super::Registry) and
/// shared read-only between importers, so they must be `Send + Sync` and
/// keep no per-import state.
pub trait FormatWorker: Send + Sync {
    /// Unique name, used in error messages and logs.
    fn name(&self) -> &str;

    /// Lower-case extensions this worker claims, without the dot.
    fn extensions(&self) -> &[&str];

    /// Whether this worker can read `path`.
    ///
    /// With `check_signature == false` this must be cheap and look at the
    /// name only. With `true` it inspects content and must avoid false
    /// positives.
    fn can_read(&self, path: &Path, io: &dyn IoSystem, check_signature: bool) -> bool;

    /// Parse `path` into a raw scene.
    fn read(
        &self,
        path: &Path,
        io: &dyn IoSystem,
        settings: &ImportSettings,
    ) -> Result<Scene, FormatError>;
}

/// Header bytes searched by the built-in token signature checks.
pub const SIGNATURE_SEARCH_BYTES: usize = 200;

/// Case-insensitive extension test.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// True when the bytes at `offset` equal one of `tokens`.
///
/// Any I/O problem reads as "no match".
pub fn check_magic_token(io: &dyn IoSystem, path: &Path, offset: u64, tokens: &[&[u8]]) -> bool {
    let Some(max_len) = tokens.iter().map(|t| t.len()).max() else {
        return false;
    };

    let Ok(mut stream) = io.open(path) else {
        return false;
    };
    if stream.seek(SeekFrom::Start(offset)).is_err() {
        return false;
    }

    let mut buffer = Vec::with_capacity(max_len);
    if stream.take(max_len as u64).read_to_end(&mut buffer).is_err() {
        return false;
    }

    tokens
        .iter()
        .any(|t| !t.is_empty() && buffer.starts_with(t))
}

/// Search the first `search_bytes` bytes for any of `tokens`, ignoring case.
///
/// A token only counts when it starts a line, so `"v "` will not match
/// inside `"rev "`.
pub fn search_file_header_for_tokens(
    io: &dyn IoSystem,
    path: &Path,
    tokens: &[&str],
    search_bytes: usize,
) -> bool {
    let Ok(stream) = io.open(path) else {
        return false;
    };

    let mut buffer = Vec::with_capacity(search_bytes);
    if stream.take(search_bytes as u64).read_to_end(&mut buffer).is_err() {
        return false;
    }

    // Binary files may contain NULs; drop them so the text search still works
    buffer.retain(|&b| b != 0);
    let header = String::from_utf8_lossy(&buffer).to_ascii_lowercase();

    tokens.iter().any(|token| {
        let token = token.to_ascii_lowercase();
        header
            .match_indices(&token)
            .any(|(pos, _)| pos == 0 || matches!(header.as_bytes()[pos - 1], b'\n' | b'\r'))
    })
}
