//! Local relationship state.
//!
//! Four plain-text files, one account id per line, no header:
//! followers, following, already-followed and ignored. Sets are
//! deduplicated on read, so appending a known id is harmless.

mod files;
mod ignore;
mod set;

pub use files::{Category, RelationshipStore, NON_FOLLOWERS_FILE};
pub use ignore::IgnoreLog;
pub use set::RelationshipSet;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing relationship files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed id {value:?} in {} at line {line}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
