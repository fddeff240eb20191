use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use crate::api::UserId;

use super::{RelationshipSet, StoreError};

/// The four persisted relationship categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Accounts following the operator.
    Followers,
    /// Accounts the operator follows.
    Following,
    /// Accounts the bot has followed or unfollowed before.
    AlreadyFollowed,
    /// Accounts rejected by the policy filter.
    Ignored,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Followers,
        Category::Following,
        Category::AlreadyFollowed,
        Category::Ignored,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Followers => "followers.txt",
            Category::Following => "following.txt",
            Category::AlreadyFollowed => "already_followed.txt",
            Category::Ignored => "ignored.txt",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Followers => "followers",
            Category::Following => "following",
            Category::AlreadyFollowed => "already_followed",
            Category::Ignored => "ignored",
        }
    }
}

/// Human-readable report of accounts not following back.
pub const NON_FOLLOWERS_FILE: &str = "non_followers.txt";

/// Flat-file relationship store rooted at a data directory.
///
/// Writes replace the whole file. There is no locking and no atomic
/// rename; a crash mid-write leaves a truncated file that the next sync
/// overwrites.
#[derive(Debug, Clone)]
pub struct RelationshipStore {
    dir: PathBuf,
}

impl RelationshipStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open the store, creating the directory and any missing files empty.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(dir);
        store.ensure_files()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, category: Category) -> PathBuf {
        self.dir.join(category.file_name())
    }

    pub fn non_followers_path(&self) -> PathBuf {
        self.dir.join(NON_FOLLOWERS_FILE)
    }

    pub fn ensure_files(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        for category in Category::ALL {
            let path = self.path(category);
            if !path.exists() {
                debug!(path = %path.display(), "Creating empty relationship file");
                fs::write(&path, "").map_err(|e| StoreError::io(&path, e))?;
            }
        }
        Ok(())
    }

    /// Read a category. A missing file reads as an empty set.
    pub fn load(&self, category: Category) -> Result<RelationshipSet, StoreError> {
        let path = self.path(category);
        match fs::read_to_string(&path) {
            Ok(contents) => RelationshipSet::parse(&contents, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RelationshipSet::new()),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Replace a category's file wholesale.
    pub fn save(&self, category: Category, set: &RelationshipSet) -> Result<(), StoreError> {
        let path = self.path(category);
        debug!(
            path = %path.display(),
            count = set.len(),
            "Writing relationship file"
        );
        fs::write(&path, set.to_lines()).map_err(|e| StoreError::io(&path, e))
    }

    /// Append one id to a category's file.
    ///
    /// A file whose last line lacks its newline (hand edits, a truncated
    /// write) gets one first, so the id never lands on that line.
    pub fn append(&self, category: Category, id: UserId) -> Result<(), StoreError> {
        let path = self.path(category);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        let needs_newline =
            ends_without_newline(&mut file).map_err(|e| StoreError::io(&path, e))?;
        let line = if needs_newline {
            format!("\n{}\n", id)
        } else {
            format!("{}\n", id)
        };
        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(&path, e))
    }

    /// Overwrite the non-followers report.
    pub fn write_report(&self, lines: &[String]) -> Result<PathBuf, StoreError> {
        let path = self.non_followers_path();
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(&path, contents).map_err(|e| StoreError::io(&path, e))?;
        Ok(path)
    }

    /// Ids listed in the non-followers report, in file order.
    ///
    /// Lines look like `[*] @name [id: 123]`. The operator may delete lines
    /// before unfollowing from the report; blank lines are skipped.
    pub fn load_report_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let path = self.non_followers_path();
        let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;

        let mut ids = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let id = line
                .rsplit_once("[id:")
                .and_then(|(_, rest)| rest.trim().strip_suffix(']'))
                .and_then(|value| value.parse::<UserId>().ok())
                .ok_or_else(|| StoreError::Malformed {
                    path: path.clone(),
                    line: index + 1,
                    value: line.to_string(),
                })?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Time since the category file was last written.
    pub fn age(&self, category: Category) -> Option<Duration> {
        let modified = fs::metadata(self.path(category)).ok()?.modified().ok()?;
        SystemTime::now().duration_since(modified).ok()
    }

    /// Warn when followers or following were synced longer ago than
    /// `max_age`. Returns whether either file is stale.
    pub fn warn_if_stale(&self, max_age: Duration) -> bool {
        let stale = [Category::Followers, Category::Following]
            .into_iter()
            .any(|category| self.age(category).is_some_and(|age| age > max_age));
        if stale {
            warn!(
                max_age_hours = max_age.as_secs() / 3600,
                "Follower sync files are stale; run a sync before continuing"
            );
        }
        stale
    }
}

fn ends_without_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
