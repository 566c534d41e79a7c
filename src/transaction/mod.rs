//! Transaction support for distribution
//!
//! The distribute stage replaces the contents of the dist directory. A
//! [`Transaction`] records every file it creates, overwrites or removes so a
//! failure halfway through leaves the previous distribution in place.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new();
//!
//! transaction.backup_file(&target)?;
//! common_fs::copy_file(&source, &target)?;
//!
//! // On success:
//! transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```


use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, file_read_failed};

/// Content of a file before the transaction touched it
#[derive(Debug, Clone)]
struct FileBackup {
    path: PathBuf,
    content: Vec<u8>,
}

/// A set of file changes that is undone unless committed
#[derive(Debug, Default)]
pub struct Transaction {
    /// Files that did not exist before this transaction
    created_files: HashSet<PathBuf>,

    /// Files that existed before this transaction, with their content
    backups: Vec<FileBackup>,

    /// Directories created during this transaction
    created_dirs: HashSet<PathBuf>,

    committed: bool,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare to write `path`
    ///
    /// An existing file is backed up; a missing one is tracked as created.
    pub fn backup_file(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            self.created_files.insert(path.to_path_buf());
            return Ok(());
        }
        if self.backups.iter().any(|b| b.path == path) {
            return Ok(());
        }
        let content = fs::read(path).map_err(|e| file_read_failed(path, e))?;
        self.backups.push(FileBackup {
            path: path.to_path_buf(),
            content,
        });
        Ok(())
    }

    /// Track a file that was created during this transaction
    pub fn track_file_created(&mut self, path: impl Into<PathBuf>) {
        self.created_files.insert(path.into());
    }

    /// Create `path` and any missing parents, tracking each one created
    pub fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        let missing: Vec<PathBuf> = path
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .map(Path::to_path_buf)
            .collect();
        fs::create_dir_all(path)?;
        self.created_dirs.extend(missing);
        Ok(())
    }

    /// Number of files created or backed up so far
    pub fn touched_files(&self) -> usize {
        self.created_files.len() + self.backups.len()
    }

    /// Commit the transaction (prevent rollback)
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Undo every tracked change
    pub fn rollback(&mut self) {
        if self.committed {
            return;
        }

        for path in &self.created_files {
            if path.exists() {
                let _ = fs::remove_file(path);
            }
        }

        for backup in &self.backups {
            if let Some(parent) = backup.path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Err(e) = fs::write(&backup.path, &backup.content) {
                log::warn!("Failed to restore {}: {e}", backup.path.display());
            }
        }

        // Deepest first; only empty directories go
        let mut dirs: Vec<_> = self.created_dirs.iter().collect();
        dirs.sort_by_key(|b| std::cmp::Reverse(b.components().count()));
        for path in dirs {
            if path.is_dir()
                && fs::read_dir(path)
                    .map(|mut d| d.next().is_none())
                    .unwrap_or(false)
            {
                let _ = fs::remove_dir(path);
            }
        }

        self.committed = true;
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed {
            log::debug!("Rolling back {} file(s)", self.touched_files());
            self.rollback();
        }
    }
}
