// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance guard for a buffer file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Lock file path next to the buffer: `<buffer>.lock`.
pub fn lock_path(buffer_path: &Path) -> PathBuf {
    let mut name = buffer_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Take an exclusive lock guarding `buffer_path`.
///
/// The lock is held until the returned file is dropped.
pub fn acquire_lock(buffer_path: &Path) -> Result<File> {
    use fs2::FileExt;

    if let Some(parent) = buffer_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path(buffer_path))?;
    file.try_lock_exclusive()
        .map_err(|_| Error::Locked(buffer_path.to_path_buf()))?;
    Ok(file)
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
