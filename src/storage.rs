//! A bounded temporary file store.
//!
//! Files move in under an opaque token; the on-disk location is a keyed
//! hash of the token, sharded across two directory levels so no single
//! directory grows unbounded. Retention is capped by total size and by age,
//! either of which can be disabled with a zero limit.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::SiftError;

pub struct TemporaryStorage {
    directory: PathBuf,
    secret:    String,
    max_bytes: u64,
    ttl_secs:  u64,
}

impl TemporaryStorage {
    /// Open (creating if needed) a store rooted at `directory`.
    ///
    /// `max_bytes` caps the total stored size and `ttl_secs` the age of any
    /// entry; zero disables the respective bound.
    pub fn new(
        secret: impl Into<String>,
        directory: impl Into<PathBuf>,
        max_bytes: u64,
        ttl_secs: u64,
    ) -> Result<Self, SiftError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| SiftError::io(&directory, e))?;
        Ok(Self {
            directory,
            secret: secret.into(),
            max_bytes,
            ttl_secs,
        })
    }

    /// Move an existing file into the store and return its token.
    ///
    /// Prunes expired and over-budget entries first so the store cannot be
    /// flooded by repeated adds.
    pub fn add(&self, file: &Path) -> Result<String, SiftError> {
        self.prune()?;

        let token = Uuid::new_v4().simple().to_string();
        let target = self.path_for(&token);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| SiftError::io(parent, e))?;
        }

        // Rename when possible, copy across filesystem boundaries.
        if fs::rename(file, &target).is_err() {
            fs::copy(file, &target).map_err(|e| SiftError::io(file, e))?;
            fs::remove_file(file).map_err(|e| SiftError::io(file, e))?;
        }
        Ok(token)
    }

    /// The path a token resolves to. Pure; the file may or may not exist.
    pub fn path_for(&self, token: &str) -> PathBuf {
        let hash = keyed_hash(&self.secret, token);
        self.directory
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(&hash[4..])
    }

    /// Enforce the TTL and size bounds, oldest entries first. Returns
    /// whether anything was deleted.
    pub fn prune(&self) -> Result<bool, SiftError> {
        if self.max_bytes == 0 && self.ttl_secs == 0 {
            return Ok(false);
        }

        let hits = crate::search()
            .files()
            .in_path(self.directory.to_string_lossy())?;

        let mut files: Vec<(PathBuf, u64, i64)> = Vec::new();
        let mut total: u64 = 0;
        for item in hits.entries()? {
            let entry = item?;
            total += entry.size();
            files.push((
                entry.path().to_path_buf(),
                entry.size(),
                entry.modified_secs(),
            ));
        }

        let mut truncated = false;

        if self.ttl_secs > 0 {
            let cutoff = now_secs() - self.ttl_secs as i64;
            let mut kept = Vec::with_capacity(files.len());
            for (path, size, mtime) in files {
                if mtime < cutoff {
                    fs::remove_file(&path).map_err(|e| SiftError::io(&path, e))?;
                    total -= size;
                    truncated = true;
                } else {
                    kept.push((path, size, mtime));
                }
            }
            files = kept;
        }

        if self.max_bytes > 0 {
            files.sort_by_key(|(_, _, mtime)| *mtime);
            for (path, size, _) in &files {
                if total <= self.max_bytes {
                    break;
                }
                fs::remove_file(path).map_err(|e| SiftError::io(path, e))?;
                total -= size;
                truncated = true;
            }
        }

        Ok(truncated)
    }
}

fn keyed_hash(secret: &str, token: &str) -> String {
    let digest = Sha256::digest(format!("{secret}{token}").as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
