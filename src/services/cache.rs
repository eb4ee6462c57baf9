//! Filesystem cache of full translation mappings, one file per slug.
//!
//! # Invariants
//! - `<dir>/<slug>` present means "already fetched"; absent means "never
//!   fetched".
//! - Entries are created once and never rewritten by [`TranslationCache::store`].

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CacheError;
use crate::model::config::RawDumpMode;
use crate::model::translation::TranslationSet;

#[derive(Debug, Clone)]
pub struct TranslationCache {
    dir: PathBuf,
}

impl TranslationCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn entry_path(&self, slug: &str) -> PathBuf {
        self.dir.join(slug)
    }

    pub fn contains(&self, slug: &str) -> Result<bool, CacheError> {
        match fs::metadata(self.entry_path(slug)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Read {
                slug: slug.to_string(),
                source,
            }),
        }
    }

    pub fn load(&self, slug: &str) -> Result<TranslationSet, CacheError> {
        let data = fs::read_to_string(self.entry_path(slug)).map_err(|source| CacheError::Read {
            slug: slug.to_string(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| CacheError::Decode {
            slug: slug.to_string(),
            source,
        })
    }

    /// Creates the entry for `slug`. Fails if it already exists.
    pub fn store(&self, slug: &str, set: &TranslationSet) -> Result<(), CacheError> {
        let write_err = |source| CacheError::Write {
            slug: slug.to_string(),
            source,
        };

        let json = serde_json::to_vec(set).map_err(|e| write_err(io::Error::other(e)))?;

        write_once(&self.entry_path(slug), &json).map_err(write_err)
    }

    /// Where the plain target-language text of `slug` goes under `mode`.
    pub fn dump_path(&self, slug: &str, language: &str, mode: RawDumpMode) -> Option<PathBuf> {
        match mode {
            RawDumpMode::Separate => Some(self.dir.join(format!("{slug}.{language}.txt"))),
            RawDumpMode::SharedWithCache => Some(self.entry_path(slug)),
            RawDumpMode::Off => None,
        }
    }

    /// Writes the raw target text. Overwrites on purpose: a dump reflects the
    /// latest run, unlike cache entries.
    pub fn dump_raw(
        &self,
        slug: &str,
        language: &str,
        text: &str,
        mode: RawDumpMode,
    ) -> Result<Option<PathBuf>, CacheError> {
        let Some(path) = self.dump_path(slug, language, mode) else {
            return Ok(None);
        };

        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&path, text))
            .map_err(|source| CacheError::Write {
                slug: slug.to_string(),
                source,
            })?;

        Ok(Some(path))
    }
}

/// Writes `bytes` to a temp file, then links it into place. The link fails
/// with `AlreadyExists` instead of replacing an existing entry, and readers
/// never observe a half-written file.
///
/// Filesystems without hard links fall back to [`create_new`], which keeps
/// the no-overwrite guarantee but not the atomic publish.
fn write_once(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, bytes)?;

    let linked = fs::hard_link(&tmp, path);
    let _ = fs::remove_file(&tmp);

    match linked {
        Err(e) if e.kind() != ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), error = %e, "hard link failed, writing entry in place");
            create_new(path, bytes)
        }
        other => other,
    }
}

/// Creates `path` and writes `bytes`; fails with `AlreadyExists` if it is
/// already there.
fn create_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "entry".to_string(),
    };
    p.set_file_name(format!(".{file_name}.{}.tmp", std::process::id()));
    p
}
