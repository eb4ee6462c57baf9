//! Flushes a built content tree to storage, one node at a time.
//!
//! A node that fails to persist is logged and counted; the walk always
//! continues with its siblings and the rest of the tree.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::PersistError;
use crate::model::tree::{ContentTree, TreeNode};
use crate::services::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Written,
    Unchanged,
}

pub trait NodeStore {
    fn persist(&mut self, node: &TreeNode<'_>) -> Result<PersistOutcome, PersistError>;
}

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    pub written: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub failures: Vec<PathBuf>,
}

impl MaterializeReport {
    pub fn total(&self) -> usize {
        self.written + self.unchanged + self.failed
    }
}

pub fn materialize<S: NodeStore + ?Sized>(tree: &ContentTree, store: &mut S) -> MaterializeReport {
    let mut report = MaterializeReport::default();

    for node in tree.nodes() {
        let path = node.relative_path();
        match store.persist(&node) {
            Ok(PersistOutcome::Written) => {
                info!(path = %path.display(), "ok");
                report.written += 1;
            }
            Ok(PersistOutcome::Unchanged) => {
                info!(path = %path.display(), "unchanged");
                report.unchanged += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "write failed");
                report.failed += 1;
                report.failures.push(path);
            }
        }
    }

    report
}

/// Writes nodes as component files under `<root>/<language>/...`.
pub struct FsNodeStore {
    root: PathBuf,
}

impl FsNodeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl NodeStore for FsNodeStore {
    fn persist(&mut self, node: &TreeNode<'_>) -> Result<PersistOutcome, PersistError> {
        let path = self.root.join(node.relative_path());
        let content = render::render(node.records());

        if let Ok(existing) = fs::read(&path) {
            if fingerprint(&existing) == fingerprint(content.as_bytes()) {
                return Ok(PersistOutcome::Unchanged);
            }
        }

        let io_err = |source| PersistError {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, content).map_err(io_err)?;

        Ok(PersistOutcome::Written)
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
