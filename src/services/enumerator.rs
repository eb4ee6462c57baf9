//! Lists the source-language components of a content root.
//!
//! Layout under `<root>/<language>/`:
//! `<cat>/.category.md`, `<cat>/<sub>/.subcategory.md`,
//! `<cat>/<sub>/.checks.md`, `<cat>/<sub>/<item>.md`.
//!
//! Parents are always listed before their children; siblings in lexical
//! order. Hidden directories (such as the translation cache) are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::EnumerateError;
use crate::model::component::{Component, ComponentKind, NodePath};
use crate::parsers;
use crate::services::encoding;

const CATEGORY_FILE: &str = ".category.md";
const SUBCATEGORY_FILE: &str = ".subcategory.md";
const CHECKS_FILE: &str = ".checks.md";
const ITEM_EXT: &str = "md";

pub trait ComponentSource {
    fn list_components(&self, language: &str) -> Result<Vec<Component>, EnumerateError>;
}

pub struct FsEnumerator {
    root: PathBuf,
}

impl FsEnumerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ComponentSource for FsEnumerator {
    fn list_components(&self, language: &str) -> Result<Vec<Component>, EnumerateError> {
        let base = self.root.join(language);
        if !base.is_dir() {
            return Err(EnumerateError::MissingLanguage {
                language: language.to_string(),
                root: self.root.clone(),
            });
        }

        let mut out = Vec::new();

        for cat_dir in sorted_dirs(&base)? {
            let cat_id = file_name(&cat_dir);

            push_file(
                &mut out,
                ComponentKind::Category,
                NodePath::category(&cat_id),
                cat_dir.join(CATEGORY_FILE),
            );

            for sub_dir in sorted_dirs(&cat_dir)? {
                let sub_id = file_name(&sub_dir);
                let sub_path = NodePath::subcategory(&cat_id, &sub_id);

                push_file(
                    &mut out,
                    ComponentKind::Subcategory,
                    sub_path.clone(),
                    sub_dir.join(SUBCATEGORY_FILE),
                );
                push_file(
                    &mut out,
                    ComponentKind::Checks,
                    sub_path,
                    sub_dir.join(CHECKS_FILE),
                );

                for item_file in sorted_items(&sub_dir)? {
                    let item_id = item_file
                        .file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_default();
                    push_file(
                        &mut out,
                        ComponentKind::Item,
                        NodePath::item(&cat_id, &sub_id, item_id),
                        item_file,
                    );
                }
            }
        }

        Ok(out)
    }
}

fn push_file(out: &mut Vec<Component>, kind: ComponentKind, path: NodePath, file: PathBuf) {
    if !file.is_file() {
        return;
    }

    let decoded = match encoding::read_text(&file) {
        Ok(d) => d,
        Err(e) => {
            warn!(file = %file.display(), error = %e, "skipping unreadable component");
            return;
        }
    };
    if decoded.had_errors {
        warn!(
            file = %file.display(),
            encoding = decoded.encoding,
            "component decoded with replacement characters"
        );
    }

    let records = parsers::component::parse(&decoded.text);
    if records.is_empty() {
        warn!(file = %file.display(), "skipping empty component");
        return;
    }

    out.push(Component::new(kind, path, file, records));
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, EnumerateError> {
    let entries = fs::read_dir(dir).map_err(|source| EnumerateError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| EnumerateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>, EnumerateError> {
    Ok(read_dir(dir)?
        .into_iter()
        .filter(|p| p.is_dir() && !is_hidden(p))
        .collect())
}

fn sorted_items(dir: &Path) -> Result<Vec<PathBuf>, EnumerateError> {
    Ok(read_dir(dir)?
        .into_iter()
        .filter(|p| {
            p.is_file()
                && !is_hidden(p)
                && p.extension().and_then(|e| e.to_str()) == Some(ITEM_EXT)
        })
        .collect())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
