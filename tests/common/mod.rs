#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;

use sekai_sync::model::translation::encode_records;
use sekai_sync::services::materialize::PersistOutcome;
use sekai_sync::{
    CancelToken, Component, ComponentKind, NodePath, NodeStore, PersistError, Record,
    RemoteError, TranslationSet, TranslationSource, TreeNode,
};

pub const SOURCE: &str = "en";
pub const TARGET: &str = "zh-Hant";

pub fn rec(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn titled(title: &str) -> Vec<Record> {
    vec![rec(&[("title", title)])]
}

pub fn category(id: &str, title: &str) -> Component {
    Component::new(
        ComponentKind::Category,
        NodePath::category(id),
        format!("en/{id}/.category.md"),
        titled(title),
    )
}

pub fn subcategory(cat: &str, id: &str, title: &str) -> Component {
    Component::new(
        ComponentKind::Subcategory,
        NodePath::subcategory(cat, id),
        format!("en/{cat}/{id}/.subcategory.md"),
        titled(title),
    )
}

pub fn item(cat: &str, sub: &str, id: &str, title: &str) -> Component {
    Component::new(
        ComponentKind::Item,
        NodePath::item(cat, sub, id),
        format!("en/{cat}/{sub}/{id}.md"),
        titled(title),
    )
}

pub fn checks(cat: &str, sub: &str, texts: &[&str]) -> Component {
    Component::new(
        ComponentKind::Checks,
        NodePath::subcategory(cat, sub),
        format!("en/{cat}/{sub}/.checks.md"),
        texts.iter().map(|t| rec(&[("text", t)])).collect(),
    )
}

/// Translation set where the target title differs from the English one.
pub fn translated_set(english: &[Record], target: &[Record]) -> TranslationSet {
    [
        (SOURCE, encode_records(english)),
        (TARGET, encode_records(target)),
    ]
    .into_iter()
    .collect()
}

/// Scripted remote: answers from a table, counts calls, can fail or cancel.
#[derive(Default)]
pub struct FakeSource {
    pub answers: HashMap<String, TranslationSet>,
    pub failing: HashSet<String>,
    pub calls: Vec<String>,
    /// Cancel this token once `cancel_after` fetches have been made.
    pub cancel: Option<(CancelToken, usize)>,
}

impl FakeSource {
    pub fn answer(mut self, slug: &str, set: TranslationSet) -> Self {
        self.answers.insert(slug.to_string(), set);
        self
    }

    pub fn fail(mut self, slug: &str) -> Self {
        self.failing.insert(slug.to_string());
        self
    }

    /// Answers every component with a translated copy of its own records.
    pub fn translating(components: &[Component]) -> Self {
        let mut src = Self::default();
        for c in components {
            let target: Vec<Record> = c
                .records()
                .iter()
                .map(|r| {
                    r.iter()
                        .map(|(k, v)| (k.clone(), format!("譯:{v}")))
                        .collect()
                })
                .collect();
            src.answers
                .insert(c.slug(), translated_set(c.records(), &target));
        }
        src
    }
}

impl TranslationSource for FakeSource {
    fn fetch_translations(&mut self, slug: &str) -> Result<TranslationSet, RemoteError> {
        self.calls.push(slug.to_string());

        if let Some((token, after)) = &self.cancel {
            if self.calls.len() >= *after {
                token.cancel();
            }
        }

        if self.failing.contains(slug) {
            return Err(RemoteError::Status("HTTP 500: boom".into()));
        }
        self.answers
            .get(slug)
            .cloned()
            .ok_or_else(|| RemoteError::Status("HTTP 404: Not found".into()))
    }
}

/// Records persisted node paths; fails on the configured ones.
#[derive(Default)]
pub struct MemoryStore {
    pub persisted: Vec<PathBuf>,
    pub failing: HashSet<PathBuf>,
}

impl NodeStore for MemoryStore {
    fn persist(&mut self, node: &TreeNode<'_>) -> Result<PersistOutcome, PersistError> {
        let path = node.relative_path();
        if self.failing.contains(&path) {
            return Err(PersistError {
                path,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.persisted.push(path);
        Ok(PersistOutcome::Written)
    }
}
