use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::FormatError;

/// One structured record of a resource (field name -> text).
pub type Record = BTreeMap<String, String>;

/// Every language's raw text for one resource, keyed by language tag.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TranslationSet(BTreeMap<String, String>);

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.0.insert(language.into(), text.into());
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Decodes a translated payload into its records.
///
/// Translations travel as the JSON encoding of the resource's record list, so
/// a language's text must itself be a `[{"field": "text"}, ...]` document.
pub fn decode_records(language: &str, text: &str) -> Result<Vec<Record>, FormatError> {
    serde_json::from_str(text).map_err(|source| FormatError {
        language: language.to_string(),
        payload: text.to_string(),
        source,
    })
}

/// Inverse of [`decode_records`]: the record-list payload shape the remote
/// returns for every language.
pub fn encode_records(records: &[Record]) -> String {
    serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
}
