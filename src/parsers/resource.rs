//! Folds translated resources into the content tree.
//!
//! # Invariants
//! - A node is only attached under parents already built for that language.
//! - Category, subcategory and item resources carry exactly one record with a
//!   `title`; a checks resource keeps the source's record count and every
//!   check has a `text`.

use crate::error::ParseError;
use crate::model::component::{Component, ComponentKind, NodePath, Resource};
use crate::model::translation::Record;
use crate::model::tree::{ContentTree, LanguageTree, Subcategory};

const TITLE: &str = "title";
const CHECK_TEXT: &str = "text";

#[derive(Debug, Default)]
pub struct ResourceParser {
    tree: ContentTree,
}

impl ResourceParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn into_tree(self) -> ContentTree {
        self.tree
    }

    /// Adds `resource` (translated records of `component`) to the tree under
    /// the two-letter `language` code.
    pub fn parse(
        &mut self,
        component: &Component,
        resource: &Resource,
        language: &str,
    ) -> Result<(), ParseError> {
        let slug = resource.slug.as_str();
        let path = component.path();

        match component.kind() {
            ComponentKind::Category => {
                let record = single_record(slug, &resource.records, TITLE)?;
                self.tree
                    .language_mut(language)
                    .upsert_category(&path.category, record);
            }
            ComponentKind::Subcategory => {
                let record = single_record(slug, &resource.records, TITLE)?;
                let sub_id = subcategory_id(slug, path)?;
                let lang = self.tree.language_mut(language);
                let category = lang
                    .category_mut(&path.category)
                    .ok_or_else(|| missing_parent(slug, &path.category))?;
                category.upsert_subcategory(sub_id, record);
            }
            ComponentKind::Checks => {
                let expected = component.records().len();
                if resource.records.len() != expected {
                    return Err(ParseError::RecordCount {
                        slug: slug.to_string(),
                        expected,
                        found: resource.records.len(),
                    });
                }
                require_field(slug, &resource.records, CHECK_TEXT)?;
                let sub = subcategory_mut(self.tree.language_mut(language), slug, path)?;
                sub.set_checks(resource.records.clone());
            }
            ComponentKind::Item => {
                let record = single_record(slug, &resource.records, TITLE)?;
                let item_id = path.item.as_deref().ok_or_else(|| ParseError::MissingField {
                    slug: slug.to_string(),
                    index: 0,
                    field: "item",
                })?;
                let sub = subcategory_mut(self.tree.language_mut(language), slug, path)?;
                sub.upsert_item(item_id, record);
            }
        }

        Ok(())
    }
}

fn single_record(slug: &str, records: &[Record], field: &'static str) -> Result<Record, ParseError> {
    if records.len() != 1 {
        return Err(ParseError::RecordCount {
            slug: slug.to_string(),
            expected: 1,
            found: records.len(),
        });
    }
    require_field(slug, records, field)?;
    Ok(records[0].clone())
}

fn require_field(slug: &str, records: &[Record], field: &'static str) -> Result<(), ParseError> {
    for (index, r) in records.iter().enumerate() {
        let present = r.get(field).map(|v| !v.trim().is_empty()).unwrap_or(false);
        if !present {
            return Err(ParseError::MissingField {
                slug: slug.to_string(),
                index,
                field,
            });
        }
    }
    Ok(())
}

fn subcategory_id<'p>(slug: &str, path: &'p NodePath) -> Result<&'p str, ParseError> {
    path.subcategory
        .as_deref()
        .ok_or_else(|| ParseError::MissingField {
            slug: slug.to_string(),
            index: 0,
            field: "subcategory",
        })
}

fn subcategory_mut<'t>(
    lang: &'t mut LanguageTree,
    slug: &str,
    path: &NodePath,
) -> Result<&'t mut Subcategory, ParseError> {
    let sub_id = subcategory_id(slug, path)?;
    let category = lang
        .category_mut(&path.category)
        .ok_or_else(|| missing_parent(slug, &path.category))?;
    category
        .sub_mut(sub_id)
        .ok_or_else(|| missing_parent(slug, &format!("{}/{}", path.category, sub_id)))
}

fn missing_parent(slug: &str, parent: &str) -> ParseError {
    ParseError::MissingParent {
        slug: slug.to_string(),
        parent: parent.to_string(),
    }
}
