//! Translated content tree: language -> category -> subcategory -> {checks, items}.
//!
//! # Invariants
//! - Every level keeps insertion order; re-inserting an id replaces its
//!   record in place and keeps its children.
//! - [`ContentTree::nodes`] yields a deterministic depth-first order.

use std::path::PathBuf;

use super::component::{ComponentKind, NodePath};
use super::translation::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTree {
    languages: Vec<LanguageTree>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTree {
    code: String,
    categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: String,
    record: Record,
    subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcategory {
    id: String,
    record: Record,
    checks: Checks,
    items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checks {
    records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: String,
    record: Record,
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn languages(&self) -> &[LanguageTree] {
        &self.languages
    }

    pub fn language(&self, code: &str) -> Option<&LanguageTree> {
        self.languages.iter().find(|l| l.code == code)
    }

    pub fn language_mut(&mut self, code: &str) -> &mut LanguageTree {
        let idx = match self.languages.iter().position(|l| l.code == code) {
            Some(idx) => idx,
            None => {
                self.languages.push(LanguageTree {
                    code: code.to_string(),
                    categories: Vec::new(),
                });
                self.languages.len() - 1
            }
        };
        &mut self.languages[idx]
    }

    pub fn is_empty(&self) -> bool {
        self.languages.iter().all(|l| l.categories.is_empty())
    }

    /// Every persistable node, depth-first in insertion order. The checks
    /// node of a subcategory is only listed when it has children.
    pub fn nodes(&self) -> Vec<TreeNode<'_>> {
        let mut out = Vec::new();

        for lang in &self.languages {
            for cat in &lang.categories {
                out.push(TreeNode::Category {
                    language: &lang.code,
                    category: cat,
                });

                for sub in &cat.subcategories {
                    out.push(TreeNode::Subcategory {
                        language: &lang.code,
                        category_id: &cat.id,
                        subcategory: sub,
                    });

                    if sub.checks.has_children() {
                        out.push(TreeNode::Checks {
                            language: &lang.code,
                            category_id: &cat.id,
                            subcategory_id: &sub.id,
                            checks: &sub.checks,
                        });
                    }

                    for item in &sub.items {
                        out.push(TreeNode::Item {
                            language: &lang.code,
                            category_id: &cat.id,
                            subcategory_id: &sub.id,
                            item,
                        });
                    }
                }
            }
        }

        out
    }
}

impl LanguageTree {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    pub fn upsert_category(&mut self, id: &str, record: Record) -> &mut Category {
        let idx = match self.categories.iter().position(|c| c.id == id) {
            Some(idx) => {
                self.categories[idx].record = record;
                idx
            }
            None => {
                self.categories.push(Category {
                    id: id.to_string(),
                    record,
                    subcategories: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        &mut self.categories[idx]
    }
}

impl Category {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }

    pub fn sub(&self, id: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }

    pub fn sub_mut(&mut self, id: &str) -> Option<&mut Subcategory> {
        self.subcategories.iter_mut().find(|s| s.id == id)
    }

    pub fn upsert_subcategory(&mut self, id: &str, record: Record) -> &mut Subcategory {
        let idx = match self.subcategories.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.subcategories[idx].record = record;
                idx
            }
            None => {
                self.subcategories.push(Subcategory {
                    id: id.to_string(),
                    record,
                    checks: Checks::default(),
                    items: Vec::new(),
                });
                self.subcategories.len() - 1
            }
        };
        &mut self.subcategories[idx]
    }
}

impl Subcategory {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn checks(&self) -> &Checks {
        &self.checks
    }

    pub fn set_checks(&mut self, records: Vec<Record>) {
        self.checks = Checks { records };
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn upsert_item(&mut self, id: &str, record: Record) {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => item.record = record,
            None => self.items.push(Item {
                id: id.to_string(),
                record,
            }),
        }
    }
}

impl Checks {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn has_children(&self) -> bool {
        !self.records.is_empty()
    }
}

impl Item {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }
}

/// Borrowed view of one node, as handed to storage.
#[derive(Debug, Clone, Copy)]
pub enum TreeNode<'a> {
    Category {
        language: &'a str,
        category: &'a Category,
    },
    Subcategory {
        language: &'a str,
        category_id: &'a str,
        subcategory: &'a Subcategory,
    },
    Checks {
        language: &'a str,
        category_id: &'a str,
        subcategory_id: &'a str,
        checks: &'a Checks,
    },
    Item {
        language: &'a str,
        category_id: &'a str,
        subcategory_id: &'a str,
        item: &'a Item,
    },
}

impl<'a> TreeNode<'a> {
    pub fn kind(&self) -> ComponentKind {
        match self {
            TreeNode::Category { .. } => ComponentKind::Category,
            TreeNode::Subcategory { .. } => ComponentKind::Subcategory,
            TreeNode::Checks { .. } => ComponentKind::Checks,
            TreeNode::Item { .. } => ComponentKind::Item,
        }
    }

    pub fn language(&self) -> &'a str {
        match self {
            TreeNode::Category { language, .. }
            | TreeNode::Subcategory { language, .. }
            | TreeNode::Checks { language, .. }
            | TreeNode::Item { language, .. } => language,
        }
    }

    pub fn node_path(&self) -> NodePath {
        match self {
            TreeNode::Category { category, .. } => NodePath::category(category.id()),
            TreeNode::Subcategory {
                category_id,
                subcategory,
                ..
            } => NodePath::subcategory(*category_id, subcategory.id()),
            TreeNode::Checks {
                category_id,
                subcategory_id,
                ..
            } => NodePath::subcategory(*category_id, *subcategory_id),
            TreeNode::Item {
                category_id,
                subcategory_id,
                item,
                ..
            } => NodePath::item(*category_id, *subcategory_id, item.id()),
        }
    }

    pub fn records(&self) -> &'a [Record] {
        match self {
            TreeNode::Category { category, .. } => std::slice::from_ref(&category.record),
            TreeNode::Subcategory { subcategory, .. } => {
                std::slice::from_ref(&subcategory.record)
            }
            TreeNode::Checks { checks, .. } => checks.records(),
            TreeNode::Item { item, .. } => std::slice::from_ref(&item.record),
        }
    }

    /// `<language>/<file>`, relative to the content root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.language()).join(self.node_path().file_for(self.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str) -> Record {
        [("title".to_string(), title.to_string())].into_iter().collect()
    }

    #[test]
    fn upsert_keeps_position_and_children() {
        let mut tree = ContentTree::new();
        let lang = tree.language_mut("zh");
        lang.upsert_category("a", rec("A"));
        lang.upsert_category("b", rec("B"));
        lang.category_mut("a")
            .unwrap()
            .upsert_subcategory("s", rec("S"));

        lang.upsert_category("a", rec("A2"));

        let lang = tree.language("zh").unwrap();
        let ids: Vec<_> = lang.categories().iter().map(Category::id).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(lang.category("a").unwrap().record()["title"], "A2");
        assert!(lang.category("a").unwrap().sub("s").is_some());
    }

    #[test]
    fn empty_checks_are_not_listed() {
        let mut tree = ContentTree::new();
        let sub = tree
            .language_mut("zh")
            .upsert_category("a", rec("A"))
            .upsert_subcategory("s", rec("S"));
        sub.upsert_item("i", rec("I"));

        let kinds: Vec<_> = tree.nodes().iter().map(TreeNode::kind).collect();
        assert_eq!(
            kinds,
            [
                ComponentKind::Category,
                ComponentKind::Subcategory,
                ComponentKind::Item
            ]
        );
        assert_eq!(
            tree.nodes()[2].relative_path(),
            PathBuf::from("zh/a/s/i.md")
        );
    }
}
