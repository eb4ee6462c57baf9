use std::fmt;
use std::path::{Path, PathBuf};

use super::translation::Record;

const SLUG_SEPARATOR: &str = "___";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Category,
    Subcategory,
    Checks,
    Item,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Category => "category",
            ComponentKind::Subcategory => "subcategory",
            ComponentKind::Checks => "checks",
            ComponentKind::Item => "item",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a node in the content tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    pub category: String,
    pub subcategory: Option<String>,
    pub item: Option<String>,
}

impl NodePath {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: None,
            item: None,
        }
    }

    pub fn subcategory(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: Some(subcategory.into()),
            item: None,
        }
    }

    pub fn item(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        item: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: Some(subcategory.into()),
            item: Some(item.into()),
        }
    }

    pub fn segments(&self) -> Vec<&str> {
        let mut out = vec![self.category.as_str()];
        out.extend(self.subcategory.as_deref());
        out.extend(self.item.as_deref());
        out
    }

    /// File holding a node of `kind` at this path, relative to a language root.
    ///
    /// - category:    `<cat>/.category.md`
    /// - subcategory: `<cat>/<sub>/.subcategory.md`
    /// - checks:      `<cat>/<sub>/.checks.md`
    /// - item:        `<cat>/<sub>/<item>.md`
    pub fn file_for(&self, kind: ComponentKind) -> PathBuf {
        let mut p = PathBuf::from(&self.category);
        if let Some(sub) = &self.subcategory {
            p.push(sub);
        }
        match kind {
            ComponentKind::Category => p.push(".category.md"),
            ComponentKind::Subcategory => p.push(".subcategory.md"),
            ComponentKind::Checks => p.push(".checks.md"),
            ComponentKind::Item => {
                let name = self.item.as_deref().unwrap_or("item");
                p.push(format!("{name}.md"));
            }
        }
        p
    }
}

/// A translatable unit: slug plus its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub slug: String,
    pub records: Vec<Record>,
}

/// One source-language file of the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    kind: ComponentKind,
    path: NodePath,
    source: PathBuf,
    records: Vec<Record>,
}

impl Component {
    pub fn new(
        kind: ComponentKind,
        path: NodePath,
        source: impl Into<PathBuf>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            kind,
            path,
            source: source.into(),
            records,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Stable resource identifier: `<kind>___<category>[___<sub>[___<item>]]`.
    pub fn slug(&self) -> String {
        let mut parts = vec![self.kind.as_str()];
        parts.extend(self.path.segments());
        parts.join(SLUG_SEPARATOR)
    }

    pub fn resource(&self) -> Resource {
        Resource {
            slug: self.slug(),
            records: self.records.clone(),
        }
    }
}
