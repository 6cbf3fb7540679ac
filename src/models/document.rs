use serde::{Deserialize, Serialize};

use super::RenderableTree;

/// A document registered in the catalog.
///
/// Entries are configuration: they are built once when the catalog is
/// constructed and never change afterwards. `file_name` is the unique key
/// and doubles as the identifier the fetch endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub file_name: String,
    pub title: String,
    pub description: String,
    /// Id of the [`CategoryDefinition`] this entry belongs to.
    pub category: String,
    /// Position within the category. Ties keep insertion order.
    pub order: i32,
    #[serde(default)]
    pub featured: bool,
}

/// A sidebar section grouping documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    pub id: String,
    pub label: String,
    pub order: i32,
}

/// A category together with its entries, in catalog order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing<'a> {
    #[serde(flatten)]
    pub category: &'a CategoryDefinition,
    pub documents: Vec<&'a DocumentEntry>,
}

/// The unparsed text of one document, fetched per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub identifier: String,
    pub text: String,
}

/// Result of serializing a [`RawDocument`].
///
/// `tree` only exists when serialization succeeded, either on the rewritten
/// body or on the original-body retry. `recovered` records which one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDocument {
    pub content: String,
    #[serde(rename = "mdx")]
    pub tree: RenderableTree,
    pub title: String,
    #[serde(skip)]
    pub recovered: bool,
}

/// One entry of a rendered document's outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    pub id: String,
    pub text: String,
    /// Always 2, 3 or 4.
    pub level: u8,
}

/// Link to an adjacent document in the same category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLink {
    pub title: String,
    pub file_name: String,
    pub description: String,
}

impl From<&DocumentEntry> for NavigationLink {
    fn from(entry: &DocumentEntry) -> Self {
        Self {
            title: entry.title.clone(),
            file_name: entry.file_name.clone(),
            description: entry.description.clone(),
        }
    }
}

/// Previous/next links for a document. Either side is `None` at the
/// boundary of its category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbors {
    pub prev: Option<NavigationLink>,
    pub next: Option<NavigationLink>,
}
