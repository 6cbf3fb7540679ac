//! Static registry of documents and categories.
//!
//! The catalog is built once (from the built-in table or a JSON file),
//! validated, and then only read. Every accessor is a pure function of the
//! registry contents, so it can be shared behind an `Arc` without locking.

mod entries;
mod search;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CategoryDefinition, CategoryListing, DocumentEntry, Neighbors};

pub use search::MAX_SEARCH_RESULTS;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("document '{file_name}' references unknown category '{category}'")]
    UnknownCategory { file_name: String, category: String },

    #[error("duplicate document file name '{0}'")]
    DuplicateFileName(String),

    #[error("duplicate category id '{0}'")]
    DuplicateCategory(String),

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub categories: Vec<CategoryDefinition>,
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Clone)]
pub struct DocumentCatalog {
    categories: Vec<CategoryDefinition>,
    entries: Vec<DocumentEntry>,
}

impl DocumentCatalog {
    /// Build a catalog, checking that file names and category ids are
    /// unique and that every entry points at a defined category.
    pub fn new(
        categories: Vec<CategoryDefinition>,
        entries: Vec<DocumentEntry>,
    ) -> Result<Self, CatalogError> {
        let mut category_ids = HashSet::new();
        for category in &categories {
            if !category_ids.insert(category.id.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }
        }

        let mut file_names = HashSet::new();
        for entry in &entries {
            if !file_names.insert(entry.file_name.as_str()) {
                return Err(CatalogError::DuplicateFileName(entry.file_name.clone()));
            }
            if !category_ids.contains(entry.category.as_str()) {
                return Err(CatalogError::UnknownCategory {
                    file_name: entry.file_name.clone(),
                    category: entry.category.clone(),
                });
            }
        }

        let mut categories = categories;
        categories.sort_by_key(|c| c.order);

        Ok(Self {
            categories,
            entries,
        })
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            categories: entries::categories(),
            entries: entries::documents(),
        }
    }

    /// Load and validate a catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::new(file.categories, file.documents)
    }

    /// Categories sorted by their `order`.
    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    pub fn category(&self, id: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn get(&self, file_name: &str) -> Option<&DocumentEntry> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    /// Entries of one category, ascending by `order`; ties keep insertion order.
    pub fn by_category(&self, category: &str) -> Vec<&DocumentEntry> {
        let mut docs: Vec<&DocumentEntry> = self
            .entries
            .iter()
            .filter(|e| e.category == category)
            .collect();
        // Stable sort keeps insertion order among equal keys.
        docs.sort_by_key(|e| e.order);
        docs
    }

    pub fn featured(&self) -> Vec<&DocumentEntry> {
        self.entries.iter().filter(|e| e.featured).collect()
    }

    /// Every category with its ordered entries, for the sidebar.
    pub fn listings(&self) -> Vec<CategoryListing<'_>> {
        self.categories
            .iter()
            .map(|category| CategoryListing {
                category,
                documents: self.by_category(&category.id),
            })
            .collect()
    }

    /// Previous and next documents within the entry's category.
    ///
    /// Returns `None` when `file_name` is not in the catalog.
    pub fn neighbors(&self, file_name: &str) -> Option<Neighbors> {
        let entry = self.get(file_name)?;
        let siblings = self.by_category(&entry.category);
        let index = siblings.iter().position(|e| e.file_name == file_name)?;

        let prev = index
            .checked_sub(1)
            .and_then(|i| siblings.get(i))
            .map(|e| (*e).into());
        let next = siblings.get(index + 1).map(|e| (*e).into());

        Some(Neighbors { prev, next })
    }
}
