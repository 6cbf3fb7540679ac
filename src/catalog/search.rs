use super::DocumentCatalog;
use crate::models::DocumentEntry;

/// Upper bound on the number of search hits returned.
pub const MAX_SEARCH_RESULTS: usize = 8;

impl DocumentCatalog {
    /// Case-insensitive substring search over title, description, file name
    /// and category.
    ///
    /// Results keep catalog order; there is no ranking. A blank query
    /// returns nothing rather than the whole catalog.
    pub fn search(&self, query: &str) -> Vec<&DocumentEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.entries()
            .iter()
            .filter(|entry| matches(entry, &needle))
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }
}

fn matches(entry: &DocumentEntry, needle: &str) -> bool {
    [
        &entry.title,
        &entry.description,
        &entry.file_name,
        &entry.category,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryDefinition;

    fn catalog_with(count: usize) -> DocumentCatalog {
        let entries = (0..count)
            .map(|i| DocumentEntry {
                file_name: format!("doc-{i}.md"),
                title: format!("Document {i}"),
                description: "Shared words".to_string(),
                category: "guides".to_string(),
                order: i as i32,
                featured: false,
            })
            .collect();
        DocumentCatalog::new(
            vec![CategoryDefinition {
                id: "guides".to_string(),
                label: "Guides".to_string(),
                order: 0,
            }],
            entries,
        )
        .unwrap()
    }

    #[test]
    fn blank_query_returns_nothing() {
        let catalog = catalog_with(3);
        assert!(catalog.search("").is_empty());
        assert!(catalog.search("   ").is_empty());
    }

    #[test]
    fn caps_results() {
        let catalog = catalog_with(20);
        let hits = catalog.search("shared");
        assert_eq!(hits.len(), MAX_SEARCH_RESULTS);
        assert_eq!(hits[0].file_name, "doc-0.md");
    }

    #[test]
    fn matches_any_field_case_insensitively() {
        let catalog = catalog_with(3);
        assert_eq!(catalog.search("DOCUMENT 1").len(), 1);
        assert_eq!(catalog.search("doc-2.MD").len(), 1);
        assert_eq!(catalog.search("GuIdEs").len(), 3);
        assert!(catalog.search("absent").is_empty());
    }
}
