use folio_docs::catalog::{CatalogError, DocumentCatalog, MAX_SEARCH_RESULTS};
use folio_docs::models::*;
use speculate2::speculate;

fn category(id: &str, order: i32) -> CategoryDefinition {
    CategoryDefinition {
        id: id.to_string(),
        label: id.to_string(),
        order,
    }
}

fn entry(file_name: &str, category: &str, order: i32) -> DocumentEntry {
    DocumentEntry {
        file_name: file_name.to_string(),
        title: format!("Title of {file_name}"),
        description: format!("About {file_name}"),
        category: category.to_string(),
        order,
        featured: false,
    }
}

fn names(entries: &[&DocumentEntry]) -> Vec<String> {
    entries.iter().map(|e| e.file_name.clone()).collect()
}

speculate! {
    before {
        let catalog = DocumentCatalog::builtin();
    }

    describe "by_category" {
        it "orders entries by their order field" {
            let docs = catalog.by_category("getting-started");
            assert_eq!(
                names(&docs),
                ["introduction.md", "installation.md", "project-structure.md"]
            );
        }

        it "keeps insertion order for equal order values" {
            let catalog = DocumentCatalog::new(
                vec![category("guides", 1)],
                vec![
                    entry("b.md", "guides", 2),
                    entry("a.md", "guides", 1),
                    entry("c.md", "guides", 2),
                ],
            ).expect("valid catalog");

            assert_eq!(names(&catalog.by_category("guides")), ["a.md", "b.md", "c.md"]);
        }

        it "returns nothing for an unknown category" {
            assert!(catalog.by_category("nope").is_empty());
        }
    }

    describe "neighbors" {
        it "has no previous link for the first entry of every category" {
            for category in catalog.categories() {
                let docs = catalog.by_category(&category.id);
                let first = catalog.neighbors(&docs[0].file_name).expect("known entry");
                assert!(first.prev.is_none(), "{} has a prev link", docs[0].file_name);
            }
        }

        it "has no next link for the last entry of every category" {
            for category in catalog.categories() {
                let docs = catalog.by_category(&category.id);
                let last = docs[docs.len() - 1];
                let neighbors = catalog.neighbors(&last.file_name).expect("known entry");
                assert!(neighbors.next.is_none(), "{} has a next link", last.file_name);
            }
        }

        it "links adjacent entries in both directions" {
            let forward = catalog.neighbors("theming.md").expect("known entry");
            let next = forward.next.expect("theming has a next entry");
            assert_eq!(next.file_name, "animations.md");

            let back = catalog.neighbors(&next.file_name).expect("known entry");
            assert_eq!(back.prev.expect("animations has a prev entry").file_name, "theming.md");

            let again = catalog.neighbors("theming.md").expect("known entry");
            assert_eq!(again.prev.unwrap().file_name, "content-pipeline.md");
        }

        it "never crosses category boundaries" {
            let last_of_first = catalog.neighbors("project-structure.md").expect("known entry");
            assert!(last_of_first.next.is_none());

            let first_of_second = catalog.neighbors("content-pipeline.md").expect("known entry");
            assert!(first_of_second.prev.is_none());
        }

        it "carries title and description" {
            let link = catalog.neighbors("introduction.md").unwrap().next.unwrap();
            assert_eq!(link.title, "Installation");
            assert!(!link.description.is_empty());
        }

        it "returns None for unknown documents" {
            assert!(catalog.neighbors("missing.md").is_none());
        }
    }

    describe "get" {
        it "finds entries by file name" {
            assert_eq!(catalog.get("deployment.md").unwrap().category, "guides");
        }

        it "returns None for unknown file names" {
            assert!(catalog.get("missing.md").is_none());
        }
    }

    describe "featured" {
        it "returns flagged entries in catalog order" {
            assert_eq!(
                names(&catalog.featured()),
                ["introduction.md", "installation.md", "content-pipeline.md"]
            );
        }
    }

    describe "search" {
        it "returns nothing for an empty query" {
            assert!(catalog.search("").is_empty());
            assert!(catalog.search("   ").is_empty());
        }

        it "matches case-insensitively across fields" {
            assert_eq!(names(&catalog.search("DEPLOYMENT")), ["deployment.md"]);
            assert_eq!(names(&catalog.search("dark mode")), ["theming.md"]);
            assert_eq!(names(&catalog.search("structure.md")), ["project-structure.md"]);
            assert_eq!(
                names(&catalog.search("guides")),
                ["writing-docs.md", "deployment.md", "performance.md"]
            );
        }

        it "caps results and keeps catalog order" {
            let entries: Vec<DocumentEntry> = (0..12)
                .map(|i| entry(&format!("doc-{i:02}.md"), "guides", i))
                .collect();
            let catalog = DocumentCatalog::new(vec![category("guides", 1)], entries)
                .expect("valid catalog");

            let hits = catalog.search("doc");
            assert_eq!(hits.len(), MAX_SEARCH_RESULTS);
            assert_eq!(hits[0].file_name, "doc-00.md");
            assert_eq!(hits[7].file_name, "doc-07.md");
        }
    }

    describe "validation" {
        it "rejects entries pointing at unknown categories" {
            let result = DocumentCatalog::new(vec![category("guides", 1)], vec![entry("a.md", "other", 1)]);
            assert!(matches!(result, Err(CatalogError::UnknownCategory { .. })));
        }

        it "rejects duplicate file names" {
            let result = DocumentCatalog::new(
                vec![category("guides", 1)],
                vec![entry("a.md", "guides", 1), entry("a.md", "guides", 2)],
            );
            assert!(matches!(result, Err(CatalogError::DuplicateFileName(name)) if name == "a.md"));
        }

        it "rejects duplicate category ids" {
            let result = DocumentCatalog::new(vec![category("guides", 1), category("guides", 2)], vec![]);
            assert!(matches!(result, Err(CatalogError::DuplicateCategory(_))));
        }

        it "loads a JSON catalog" {
            let catalog = DocumentCatalog::from_json_str(r#"{
                "categories": [
                    { "id": "b", "label": "B", "order": 2 },
                    { "id": "a", "label": "A", "order": 1 }
                ],
                "documents": [
                    { "fileName": "x.md", "title": "X", "description": "", "category": "a", "order": 1, "featured": true }
                ]
            }"#).expect("valid catalog");

            let ids: Vec<&str> = catalog.categories().iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, ["a", "b"]);
            assert_eq!(names(&catalog.featured()), ["x.md"]);
        }

        it "reports malformed JSON" {
            assert!(matches!(
                DocumentCatalog::from_json_str("{"),
                Err(CatalogError::Parse(_))
            ));
        }
    }
}
