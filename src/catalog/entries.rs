use crate::models::{CategoryDefinition, DocumentEntry};

fn category(id: &str, label: &str, order: i32) -> CategoryDefinition {
    CategoryDefinition {
        id: id.to_string(),
        label: label.to_string(),
        order,
    }
}

fn doc(
    file_name: &str,
    title: &str,
    description: &str,
    category: &str,
    order: i32,
    featured: bool,
) -> DocumentEntry {
    DocumentEntry {
        file_name: file_name.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        order,
        featured,
    }
}

pub(super) fn categories() -> Vec<CategoryDefinition> {
    vec![
        category("getting-started", "Getting Started", 1),
        category("architecture", "Architecture", 2),
        category("guides", "Guides", 3),
    ]
}

pub(super) fn documents() -> Vec<DocumentEntry> {
    vec![
        doc(
            "introduction.md",
            "Introduction",
            "What this site is built from and how the pieces fit together",
            "getting-started",
            1,
            true,
        ),
        doc(
            "installation.md",
            "Installation",
            "Clone the repository, install toolchains and run the dev server",
            "getting-started",
            2,
            true,
        ),
        doc(
            "project-structure.md",
            "Project Structure",
            "A tour of the source tree and where each concern lives",
            "getting-started",
            3,
            false,
        ),
        doc(
            "content-pipeline.md",
            "Content Pipeline",
            "How markdown documents are fetched, rewritten and serialized",
            "architecture",
            1,
            true,
        ),
        doc(
            "theming.md",
            "Theming",
            "Color tokens, dark mode and the font customizer",
            "architecture",
            2,
            false,
        ),
        doc(
            "animations.md",
            "Animations",
            "Scroll-driven sections, marquees and reduced-motion handling",
            "architecture",
            3,
            false,
        ),
        doc(
            "writing-docs.md",
            "Writing Docs",
            "Frontmatter, code fences, callouts and tabbed samples",
            "guides",
            1,
            false,
        ),
        doc(
            "deployment.md",
            "Deployment",
            "Building for production and shipping to the edge",
            "guides",
            2,
            false,
        ),
        doc(
            "performance.md",
            "Performance",
            "Measuring and trimming bundle size and render cost",
            "guides",
            3,
            false,
        ),
    ]
}
