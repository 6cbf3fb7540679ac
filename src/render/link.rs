/// Route prefix documents are served under in the site.
pub const DOCS_ROUTE: &str = "/docs";

/// Site path of a document page.
pub fn doc_href(file_name: &str) -> String {
    format!("{DOCS_ROUTE}/{file_name}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub href: String,
    /// Opens in a new tab without an opener reference.
    pub external: bool,
}

/// Decides how link targets found in documents are presented.
pub trait LinkResolver: Send + Sync {
    fn resolve(&self, href: &str) -> ResolvedLink;
}

/// Default resolver for documentation pages.
///
/// `http(s)://` and `mailto:` targets are external; relative `*.md` targets
/// point at the docs route; everything else passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocsLinkResolver;

impl LinkResolver for DocsLinkResolver {
    fn resolve(&self, href: &str) -> ResolvedLink {
        let lower = href.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:") {
            return ResolvedLink {
                href: href.to_string(),
                external: true,
            };
        }

        if !href.starts_with('/') && !href.starts_with('#') {
            let (path, fragment) = match href.split_once('#') {
                Some((path, fragment)) => (path, Some(fragment)),
                None => (href, None),
            };
            let path = path.strip_prefix("./").unwrap_or(path);
            if path.ends_with(".md") || path.ends_with(".mdx") {
                let mut target = doc_href(path);
                if let Some(fragment) = fragment {
                    target.push('#');
                    target.push_str(fragment);
                }
                return ResolvedLink {
                    href: target,
                    external: false,
                };
            }
        }

        ResolvedLink {
            href: href.to_string(),
            external: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(href: &str) -> ResolvedLink {
        DocsLinkResolver.resolve(href)
    }

    #[test]
    fn external_links() {
        assert!(resolve("https://example.com").external);
        assert!(resolve("HTTP://example.com").external);
        assert!(resolve("mailto:me@example.com").external);
    }

    #[test]
    fn relative_markdown_links_point_at_docs() {
        assert_eq!(resolve("theming.md").href, "/docs/theming.md");
        assert_eq!(resolve("./theming.md#tokens").href, "/docs/theming.md#tokens");
        assert!(!resolve("theming.md").external);
    }

    #[test]
    fn anchors_and_absolute_paths_pass_through() {
        assert_eq!(resolve("#setup").href, "#setup");
        assert_eq!(resolve("/about").href, "/about");
        assert_eq!(resolve("assets/diagram.png").href, "assets/diagram.png");
    }
}
