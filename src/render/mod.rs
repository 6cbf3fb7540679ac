//! Maps a [`RenderableTree`] onto presentational [`View`] elements.
//!
//! Rendering is pure: the tree is already fetched and parsed, so nothing here
//! touches the network or the file system.

mod link;
mod scrollspy;
mod slug;
mod toc;
mod view;

pub use link::{doc_href, DocsLinkResolver, LinkResolver, ResolvedLink, DOCS_ROUTE};
pub use scrollspy::{ActiveBand, HeadingPosition, Scrollspy};
pub use slug::slugify;
pub use toc::{extract_toc, scroll_target, HEADER_OFFSET};
pub use view::{escape_html, Component, Element, View};

use crate::models::{plain_text, Alignment, CodeSample, Inline, ListItem, Node, RenderableTree};

/// Whether a code sample in `language` gets line numbers. Shell snippets
/// are meant to be copied and never do.
pub fn shows_line_numbers(language: &str) -> bool {
    !matches!(language.to_ascii_lowercase().as_str(), "bash" | "sh")
}

/// Anchor id for a heading: the explicit id when given, otherwise the slug
/// of its text.
pub fn heading_anchor(explicit: Option<&str>, children: &[Inline]) -> String {
    match explicit {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => slugify(&plain_text(children)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer<L = DocsLinkResolver> {
    links: L,
}

impl DocumentRenderer<DocsLinkResolver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: LinkResolver> DocumentRenderer<L> {
    pub fn with_link_resolver(links: L) -> Self {
        Self { links }
    }

    pub fn render(&self, tree: &RenderableTree) -> View {
        View::element(Component::Document, self.blocks(&tree.children))
    }

    fn blocks(&self, nodes: &[Node]) -> Vec<View> {
        nodes.iter().map(|node| self.block(node)).collect()
    }

    fn block(&self, node: &Node) -> View {
        match node {
            Node::Heading {
                level,
                id,
                children,
            } => self.heading(*level, id.as_deref(), children),
            Node::Paragraph { children } => {
                View::element(Component::Paragraph, self.inlines(children))
            }
            Node::List {
                ordered,
                start,
                items,
            } => self.list(*ordered, *start, items),
            Node::Table {
                alignments,
                head,
                rows,
            } => self.table(alignments, head, rows),
            Node::CodeBlock(sample) => code_block(sample),
            Node::BlockQuote { children } => {
                View::element(Component::BlockQuote, self.blocks(children))
            }
            Node::ThematicBreak => View::element(Component::HorizontalRule, vec![]),
            Node::Callout {
                kind,
                title,
                children,
            } => {
                let mut body = Vec::with_capacity(children.len() + 1);
                if let Some(title) = title {
                    body.push(View::element(
                        Component::CalloutTitle,
                        vec![View::text(title.clone())],
                    ));
                }
                body.extend(self.blocks(children));
                View::with_attrs(
                    Component::Callout,
                    vec![
                        ("class", format!("callout-{kind}")),
                        ("data-kind", kind.clone()),
                    ],
                    body,
                )
            }
            Node::CodeTabs { tabs } => code_tabs(tabs),
            Node::Html { value } => View::Raw(value.clone()),
        }
    }

    fn heading(&self, level: u8, explicit: Option<&str>, children: &[Inline]) -> View {
        let anchor = heading_anchor(explicit, children);
        let mut content = self.inlines(children);
        let mut attrs = Vec::new();

        if !anchor.is_empty() {
            content.push(View::with_attrs(
                Component::HeadingAnchor,
                vec![
                    ("href", format!("#{anchor}")),
                    ("aria-hidden", "true".to_string()),
                ],
                vec![View::text("#")],
            ));
            attrs.push(("id", anchor));
        }

        View::with_attrs(Component::Heading(level.clamp(1, 6)), attrs, content)
    }

    fn list(&self, ordered: bool, start: Option<u64>, items: &[ListItem]) -> View {
        let items = items
            .iter()
            .map(|item| {
                let mut children = Vec::new();
                if let Some(checked) = item.checked {
                    let mut attrs = vec![
                        ("type", "checkbox".to_string()),
                        ("disabled", "disabled".to_string()),
                    ];
                    if checked {
                        attrs.push(("checked", "checked".to_string()));
                    }
                    children.push(View::with_attrs(Component::TaskCheckbox, attrs, vec![]));
                }
                children.extend(self.blocks(&item.children));
                View::element(Component::ListItem, children)
            })
            .collect();

        if ordered {
            let attrs = match start {
                Some(start) if start != 1 => vec![("start", start.to_string())],
                _ => vec![],
            };
            View::with_attrs(Component::OrderedList, attrs, items)
        } else {
            View::element(Component::UnorderedList, items)
        }
    }

    fn table(
        &self,
        alignments: &[Alignment],
        head: &[Vec<Inline>],
        rows: &[Vec<Vec<Inline>>],
    ) -> View {
        let cell = |component: Component, index: usize, content: &[Inline]| {
            let attrs = match alignments.get(index) {
                Some(Alignment::Left) => vec![("style", "text-align: left".to_string())],
                Some(Alignment::Center) => vec![("style", "text-align: center".to_string())],
                Some(Alignment::Right) => vec![("style", "text-align: right".to_string())],
                _ => vec![],
            };
            View::with_attrs(component, attrs, self.inlines(content))
        };

        let head_row = View::element(
            Component::TableRow,
            head.iter()
                .enumerate()
                .map(|(i, c)| cell(Component::TableHeaderCell, i, c.as_slice()))
                .collect(),
        );
        let body_rows = rows
            .iter()
            .map(|row| {
                View::element(
                    Component::TableRow,
                    row.iter()
                        .enumerate()
                        .map(|(i, c)| cell(Component::TableCell, i, c.as_slice()))
                        .collect(),
                )
            })
            .collect();

        View::element(
            Component::Table,
            vec![
                View::element(Component::TableHead, vec![head_row]),
                View::element(Component::TableBody, body_rows),
            ],
        )
    }

    fn inlines(&self, inlines: &[Inline]) -> Vec<View> {
        let mut out = Vec::with_capacity(inlines.len());
        for inline in inlines {
            match inline {
                Inline::Text { value } => out.push(View::text(value.clone())),
                Inline::Emphasis { children } => {
                    out.push(View::element(Component::Emphasis, self.inlines(children)))
                }
                Inline::Strong { children } => {
                    out.push(View::element(Component::Strong, self.inlines(children)))
                }
                Inline::Strikethrough { children } => out.push(View::element(
                    Component::Strikethrough,
                    self.inlines(children),
                )),
                Inline::InlineCode { value } => out.push(View::element(
                    Component::InlineCode,
                    vec![View::text(value.clone())],
                )),
                Inline::Link {
                    href,
                    title,
                    children,
                } => {
                    // A link without a target is shown as its text.
                    if href.trim().is_empty() {
                        out.extend(self.inlines(children));
                        continue;
                    }
                    let resolved = self.links.resolve(href);
                    let mut attrs = vec![("href", resolved.href)];
                    if let Some(title) = title {
                        attrs.push(("title", title.clone()));
                    }
                    if resolved.external {
                        attrs.push(("target", "_blank".to_string()));
                        attrs.push(("rel", "noopener noreferrer".to_string()));
                    }
                    out.push(View::with_attrs(
                        Component::Link,
                        attrs,
                        self.inlines(children),
                    ));
                }
                Inline::Image { src, alt, title } => {
                    let mut attrs = vec![
                        ("src", src.clone()),
                        ("alt", alt.clone()),
                        ("loading", "lazy".to_string()),
                    ];
                    if let Some(title) = title {
                        attrs.push(("title", title.clone()));
                    }
                    out.push(View::with_attrs(Component::Image, attrs, vec![]));
                }
                Inline::SoftBreak => out.push(View::text(" ")),
                Inline::HardBreak => out.push(View::element(Component::LineBreak, vec![])),
                Inline::Html { value } => out.push(View::Raw(value.clone())),
            }
        }
        out
    }
}

fn code_block(sample: &CodeSample) -> View {
    let line_numbers = shows_line_numbers(&sample.language);

    let body = if line_numbers {
        sample
            .code
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                View::with_attrs(
                    Component::CodeLine,
                    vec![("data-line", (i + 1).to_string())],
                    vec![View::text(format!("{line}\n"))],
                )
            })
            .collect()
    } else {
        vec![View::text(sample.code.clone())]
    };

    let mut children = Vec::with_capacity(2);
    if let Some(filename) = &sample.filename {
        children.push(View::element(
            Component::CodeCaption,
            vec![View::text(filename.clone())],
        ));
    }
    children.push(View::element(
        Component::CodePre,
        vec![View::with_attrs(
            Component::CodeBody,
            vec![("class", format!("language-{}", sample.language))],
            body,
        )],
    ));

    View::with_attrs(
        Component::CodeBlock,
        vec![
            ("data-language", sample.language.clone()),
            ("data-line-numbers", line_numbers.to_string()),
        ],
        children,
    )
}

fn code_tabs(tabs: &[CodeSample]) -> View {
    let label = |sample: &CodeSample| {
        sample
            .filename
            .clone()
            .unwrap_or_else(|| sample.language.clone())
    };

    let buttons = tabs
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            View::with_attrs(
                Component::TabButton,
                vec![
                    ("role", "tab".to_string()),
                    ("aria-selected", (i == 0).to_string()),
                ],
                vec![View::text(label(sample))],
            )
        })
        .collect();

    let panels = tabs.iter().enumerate().map(|(i, sample)| {
        let mut attrs = vec![
            ("role", "tabpanel".to_string()),
            ("data-tab-label", label(sample)),
        ];
        if i != 0 {
            attrs.push(("hidden", "hidden".to_string()));
        }
        View::with_attrs(Component::TabPanel, attrs, vec![code_block(sample)])
    });

    let mut children = vec![View::with_attrs(
        Component::TabList,
        vec![("role", "tablist".to_string())],
        buttons,
    )];
    children.extend(panels);
    View::element(Component::CodeTabs, children)
}
