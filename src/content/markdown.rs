//! Markdown to [`Node`] conversion on top of `pulldown-cmark`.

use pulldown_cmark::{
    Alignment as MdAlignment, CodeBlockKind, CowStr, Event as MdEvent, Options, Parser as MdParser,
    Tag as MdTag,
};

use super::rewrite::DEFAULT_LANGUAGE;
use crate::models::{Alignment, CodeSample, Inline, ListItem, Node};

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Parse a markdown fragment. Never fails: anything the parser cannot map
/// degrades to text or raw html.
pub fn parse(text: &str) -> Vec<Node> {
    let mut builder = TreeBuilder::default();
    for event in MdParser::new_ext(text, markdown_options()) {
        builder.event(event);
    }
    builder.finish()
}

enum BlockKind {
    Root,
    BlockQuote,
    Item { checked: Option<bool> },
}

enum InlineKind {
    Paragraph,
    Heading { level: u8, id: Option<String> },
    Cell,
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: Option<String> },
    /// Tags without a node of their own; children are spliced into the parent.
    Transparent,
}

enum Frame {
    Blocks {
        kind: BlockKind,
        children: Vec<Node>,
        pending: Vec<Inline>,
    },
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Inlines {
        kind: InlineKind,
        children: Vec<Inline>,
    },
    Code {
        language: String,
        code: String,
    },
    Html {
        value: String,
    },
    Table {
        alignments: Vec<Alignment>,
        head: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Row {
        head: bool,
        cells: Vec<Vec<Inline>>,
    },
    Image {
        src: String,
        title: Option<String>,
        alt: String,
    },
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            stack: vec![Frame::Blocks {
                kind: BlockKind::Root,
                children: Vec::new(),
                pending: Vec::new(),
            }],
        }
    }
}

fn non_empty(s: CowStr<'_>) -> Option<String> {
    (!s.is_empty()).then(|| s.into_string())
}

fn flush_pending(children: &mut Vec<Node>, pending: &mut Vec<Inline>) {
    if !pending.is_empty() {
        children.push(Node::Paragraph {
            children: std::mem::take(pending),
        });
    }
}

fn push_merged(children: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text { value } = &inline {
        if let Some(Inline::Text { value: last }) = children.last_mut() {
            last.push_str(value);
            return;
        }
    }
    children.push(inline);
}

impl TreeBuilder {
    fn event(&mut self, event: MdEvent<'_>) {
        match event {
            MdEvent::Start(tag) => self.start(tag),
            MdEvent::End(_) => self.end(),
            MdEvent::Text(text) => self.text(&text),
            MdEvent::Code(code) => self.push_inline(Inline::InlineCode {
                value: code.into_string(),
            }),
            MdEvent::Html(html) => match self.stack.last_mut() {
                Some(Frame::Html { value }) => value.push_str(&html),
                _ => self.push_inline(Inline::Html {
                    value: html.into_string(),
                }),
            },
            MdEvent::InlineHtml(html) => self.push_inline(Inline::Html {
                value: html.into_string(),
            }),
            MdEvent::SoftBreak => self.push_inline(Inline::SoftBreak),
            MdEvent::HardBreak => self.push_inline(Inline::HardBreak),
            MdEvent::Rule => self.push_block(Node::ThematicBreak),
            MdEvent::TaskListMarker(done) => {
                let item = self.stack.iter_mut().rev().find_map(|frame| match frame {
                    Frame::Blocks {
                        kind: BlockKind::Item { checked },
                        ..
                    } => Some(checked),
                    _ => None,
                });
                if let Some(checked) = item {
                    *checked = Some(done);
                }
            }
            MdEvent::FootnoteReference(label) => self.text(&format!("[^{label}]")),
            MdEvent::InlineMath(math) | MdEvent::DisplayMath(math) => {
                self.push_inline(Inline::InlineCode {
                    value: math.into_string(),
                })
            }
        }
    }

    fn start(&mut self, tag: MdTag<'_>) {
        let frame = match tag {
            MdTag::Paragraph => inlines(InlineKind::Paragraph),
            MdTag::Heading { level, id, .. } => inlines(InlineKind::Heading {
                level: level as u8,
                id: id.and_then(non_empty),
            }),
            MdTag::BlockQuote(_) => blocks(BlockKind::BlockQuote),
            MdTag::CodeBlock(kind) => Frame::Code {
                language: match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or(DEFAULT_LANGUAGE)
                        .to_string(),
                    CodeBlockKind::Indented => DEFAULT_LANGUAGE.to_string(),
                },
                code: String::new(),
            },
            MdTag::HtmlBlock => Frame::Html {
                value: String::new(),
            },
            MdTag::List(start) => Frame::List {
                start,
                items: Vec::new(),
            },
            MdTag::Item => blocks(BlockKind::Item { checked: None }),
            MdTag::Table(alignments) => Frame::Table {
                alignments: alignments.into_iter().map(alignment).collect(),
                head: Vec::new(),
                rows: Vec::new(),
            },
            MdTag::TableHead => Frame::Row {
                head: true,
                cells: Vec::new(),
            },
            MdTag::TableRow => Frame::Row {
                head: false,
                cells: Vec::new(),
            },
            MdTag::TableCell => inlines(InlineKind::Cell),
            MdTag::Emphasis => inlines(InlineKind::Emphasis),
            MdTag::Strong => inlines(InlineKind::Strong),
            MdTag::Strikethrough => inlines(InlineKind::Strikethrough),
            MdTag::Link {
                dest_url, title, ..
            } => inlines(InlineKind::Link {
                href: dest_url.into_string(),
                title: non_empty(title),
            }),
            MdTag::Image {
                dest_url, title, ..
            } => Frame::Image {
                src: dest_url.into_string(),
                title: non_empty(title),
                alt: String::new(),
            },
            _ => inlines(InlineKind::Transparent),
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        // The root frame is never closed by an event.
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };

        match frame {
            Frame::Blocks {
                kind,
                mut children,
                mut pending,
            } => {
                flush_pending(&mut children, &mut pending);
                match kind {
                    BlockKind::Root => {}
                    BlockKind::BlockQuote => self.push_block(Node::BlockQuote { children }),
                    BlockKind::Item { checked } => {
                        if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                            items.push(ListItem { checked, children });
                        }
                    }
                }
            }
            Frame::List { start, items } => self.push_block(Node::List {
                ordered: start.is_some(),
                start,
                items,
            }),
            Frame::Inlines { kind, children } => match kind {
                InlineKind::Paragraph => self.push_block(Node::Paragraph { children }),
                InlineKind::Heading { level, id } => self.push_block(Node::Heading {
                    level,
                    id,
                    children,
                }),
                InlineKind::Cell => {
                    if let Some(Frame::Row { cells, .. }) = self.stack.last_mut() {
                        cells.push(children);
                    }
                }
                InlineKind::Emphasis => self.push_inline(Inline::Emphasis { children }),
                InlineKind::Strong => self.push_inline(Inline::Strong { children }),
                InlineKind::Strikethrough => self.push_inline(Inline::Strikethrough { children }),
                InlineKind::Link { href, title } => self.push_inline(Inline::Link {
                    href,
                    title,
                    children,
                }),
                InlineKind::Transparent => {
                    for child in children {
                        self.push_inline(child);
                    }
                }
            },
            Frame::Code { language, mut code } => {
                if code.ends_with('\n') {
                    code.pop();
                }
                self.push_block(Node::CodeBlock(CodeSample {
                    code,
                    language,
                    filename: None,
                }));
            }
            Frame::Html { value } => self.push_block(Node::Html { value }),
            Frame::Table {
                alignments,
                head,
                rows,
            } => self.push_block(Node::Table {
                alignments,
                head,
                rows,
            }),
            Frame::Row { head, cells } => {
                if let Some(Frame::Table {
                    head: table_head,
                    rows,
                    ..
                }) = self.stack.last_mut()
                {
                    if head {
                        *table_head = cells;
                    } else {
                        rows.push(cells);
                    }
                }
            }
            Frame::Image { src, title, alt } => {
                self.push_inline(Inline::Image { src, alt, title })
            }
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Code { code, .. }) => code.push_str(text),
            Some(Frame::Html { value }) => value.push_str(text),
            _ => self.push_inline(Inline::text(text)),
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.stack.last_mut() {
            Some(Frame::Inlines { children, .. }) => push_merged(children, inline),
            Some(Frame::Blocks { pending, .. }) => push_merged(pending, inline),
            Some(Frame::Image { alt, .. }) => {
                alt.push_str(&crate::models::plain_text(std::slice::from_ref(&inline)))
            }
            Some(Frame::Code { code, .. }) => {
                code.push_str(&crate::models::plain_text(std::slice::from_ref(&inline)))
            }
            _ => {}
        }
    }

    fn push_block(&mut self, node: Node) {
        if let Some(Frame::Blocks {
            children, pending, ..
        }) = self.stack.last_mut()
        {
            flush_pending(children, pending);
            children.push(node);
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.end();
        }
        match self.stack.pop() {
            Some(Frame::Blocks {
                mut children,
                mut pending,
                ..
            }) => {
                flush_pending(&mut children, &mut pending);
                children
            }
            _ => Vec::new(),
        }
    }
}

fn inlines(kind: InlineKind) -> Frame {
    Frame::Inlines {
        kind,
        children: Vec::new(),
    }
}

fn blocks(kind: BlockKind) -> Frame {
    Frame::Blocks {
        kind,
        children: Vec::new(),
        pending: Vec::new(),
    }
}

fn alignment(alignment: MdAlignment) -> Alignment {
    match alignment {
        MdAlignment::None => Alignment::None,
        MdAlignment::Left => Alignment::Left,
        MdAlignment::Center => Alignment::Center,
        MdAlignment::Right => Alignment::Right,
    }
}
