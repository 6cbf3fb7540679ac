//! Presentational element tree produced by the renderer.

use std::fmt::Write as _;

/// The fixed set of presentational components a document can render to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Document,
    /// Source heading level, 1..=6.
    Heading(u8),
    HeadingAnchor,
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    TaskCheckbox,
    Link,
    Image,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    CodeBlock,
    CodeCaption,
    CodePre,
    CodeBody,
    CodeLine,
    InlineCode,
    BlockQuote,
    HorizontalRule,
    Callout,
    CalloutTitle,
    CodeTabs,
    TabList,
    TabButton,
    TabPanel,
    Emphasis,
    Strong,
    Strikethrough,
    LineBreak,
}

impl Component {
    pub fn tag(self) -> &'static str {
        match self {
            Component::Document => "article",
            Component::Heading(1) => "h1",
            Component::Heading(2) => "h2",
            Component::Heading(3) => "h3",
            Component::Heading(4) => "h4",
            Component::Heading(5) => "h5",
            Component::Heading(_) => "h6",
            Component::HeadingAnchor | Component::Link => "a",
            Component::Paragraph | Component::CalloutTitle => "p",
            Component::UnorderedList => "ul",
            Component::OrderedList => "ol",
            Component::ListItem => "li",
            Component::TaskCheckbox => "input",
            Component::Image => "img",
            Component::Table => "table",
            Component::TableHead => "thead",
            Component::TableBody => "tbody",
            Component::TableRow => "tr",
            Component::TableHeaderCell => "th",
            Component::TableCell => "td",
            Component::CodeBlock => "figure",
            Component::CodeCaption => "figcaption",
            Component::CodePre => "pre",
            Component::CodeBody | Component::InlineCode => "code",
            Component::CodeLine => "span",
            Component::BlockQuote => "blockquote",
            Component::HorizontalRule => "hr",
            Component::Callout => "aside",
            Component::CodeTabs | Component::TabList | Component::TabPanel => "div",
            Component::TabButton => "button",
            Component::Emphasis => "em",
            Component::Strong => "strong",
            Component::Strikethrough => "del",
            Component::LineBreak => "br",
        }
    }

    /// CSS class the component always carries.
    pub fn class(self) -> Option<&'static str> {
        match self {
            Component::Document => Some("doc-content"),
            Component::HeadingAnchor => Some("heading-anchor"),
            Component::CodeBlock => Some("code-block"),
            Component::CodeLine => Some("line"),
            Component::Callout => Some("callout"),
            Component::CalloutTitle => Some("callout-title"),
            Component::CodeTabs => Some("code-tabs"),
            Component::TabList => Some("code-tabs-list"),
            Component::TabButton => Some("code-tabs-trigger"),
            Component::TabPanel => Some("code-tabs-panel"),
            _ => None,
        }
    }

    fn is_void(self) -> bool {
        matches!(
            self,
            Component::Image
                | Component::HorizontalRule
                | Component::LineBreak
                | Component::TaskCheckbox
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub component: Component,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<View>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Element(Element),
    Text(String),
    /// Trusted html carried over from the document source.
    Raw(String),
}

impl View {
    pub fn element(component: Component, children: Vec<View>) -> Self {
        View::Element(Element {
            component,
            attrs: Vec::new(),
            children,
        })
    }

    pub fn with_attrs(
        component: Component,
        attrs: Vec<(&str, String)>,
        children: Vec<View>,
    ) -> Self {
        View::Element(Element {
            component,
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            children,
        })
    }

    pub fn text(value: impl Into<String>) -> Self {
        View::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            View::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Visible text, skipping heading anchors.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            View::Text(text) => out.push_str(text),
            View::Raw(_) => {}
            View::Element(el) if el.component == Component::HeadingAnchor => {}
            View::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            View::Text(text) => out.push_str(&escape_html(text)),
            View::Raw(html) => out.push_str(html),
            View::Element(el) => {
                let tag = el.component.tag();
                out.push('<');
                out.push_str(tag);
                if let Some(class) = el.component.class() {
                    let extra = el.attr("class");
                    match extra {
                        Some(extra) => {
                            let _ = write!(out, " class=\"{} {}\"", class, escape_html(extra));
                        }
                        None => {
                            let _ = write!(out, " class=\"{class}\"");
                        }
                    }
                }
                for (name, value) in &el.attrs {
                    if name == "class" && el.component.class().is_some() {
                        continue;
                    }
                    let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
                }
                out.push('>');
                if el.component.is_void() {
                    return;
                }
                for child in &el.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
