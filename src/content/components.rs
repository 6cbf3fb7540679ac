//! Embedded block invocations inside document bodies.
//!
//! Three components are understood when they start a line outside a fenced
//! block: `CodeBlock` (self-closing), `Callout` and `CodeTabs` (both with
//! markdown children closed by `</Name>`). Everything else stays markdown.

use std::collections::BTreeMap;

use thiserror::Error;

use super::markdown;
use super::rewrite::{unescape_template, DEFAULT_LANGUAGE};
use crate::models::{CodeSample, Node};

const DEFAULT_CALLOUT_KIND: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error("<{component}> is never closed")]
    Unterminated { component: String },

    #[error("malformed attribute in <{component}>: {detail}")]
    MalformedAttribute { component: String, detail: String },

    #[error("unsupported expression {{{expression}}} in <{component}>")]
    UnsupportedExpression {
        component: String,
        expression: String,
    },

    #[error("<{component}> requires attribute '{attribute}'")]
    MissingAttribute {
        component: String,
        attribute: String,
    },

    #[error("unexpected content after </{component}>")]
    TrailingContent { component: String },

    #[error("<{component}> must be self-closing")]
    NotSelfClosing { component: String },

    #[error("<CodeTabs> contains no code samples")]
    EmptyTabs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    CodeBlock,
    Callout,
    CodeTabs,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::CodeBlock => "CodeBlock",
            Kind::Callout => "Callout",
            Kind::CodeTabs => "CodeTabs",
        }
    }

    /// Recognise a component opening at the start of `line`.
    fn at_line_start(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('<')?;
        [Kind::CodeBlock, Kind::Callout, Kind::CodeTabs]
            .into_iter()
            .find(|kind| {
                rest.strip_prefix(kind.name()).is_some_and(|after| {
                    after
                        .chars()
                        .next()
                        .map_or(true, |c| c.is_whitespace() || c == '/' || c == '>')
                })
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AttrValue {
    Str(String),
    Bool(bool),
    Number(f64),
}

struct Attributes {
    component: &'static str,
    values: BTreeMap<String, AttrValue>,
}

impl Attributes {
    fn string(&self, name: &str) -> Result<Option<String>, ComponentError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(AttrValue::Str(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ComponentError::MalformedAttribute {
                component: self.component.to_string(),
                detail: format!("'{name}' must be a string, got {other:?}"),
            }),
        }
    }

    fn required_string(&self, name: &str) -> Result<String, ComponentError> {
        self.string(name)?
            .ok_or_else(|| ComponentError::MissingAttribute {
                component: self.component.to_string(),
                attribute: name.to_string(),
            })
    }
}

/// Parse a body made of markdown interleaved with component invocations.
pub fn parse_blocks(text: &str) -> Result<Vec<Node>, ComponentError> {
    let mut nodes = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut markdown_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
        let line = &text[pos..line_end];

        if let Some(open) = fence {
            if closes_fence(line, open) {
                fence = None;
            }
        } else if let Some(open) = opens_fence(line) {
            fence = Some(open);
        } else if let Some(kind) = Kind::at_line_start(line) {
            nodes.extend(markdown::parse(&text[markdown_start..pos]));
            let (node, end) = parse_invocation(text, pos, kind)?;
            nodes.push(node);

            let after_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
            if !text[end..after_end].trim().is_empty() {
                return Err(ComponentError::TrailingContent {
                    component: kind.name().to_string(),
                });
            }
            pos = (after_end + 1).min(text.len());
            markdown_start = pos;
            continue;
        }

        pos = line_end + 1;
    }

    if markdown_start < text.len() {
        nodes.extend(markdown::parse(&text[markdown_start..]));
    }
    Ok(nodes)
}

fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let trimmed = &line[indent..];
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let count = trimmed.chars().take_while(|c| *c == marker).count();
    (count >= 3).then(|| (marker, count, &trimmed[count..]))
}

fn opens_fence(line: &str) -> Option<(char, usize)> {
    let (marker, count, info) = fence_marker(line)?;
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some((marker, count))
}

fn closes_fence(line: &str, (open_marker, open_count): (char, usize)) -> bool {
    fence_marker(line).is_some_and(|(marker, count, rest)| {
        marker == open_marker && count >= open_count && rest.trim().is_empty()
    })
}

/// Parse one invocation starting at `start`; returns the node and the byte
/// offset just past it.
fn parse_invocation(
    text: &str,
    start: usize,
    kind: Kind,
) -> Result<(Node, usize), ComponentError> {
    let mut cursor = Cursor {
        text,
        pos: start + 1 + kind.name().len(),
        component: kind.name(),
    };
    let (attrs, self_closing) = cursor.attributes()?;

    let (children, end) = if self_closing {
        (None, cursor.pos)
    } else {
        let (inner, end) = container_body(text, cursor.pos, kind)?;
        (Some(inner), end)
    };

    let node = match kind {
        Kind::CodeBlock => {
            if children.is_some() {
                return Err(ComponentError::NotSelfClosing {
                    component: kind.name().to_string(),
                });
            }
            Node::CodeBlock(CodeSample {
                code: attrs.required_string("code")?,
                language: attrs
                    .string("language")?
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                filename: attrs.string("filename")?,
            })
        }
        Kind::Callout => Node::Callout {
            kind: attrs
                .string("type")?
                .unwrap_or_else(|| DEFAULT_CALLOUT_KIND.to_string()),
            title: attrs.string("title")?,
            children: match children {
                Some(inner) => parse_blocks(inner)?,
                None => Vec::new(),
            },
        },
        Kind::CodeTabs => {
            let tabs: Vec<CodeSample> = match children {
                Some(inner) => parse_blocks(inner)?
                    .into_iter()
                    .filter_map(|node| match node {
                        Node::CodeBlock(sample) => Some(sample),
                        _ => None,
                    })
                    .collect(),
                None => Vec::new(),
            };
            if tabs.is_empty() {
                return Err(ComponentError::EmptyTabs);
            }
            Node::CodeTabs { tabs }
        }
    };

    Ok((node, end))
}

/// Find the matching `</Name>` for a container opened before `from`.
///
/// Tags inside fenced blocks and `{`template`}` expressions are code, not
/// structure, and are skipped.
fn container_body(text: &str, from: usize, kind: Kind) -> Result<(&str, usize), ComponentError> {
    let open = format!("<{}", kind.name());
    let close = format!("</{}>", kind.name());
    let mut depth = 1;
    let mut fence: Option<(char, usize)> = None;
    let mut pos = from;

    while pos < text.len() {
        if text[..pos].ends_with('\n') {
            let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
            let line = &text[pos..line_end];
            if let Some(open_fence) = fence {
                if closes_fence(line, open_fence) {
                    fence = None;
                }
                pos = line_end + 1;
                continue;
            }
            if let Some(open_fence) = opens_fence(line) {
                fence = Some(open_fence);
                pos = line_end + 1;
                continue;
            }
        }

        let rest = &text[pos..];
        if rest.starts_with(&close) {
            depth -= 1;
            if depth == 0 {
                return Ok((&text[from..pos], pos + close.len()));
            }
            pos += close.len();
        } else if rest.starts_with(&open)
            && rest[open.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
        {
            depth += 1;
            pos += open.len();
        } else if let Some(len) = template_literal_len(rest) {
            pos += len;
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    Err(ComponentError::Unterminated {
        component: kind.name().to_string(),
    })
}

/// Byte length of a `{`...`}` template expression opening `rest`, through
/// its closing backtick. Escapes follow [`Cursor::expression`].
fn template_literal_len(rest: &str) -> Option<usize> {
    let inner = rest.strip_prefix('{')?.trim_start();
    let offset = rest.len() - inner.len() + 1;
    let mut chars = inner.strip_prefix('`')?.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '`' => return Some(offset + i + 1),
            _ => {}
        }
    }
    None
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    component: &'static str,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn malformed(&self, detail: impl Into<String>) -> ComponentError {
        ComponentError::MalformedAttribute {
            component: self.component.to_string(),
            detail: detail.into(),
        }
    }

    fn unterminated(&self) -> ComponentError {
        ComponentError::Unterminated {
            component: self.component.to_string(),
        }
    }

    /// Read attributes up to `/>` or `>`. Returns whether the tag self-closes.
    fn attributes(&mut self) -> Result<(Attributes, bool), ComponentError> {
        let mut values = BTreeMap::new();
        loop {
            self.skip_whitespace();
            if self.text[self.pos..].starts_with("/>") {
                self.pos += 2;
                return Ok((self.finish(values), true));
            }
            match self.peek() {
                None => return Err(self.unterminated()),
                Some('>') => {
                    self.bump();
                    return Ok((self.finish(values), false));
                }
                _ => {}
            }

            let name = self.attribute_name()?;
            let value = if self.peek() == Some('=') {
                self.bump();
                self.attribute_value()?
            } else {
                AttrValue::Bool(true)
            };

            match self.peek() {
                Some(c) if c.is_whitespace() || c == '/' || c == '>' => {}
                None => return Err(self.unterminated()),
                Some(c) => {
                    return Err(self.malformed(format!("unexpected '{c}' after attribute '{name}'")))
                }
            }
            values.insert(name, value);
        }
    }

    fn finish(&self, values: BTreeMap<String, AttrValue>) -> Attributes {
        Attributes {
            component: self.component,
            values,
        }
    }

    fn attribute_name(&mut self) -> Result<String, ComponentError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(c) => return Err(self.malformed(format!("unexpected '{c}'"))),
            None => return Err(self.unterminated()),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.bump();
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn attribute_value(&mut self) -> Result<AttrValue, ComponentError> {
        match self.bump() {
            Some('"') => {
                let start = self.pos;
                let len = self.text[start..]
                    .find('"')
                    .ok_or_else(|| self.unterminated())?;
                self.pos = start + len + 1;
                Ok(AttrValue::Str(self.text[start..start + len].to_string()))
            }
            Some('{') => self.expression(),
            Some(c) => Err(self.malformed(format!("unexpected '{c}' in attribute value"))),
            None => Err(self.unterminated()),
        }
    }

    /// Read the inside of `{...}` after the opening brace.
    fn expression(&mut self) -> Result<AttrValue, ComponentError> {
        self.skip_whitespace();
        if self.peek() == Some('`') {
            self.bump();
            let start = self.pos;
            loop {
                match self.bump() {
                    Some('\\') => {
                        self.bump();
                    }
                    Some('`') => break,
                    Some(_) => {}
                    None => return Err(self.unterminated()),
                }
            }
            let raw = &self.text[start..self.pos - 1];
            self.skip_whitespace();
            if self.bump() != Some('}') {
                return Err(self.malformed("expected '}' after template literal"));
            }
            return Ok(AttrValue::Str(unescape_template(raw)));
        }

        let start = self.pos;
        let len = self.text[start..]
            .find('}')
            .ok_or_else(|| self.unterminated())?;
        self.pos = start + len + 1;
        let expression = self.text[start..start + len].trim();

        match expression {
            "true" => Ok(AttrValue::Bool(true)),
            "false" => Ok(AttrValue::Bool(false)),
            other => other
                .parse::<f64>()
                .map(AttrValue::Number)
                .map_err(|_| ComponentError::UnsupportedExpression {
                    component: self.component.to_string(),
                    expression: other.to_string(),
                }),
        }
    }
}
