//! Rewrites fenced code blocks into `CodeBlock` invocations.
//!
//! The matcher is a single pattern over the text, not a markdown parser: a
//! fence runs from an opening line to the next bare closing line. A fence
//! nested inside another fenced block therefore closes the outer block
//! early. Callers depend only on [`CodeFenceRewriter`], so a real tokenizer
//! can replace [`FenceRewriter`] later.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Language recorded for fences without a language tag.
pub const DEFAULT_LANGUAGE: &str = "text";

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^```([^`\n]*)\n([\s\S]*?)^```[ \t]*$").expect("fence pattern is valid")
});

pub trait CodeFenceRewriter: Send + Sync {
    fn rewrite(&self, text: &str) -> String;
}

/// Pattern-based [`CodeFenceRewriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceRewriter;

impl CodeFenceRewriter for FenceRewriter {
    fn rewrite(&self, text: &str) -> String {
        FENCE
            .replace_all(text, |caps: &Captures| {
                let (language, filename) = parse_info(&caps[1]);
                let body = &caps[2];
                let body = body.strip_suffix('\n').unwrap_or(body);
                code_block_invocation(body, &language, filename.as_deref())
            })
            .into_owned()
    }
}

/// Split a fence info string into language and optional filename.
///
/// The first token is the language unless it looks like an annotation
/// (`filename="x"`, `"x"`). Whatever follows is the filename, with an
/// optional `filename=` prefix and one pair of surrounding quotes removed.
pub fn parse_info(info: &str) -> (String, Option<String>) {
    let info = info.trim();
    let (first, rest) = match info.find(char::is_whitespace) {
        Some(i) => (&info[..i], info[i..].trim()),
        None => (info, ""),
    };

    let (language, annotation) = if first.contains('=') || first.contains('"') {
        (DEFAULT_LANGUAGE, info)
    } else if first.is_empty() {
        (DEFAULT_LANGUAGE, "")
    } else {
        (first, rest)
    };

    let annotation = annotation.strip_prefix("filename=").unwrap_or(annotation);
    let annotation = match annotation
        .strip_prefix('"')
        .and_then(|a| a.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => annotation,
    };

    let filename = (!annotation.is_empty()).then(|| annotation.to_string());
    (language.to_string(), filename)
}

/// Render the block invocation that replaces a fence.
///
/// The filename is inserted verbatim; only the code body is escaped.
pub fn code_block_invocation(code: &str, language: &str, filename: Option<&str>) -> String {
    let filename = filename
        .map(|f| format!(" filename=\"{f}\""))
        .unwrap_or_default();
    format!(
        "<CodeBlock code={{`{}`}} language=\"{}\"{} />",
        escape_template(code),
        language,
        filename
    )
}

/// Escape text for a backtick template literal.
pub fn escape_template(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for c in code.chars() {
        if matches!(c, '\\' | '`' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Inverse of [`escape_template`].
pub fn unescape_template(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}
