//! Turns raw document text into a [`SerializedDocument`].
//!
//! The rewritten body is tried first. If it does not parse, the original
//! body is parsed instead: fences then come out as plain code blocks with no
//! filename, but the document stays viewable.

use once_cell::sync::Lazy;
use regex::Regex;

use super::components;
use super::frontmatter;
use super::rewrite::{CodeFenceRewriter, FenceRewriter};
use super::{ContentError, ParseError};
use crate::models::{RawDocument, RenderableTree, SerializedDocument};

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("title pattern is valid"));

#[derive(Debug, Clone, Default)]
pub struct DocumentSerializer<R = FenceRewriter> {
    rewriter: R,
}

impl DocumentSerializer<FenceRewriter> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CodeFenceRewriter> DocumentSerializer<R> {
    pub fn with_rewriter(rewriter: R) -> Self {
        Self { rewriter }
    }

    pub fn serialize_raw(&self, raw: &RawDocument) -> Result<SerializedDocument, ContentError> {
        self.serialize(&raw.identifier, &raw.text)
    }

    /// Serialize `text`, retrying on the original body if the rewritten one
    /// fails to parse. `identifier` is the title when no `# heading` exists.
    pub fn serialize(
        &self,
        identifier: &str,
        text: &str,
    ) -> Result<SerializedDocument, ContentError> {
        let normalized = text.replace("\r\n", "\n");
        let (front, body) = frontmatter::split(&normalized);
        let title = extract_title(body).unwrap_or_else(|| identifier.to_string());

        let rewritten = self.rewriter.rewrite(body);

        let (tree, recovered) = match parse_structure(front, &rewritten) {
            Ok(tree) => (tree, false),
            Err(primary) => {
                tracing::warn!(
                    "Falling back to original body for {}: {}",
                    identifier,
                    primary
                );
                match parse_structure(front, body) {
                    Ok(tree) => (tree, true),
                    Err(fallback) => {
                        tracing::error!(
                            "Serialization failed for {}: {} (fallback: {})",
                            identifier,
                            primary,
                            fallback
                        );
                        return Err(ContentError::Serialization {
                            identifier: identifier.to_string(),
                            reason: fallback.to_string(),
                        });
                    }
                }
            }
        };

        Ok(SerializedDocument {
            content: text.to_string(),
            tree,
            title,
            recovered,
        })
    }
}

/// Text of the first level-1 heading, if any.
pub fn extract_title(body: &str) -> Option<String> {
    TITLE
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

fn parse_structure(front: Option<&str>, body: &str) -> Result<RenderableTree, ParseError> {
    let frontmatter = match front {
        Some(source) => frontmatter::parse(source)?,
        None => Default::default(),
    };
    let children = components::parse_blocks(body)?;
    Ok(RenderableTree {
        frontmatter,
        children,
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::{CodeSample, Node};

    #[test]
    fn title_comes_from_first_h1() {
        assert_eq!(
            extract_title("intro\n## Sub\n# Real Title  \n# Second\n").as_deref(),
            Some("Real Title")
        );
        assert_eq!(extract_title("## Only h2\n"), None);
        assert_eq!(extract_title("#NoSpace\n"), None);
    }

    #[test]
    fn title_falls_back_to_identifier() {
        let doc = DocumentSerializer::new()
            .serialize("notes.md", "No heading here.\n")
            .unwrap();
        assert_eq!(doc.title, "notes.md");
    }

    #[test]
    fn frontmatter_comments_are_not_titles() {
        let doc = DocumentSerializer::new()
            .serialize("a.md", "---\n# yaml comment\nkey: v\n---\n# Heading\n")
            .unwrap();
        assert_eq!(doc.title, "Heading");
        assert_eq!(doc.tree.frontmatter["key"], "v");
    }

    #[test]
    fn content_is_the_raw_text() {
        let text = "---\na: 1\n---\r\n# T\r\n";
        let doc = DocumentSerializer::new().serialize("t.md", text).unwrap();
        assert_eq!(doc.content, text);
    }

    #[test]
    fn rewritten_fences_keep_filenames() {
        let doc = DocumentSerializer::new()
            .serialize("a.md", "```ts filename=\"a.ts\"\nlet x = 1;\n```\n")
            .unwrap();
        assert!(!doc.recovered);
        assert_eq!(
            doc.tree.children,
            vec![Node::CodeBlock(CodeSample {
                code: "let x = 1;".to_string(),
                language: "ts".to_string(),
                filename: Some("a.ts".to_string()),
            })]
        );
    }

    #[test]
    fn malformed_rewrite_recovers_with_original_body() {
        let doc = DocumentSerializer::new()
            .serialize("a.md", "# Doc\n\n```js my\"file.js\nrun();\n```\n")
            .unwrap();
        assert!(doc.recovered);
        assert_eq!(doc.title, "Doc");
        assert_eq!(
            doc.tree.children[1],
            Node::CodeBlock(CodeSample {
                code: "run();".to_string(),
                language: "js".to_string(),
                filename: None,
            })
        );
    }

    #[test]
    fn fails_when_both_attempts_fail() {
        let result = DocumentSerializer::new().serialize("bad.md", "---\n: [\n---\nbody\n");
        assert!(matches!(
            result,
            Err(ContentError::Serialization { ref identifier, .. }) if identifier == "bad.md"
        ));
    }

    struct Breaking;

    impl CodeFenceRewriter for Breaking {
        fn rewrite(&self, _text: &str) -> String {
            "<Callout>\nnever closed".to_string()
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that records WARN and above, returning
    /// what was logged.
    fn logged_while(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn fallback_is_logged() {
        let logs = logged_while(|| {
            let doc = DocumentSerializer::new()
                .serialize("fallback.md", "```js my\"file.js\nrun();\n```\n")
                .unwrap();
            assert!(doc.recovered);
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Falling back to original body for fallback.md"), "{logs}");
    }

    #[test]
    fn clean_documents_log_nothing() {
        let logs = logged_while(|| {
            let doc = DocumentSerializer::new()
                .serialize("clean.md", "# Clean\n\n```js\nrun();\n```\n")
                .unwrap();
            assert!(!doc.recovered);
        });
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn fallback_ignores_the_rewriter() {
        let doc = DocumentSerializer::with_rewriter(Breaking)
            .serialize("x.md", "Hello\n")
            .unwrap();
        assert!(doc.recovered);
        assert_eq!(doc.tree.children.len(), 1);
    }
}
