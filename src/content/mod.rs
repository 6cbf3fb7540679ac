//! Server-side document pipeline: fetch, rewrite fences, serialize.

mod components;
mod error;
mod fetcher;
mod frontmatter;
mod markdown;
mod rewrite;
mod serialize;

pub use components::ComponentError;
pub use error::{ContentError, ParseError};
pub use fetcher::{ContentFetcher, DocumentStore, LocalStore};
pub use frontmatter::FrontmatterError;
pub use rewrite::{
    code_block_invocation, escape_template, unescape_template, CodeFenceRewriter, FenceRewriter,
    DEFAULT_LANGUAGE,
};
pub use serialize::{extract_title, DocumentSerializer};

use crate::models::SerializedDocument;

/// Fetcher and serializer wired together for request handling.
#[derive(Debug, Clone)]
pub struct ContentPipeline<S = LocalStore> {
    fetcher: ContentFetcher<S>,
    serializer: DocumentSerializer,
}

impl<S: DocumentStore> ContentPipeline<S> {
    pub fn new(fetcher: ContentFetcher<S>) -> Self {
        Self {
            fetcher,
            serializer: DocumentSerializer::new(),
        }
    }

    pub fn fetcher(&self) -> &ContentFetcher<S> {
        &self.fetcher
    }

    /// Load and serialize one document.
    pub fn load(&self, identifier: &str) -> Result<SerializedDocument, ContentError> {
        let raw = self.fetcher.load(identifier)?;
        tracing::debug!("Loaded {} ({} bytes)", identifier, raw.text.len());
        self.serializer.serialize_raw(&raw)
    }
}
