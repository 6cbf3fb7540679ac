//! Document page state.
//!
//! Every load is stamped with a [`LoadTicket`]. Only the ticket of the most
//! recent `begin` may complete the view, so a slow response for a page the
//! reader already left is dropped instead of overwriting the newer one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{ClientError, DocsClient};
use crate::catalog::DocumentCatalog;
use crate::models::{Neighbors, SerializedDocument, TocItem};
use crate::render::{extract_toc, DocumentRenderer, View, DOCS_ROUTE};

/// How long the not-found page waits before sending the reader to the index.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    file: String,
    generation: u64,
}

impl LoadTicket {
    pub fn file(&self) -> &str {
        &self.file
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub file: String,
    pub title: String,
    pub view: View,
    pub html: String,
    pub toc: Vec<TocItem>,
    pub neighbors: Neighbors,
    /// Raw markdown, offered as a download.
    pub content: String,
}

/// Manual way out of the not-found page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeLink {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotFound {
    pub file: String,
    pub message: String,
    since: Instant,
}

impl NotFound {
    fn new(file: String, error: &ClientError, now: Instant) -> Self {
        let message = match error {
            ClientError::InvalidPath(_) | ClientError::NotFound(_) => {
                "The document you're looking for doesn't exist or has been moved.".to_string()
            }
            _ => "The document could not be loaded.".to_string(),
        };
        Self {
            file,
            message,
            since: now,
        }
    }

    /// Where to send the reader once the delay has passed.
    pub fn redirect_due(&self, now: Instant) -> Option<&'static str> {
        (now.saturating_duration_since(self.since) >= REDIRECT_DELAY).then_some(DOCS_ROUTE)
    }

    pub fn escapes(&self) -> [EscapeLink; 2] {
        [
            EscapeLink {
                label: "Browse documentation",
                href: DOCS_ROUTE,
            },
            EscapeLink {
                label: "Go home",
                href: "/",
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading { file: String },
    Ready(Box<RenderedDocument>),
    NotFound(NotFound),
}

#[derive(Debug)]
pub struct DocumentViewer {
    catalog: Arc<DocumentCatalog>,
    renderer: DocumentRenderer,
    generation: u64,
    state: ViewState,
}

impl DocumentViewer {
    pub fn new(catalog: Arc<DocumentCatalog>) -> Self {
        Self {
            catalog,
            renderer: DocumentRenderer::new(),
            generation: 0,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start loading `file`. Any load still in flight becomes stale.
    pub fn begin(&mut self, file: &str) -> LoadTicket {
        self.generation += 1;
        self.state = ViewState::Loading {
            file: file.to_string(),
        };
        LoadTicket {
            file: file.to_string(),
            generation: self.generation,
        }
    }

    /// Apply the outcome of a load. Returns `false` when the ticket is stale
    /// and the result was ignored.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<SerializedDocument, ClientError>,
        now: Instant,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("Ignoring stale response for {}", ticket.file);
            return false;
        }

        self.state = match result {
            Ok(document) => ViewState::Ready(Box::new(self.present(ticket.file, document))),
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", ticket.file, e);
                ViewState::NotFound(NotFound::new(ticket.file, &e, now))
            }
        };
        true
    }

    /// Fetch `file` through `client` and show it.
    pub async fn open(&mut self, client: &DocsClient, file: &str) -> &ViewState {
        let ticket = self.begin(file);
        let result = client.fetch_document(file).await;
        self.complete(ticket, result, Instant::now());
        &self.state
    }

    fn present(&self, file: String, document: SerializedDocument) -> RenderedDocument {
        let view = self.renderer.render(&document.tree);
        let toc = extract_toc(&view);
        let neighbors = self.catalog.neighbors(&file).unwrap_or_default();
        RenderedDocument {
            html: view.to_html(),
            title: document.title,
            content: document.content,
            file,
            view,
            toc,
            neighbors,
        }
    }
}
