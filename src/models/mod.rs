//! Domain models for the documentation pipeline.
//!
//! # Core Concepts
//!
//! ## Configuration
//!
//! - [`DocumentEntry`]: A document registered in the catalog, keyed by file name.
//! - [`CategoryDefinition`]: A sidebar section that entries reference by id.
//!
//! ## Request-scoped
//!
//! - [`RawDocument`]: Text loaded from the content root for one request.
//! - [`SerializedDocument`]: Frontmatter + [`RenderableTree`] + title, sent to the client.
//!
//! ## View-scoped
//!
//! - [`TocItem`]: Outline entry derived from rendered headings.
//! - [`NavigationLink`] / [`Neighbors`]: Previous/next documents within a category.

mod document;
mod tree;

pub use document::*;
pub use tree::*;
