use std::sync::Arc;

use super::{Subscription, SubscriptionKind, Subscriptions};
use crate::catalog::DocumentCatalog;
use crate::models::DocumentEntry;
use crate::render::doc_href;

/// A key press seen by the global keyboard listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl+K or Cmd+K.
    pub fn opens_search(&self) -> bool {
        (self.ctrl || self.meta) && self.key.eq_ignore_ascii_case("k")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Focus,
    Key(KeyPress),
    Input(String),
    /// Pick the n-th visible result.
    Select(usize),
    Escape,
    OutsideClick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Closed,
    /// Open with nothing typed yet.
    Empty,
    Results(Vec<DocumentEntry>),
    NoResults,
}

/// The search box in the docs header.
#[derive(Debug)]
pub struct SearchPanel {
    catalog: Arc<DocumentCatalog>,
    query: String,
    state: SearchState,
    shortcut: Option<Subscription>,
}

impl SearchPanel {
    pub fn new(catalog: Arc<DocumentCatalog>) -> Self {
        Self {
            catalog,
            query: String::new(),
            state: SearchState::Closed,
            shortcut: None,
        }
    }

    /// Attach the global shortcut listener.
    pub fn mount(&mut self, subscriptions: &Subscriptions) {
        self.shortcut = Some(subscriptions.subscribe(SubscriptionKind::KeyboardShortcut, "search"));
    }

    pub fn unmount(&mut self) {
        self.shortcut = None;
        self.state = SearchState::Closed;
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_open(&self) -> bool {
        self.state != SearchState::Closed
    }

    /// Feed one UI event. Returns the route to navigate to when a result
    /// was picked.
    pub fn handle(&mut self, event: SearchEvent) -> Option<String> {
        match event {
            SearchEvent::Focus => self.open(),
            SearchEvent::Key(key) => {
                if self.shortcut.is_some() && key.opens_search() {
                    self.open();
                }
            }
            SearchEvent::Input(query) => {
                self.query = query;
                self.open();
            }
            SearchEvent::Select(index) => {
                let SearchState::Results(results) = &self.state else {
                    return None;
                };
                let href = doc_href(&results.get(index)?.file_name);
                self.query.clear();
                self.state = SearchState::Closed;
                return Some(href);
            }
            SearchEvent::Escape | SearchEvent::OutsideClick => self.state = SearchState::Closed,
        }
        None
    }

    fn open(&mut self) {
        self.state = if self.query.trim().is_empty() {
            SearchState::Empty
        } else {
            let results: Vec<DocumentEntry> =
                self.catalog.search(&self.query).into_iter().cloned().collect();
            if results.is_empty() {
                SearchState::NoResults
            } else {
                SearchState::Results(results)
            }
        };
    }
}
