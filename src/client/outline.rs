use super::{Subscription, SubscriptionKind, Subscriptions};
use crate::models::TocItem;
use crate::render::{extract_toc, scroll_target, ActiveBand, HeadingPosition, Scrollspy, View};

/// "On this page" panel: the outline of the shown document plus the
/// heading the reader is currently in.
#[derive(Debug)]
pub struct TocController {
    subscriptions: Subscriptions,
    items: Vec<TocItem>,
    spy: Scrollspy,
    observer: Option<Subscription>,
}

impl TocController {
    pub fn new(subscriptions: Subscriptions) -> Self {
        Self::with_band(subscriptions, ActiveBand::default())
    }

    pub fn with_band(subscriptions: Subscriptions, band: ActiveBand) -> Self {
        Self {
            subscriptions,
            items: Vec::new(),
            spy: Scrollspy::new(band),
            observer: None,
        }
    }

    /// Scan `view` and start observing its headings.
    pub fn mount(&mut self, file: &str, view: &View) {
        self.items = extract_toc(view);
        self.spy.reset();
        // Dropping the previous guard disconnects the old observer.
        self.observer = None;
        if !self.items.is_empty() {
            self.observer = Some(
                self.subscriptions
                    .subscribe(SubscriptionKind::IntersectionObserver, file),
            );
        }
    }

    pub fn document_changed(&mut self, file: &str, view: &View) {
        self.mount(file, view);
    }

    pub fn unmount(&mut self) {
        self.observer = None;
        self.items.clear();
        self.spy.reset();
    }

    pub fn items(&self) -> &[TocItem] {
        &self.items
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    pub fn active(&self) -> Option<&str> {
        self.spy.active()
    }

    /// Intersection callback: headings moved relative to the viewport.
    pub fn on_scroll(
        &mut self,
        viewport_height: f64,
        positions: &[HeadingPosition<'_>],
    ) -> Option<&str> {
        if self.observer.is_none() {
            return None;
        }
        self.spy.update(viewport_height, positions)
    }

    /// Scroll position for a click on the outline entry `id`.
    pub fn click(&self, id: &str, heading_top: f64, scroll_y: f64) -> Option<f64> {
        self.items
            .iter()
            .any(|item| item.id == id)
            .then(|| scroll_target(heading_top, scroll_y))
    }
}
