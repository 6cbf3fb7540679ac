use super::view::{Component, View};
use crate::models::TocItem;

/// Height of the sticky header, in pixels. Scrolling to a heading stops this
/// far above it.
pub const HEADER_OFFSET: f64 = 80.0;

/// Scan rendered output for level 2-4 headings carrying an id, in document
/// order.
pub fn extract_toc(view: &View) -> Vec<TocItem> {
    let mut items = Vec::new();
    collect(view, &mut items);
    items
}

fn collect(view: &View, items: &mut Vec<TocItem>) {
    let View::Element(el) = view else {
        return;
    };

    if let Component::Heading(level @ 2..=4) = el.component {
        if let Some(id) = el.attr("id") {
            items.push(TocItem {
                id: id.to_string(),
                text: view.text_content().trim().to_string(),
                level,
            });
        }
        return;
    }

    for child in &el.children {
        collect(child, items);
    }
}

/// Scroll position that puts a heading just below the sticky header.
///
/// `heading_top` is the heading's offset from the viewport top and
/// `scroll_y` the current scroll position.
pub fn scroll_target(heading_top: f64, scroll_y: f64) -> f64 {
    (scroll_y + heading_top - HEADER_OFFSET).max(0.0)
}
