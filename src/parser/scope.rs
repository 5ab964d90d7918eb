//! Heading lookup and sibling scoping.
//!
//! Wiki pages are flat: a heading is followed by the content it titles as
//! *siblings*, not children. A scope is the run of sibling elements after a
//! heading, ending at the next heading of the same or a higher level (or
//! the end of the container).

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

pub fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>()
}

/// `Some(1..=6)` for `h1`..`h6`.
pub fn heading_level(el: ElementRef) -> Option<u8> {
    match el.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// The element itself if it is a heading, else its nearest heading ancestor.
pub fn enclosing_heading(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|e| heading_level(*e).is_some())
}

/// First heading under `root`, in document order, where the heading or one
/// of its inner elements has text satisfying `matches`.
///
/// Inner elements are checked on their own so that an edit link placed
/// before the headline span does not hide it.
pub fn find_heading<'a, F>(root: ElementRef<'a>, matches: F) -> Option<ElementRef<'a>>
where
    F: Fn(&str) -> bool,
{
    root.select(&HEADINGS).find(|h| {
        h.descendants()
            .filter_map(ElementRef::wrap)
            .any(|el| matches(element_text(el).trim()))
    })
}

/// Sibling elements following `start` up to the next heading of equal or
/// higher level. A non-heading `start` is closed by any heading.
pub fn scope_after(start: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let level = heading_level(start).unwrap_or(0);
    start
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| match heading_level(*el) {
            Some(l) => level != 0 && l > level,
            None => true,
        })
        .collect()
}

/// Elements matching `selector` within a scope: the scope roots themselves
/// first, then their descendants, in document order.
pub fn select_in_scope<'a>(scope: &[ElementRef<'a>], selector: &Selector) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    for root in scope {
        if selector.matches(root) {
            found.push(*root);
        }
        found.extend(root.select(selector));
    }
    found
}

// ── Tests ──
