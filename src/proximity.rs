//! Direction-constrained nearest-neighbor lookup from a label block to a
//! value block.
//!
//! Scanned forms put values below or beside their printed labels, so the
//! search is anchored on the first block containing a label keyword and
//! constrained to a tolerance band in the requested direction.

use crate::layout::TextBlock;

/// Horizontal tolerance for `Below` searches (page pixels).
const HORIZONTAL_TOLERANCE: f64 = 150.0;
/// Vertical tolerance for `Right` searches (page pixels).
const VERTICAL_TOLERANCE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Below,
    Right,
}

/// Find the nearest candidate block in `direction` from the first block
/// whose text contains any of `keywords` (case-insensitive substring).
///
/// Only the first matching label block is consulted; duplicate labels
/// later in traversal order are ignored. Returns `""` when no label block
/// or no qualifying candidate exists.
pub fn locate(
    keywords: &[&str],
    blocks: &[TextBlock],
    direction: Direction,
    max_distance: f64,
) -> String {
    let is_label = |block: &TextBlock| {
        let lower = block.text.to_lowercase();
        keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
    };

    let Some(label) = blocks.iter().find(|b| is_label(b)) else {
        return String::new();
    };

    let candidates = blocks.iter().filter(|b| !is_label(b));

    let best = match direction {
        Direction::Below => candidates
            .filter(|c| c.cy > label.cy && (c.cx - label.cx).abs() < HORIZONTAL_TOLERANCE)
            .min_by(|a, b| a.cy.total_cmp(&b.cy)),
        Direction::Right => candidates
            .filter(|c| {
                let dx = c.cx - label.cx;
                dx > 0.0 && dx < max_distance && (c.cy - label.cy).abs() < VERTICAL_TOLERANCE
            })
            .min_by(|a, b| (a.cx - label.cx).total_cmp(&(b.cx - label.cx))),
    };

    best.map(|b| b.text.trim().to_string()).unwrap_or_default()
}
