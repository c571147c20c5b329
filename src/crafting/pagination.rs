//! Paged view over the ingredient price list.
//!
//! A [`PaginationState`] is a value: `(entries, start, page_size)`. Moving
//! between pages builds a new state instead of editing the old one, and
//! [`PaginationState::page`] is a pure function of those three fields, so a
//! page can always be rebuilt from a fresh price list after an edit.

use crate::crafting::types::IngredientCost;

/// Direction for [`PaginationState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceEntry {
    pub ingredient: String,
    pub cost_per_unit: f64,
}

impl From<IngredientCost> for PriceEntry {
    fn from(cost: IngredientCost) -> Self {
        Self {
            ingredient: cost.ingredient,
            cost_per_unit: cost.cost_per_unit,
        }
    }
}

/// The slice of entries visible on one page plus navigation flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub start: usize,
    pub entries: &'a [PriceEntry],
    pub has_previous: bool,
    pub has_next: bool,
}

/// Window `[start, start + page_size)` of `entries`.
pub fn render(entries: &[PriceEntry], start: usize, page_size: usize) -> Page<'_> {
    let start = start.min(entries.len());
    let end = start.saturating_add(page_size).min(entries.len());
    Page {
        start,
        entries: &entries[start..end],
        has_previous: start > 0,
        has_next: start.saturating_add(page_size) < entries.len(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    entries: Vec<PriceEntry>,
    start: usize,
    page_size: usize,
}

impl PaginationState {
    /// `start` is clamped to the list length; a zero page size is treated as one.
    pub fn new(entries: Vec<PriceEntry>, start: usize, page_size: usize) -> Self {
        let start = start.min(entries.len());
        Self {
            entries,
            start,
            page_size: page_size.max(1),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn page(&self) -> Page<'_> {
        render(&self.entries, self.start, self.page_size)
    }

    /// A new state one page forward or back; `self` is left untouched.
    pub fn advance(&self, direction: Direction) -> Self {
        let start = match direction {
            Direction::Next => (self.start + self.page_size).min(self.entries.len()),
            Direction::Previous => self.start.saturating_sub(self.page_size),
        };
        Self::new(self.entries.clone(), start, self.page_size)
    }

    /// Same window over a refreshed list.
    pub fn refreshed(&self, entries: Vec<PriceEntry>) -> Self {
        Self::new(entries, self.start, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<PriceEntry> {
        (0..n)
            .map(|i| PriceEntry {
                ingredient: format!("ingredient {:02}", i),
                cost_per_unit: i as f64,
            })
            .collect()
    }

    #[test]
    fn twelve_entries_in_pages_of_five() {
        let first = PaginationState::new(entries(12), 0, 5);
        let page = first.page();
        assert_eq!(page.entries.len(), 5);
        assert_eq!(page.entries[0].ingredient, "ingredient 00");
        assert!(!page.has_previous);
        assert!(page.has_next);

        let third = first.advance(Direction::Next).advance(Direction::Next);
        let page = third.page();
        assert_eq!(page.start, 10);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[1].ingredient, "ingredient 11");
        assert!(page.has_previous);
        assert!(!page.has_next);

        // The original state is untouched.
        assert_eq!(first.start(), 0);
    }

    #[test]
    fn previous_saturates_at_zero() {
        let state = PaginationState::new(entries(12), 3, 5);
        assert_eq!(state.advance(Direction::Previous).start(), 0);
    }

    #[test]
    fn next_clamps_to_length() {
        let state = PaginationState::new(entries(5), 0, 5);
        let next = state.advance(Direction::Next);
        assert_eq!(next.start(), 5);
        assert!(next.page().entries.is_empty());
        assert!(!next.page().has_next);
    }

    #[test]
    fn refreshed_keeps_window() {
        let state = PaginationState::new(entries(12), 5, 5);
        let mut fresh = entries(12);
        fresh[6].cost_per_unit = 99.0;
        let page_state = state.refreshed(fresh);
        assert_eq!(page_state.page().entries[1].cost_per_unit, 99.0);
        assert_eq!(page_state.start(), 5);
    }
}
