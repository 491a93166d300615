//! Positions a single selection over an ordered sequence of highlight ids.
//! Kept as ids rather than array indices because
//! [`crate::registry::HtmlHighlighter`] removes markers out of band; an
//! index would silently point at the wrong highlight (or past the end)
//! after a removal, where an id just stops showing up in the eligible list.

#[derive(Debug, Default)]
pub struct Cursor {
    selected: Option<u64>,
}

impl Cursor {
    pub fn new() -> Self {
        Cursor { selected: None }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn current(&self) -> Option<u64> {
        self.selected
    }

    /// Moves to the next (or, if `reverse`, previous) id in `eligible`
    /// relative to the current selection, wrapping around at either end.
    /// If the current selection isn't in `eligible` (disabled, removed, or
    /// filtered out since it was set), starts from the first/last entry.
    pub fn advance(&mut self, eligible: &[u64], reverse: bool) -> Option<u64> {
        if eligible.is_empty() {
            self.selected = None;
            return None;
        }
        let next_index = match self.selected.and_then(|id| eligible.iter().position(|&e| e == id)) {
            Some(pos) if reverse => (pos + eligible.len() - 1) % eligible.len(),
            Some(pos) => (pos + 1) % eligible.len(),
            None if reverse => eligible.len() - 1,
            None => 0,
        };
        self.selected = Some(eligible[next_index]);
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around_in_both_directions() {
        let mut cursor = Cursor::new();
        let ids = [10, 20, 30];
        assert_eq!(cursor.advance(&ids, false), Some(10));
        assert_eq!(cursor.advance(&ids, false), Some(20));
        assert_eq!(cursor.advance(&ids, false), Some(30));
        assert_eq!(cursor.advance(&ids, false), Some(10));

        cursor.clear();
        assert_eq!(cursor.advance(&ids, true), Some(30));
        assert_eq!(cursor.advance(&ids, true), Some(20));
    }

    #[test]
    fn recovers_when_current_selection_disappears() {
        let mut cursor = Cursor::new();
        cursor.advance(&[1, 2, 3], false);
        cursor.advance(&[1, 2, 3], false); // selected = 2
        assert_eq!(cursor.advance(&[1, 3], false), Some(1));
    }
}
