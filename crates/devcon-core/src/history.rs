//! History: bounded scrollback buffer for lines scrolled off a page.
//!
//! Lines are moved here whole — no cell copying — when a page scrolls up,
//! and moved back on scroll-down or when the page grows taller. Pushes go to
//! the tail, pops come from the tail, and the head (oldest lines) is trimmed
//! when the buffer exceeds its capacity.
//!
//! Stored lines keep whatever width they had when detached, which may be
//! narrower than the current page width; [`pop`](History::pop) re-reserves
//! them before handing them back.

use std::collections::VecDeque;

use crate::cell::Attr;
use crate::line::Line;

/// Default maximum number of scrollback lines.
pub const DEFAULT_MAX_LINES: usize = 4096;

/// Bounded scrollback buffer.
#[derive(Debug, Clone, Default)]
pub struct History {
    lines: VecDeque<Line>,
    max_lines: usize,
}

impl History {
    /// Create a history with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        History::with_max_lines(DEFAULT_MAX_LINES)
    }

    /// Create a history bounded to `max_lines`.
    #[must_use]
    pub fn with_max_lines(max_lines: usize) -> Self {
        History {
            lines: VecDeque::new(),
            max_lines,
        }
    }

    /// Number of stored lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of lines this history retains.
    #[must_use]
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Change the capacity, trimming oldest lines if necessary.
    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.max_lines = max_lines;
        self.trim(max_lines);
    }

    /// Remove all stored lines.
    pub fn clear(&mut self) {
        self.trim(0);
    }

    /// Drop lines from the head (oldest first) until at most `max` remain.
    pub fn trim(&mut self, max: usize) {
        while self.lines.len() > max {
            self.lines.pop_front();
        }
    }

    /// Push a line at the tail; at capacity, the oldest line is dropped.
    pub fn push(&mut self, line: Line) {
        self.lines.push_back(line);
        if self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    /// Pop the most recently pushed line, re-reserved to `new_width`.
    ///
    /// Cells the line already had are preserved; new cells are initialized
    /// with `attr` and `age`. If the reservation fails, the line is left in
    /// the history untouched and `None` is returned — scrollback is never
    /// lost to an allocation failure.
    pub fn pop(&mut self, new_width: usize, attr: Attr, age: u64) -> Option<Line> {
        {
            let line = self.lines.back_mut()?;
            let protect = line.width();
            line.reserve(new_width, attr, age, protect).ok()?;
            line.set_width(new_width);
        }
        self.lines.pop_back()
    }

    /// Prepare up to `max` lines (newest first) for retrieval.
    ///
    /// Each counted line is reserved to `reserve_width`, so a subsequent
    /// loop of [`pop`](History::pop) with the same arguments is guaranteed
    /// to succeed at least the returned number of times.
    pub fn peek(&mut self, max: usize, reserve_width: usize, attr: Attr, age: u64) -> usize {
        let mut num = 0;
        for line in self.lines.iter_mut().rev() {
            if num >= max {
                break;
            }
            let protect = line.width();
            if line.reserve(reserve_width, attr, age, protect).is_err() {
                break;
            }
            num += 1;
        }
        num
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Char, CharBuf};

    fn tagged_line(tag: char) -> Line {
        let mut line = Line::with_reserved(4, Attr::default(), 1).unwrap();
        line.write(0, Char::from_ucs4(u32::from(tag)), 1, Attr::default(), 1, false);
        line
    }

    fn tag_of(line: &Line) -> char {
        let mut buf = CharBuf::default();
        let points = line.cell(0).unwrap().ch.resolve(&mut buf);
        char::from_u32(points[0]).unwrap()
    }

    #[test]
    fn push_pop_is_lifo() {
        let mut history = History::new();
        history.push(tagged_line('a'));
        history.push(tagged_line('b'));

        let first = history.pop(4, Attr::default(), 2).unwrap();
        assert_eq!(tag_of(&first), 'b');
        let second = history.pop(4, Attr::default(), 2).unwrap();
        assert_eq!(tag_of(&second), 'a');
        assert!(history.pop(4, Attr::default(), 2).is_none());
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut history = History::with_max_lines(2);
        history.push(tagged_line('a'));
        history.push(tagged_line('b'));
        history.push(tagged_line('c'));
        assert_eq!(history.len(), 2);

        assert_eq!(tag_of(&history.pop(4, Attr::default(), 2).unwrap()), 'c');
        assert_eq!(tag_of(&history.pop(4, Attr::default(), 2).unwrap()), 'b');
    }

    #[test]
    fn pop_widens_narrow_lines() {
        let mut history = History::new();
        history.push(tagged_line('a')); // width 4

        let line = history.pop(8, Attr::default(), 2).unwrap();
        assert_eq!(line.width(), 8);
        assert!(line.n_cells() >= 8);
        assert_eq!(tag_of(&line), 'a'); // old cells preserved
    }

    #[test]
    fn peek_counts_available_lines() {
        let mut history = History::new();
        for tag in ['a', 'b', 'c'] {
            history.push(tagged_line(tag));
        }
        assert_eq!(history.peek(2, 8, Attr::default(), 2), 2);
        assert_eq!(history.peek(10, 8, Attr::default(), 2), 3);
        assert_eq!(history.len(), 3); // peek does not detach
    }

    #[test]
    fn trim_and_clear() {
        let mut history = History::new();
        for tag in ['a', 'b', 'c', 'd'] {
            history.push(tagged_line(tag));
        }
        history.trim(2);
        assert_eq!(history.len(), 2);
        assert_eq!(tag_of(&history.pop(4, Attr::default(), 2).unwrap()), 'd');

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn set_max_lines_trims() {
        let mut history = History::with_max_lines(8);
        for tag in ['a', 'b', 'c', 'd'] {
            history.push(tagged_line(tag));
        }
        history.set_max_lines(1);
        assert_eq!(history.len(), 1);
        assert_eq!(tag_of(&history.pop(4, Attr::default(), 2).unwrap()), 'd');
    }
}
