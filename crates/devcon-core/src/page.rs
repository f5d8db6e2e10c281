//! Page: the 2D cell table of a terminal.
//!
//! A page stores its lines individually so scrolling is a line shuffle, not a
//! cell copy, and so lines can be handed to the scrollback history whole.
//! All cell-level operations are bounds-checked here and forwarded to the
//! right line; out-of-bounds positions are silently ignored.
//!
//! Scrolling only ever touches the scroll region `[scroll_idx, scroll_idx +
//! scroll_num)`. The `scroll_fill` state counts the touched lines inside that
//! region and lets a height shrink consume empty slack before pushing real
//! content into the history.
//!
//! Growing a page is split in two: [`reserve`](Page::reserve) performs every
//! allocation and may fail, [`resize`](Page::resize) then applies the new
//! dimensions and cannot fail. Callers must reserve before they resize.

use crate::cell::{Attr, Cell};
use crate::character::Char;
use crate::history::History;
use crate::line::Line;
use crate::Error;

/// A 2D table of cells with a scroll region and an optional history link.
#[derive(Debug, Clone, Default)]
pub struct Page {
    lines: Vec<Line>,
    width: usize,
    height: usize,
    scroll_idx: usize,
    scroll_num: usize,
    scroll_fill: usize,
    /// Page age; overrides line and cell ages when newer.
    pub age: u64,
}

impl Page {
    /// Create an empty page with dimensions 0 x 0.
    #[must_use]
    pub fn new() -> Self {
        Page::default()
    }

    /// Width of the visible area.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the visible area.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of allocated lines; never shrinks and always `>= height`.
    #[must_use]
    pub fn n_lines(&self) -> usize {
        self.lines.len()
    }

    /// Start index of the scroll region.
    #[must_use]
    pub fn scroll_idx(&self) -> usize {
        self.scroll_idx
    }

    /// Number of lines in the scroll region.
    #[must_use]
    pub fn scroll_num(&self) -> usize {
        self.scroll_num
    }

    /// Number of touched lines in the scroll region.
    #[must_use]
    pub fn scroll_fill(&self) -> usize {
        self.scroll_fill
    }

    /// The visible line at `y`.
    #[must_use]
    pub fn line(&self, y: usize) -> Option<&Line> {
        self.lines[..self.height].get(y)
    }

    /// The cell at `(x, y)`, if within the visible area.
    #[must_use]
    pub fn get_cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width {
            return None;
        }
        self.lines[..self.height].get(y)?.cell(x)
    }

    /// Mutable access to the cell at `(x, y)`.
    ///
    /// The reference must be dropped before any other page operation runs.
    pub fn get_cell_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        if x >= self.width {
            return None;
        }
        self.lines[..self.height].get_mut(y)?.cell_mut(x)
    }

    /// Mark the line at `y` as touched for scroll accounting.
    ///
    /// The page itself only consumes `scroll_fill` (scrolling and resizing
    /// update it); producing it is the caller's job, done here whenever a
    /// write lands inside the scroll region.
    pub fn note_fill(&mut self, y: usize) {
        if y >= self.scroll_idx && y < self.scroll_idx + self.scroll_num {
            self.scroll_fill = self.scroll_fill.max(y - self.scroll_idx + 1);
        }
    }

    /// Guarantee allocations for a `cols` x `rows` area.
    ///
    /// Existing lines are grown to at least `cols` cells (visible lines keep
    /// their current `width` columns protected, lines beyond the visible
    /// height are cleared outright) and new lines are allocated until `rows`
    /// exist. Newly added cells carry `attr` and `age`.
    ///
    /// Growth already performed is retained when a later allocation fails,
    /// so the call can simply be retried.
    pub fn reserve(&mut self, cols: usize, rows: usize, attr: Attr, age: u64) -> Result<(), Error> {
        // Grow existing lines first; this touches no cell inside the current
        // visible area, so failing halfway leaves the page fully usable.
        let min_lines = self.lines.len().min(rows);
        for i in 0..min_lines {
            if cols < self.width && i < self.height {
                // Visible lines already have at least `width >= cols` cells.
                continue;
            }
            let protect = if i < self.height { self.width } else { 0 };
            self.lines[i].reserve(cols, attr, age, protect)?;
        }

        if rows > self.lines.len() {
            self.lines
                .try_reserve_exact(rows - self.lines.len())
                .map_err(|_| Error::OutOfMemory)?;
            while self.lines.len() < rows {
                let mut line = Line::new();
                line.reserve(cols, attr, age, 0)?;
                self.lines.push(line);
            }
        }

        Ok(())
    }

    /// Apply new visible dimensions.
    ///
    /// [`reserve`](Page::reserve) must already have succeeded for the target
    /// size. Shrinking the height emulates a scroll-up (consuming empty
    /// scroll-region slack first) so content migrates into `history`; growing
    /// pulls lines back out of `history` via scroll-down. The lower margin —
    /// lines below the scroll region — is preserved across both.
    pub fn resize(
        &mut self,
        cols: usize,
        rows: usize,
        attr: Attr,
        age: u64,
        mut history: Option<&mut History>,
    ) {
        debug_assert!(self.lines.len() >= rows, "resize without prior reserve");

        let old_height = self.height;

        if rows < old_height {
            // Push content to history, but only as much as the touched part
            // of the scroll region actually requires.
            let num = old_height - rows;
            let empty = self.scroll_num.saturating_sub(self.scroll_fill);
            if num > empty {
                self.up(cols, num - empty, attr, age, history.as_deref_mut());
            }

            // Swap the lower margin up so it survives at the new bottom;
            // overlapping ranges make the direction significant.
            let bottom = self.scroll_idx + self.scroll_num;
            let num = old_height.saturating_sub(bottom).min(rows.saturating_sub(self.scroll_idx));
            if num > 0 {
                let top = rows - num;
                for i in 0..num {
                    self.lines.swap(top + i, bottom + i);
                }
            }

            self.height = rows;
            self.scroll_idx = self.scroll_idx.min(rows);
            self.scroll_num -= self.scroll_num.min(old_height - rows);
            // scroll_fill is already up to date (or zero) from the scroll-up.
        } else if rows > old_height {
            // New rows are accounted to the scroll region, so move the lower
            // margin down first to keep it at the bottom.
            let top = self.scroll_idx + self.scroll_num;
            let num = old_height.saturating_sub(top);
            if num > 0 {
                let bottom = top + (rows - old_height);
                for i in (0..num).rev() {
                    self.lines.swap(top + i, bottom + i);
                }
            }

            self.height = rows;
            self.scroll_num = rows
                .saturating_sub(self.scroll_idx)
                .min(self.scroll_num + (rows - old_height));

            let num = match history.as_deref_mut() {
                Some(h) => h.peek(rows - old_height, cols, attr, age),
                None => 0,
            };
            if num > 0 {
                self.down(cols, num, attr, age, history);
            }
        }

        self.width = cols;
        for line in &mut self.lines[..self.height] {
            line.set_width(cols);
        }
    }

    /// Scroll the scroll region up by `num` lines.
    ///
    /// Old lines move into `history` when given; freshly reserved lines take
    /// their place at the bottom. If a replacement line cannot be allocated,
    /// the old line is reset and reused in place — the display survives, the
    /// scrollback entry is skipped.
    pub fn scroll_up(&mut self, num: usize, attr: Attr, age: u64, history: Option<&mut History>) {
        self.up(self.width, num, attr, age, history);
    }

    /// Scroll the scroll region down by `num` lines.
    ///
    /// New top lines come out of `history` when given, otherwise they are
    /// cleared. Pass no history for ordinary scroll-down commands; the
    /// history variant exists for growing the page on resize.
    pub fn scroll_down(&mut self, num: usize, attr: Attr, age: u64, history: Option<&mut History>) {
        self.down(self.width, num, attr, age, history);
    }

    fn up(
        &mut self,
        new_width: usize,
        num: usize,
        attr: Attr,
        age: u64,
        mut history: Option<&mut History>,
    ) {
        let num = num.min(self.scroll_num);
        if num == 0 {
            return;
        }

        // Avoid under-allocating replacement lines, even mid-resize.
        let new_width = new_width.max(self.width);

        for i in 0..num {
            let idx = self.scroll_idx + i;
            let mut replaced = false;
            if let Some(h) = history.as_deref_mut()
                && let Ok(mut fresh) = Line::with_reserved(new_width, attr, age)
            {
                fresh.set_width(self.width);
                fresh.age = age;
                let old = std::mem::replace(&mut self.lines[idx], fresh);
                h.push(old);
                replaced = true;
            }
            if !replaced {
                self.lines[idx].reset(attr, age);
                self.lines[idx].age = age;
            }
        }

        // Rotate the region so the fresh (or reset) lines end up at the
        // bottom and everything else moves up.
        let region = &mut self.lines[self.scroll_idx..self.scroll_idx + self.scroll_num];
        region.rotate_left(num);
        for line in &mut region[..self.scroll_num - num] {
            line.age = age;
        }

        self.scroll_fill -= self.scroll_fill.min(num);
    }

    fn down(
        &mut self,
        new_width: usize,
        num: usize,
        attr: Attr,
        age: u64,
        mut history: Option<&mut History>,
    ) {
        let num = num.min(self.scroll_num);
        if num == 0 {
            return;
        }

        let new_width = new_width.max(self.width);
        let last = self.scroll_idx + self.scroll_num - 1;

        // Fill the bottom `num` slots with history lines (newest first, so
        // the most recent line ends up closest to the old content); a failed
        // pop falls back to clearing the line that scrolls out.
        for i in 0..num {
            let idx = last - i;
            let popped = history
                .as_deref_mut()
                .and_then(|h| h.pop(new_width, attr, age));
            match popped {
                Some(mut line) => {
                    line.set_width(self.width.min(line.width()));
                    line.age = age;
                    self.lines[idx] = line;
                }
                None => {
                    self.lines[idx].reset(attr, age);
                    self.lines[idx].age = age;
                }
            }
        }

        let region = &mut self.lines[self.scroll_idx..self.scroll_idx + self.scroll_num];
        region.rotate_right(num);
        for line in &mut region[num..] {
            line.age = age;
        }

        // Only grow the fill when the region already had content; an empty
        // region stays empty-looking after pulling in blanks.
        if self.scroll_fill > 0 {
            self.scroll_fill = self.scroll_num.min(self.scroll_fill + num);
        }
    }

    /// Write a character to the cell at `(pos_x, pos_y)`.
    ///
    /// Takes ownership of `ch`. Does not wrap across lines; out-of-bounds
    /// rows are a no-op.
    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &mut self,
        pos_x: usize,
        pos_y: usize,
        ch: Char,
        cwidth: usize,
        attr: Attr,
        age: u64,
        insert_mode: bool,
    ) {
        if pos_y >= self.height {
            return;
        }
        self.lines[pos_y].write(pos_x, ch, cwidth, attr, age, insert_mode);
        self.note_fill(pos_y);
    }

    /// Insert `num` blank cells at `(from_x, from_y)`, shifting the rest of
    /// the line right.
    pub fn insert_cells(&mut self, from_x: usize, from_y: usize, num: usize, attr: Attr, age: u64) {
        if from_y >= self.height {
            return;
        }
        self.lines[from_y].insert(from_x, num, attr, age);
    }

    /// Delete `num` cells at `(from_x, from_y)`, shifting the rest of the
    /// line left.
    pub fn delete_cells(&mut self, from_x: usize, from_y: usize, num: usize, attr: Attr, age: u64) {
        if from_y >= self.height {
            return;
        }
        self.lines[from_y].delete(from_x, num, attr, age);
    }

    /// Append a combining mark to the cell at `(pos_x, pos_y)`.
    pub fn append(&mut self, pos_x: usize, pos_y: usize, ucs4: u32, age: u64) {
        if pos_y >= self.height {
            return;
        }
        self.lines[pos_y].append(pos_x, ucs4, age);
    }

    /// Erase all cells from `(from_x, from_y)` through `(to_x, to_y)`.
    ///
    /// The range wraps across line boundaries: rows strictly between the
    /// endpoints are cleared entirely; `to_x` is exclusive on the final row.
    #[allow(clippy::too_many_arguments)]
    pub fn erase(
        &mut self,
        from_x: usize,
        from_y: usize,
        to_x: usize,
        to_y: usize,
        attr: Attr,
        age: u64,
        keep_protected: bool,
    ) {
        let mut y = from_y;
        while y <= to_y && y < self.height {
            let from = if y == from_y { from_x } else { 0 };
            let to = if y == to_y { to_x } else { self.width };
            self.lines[y].erase(from, to.saturating_sub(from), attr, age, keep_protected);
            y += 1;
        }
    }

    /// Erase the whole visible page.
    pub fn reset(&mut self, attr: Attr, age: u64) {
        if self.height == 0 {
            return;
        }
        self.erase(0, 0, self.width, self.height - 1, attr, age, false);
    }

    /// Set the scroll region, clipped to the current page extents.
    ///
    /// A page of height 0 forces an empty region.
    pub fn set_scroll_region(&mut self, idx: usize, num: usize) {
        if self.height < 1 {
            self.scroll_idx = 0;
            self.scroll_num = 0;
        } else {
            self.scroll_idx = idx.min(self.height - 1);
            self.scroll_num = num.min(self.height - self.scroll_idx);
        }
        self.scroll_fill = self.scroll_fill.min(self.scroll_num);
    }

    /// Insert `num` blank lines at `pos_y`, pushing lines below down.
    ///
    /// Only lines inside (or above the bottom of) the scroll region move; a
    /// `pos_y` below the region implies a one-line region, i.e. the line is
    /// simply cleared. Lines pushed past the region bottom are dropped.
    pub fn insert_lines(&mut self, pos_y: usize, num: usize, attr: Attr, age: u64) {
        if pos_y >= self.height {
            return;
        }
        let num = num.min(self.height);

        let (saved_idx, saved_num) = (self.scroll_idx, self.scroll_num);

        self.scroll_idx = pos_y;
        if pos_y >= saved_idx + saved_num {
            self.scroll_num = 1;
        } else if pos_y >= saved_idx {
            self.scroll_num = saved_num - (pos_y - saved_idx);
        } else {
            self.scroll_num = saved_num + (saved_idx - pos_y);
        }

        self.scroll_down(num, attr, age, None);

        self.scroll_idx = saved_idx;
        self.scroll_num = saved_num;
    }

    /// Delete `num` lines at `pos_y`, pulling lines below up and clearing
    /// the freed lines at the region bottom.
    ///
    /// Region narrowing matches [`insert_lines`](Page::insert_lines) except
    /// at the exact region top, where deleting keeps the full region. The
    /// boundary comparison differs deliberately: inserting at the top grows
    /// the temporary region, deleting there already covers it.
    pub fn delete_lines(&mut self, pos_y: usize, num: usize, attr: Attr, age: u64) {
        if pos_y >= self.height {
            return;
        }
        let num = num.min(self.height);

        let (saved_idx, saved_num) = (self.scroll_idx, self.scroll_num);

        self.scroll_idx = pos_y;
        if pos_y >= saved_idx + saved_num {
            self.scroll_num = 1;
        } else if pos_y > saved_idx {
            self.scroll_num = saved_num - (pos_y - saved_idx);
        } else {
            self.scroll_num = saved_num + (saved_idx - pos_y);
        }

        self.scroll_up(num, attr, age, None);

        self.scroll_idx = saved_idx;
        self.scroll_num = saved_num;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharBuf;

    fn page(cols: usize, rows: usize) -> Page {
        let mut page = Page::new();
        page.reserve(cols, rows, Attr::default(), 1).unwrap();
        page.resize(cols, rows, Attr::default(), 1, None);
        page
    }

    fn write_tag(page: &mut Page, x: usize, y: usize, tag: char) {
        page.write(x, y, Char::from_ucs4(u32::from(tag)), 1, Attr::default(), 1, false);
    }

    fn tag_at(page: &Page, x: usize, y: usize) -> char {
        let mut buf = CharBuf::default();
        match page.get_cell(x, y) {
            Some(cell) if !cell.ch.is_null() => {
                char::from_u32(cell.ch.resolve(&mut buf)[0]).unwrap()
            }
            _ => ' ',
        }
    }

    fn column0(page: &Page) -> String {
        (0..page.height()).map(|y| tag_at(page, 0, y)).collect()
    }

    #[test]
    fn fresh_page_has_full_scroll_region() {
        let page = page(4, 4);
        assert_eq!(page.width(), 4);
        assert_eq!(page.height(), 4);
        assert_eq!(page.scroll_idx(), 0);
        assert_eq!(page.scroll_num(), 4);
    }

    #[test]
    fn get_cell_bounds() {
        let mut page = page(3, 2);
        assert!(page.get_cell(0, 0).is_some());
        assert!(page.get_cell(3, 0).is_none());
        assert!(page.get_cell(0, 2).is_none());
        assert!(page.get_cell_mut(2, 1).is_some());
    }

    #[test]
    fn write_out_of_bounds_is_noop() {
        let mut page = page(2, 2);
        page.write(0, 5, Char::from_ucs4(0x41), 1, Attr::default(), 1, false);
        page.insert_cells(0, 5, 1, Attr::default(), 1);
        page.delete_cells(0, 5, 1, Attr::default(), 1);
        page.append(0, 5, 0x301, 1);
    }

    #[test]
    fn scroll_up_moves_lines_to_history() {
        let mut page = page(4, 4);
        let mut history = History::with_max_lines(8);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }

        page.scroll_up(2, Attr::default(), 2, Some(&mut history));

        assert_eq!(column0(&page), "CD  ");
        assert_eq!(history.len(), 2);
        let first = history.pop(4, Attr::default(), 3).unwrap();
        let mut buf = CharBuf::default();
        assert_eq!(first.cell(0).unwrap().ch.resolve(&mut buf)[0], u32::from('B'));
    }

    #[test]
    fn scroll_up_without_history_resets_lines() {
        let mut page = page(4, 3);
        for (y, tag) in ['A', 'B', 'C'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.scroll_up(1, Attr::default(), 2, None);
        assert_eq!(column0(&page), "BC ");
    }

    #[test]
    fn scroll_down_pulls_from_history() {
        let mut page = page(4, 4);
        let mut history = History::with_max_lines(8);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }

        page.scroll_up(2, Attr::default(), 2, Some(&mut history));
        page.scroll_down(2, Attr::default(), 3, Some(&mut history));

        assert_eq!(column0(&page), "ABCD");
        assert!(history.is_empty());
    }

    #[test]
    fn scroll_down_without_history_clears_top() {
        let mut page = page(4, 3);
        for (y, tag) in ['A', 'B', 'C'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.scroll_down(1, Attr::default(), 2, None);
        assert_eq!(column0(&page), " AB");
    }

    #[test]
    fn scroll_respects_region() {
        let mut page = page(4, 4);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.set_scroll_region(1, 2);
        page.scroll_up(1, Attr::default(), 2, None);
        assert_eq!(column0(&page), "AC D");
    }

    #[test]
    fn scroll_up_caps_at_region_size() {
        let mut page = page(4, 4);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.scroll_up(100, Attr::default(), 2, None);
        assert_eq!(column0(&page), "    ");
    }

    #[test]
    fn insert_lines_pushes_down_within_region() {
        let mut page = page(4, 4);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.insert_lines(1, 1, Attr::default(), 2);
        assert_eq!(column0(&page), "A BC");
        assert_eq!(page.scroll_idx(), 0);
        assert_eq!(page.scroll_num(), 4);
    }

    #[test]
    fn delete_lines_pulls_up_within_region() {
        let mut page = page(4, 4);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.delete_lines(1, 2, Attr::default(), 2);
        assert_eq!(column0(&page), "AD  ");
    }

    #[test]
    fn insert_lines_below_region_clears_single_line() {
        let mut page = page(4, 4);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.set_scroll_region(0, 2);
        page.insert_lines(3, 1, Attr::default(), 2);
        assert_eq!(column0(&page), "ABC ");
    }

    #[test]
    fn delete_lines_at_region_top_keeps_full_region() {
        let mut page = page(4, 4);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        page.set_scroll_region(1, 3);
        page.delete_lines(1, 1, Attr::default(), 2);
        assert_eq!(column0(&page), "ACD ");
    }

    #[test]
    fn reserve_is_monotone() {
        let mut page = Page::new();
        page.reserve(4, 4, Attr::default(), 1).unwrap();
        assert_eq!(page.n_lines(), 4);
        page.reserve(2, 2, Attr::default(), 1).unwrap();
        assert_eq!(page.n_lines(), 4);
        page.reserve(8, 6, Attr::default(), 1).unwrap();
        assert_eq!(page.n_lines(), 6);
    }

    #[test]
    fn resize_shrink_pushes_to_history() {
        let mut page = page(4, 4);
        let mut history = History::with_max_lines(8);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }

        page.resize(4, 2, Attr::default(), 2, Some(&mut history));
        assert_eq!(page.height(), 2);
        assert_eq!(column0(&page), "CD");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn resize_grow_pulls_back_from_history() {
        let mut page = page(4, 4);
        let mut history = History::with_max_lines(8);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }

        page.resize(4, 2, Attr::default(), 2, Some(&mut history));
        page.reserve(4, 4, Attr::default(), 3).unwrap();
        page.resize(4, 4, Attr::default(), 3, Some(&mut history));

        assert_eq!(page.height(), 4);
        assert_eq!(column0(&page), "ABCD");
        assert!(history.is_empty());
    }

    #[test]
    fn resize_shrink_consumes_empty_slack_first() {
        let mut page = page(4, 4);
        let mut history = History::with_max_lines(8);
        // Touch only the first two lines; the bottom two are slack.
        write_tag(&mut page, 0, 0, 'A');
        write_tag(&mut page, 0, 1, 'B');

        page.resize(4, 2, Attr::default(), 2, Some(&mut history));
        assert_eq!(column0(&page), "AB");
        assert!(history.is_empty());
    }

    #[test]
    fn resize_narrower_clamps_line_widths() {
        let mut page = page(4, 2);
        write_tag(&mut page, 3, 0, 'Z');
        page.resize(2, 2, Attr::default(), 2, None);
        assert_eq!(page.width(), 2);
        assert!(page.get_cell(3, 0).is_none());

        // Growing back re-exposes the cells after a reserve.
        page.reserve(4, 2, Attr::default(), 3).unwrap();
        page.resize(4, 2, Attr::default(), 3, None);
        assert_eq!(page.width(), 4);
    }

    #[test]
    fn resize_preserves_lower_margin() {
        let mut page = page(4, 4);
        for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
            write_tag(&mut page, 0, y, tag);
        }
        // Region covers the top three lines; 'D' is the lower margin.
        page.set_scroll_region(0, 3);

        page.resize(4, 3, Attr::default(), 2, None);
        assert_eq!(page.height(), 3);
        assert_eq!(tag_at(&page, 0, 2), 'D');
    }

    #[test]
    fn set_scroll_region_clamps() {
        let mut page = page(4, 4);
        page.set_scroll_region(10, 10);
        assert_eq!(page.scroll_idx(), 3);
        assert_eq!(page.scroll_num(), 1);

        page.set_scroll_region(1, 100);
        assert_eq!(page.scroll_idx(), 1);
        assert_eq!(page.scroll_num(), 3);
    }

    #[test]
    fn erase_spans_rows() {
        let mut page = page(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                write_tag(&mut page, x, y, 'X');
            }
        }
        page.erase(1, 0, 2, 2, Attr::default(), 2, false);
        assert_eq!(tag_at(&page, 0, 0), 'X');
        assert_eq!(tag_at(&page, 1, 0), ' ');
        assert_eq!(tag_at(&page, 2, 1), ' ');
        assert_eq!(tag_at(&page, 1, 2), ' ');
        assert_eq!(tag_at(&page, 2, 2), 'X');
    }

    #[test]
    fn reset_clears_everything() {
        let mut page = page(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                write_tag(&mut page, x, y, 'X');
            }
        }
        page.reset(Attr::default(), 2);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(tag_at(&page, x, y), ' ');
            }
        }
    }

    #[test]
    fn zero_height_page_ignores_operations() {
        let mut page = Page::new();
        page.write(0, 0, Char::from_ucs4(0x41), 1, Attr::default(), 1, false);
        page.scroll_up(1, Attr::default(), 1, None);
        page.set_scroll_region(2, 2);
        assert_eq!(page.scroll_num(), 0);
        page.reset(Attr::default(), 1);
    }
}
