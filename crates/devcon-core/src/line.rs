//! Line: a resizable row of cells.
//!
//! Lines are allocated individually so that scrolling and scrollback hand-off
//! move whole lines instead of copying cells. A line distinguishes its
//! *visible width* from its *allocated cell count*: shrinking the width never
//! releases memory, so growing back to a previously used width cannot fail.
//!
//! The `fill` state tracks the right edge of touched content (the index one
//! past the last written cell). Renderers use it to skip trailing blanks;
//! the erase/delete operations keep it conservative rather than exact.

use crate::cell::{clear_cells, Attr, Cell};
use crate::character::Char;
use crate::Error;

/// A single line of a page or the history buffer.
#[derive(Debug, Clone, Default)]
pub struct Line {
    cells: Vec<Cell>,
    width: usize,
    fill: usize,
    /// Line age; overrides cell ages when newer. Not implicitly updated by
    /// cell-level mutations.
    pub age: u64,
}

impl Line {
    /// Create an empty line with no cells allocated.
    #[must_use]
    pub fn new() -> Self {
        Line::default()
    }

    /// Create a line with `width` cells reserved and visible.
    pub fn with_reserved(width: usize, attr: Attr, age: u64) -> Result<Self, Error> {
        let mut line = Line::new();
        line.reserve(width, attr, age, 0)?;
        line.set_width(width);
        Ok(line)
    }

    /// Visible width of the line.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of allocated cells. Never shrinks; always `>= width`.
    #[must_use]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Index one past the last touched cell, within `[0, width]`.
    #[must_use]
    pub fn fill(&self) -> usize {
        self.fill
    }

    /// Visible cells of the line.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells[..self.width]
    }

    /// The cell at `x`, if within the visible width.
    #[must_use]
    pub fn cell(&self, x: usize) -> Option<&Cell> {
        self.cells[..self.width].get(x)
    }

    /// Mutable access to the cell at `x`, if within the visible width.
    pub fn cell_mut(&mut self, x: usize) -> Option<&mut Cell> {
        self.cells[..self.width].get_mut(x)
    }

    /// Guarantee that at least `width` cells are allocated.
    ///
    /// Existing cells outside the protected prefix (`[protect_width,
    /// min(n_cells, width))`) are cleared to blanks with `attr` and `age`;
    /// newly allocated cells are initialized the same way. This never frees
    /// memory — reducing the width or re-growing to a previous width always
    /// succeeds.
    ///
    /// `fill` is clamped to `protect_width`.
    pub fn reserve(
        &mut self,
        width: usize,
        attr: Attr,
        age: u64,
        protect_width: usize,
    ) -> Result<(), Error> {
        let min_width = self.cells.len().min(width);
        if min_width > protect_width {
            clear_cells(&mut self.cells[protect_width..min_width], attr, age);
        }

        if width > self.cells.len() {
            let additional = width - self.cells.len();
            self.cells
                .try_reserve_exact(additional)
                .map_err(|_| Error::OutOfMemory)?;
            self.cells.resize_with(width, || Cell::blank(attr, age));
        }

        self.fill = self.fill.min(protect_width);
        Ok(())
    }

    /// Change the visible width, cropped to the allocated cell count.
    ///
    /// Cells are not modified; use [`reserve`](Line::reserve) or
    /// [`erase`](Line::erase) to clear newly exposed cells. The fill state is
    /// cropped at the new width; if a multi-cell character straddles the new
    /// edge, `fill` keeps pointing at its head — multi-cell tails must never
    /// be dereferenced on their own.
    pub fn set_width(&mut self, width: usize) {
        self.width = width.min(self.cells.len());
        self.fill = self.fill.min(self.width);
    }

    /// Write a character into the cell at `pos_x`.
    ///
    /// The character occupies `max(1, cwidth)` cells, truncated at the right
    /// edge; the head cell receives `ch`, the tail cells are cleared. With
    /// `insert_mode`, existing cells shift right instead of being
    /// overwritten. Out-of-bounds positions are a no-op.
    pub fn write(
        &mut self,
        pos_x: usize,
        ch: Char,
        cwidth: usize,
        attr: Attr,
        age: u64,
        insert_mode: bool,
    ) {
        if pos_x >= self.width {
            return;
        }

        let len = cwidth.max(1).min(self.width - pos_x);
        if len == 0 {
            return;
        }

        if insert_mode {
            self.place(pos_x, len, ch, cwidth, attr, age);
        } else {
            self.cells[pos_x].set(ch, cwidth as u8, attr, age);
            clear_cells(&mut self.cells[pos_x + 1..pos_x + len], attr, age);
            self.fill = self.width.min(self.fill.max(pos_x + len));
        }
    }

    /// Insert `num` cells at `from`, shifting existing cells right; the head
    /// cell is set to `head_char`, the rest are blanks. Cells shifted past
    /// the right edge are discarded.
    pub fn place(
        &mut self,
        from: usize,
        num: usize,
        head_char: Char,
        head_cwidth: usize,
        attr: Attr,
        age: u64,
    ) {
        if from >= self.width {
            return;
        }
        let num = num.min(self.width - from);
        if num == 0 {
            return;
        }

        let moved = self.width - from - num;
        if moved > 0 {
            // Shift the surviving cells right; the cells knocked off the edge
            // rotate to the front and are overwritten (releasing their
            // characters) below.
            self.cells[from..self.width].rotate_right(num);
            for cell in &mut self.cells[from + num..self.width] {
                cell.age = age;
            }
            self.cells[from].set(head_char, head_cwidth as u8, attr, age);
            clear_cells(&mut self.cells[from + 1..from + num], attr, age);
            self.fill = self.width.min((self.fill + num).max(from + num));
        } else {
            self.cells[from].set(head_char, head_cwidth as u8, attr, age);
            clear_cells(&mut self.cells[from + 1..from + num], attr, age);
            self.fill = self.width;
        }
    }

    /// Insert `num` blank cells at `from`, shifting existing cells right.
    pub fn insert(&mut self, from: usize, num: usize, attr: Attr, age: u64) {
        self.place(from, num, Char::NULL, 0, attr, age);
    }

    /// Delete `num` cells at `from`, shifting the remainder left and clearing
    /// the freed tail.
    pub fn delete(&mut self, from: usize, num: usize, attr: Attr, age: u64) {
        if from >= self.width {
            return;
        }
        let num = num.min(self.width - from);
        if num == 0 {
            return;
        }

        let moved = self.width - from - num;
        if moved > 0 {
            self.cells[from..self.width].rotate_left(num);
            for cell in &mut self.cells[from..from + moved] {
                cell.age = age;
            }
        }
        clear_cells(&mut self.cells[from + moved..self.width], attr, age);

        if from + num < self.fill {
            self.fill -= num;
        } else if from < self.fill {
            self.fill = from;
        }
    }

    /// Append a combining mark to the cell at `pos_x`.
    ///
    /// Skipped entirely if the cell is outside the visible width.
    pub fn append(&mut self, pos_x: usize, ucs4: u32, age: u64) {
        if pos_x >= self.width {
            return;
        }
        self.cells[pos_x].append(ucs4, age);
    }

    /// Erase `num` cells starting at `from`, clearing them in place.
    ///
    /// Cells whose protect attribute is set are skipped when
    /// `keep_protected` is true. Cells to the right are not shifted; use
    /// [`delete`](Line::delete) for that.
    pub fn erase(&mut self, from: usize, num: usize, attr: Attr, age: u64, keep_protected: bool) {
        if from >= self.width {
            return;
        }
        let num = num.min(self.width - from);
        if num == 0 {
            return;
        }

        let mut last_protected = 0;
        for i in 0..num {
            let cell = &mut self.cells[from + i];
            if keep_protected && cell.attr.flags.contains(crate::AttrFlags::PROTECT) {
                // Protected cells only count towards fill when they are
                // inside the current fill region.
                if from + i < self.fill {
                    last_protected = from + i + 1;
                }
                continue;
            }
            cell.clear(attr, age);
        }

        // The fill state can only be reduced when the erased range starts
        // inside it and runs to its end or beyond; otherwise content to the
        // right keeps the old value correct.
        if from < self.fill && from + num >= self.fill {
            self.fill = from.max(last_protected);
        }
    }

    /// Erase the whole visible line, ignoring protection.
    pub fn reset(&mut self, attr: Attr, age: u64) {
        self.erase(0, self.width, attr, age, false);
    }
}
