//! Screen: the terminal-side state machine.
//!
//! A [`Screen`] connects the UTF-8 decoder, the control-sequence parser, and
//! a page pair (main + alternate) into a working terminal. It owns all
//! runtime state the page layer deliberately avoids: cursor position, saved
//! cursor, insert/origin/wrap modes, the current SGR attributes, the G0-G3
//! charset registers, tab stops, and the answerback string.
//!
//! The screen performs no I/O. Bytes from the host enter through
//! [`feed_text`](Screen::feed_text); bytes for the host (answerback, device
//! status reports) accumulate in an internal buffer the caller drains with
//! [`take_output`](Screen::take_output). Rendering walks the visible cells
//! through [`draw`](Screen::draw), using ages to skip what has not changed.

use tracing::{debug, trace};

use crate::cell::{Attr, AttrFlags, Cell};
use crate::character::{ucs4_width, Char};
use crate::charset::{
    self, CharsetTable, DEC_SPECIAL_GRAPHICS, DEC_SUPPLEMENTAL_GRAPHICS, UNICODE_LOWER,
    UNICODE_UPPER,
};
use crate::command::{Charset, Command};
use crate::history::History;
use crate::page::Page;
use crate::parser::{Parser, Seq, SeqType};
use crate::utf8::Utf8;
use crate::Error;

bitflags::bitflags! {
    /// Runtime screen modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct ScreenFlags: u16 {
        /// IRM: writes shift existing cells right instead of overwriting.
        const INSERT_MODE    = 1 << 0;
        /// DECAWM: writes past the right margin wrap to the next line.
        const AUTO_WRAP      = 1 << 1;
        /// DECOM: row addressing is relative to the scroll region.
        const ORIGIN_MODE    = 1 << 2;
        /// DECTCEM off: the cursor is not drawn.
        const HIDE_CURSOR    = 1 << 3;
        /// DECSCNM: the whole screen renders inverted.
        const INVERSE_SCREEN = 1 << 4;
        /// DECCKM: cursor keys send application sequences (input side).
        const APP_CURSOR     = 1 << 5;
        /// The alternate page is active.
        const ALT_ACTIVE     = 1 << 6;
    }
}

/// Translation table bound to a G register.
///
/// The charset ids alias 94- and 96-position sets (e.g. the American NRCS
/// shares its id with ISO Latin-2 supplemental), so the table has to be
/// chosen when the set is *designated*, from both the charset and the
/// designator used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum GlMap {
    #[default]
    Lower,
    Upper,
    Special,
    Supplemental,
}

impl GlMap {
    fn table(self) -> &'static CharsetTable {
        match self {
            GlMap::Lower => &UNICODE_LOWER,
            GlMap::Upper => &UNICODE_UPPER,
            GlMap::Special => &DEC_SPECIAL_GRAPHICS,
            GlMap::Supplemental => &DEC_SUPPLEMENTAL_GRAPHICS,
        }
    }

    fn designate(charset: Charset, via_96: bool) -> GlMap {
        match charset {
            Charset::DecSpecialGraphic => GlMap::Special,
            Charset::DecSupplemental | Charset::UserprefSupplemental => GlMap::Supplemental,
            cs if cs.is_96() && via_96 => GlMap::Upper,
            _ => GlMap::Lower,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SavedCursor {
    x: usize,
    y: usize,
    attr: Attr,
    g: [GlMap; 4],
    gl: usize,
    origin_mode: bool,
}

/// The terminal-side screen state.
#[derive(Debug)]
pub struct Screen {
    decoder: Utf8,
    parser: Parser,
    state: ScreenState,
}

#[derive(Debug)]
struct ScreenState {
    age: u64,
    main: Page,
    alt: Page,
    history: History,
    cursor_x: usize,
    cursor_y: usize,
    saved: SavedCursor,
    attr: Attr,
    flags: ScreenFlags,
    g: [GlMap; 4],
    gl: usize,
    /// Pending single shift (SS2/SS3): applies to the next graphic only.
    glt: Option<usize>,
    tabs: Vec<bool>,
    answerback: Vec<u8>,
    out: Vec<u8>,
    last_graphic: Option<(u32, usize)>,
}

impl Default for Screen {
    fn default() -> Self {
        Screen::new()
    }
}

impl Screen {
    /// Create a screen with dimensions 0 x 0; call
    /// [`resize`](Screen::resize) before feeding data.
    #[must_use]
    pub fn new() -> Self {
        Screen {
            decoder: Utf8::new(),
            parser: Parser::new(),
            state: ScreenState {
                age: 1,
                main: Page::new(),
                alt: Page::new(),
                history: History::new(),
                cursor_x: 0,
                cursor_y: 0,
                saved: SavedCursor::default(),
                attr: Attr::default(),
                flags: ScreenFlags::AUTO_WRAP,
                g: [GlMap::Lower; 4],
                gl: 0,
                glt: None,
                tabs: Vec::new(),
                answerback: Vec::new(),
                out: Vec::new(),
                last_graphic: None,
            },
        }
    }

    /// Width of the visible area.
    #[must_use]
    pub fn width(&self) -> usize {
        self.state.page().width()
    }

    /// Height of the visible area.
    #[must_use]
    pub fn height(&self) -> usize {
        self.state.page().height()
    }

    /// Current age counter; compare against the value returned by
    /// [`draw`](Screen::draw) to detect changes.
    #[must_use]
    pub fn age(&self) -> u64 {
        self.state.age
    }

    /// Cursor position as `(x, y)`.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        (
            self.state.cursor_x.min(self.width().saturating_sub(1)),
            self.state.cursor_y,
        )
    }

    /// Whether the cursor should be drawn (DECTCEM).
    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        !self.state.flags.contains(ScreenFlags::HIDE_CURSOR)
    }

    /// The cell at `(x, y)` of the active page.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.state.page().get_cell(x, y)
    }

    /// The scrollback history of the main page.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.state.history
    }

    /// Bound the scrollback history to `max` lines.
    pub fn set_history_limit(&mut self, max: usize) {
        self.state.history.set_max_lines(max);
    }

    /// Set the answerback string sent in response to ENQ.
    pub fn set_answerback(&mut self, answerback: &str) {
        self.state.answerback = answerback.as_bytes().to_vec();
    }

    /// Drain the bytes the screen wants sent back to the host.
    #[must_use]
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.state.out)
    }

    /// Feed host output bytes through decoder, parser, and dispatch.
    ///
    /// All side effects complete before the call returns; there is no
    /// batching across calls.
    pub fn feed_text(&mut self, bytes: &[u8]) {
        self.state.age += 1;
        for &byte in bytes {
            let points = self.decoder.feed(byte);
            for &raw in points {
                if let Some(seq) = self.parser.feed(raw) {
                    self.state.dispatch(seq);
                }
            }
        }
    }

    /// Change the visible dimensions of both pages.
    ///
    /// The main page exchanges lines with the scrollback history; the
    /// alternate page never does. The cursor is clamped into the new area.
    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<(), Error> {
        self.state.resize(cols, rows)
    }

    /// DECSTR: reset modes, charsets, attributes, and the scroll region
    /// without clearing the display.
    pub fn soft_reset(&mut self) {
        self.state.soft_reset();
    }

    /// RIS: full reset — soft reset plus cleared pages, home cursor, and
    /// default tab stops.
    pub fn hard_reset(&mut self) {
        self.decoder.reset();
        self.parser.reset();
        self.state.hard_reset();
    }

    /// Walk the visible cells, invoking `draw_fn` for each cell younger than
    /// `fb_age` (pass 0 to draw everything). Returns the current screen age
    /// for the next call.
    pub fn draw<F>(&self, fb_age: u64, mut draw_fn: F) -> u64
    where
        F: FnMut(usize, usize, &Attr, &[u32], usize),
    {
        let state = &self.state;
        let page = state.page();
        let inverse = state.flags.contains(ScreenFlags::INVERSE_SCREEN);

        let mut buf = crate::character::CharBuf::default();
        for y in 0..page.height() {
            let Some(line) = page.line(y) else { continue };
            for (x, cell) in line.cells().iter().enumerate() {
                let age = page.age.max(line.age).max(cell.age);
                if fb_age != 0 && age != 0 && age <= fb_age {
                    continue;
                }
                let mut attr = cell.attr;
                if inverse {
                    attr.flags.toggle(AttrFlags::INVERSE);
                }
                let points = cell.ch.resolve(&mut buf);
                draw_fn(x, y, &attr, points, usize::from(cell.cwidth));
            }
        }

        state.age
    }
}

impl ScreenState {
    fn page(&self) -> &Page {
        if self.flags.contains(ScreenFlags::ALT_ACTIVE) {
            &self.alt
        } else {
            &self.main
        }
    }

    fn page_mut(&mut self) -> &mut Page {
        if self.flags.contains(ScreenFlags::ALT_ACTIVE) {
            &mut self.alt
        } else {
            &mut self.main
        }
    }

    /// History handle for scroll operations: main page only.
    fn scroll_history(&mut self) -> (&mut Page, Option<&mut History>) {
        if self.flags.contains(ScreenFlags::ALT_ACTIVE) {
            (&mut self.alt, None)
        } else {
            (&mut self.main, Some(&mut self.history))
        }
    }

    fn resize(&mut self, cols: usize, rows: usize) -> Result<(), Error> {
        debug!(cols, rows, "screen resize");
        self.age += 1;
        let (attr, age) = (self.attr, self.age);

        self.main.reserve(cols, rows, attr, age)?;
        self.alt.reserve(cols, rows, attr, age)?;

        self.main.resize(cols, rows, attr, age, Some(&mut self.history));
        self.alt.resize(cols, rows, attr, age, None);

        let old_cols = self.tabs.len();
        self.tabs.resize(cols, false);
        for i in old_cols..cols {
            self.tabs[i] = i % 8 == 0;
        }

        self.cursor_x = self.cursor_x.min(cols.saturating_sub(1));
        self.cursor_y = self.cursor_y.min(rows.saturating_sub(1));

        self.main.age = age;
        self.alt.age = age;
        Ok(())
    }

    fn soft_reset(&mut self) {
        self.age += 1;
        self.flags = ScreenFlags::AUTO_WRAP | (self.flags & ScreenFlags::ALT_ACTIVE);
        self.attr = Attr::default();
        self.g = [GlMap::Lower; 4];
        self.gl = 0;
        self.glt = None;
        let (width, height) = (self.page().width(), self.page().height());
        self.page_mut().set_scroll_region(0, height);
        self.cursor_x = self.cursor_x.min(width.saturating_sub(1));
    }

    fn hard_reset(&mut self) {
        debug!("screen hard reset");
        self.soft_reset();
        self.flags = ScreenFlags::AUTO_WRAP;
        let age = self.age;
        let height = self.main.height();
        self.main.set_scroll_region(0, height);
        self.main.reset(Attr::default(), age);
        self.alt.reset(Attr::default(), age);
        self.main.age = age;
        self.alt.age = age;
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.saved = SavedCursor::default();
        self.last_graphic = None;
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            *tab = i % 8 == 0;
        }
    }

    // ── Cursor movement ─────────────────────────────────────────────

    fn scroll_top(&self) -> usize {
        self.page().scroll_idx()
    }

    fn scroll_bottom(&self) -> usize {
        let page = self.page();
        page.scroll_idx() + page.scroll_num()
    }

    /// Move down one line, scrolling when at the bottom margin.
    fn index(&mut self) {
        let (attr, age) = (self.attr, self.age);
        if self.cursor_y + 1 == self.scroll_bottom() {
            let (page, history) = self.scroll_history();
            page.scroll_up(1, attr, age, history);
        } else if self.cursor_y + 1 < self.page().height() {
            self.cursor_y += 1;
        }
    }

    /// Move up one line, scrolling when at the top margin.
    fn reverse_index(&mut self) {
        let (attr, age) = (self.attr, self.age);
        if self.cursor_y == self.scroll_top() {
            let page = self.page_mut();
            page.scroll_down(1, attr, age, None);
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
        }
    }

    fn move_up(&mut self, num: usize) {
        let top = self.scroll_top();
        let floor = if self.cursor_y >= top { top } else { 0 };
        self.cursor_y = self.cursor_y.saturating_sub(num).max(floor);
    }

    fn move_down(&mut self, num: usize) {
        let bottom = self.scroll_bottom();
        let height = self.page().height();
        let ceil = if self.cursor_y < bottom {
            bottom.saturating_sub(1)
        } else {
            height.saturating_sub(1)
        };
        self.cursor_y = (self.cursor_y + num).min(ceil);
    }

    fn move_left(&mut self, num: usize) {
        let width = self.page().width();
        self.cursor_x = self.cursor_x.min(width.saturating_sub(1));
        self.cursor_x = self.cursor_x.saturating_sub(num);
    }

    fn move_right(&mut self, num: usize) {
        let width = self.page().width();
        self.cursor_x = (self.cursor_x + num).min(width.saturating_sub(1));
    }

    /// Absolute cursor positioning, honoring origin mode.
    fn move_to(&mut self, x: usize, y: usize) {
        let page = self.page();
        let (width, height) = (page.width(), page.height());
        if self.flags.contains(ScreenFlags::ORIGIN_MODE) {
            let top = page.scroll_idx();
            let bottom = top + page.scroll_num();
            self.cursor_y = (top + y).min(bottom.saturating_sub(1));
        } else {
            self.cursor_y = y.min(height.saturating_sub(1));
        }
        self.cursor_x = x.min(width.saturating_sub(1));
    }

    fn next_tab_stop(&self, from: usize) -> usize {
        let width = self.page().width();
        ((from + 1)..width)
            .find(|&x| self.tabs.get(x).copied().unwrap_or(false))
            .unwrap_or(width.saturating_sub(1))
    }

    fn prev_tab_stop(&self, from: usize) -> usize {
        (0..from)
            .rev()
            .find(|&x| self.tabs.get(x).copied().unwrap_or(false))
            .unwrap_or(0)
    }

    // ── Writing ─────────────────────────────────────────────────────

    fn map_char(&mut self, raw: u32) -> u32 {
        let slot = self.glt.take().unwrap_or(self.gl);
        let table = self.g.get(slot).copied().unwrap_or_default().table();
        charset::map(table, raw)
    }

    fn write_char(&mut self, raw: u32) {
        let ucs4 = self.map_char(raw);
        self.put_char(ucs4);
    }

    /// Write an already charset-mapped code point at the cursor.
    fn put_char(&mut self, ucs4: u32) {
        let cwidth = ucs4_width(ucs4);
        let width = self.page().width();
        if width == 0 {
            return;
        }

        if cwidth == 0 {
            // A combining mark attaches to the previously written cell.
            let x = self.cursor_x.min(width - 1).saturating_sub(1);
            let (y, age) = (self.cursor_y, self.age);
            self.page_mut().append(x, y, ucs4, age);
            return;
        }

        if self.cursor_x >= width {
            if self.flags.contains(ScreenFlags::AUTO_WRAP) {
                self.cursor_x = 0;
                self.index();
            } else {
                self.cursor_x = width - 1;
            }
        }

        let insert = self.flags.contains(ScreenFlags::INSERT_MODE);
        let (x, y) = (self.cursor_x, self.cursor_y);
        let (attr, age) = (self.attr, self.age);
        self.page_mut()
            .write(x, y, Char::from_ucs4(ucs4), cwidth, attr, age, insert);
        self.cursor_x += cwidth;
        self.last_graphic = Some((ucs4, cwidth));
    }

    // ── Dispatch ────────────────────────────────────────────────────

    fn dispatch(&mut self, seq: &Seq) {
        match seq.seq_type {
            SeqType::Graphic => self.write_char(seq.terminator),
            SeqType::Control | SeqType::Escape | SeqType::Csi => self.do_command(seq),
            SeqType::Ignore | SeqType::Dcs | SeqType::Osc => {}
        }
    }

    #[allow(clippy::too_many_lines)]
    fn do_command(&mut self, seq: &Seq) {
        let (attr, age) = (self.attr, self.age);
        match seq.command {
            Command::Bel | Command::Null | Command::Dc1 | Command::Dc3 => {}
            Command::Enq => {
                let answerback = self.answerback.clone();
                self.out.extend_from_slice(&answerback);
            }
            Command::Bs => self.move_left(1),
            Command::Ht => {
                self.cursor_x = self.next_tab_stop(self.cursor_x);
            }
            Command::Lf | Command::Vt | Command::Ff | Command::Ind => self.index(),
            Command::Cr => self.cursor_x = 0,
            Command::Nel => {
                self.cursor_x = 0;
                self.index();
            }
            Command::Ri => self.reverse_index(),
            Command::So | Command::Ls1r => self.gl = 1,
            Command::Si => self.gl = 0,
            Command::Ls2 | Command::Ls2r => self.gl = 2,
            Command::Ls3 | Command::Ls3r => self.gl = 3,
            Command::Ss2 => self.glt = Some(2),
            Command::Ss3 => self.glt = Some(3),
            Command::Hts => {
                let x = self.cursor_x.min(self.tabs.len().saturating_sub(1));
                if let Some(tab) = self.tabs.get_mut(x) {
                    *tab = true;
                }
            }
            Command::Tbc => match seq.arg(0, 0) {
                0 => {
                    let x = self.cursor_x;
                    if let Some(tab) = self.tabs.get_mut(x) {
                        *tab = false;
                    }
                }
                3 => self.tabs.fill(false),
                _ => {}
            },
            Command::Cht => {
                for _ in 0..seq.arg(0, 1).max(1) {
                    self.cursor_x = self.next_tab_stop(self.cursor_x);
                }
            }
            Command::Cbt => {
                for _ in 0..seq.arg(0, 1).max(1) {
                    self.cursor_x = self.prev_tab_stop(self.cursor_x);
                }
            }
            Command::Sub => {
                // SUB cancels the sequence and shows an error glyph.
                self.write_char(0xfffd);
            }

            Command::Cuu => self.move_up(seq.arg(0, 1).max(1) as usize),
            Command::Cud => self.move_down(seq.arg(0, 1).max(1) as usize),
            Command::Cuf => self.move_right(seq.arg(0, 1).max(1) as usize),
            Command::Cub => self.move_left(seq.arg(0, 1).max(1) as usize),
            Command::Cnl => {
                self.move_down(seq.arg(0, 1).max(1) as usize);
                self.cursor_x = 0;
            }
            Command::Cpl => {
                self.move_up(seq.arg(0, 1).max(1) as usize);
                self.cursor_x = 0;
            }
            Command::Cha => {
                let width = self.page().width();
                self.cursor_x = (seq.arg(0, 1).max(1) as usize - 1).min(width.saturating_sub(1));
            }
            Command::Cup | Command::Hvp => {
                let y = seq.arg(0, 1).max(1) as usize - 1;
                let x = seq.arg(1, 1).max(1) as usize - 1;
                self.move_to(x, y);
            }
            Command::Vpa => {
                let y = seq.arg(0, 1).max(1) as usize - 1;
                let x = self.cursor_x;
                self.move_to(x, y);
            }
            Command::Vpr => self.move_down(seq.arg(0, 1).max(1) as usize),
            Command::Hpa => {
                let width = self.page().width();
                self.cursor_x = (seq.arg(0, 1).max(1) as usize - 1).min(width.saturating_sub(1));
            }
            Command::Hpr => self.move_right(seq.arg(0, 1).max(1) as usize),

            Command::Ich => {
                let num = seq.arg(0, 1).max(1) as usize;
                let (x, y) = (self.cursor_x, self.cursor_y);
                self.page_mut().insert_cells(x, y, num, attr, age);
            }
            Command::Dch => {
                let num = seq.arg(0, 1).max(1) as usize;
                let (x, y) = (self.cursor_x, self.cursor_y);
                self.page_mut().delete_cells(x, y, num, attr, age);
            }
            Command::Ech => {
                let num = seq.arg(0, 1).max(1) as usize;
                let (x, y) = (self.cursor_x, self.cursor_y);
                self.page_mut().erase(x, y, x + num, y, attr, age, false);
            }
            Command::Il => {
                let num = seq.arg(0, 1).max(1) as usize;
                let y = self.cursor_y;
                self.page_mut().insert_lines(y, num, attr, age);
            }
            Command::Dl => {
                let num = seq.arg(0, 1).max(1) as usize;
                let y = self.cursor_y;
                self.page_mut().delete_lines(y, num, attr, age);
            }
            Command::Su => {
                let num = seq.arg(0, 1).max(1) as usize;
                let (page, history) = self.scroll_history();
                page.scroll_up(num, attr, age, history);
            }
            Command::Sd => {
                let num = seq.arg(0, 1).max(1) as usize;
                self.page_mut().scroll_down(num, attr, age, None);
            }

            Command::Ed | Command::DecSed => {
                let keep = seq.command == Command::DecSed;
                self.erase_display(seq.arg(0, 0), keep);
            }
            Command::El | Command::DecSel => {
                let keep = seq.command == Command::DecSel;
                self.erase_line(seq.arg(0, 0), keep);
            }

            Command::Sgr => self.do_sgr(seq),
            Command::DecSca => match seq.arg(0, 0) {
                1 => self.attr.flags.insert(AttrFlags::PROTECT),
                _ => self.attr.flags.remove(AttrFlags::PROTECT),
            },

            Command::SmAnsi => self.set_ansi_modes(seq, true),
            Command::RmAnsi => self.set_ansi_modes(seq, false),
            Command::SmDec => self.set_dec_modes(seq, true),
            Command::RmDec => self.set_dec_modes(seq, false),

            Command::DecStbm => {
                let height = self.page().height();
                let top = seq.arg(0, 1).max(1) as usize - 1;
                let bottom = match seq.arg(1, 0) {
                    0 => height,
                    v => (v as usize).min(height),
                };
                if bottom > top {
                    self.page_mut().set_scroll_region(top, bottom - top);
                    self.move_to(0, 0);
                }
            }
            Command::DecSlrmOrSc => {
                // Without DECLRMM support this is the ANSI save-cursor form.
                self.save_cursor();
            }
            Command::DecSc => self.save_cursor(),
            Command::DecRc | Command::Rc => self.restore_cursor(),

            Command::DecAln => self.alignment_pattern(),
            Command::Ris => self.hard_reset(),
            Command::DecStr => self.soft_reset(),
            Command::Scs => self.designate_charset(seq),
            Command::Rep => {
                // The stored value is already charset-mapped.
                if let Some((ucs4, _)) = self.last_graphic {
                    for _ in 0..seq.arg(0, 1).max(1) {
                        self.put_char(ucs4);
                    }
                }
            }

            Command::Da1 | Command::DecId => {
                // VT220-class with ANSI color.
                self.out.extend_from_slice(b"\x1b[?62;22c");
            }
            Command::Da2 => {
                self.out.extend_from_slice(b"\x1b[>1;0;0c");
            }
            Command::DsrAnsi => match seq.arg(0, 0) {
                5 => self.out.extend_from_slice(b"\x1b[0n"),
                6 => self.report_cursor(),
                _ => {}
            },
            Command::DsrDec => {
                if seq.arg(0, 0) == 6 {
                    self.report_cursor();
                }
            }

            Command::DecKpam | Command::DecKpnm => {
                // Keypad mode only affects keyboard translation, which the
                // input collaborator owns.
            }

            cmd => {
                trace!(?cmd, "unhandled command");
            }
        }
    }

    fn save_cursor(&mut self) {
        self.saved = SavedCursor {
            x: self.cursor_x,
            y: self.cursor_y,
            attr: self.attr,
            g: self.g,
            gl: self.gl,
            origin_mode: self.flags.contains(ScreenFlags::ORIGIN_MODE),
        };
    }

    fn restore_cursor(&mut self) {
        let saved = self.saved.clone();
        self.attr = saved.attr;
        self.g = saved.g;
        self.gl = saved.gl;
        self.flags.set(ScreenFlags::ORIGIN_MODE, saved.origin_mode);
        let (width, height) = {
            let page = self.page();
            (page.width(), page.height())
        };
        self.cursor_x = saved.x.min(width.saturating_sub(1));
        self.cursor_y = saved.y.min(height.saturating_sub(1));
    }

    fn report_cursor(&mut self) {
        let y = if self.flags.contains(ScreenFlags::ORIGIN_MODE) {
            self.cursor_y.saturating_sub(self.scroll_top())
        } else {
            self.cursor_y
        };
        let x = self.cursor_x.min(self.page().width().saturating_sub(1));
        let report = format!("\x1b[{};{}R", y + 1, x + 1);
        self.out.extend_from_slice(report.as_bytes());
    }

    fn designate_charset(&mut self, seq: &Seq) {
        use crate::parser::SeqFlags;
        let slot = if seq.intermediates.intersects(SeqFlags::POPEN) {
            0
        } else if seq.intermediates.intersects(SeqFlags::PCLOSE | SeqFlags::MINUS) {
            1
        } else if seq.intermediates.intersects(SeqFlags::MULT | SeqFlags::DOT) {
            2
        } else if seq.intermediates.intersects(SeqFlags::PLUS | SeqFlags::SLASH) {
            3
        } else {
            return;
        };
        let via_96 = seq
            .intermediates
            .intersects(SeqFlags::MINUS | SeqFlags::DOT | SeqFlags::SLASH);
        self.g[slot] = GlMap::designate(seq.charset, via_96);
    }

    fn erase_display(&mut self, mode: i32, keep_protected: bool) {
        let (attr, age) = (self.attr, self.age);
        let (x, y) = (self.cursor_x, self.cursor_y);
        let (width, height) = (self.page().width(), self.page().height());
        if height == 0 {
            return;
        }
        match mode {
            0 => self
                .page_mut()
                .erase(x, y, width, height - 1, attr, age, keep_protected),
            1 => self.page_mut().erase(0, 0, x + 1, y, attr, age, keep_protected),
            2 => {
                self.page_mut().erase(0, 0, width, height - 1, attr, age, keep_protected);
                self.page_mut().age = age;
            }
            _ => {}
        }
    }

    fn erase_line(&mut self, mode: i32, keep_protected: bool) {
        let (attr, age) = (self.attr, self.age);
        let (x, y) = (self.cursor_x, self.cursor_y);
        let width = self.page().width();
        match mode {
            0 => self.page_mut().erase(x, y, width, y, attr, age, keep_protected),
            1 => self.page_mut().erase(0, y, x + 1, y, attr, age, keep_protected),
            2 => self.page_mut().erase(0, y, width, y, attr, age, keep_protected),
            _ => {}
        }
    }

    fn alignment_pattern(&mut self) {
        let (width, height) = (self.page().width(), self.page().height());
        let age = self.age;
        self.page_mut().set_scroll_region(0, height);
        for y in 0..height {
            for x in 0..width {
                self.page_mut().write(
                    x,
                    y,
                    Char::from_ucs4(u32::from('E')),
                    1,
                    Attr::default(),
                    age,
                    false,
                );
            }
        }
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    fn set_ansi_modes(&mut self, seq: &Seq, enable: bool) {
        for i in 0..seq.n_args {
            if seq.arg(i, 0) == 4 {
                self.flags.set(ScreenFlags::INSERT_MODE, enable);
            }
        }
    }

    fn set_dec_modes(&mut self, seq: &Seq, enable: bool) {
        for i in 0..seq.n_args {
            match seq.arg(i, 0) {
                1 => self.flags.set(ScreenFlags::APP_CURSOR, enable),
                5 => {
                    if self.flags.contains(ScreenFlags::INVERSE_SCREEN) != enable {
                        self.flags.set(ScreenFlags::INVERSE_SCREEN, enable);
                        // Whole-screen change: everything needs a redraw.
                        self.age += 1;
                        let age = self.age;
                        self.page_mut().age = age;
                    }
                }
                6 => {
                    self.flags.set(ScreenFlags::ORIGIN_MODE, enable);
                    self.move_to(0, 0);
                }
                7 => self.flags.set(ScreenFlags::AUTO_WRAP, enable),
                25 => self.flags.set(ScreenFlags::HIDE_CURSOR, !enable),
                47 => self.set_alt_screen(enable, false, false),
                1047 => self.set_alt_screen(enable, true, false),
                1048 => {
                    if enable {
                        self.save_cursor();
                    } else {
                        self.restore_cursor();
                    }
                }
                1049 => self.set_alt_screen(enable, true, true),
                _ => {}
            }
        }
    }

    fn set_alt_screen(&mut self, enable: bool, clear: bool, save_cursor: bool) {
        let active = self.flags.contains(ScreenFlags::ALT_ACTIVE);
        if active == enable {
            return;
        }

        self.age += 1;
        let age = self.age;

        if enable {
            if save_cursor {
                self.save_cursor();
            }
            self.flags.insert(ScreenFlags::ALT_ACTIVE);
            if clear {
                self.alt.reset(Attr::default(), age);
            }
            self.cursor_x = 0;
            self.cursor_y = 0;
        } else {
            if clear {
                self.alt.reset(Attr::default(), age);
            }
            self.flags.remove(ScreenFlags::ALT_ACTIVE);
            if save_cursor {
                self.restore_cursor();
            }
        }

        self.main.age = age;
        self.alt.age = age;
    }

    fn do_sgr(&mut self, seq: &Seq) {
        use crate::cell::Color;

        if seq.n_args == 0 {
            self.attr = Attr::default();
            return;
        }

        let mut i = 0;
        while i < seq.n_args {
            let v = seq.arg(i, 0);
            match v {
                0 => self.attr = Attr::default(),
                1 => self.attr.flags.insert(AttrFlags::BOLD),
                3 => self.attr.flags.insert(AttrFlags::ITALIC),
                4 => self.attr.flags.insert(AttrFlags::UNDERLINE),
                5 => self.attr.flags.insert(AttrFlags::BLINK),
                7 => self.attr.flags.insert(AttrFlags::INVERSE),
                8 => self.attr.flags.insert(AttrFlags::HIDDEN),
                22 => self.attr.flags.remove(AttrFlags::BOLD),
                23 => self.attr.flags.remove(AttrFlags::ITALIC),
                24 => self.attr.flags.remove(AttrFlags::UNDERLINE),
                25 => self.attr.flags.remove(AttrFlags::BLINK),
                27 => self.attr.flags.remove(AttrFlags::INVERSE),
                28 => self.attr.flags.remove(AttrFlags::HIDDEN),
                30..=37 => self.attr.fg = Color::Named((v - 30) as u8),
                39 => self.attr.fg = Color::Default,
                40..=47 => self.attr.bg = Color::Named((v - 40) as u8),
                49 => self.attr.bg = Color::Default,
                90..=97 => self.attr.fg = Color::Named((v - 90 + 8) as u8),
                100..=107 => self.attr.bg = Color::Named((v - 100 + 8) as u8),
                38 | 48 => {
                    let (color, consumed) = Self::extended_color(seq, i);
                    if let Some(color) = color {
                        if v == 38 {
                            self.attr.fg = color;
                        } else {
                            self.attr.bg = color;
                        }
                    }
                    i += consumed;
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Parse an SGR 38/48 extended color starting at `idx`; returns the
    /// color and how many extra arguments were consumed.
    fn extended_color(seq: &Seq, idx: usize) -> (Option<crate::cell::Color>, usize) {
        use crate::cell::Color;
        match seq.arg(idx + 1, -1) {
            5 => {
                let c = seq.arg(idx + 2, 0).clamp(0, 255) as u8;
                (Some(Color::Indexed(c)), 2)
            }
            2 => {
                let r = seq.arg(idx + 2, 0).clamp(0, 255) as u8;
                let g = seq.arg(idx + 3, 0).clamp(0, 255) as u8;
                let b = seq.arg(idx + 4, 0).clamp(0, 255) as u8;
                (Some(Color::Rgb(r, g, b)), 4)
            }
            _ => (None, 0),
        }
    }
}
