//! Terminal cell: the fundamental unit of the grid.
//!
//! Each cell stores a character (base code point plus combining marks), its
//! cached display width, its display attributes, and a modification age that
//! renderers use to skip unchanged cells.
//!
//! Cells are never heap-allocated individually — they live inside a line's
//! contiguous buffer. A zeroed cell (null char, width 0, default attributes,
//! null age) is a valid blank cell.

use bitflags::bitflags;

use crate::character::Char;
use crate::AGE_NULL;

bitflags! {
    /// Boolean display attributes of a cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u8 {
        const BOLD      = 1 << 0;
        const ITALIC    = 1 << 1;
        const UNDERLINE = 1 << 2;
        const INVERSE   = 1 << 3;
        /// Protected from erase operations that honor protection (DECSCA).
        const PROTECT   = 1 << 4;
        const BLINK     = 1 << 5;
        const HIDDEN    = 1 << 6;
    }
}

/// Color of a cell foreground or background.
///
/// Follows the terminal color model hierarchy:
/// default → 16 named → 256 indexed → 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default foreground/background.
    #[default]
    Default,
    /// Named color 0-15: the eight dark colors plus their light variants.
    Named(u8),
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

/// A 16-entry color palette plus default foreground and background,
/// as RGB triples.
pub type Palette = [[u8; 3]; 18];

/// Default palette: classic xterm-ish colors, light-grey-on-black.
pub const DEFAULT_PALETTE: Palette = [
    [0, 0, 0],       // black
    [205, 0, 0],     // red
    [0, 205, 0],     // green
    [205, 205, 0],   // yellow
    [0, 0, 238],     // blue
    [205, 0, 205],   // magenta
    [0, 205, 205],   // cyan
    [229, 229, 229], // light grey
    [127, 127, 127], // dark grey
    [255, 0, 0],     // light red
    [0, 255, 0],     // light green
    [255, 255, 0],   // light yellow
    [92, 92, 255],   // light blue
    [255, 0, 255],   // light magenta
    [0, 255, 255],   // light cyan
    [255, 255, 255], // white
    [229, 229, 229], // foreground: light grey
    [0, 0, 0],       // background: black
];

/// Display attributes of a cell: foreground, background, and flags.
///
/// The all-default value (`Attr::default()`) is the terminal default
/// rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attr {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
}

/// Steps of the 6x6x6 color cube used by the 256-color palette.
const CUBE_VALUES: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

fn color_to_argb32(color: Color, is_fg: bool, bold: bool, palette: &Palette) -> u32 {
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Indexed(idx) => {
            let t = u32::from(idx);
            if t < 16 {
                let p = palette[t as usize];
                (p[0], p[1], p[2])
            } else if t < 232 {
                let t = t - 16;
                let b = CUBE_VALUES[(t % 6) as usize];
                let g = CUBE_VALUES[((t / 6) % 6) as usize];
                let r = CUBE_VALUES[((t / 36) % 6) as usize];
                (r, g, b)
            } else {
                let v = ((t - 232) * 10 + 8) as u8;
                (v, v, v)
            }
        }
        Color::Named(idx) => {
            let mut t = usize::from(idx.min(15));
            // Bold brightens the dark colors, foreground only.
            if t < 8 && bold && is_fg {
                t += 8;
            }
            let p = palette[t];
            (p[0], p[1], p[2])
        }
        Color::Default => {
            let p = palette[if is_fg { 16 } else { 17 }];
            (p[0], p[1], p[2])
        }
    };

    (0xff_u32 << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

impl Attr {
    /// Resolve this attribute's colors to native ARGB32 values.
    ///
    /// The inverse flag is applied here, swapping foreground and background.
    #[must_use]
    pub fn to_argb32(&self, palette: Option<&Palette>) -> (u32, u32) {
        let palette = palette.unwrap_or(&DEFAULT_PALETTE);
        let bold = self.flags.contains(AttrFlags::BOLD);
        let fg = color_to_argb32(self.fg, true, bold, palette);
        let bg = color_to_argb32(self.bg, false, bold, palette);

        if self.flags.contains(AttrFlags::INVERSE) {
            (bg, fg)
        } else {
            (fg, bg)
        }
    }
}

/// A single cell in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Stored character, or [`Char::NULL`] for a blank cell.
    pub ch: Char,
    /// Cached display width of `ch`.
    pub cwidth: u8,
    /// Display attributes.
    pub attr: Attr,
    /// Age of the last modification, or [`AGE_NULL`].
    pub age: u64,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: Char::NULL,
            cwidth: 0,
            attr: Attr::default(),
            age: AGE_NULL,
        }
    }
}

impl Cell {
    /// Create a cell, taking ownership of `ch`.
    #[must_use]
    pub fn new(ch: Char, cwidth: u8, attr: Attr, age: u64) -> Self {
        Cell {
            ch,
            cwidth,
            attr,
            age,
        }
    }

    /// Create a blank cell carrying the given attributes and age.
    #[must_use]
    pub fn blank(attr: Attr, age: u64) -> Self {
        Cell::new(Char::NULL, 0, attr, age)
    }

    /// Change the contents of this cell, taking ownership of `ch`.
    ///
    /// The previously stored character is released unless `ch` is the very
    /// same character being written back.
    pub fn set(&mut self, ch: Char, cwidth: u8, attr: Attr, age: u64) {
        if !ch.same(&self.ch) {
            self.ch = ch;
        }
        self.cwidth = cwidth;
        self.attr = attr;
        self.age = age;
    }

    /// Append a combining mark to the stored character and refresh the age.
    pub fn append(&mut self, ucs4: u32, age: u64) {
        self.ch = self.ch.take().merge(ucs4);
        self.age = age;
    }

    /// Reset this cell to a blank with the given attributes and age.
    pub fn clear(&mut self, attr: Attr, age: u64) {
        self.set(Char::NULL, 0, attr, age);
    }
}

/// Reset a range of cells to blanks with the given attributes and age.
pub(crate) fn clear_cells(cells: &mut [Cell], attr: Attr, age: u64) {
    for cell in cells {
        cell.clear(attr, age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_blank() {
        let cell = Cell::default();
        assert!(cell.ch.is_null());
        assert_eq!(cell.cwidth, 0);
        assert_eq!(cell.attr, Attr::default());
        assert_eq!(cell.age, AGE_NULL);
    }

    #[test]
    fn set_replaces_char_and_attrs() {
        let mut cell = Cell::default();
        let attr = Attr {
            fg: Color::Named(1),
            bg: Color::Default,
            flags: AttrFlags::BOLD,
        };
        cell.set(Char::from_ucs4(u32::from('X')), 1, attr, 7);
        assert_eq!(cell.ch, Char::from_ucs4(u32::from('X')));
        assert_eq!(cell.cwidth, 1);
        assert_eq!(cell.attr, attr);
        assert_eq!(cell.age, 7);
    }

    #[test]
    fn append_extends_char_and_bumps_age() {
        let mut cell = Cell::new(Char::from_ucs4(0x65), 1, Attr::default(), 1);
        cell.append(0x301, 5);
        assert_eq!(cell.ch.len(), 2);
        assert_eq!(cell.age, 5);
    }

    #[test]
    fn clear_keeps_attr_and_age_arguments() {
        let mut cell = Cell::new(Char::from_ucs4(0x41), 1, Attr::default(), 1);
        let attr = Attr {
            bg: Color::Indexed(42),
            ..Attr::default()
        };
        cell.clear(attr, 9);
        assert!(cell.ch.is_null());
        assert_eq!(cell.cwidth, 0);
        assert_eq!(cell.attr.bg, Color::Indexed(42));
        assert_eq!(cell.age, 9);
    }

    #[test]
    fn argb32_default_colors() {
        let attr = Attr::default();
        let (fg, bg) = attr.to_argb32(None);
        assert_eq!(fg, 0xff_e5e5e5);
        assert_eq!(bg, 0xff_000000);
    }

    #[test]
    fn argb32_bold_brightens_named_foreground() {
        let attr = Attr {
            fg: Color::Named(1),
            bg: Color::Default,
            flags: AttrFlags::BOLD,
        };
        let (fg, _) = attr.to_argb32(None);
        assert_eq!(fg, 0xff_ff0000); // light red, not dark red

        let bg_attr = Attr {
            fg: Color::Default,
            bg: Color::Named(1),
            flags: AttrFlags::BOLD,
        };
        let (_, bg) = bg_attr.to_argb32(None);
        assert_eq!(bg, 0xff_cd0000); // background stays dark
    }

    #[test]
    fn argb32_256_color_cube_and_ramp() {
        let cube = Attr {
            fg: Color::Indexed(16),
            ..Attr::default()
        };
        assert_eq!(cube.to_argb32(None).0, 0xff_000000);

        let cube_end = Attr {
            fg: Color::Indexed(231),
            ..Attr::default()
        };
        assert_eq!(cube_end.to_argb32(None).0, 0xff_ffffff);

        let grey = Attr {
            fg: Color::Indexed(232),
            ..Attr::default()
        };
        assert_eq!(grey.to_argb32(None).0, 0xff_080808);
    }

    #[test]
    fn argb32_inverse_swaps() {
        let attr = Attr {
            fg: Color::Rgb(1, 2, 3),
            bg: Color::Rgb(4, 5, 6),
            flags: AttrFlags::INVERSE,
        };
        let (fg, bg) = attr.to_argb32(None);
        assert_eq!(fg, 0xff_040506);
        assert_eq!(bg, 0xff_010203);
    }
}
