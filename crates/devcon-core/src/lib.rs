#![forbid(unsafe_code)]

//! Host-agnostic terminal engine for the devcon developer console.
//!
//! `devcon-core` is the platform-independent terminal model at the heart of
//! devcon. It owns the cell grid, scrollback, VT/ANSI parsing, and cursor
//! state — all without any host I/O dependencies. The surrounding console
//! (keyboard input, framebuffer output, pty plumbing) drives it through
//! narrow, synchronous calls.
//!
//! # Primary responsibilities
//!
//! - **Char**: a base code point plus combining marks, packed into a single
//!   word where possible and spilled to the heap otherwise.
//! - **Cell**: character content + display attributes + modification age.
//! - **Line**: a resizable row of cells with fill tracking.
//! - **Page**: the 2D line table with scroll-region handling and history
//!   hand-off.
//! - **History**: bounded scrollback buffer for lines scrolled off the top.
//! - **Utf8**: streaming UTF-8 decoder with ISO-8859-1 fallback.
//! - **Parser**: VT/ANSI control-sequence state machine (Paul Flo Williams
//!   model) plus the command resolver tables.
//! - **Screen**: glue that consumes parser output and drives the page —
//!   cursor, modes, SGR state, charset mapping, answerback.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; the host adapter supplies
//!   bytes and drains response bytes.
//! - **Deterministic**: identical byte sequences always produce identical
//!   state.
//! - **Graceful degradation**: allocation failure never tears down the
//!   display; it falls back to reusing what is already allocated.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

use std::fmt;

pub mod cell;
pub mod character;
pub mod charset;
pub mod command;
pub mod history;
pub mod line;
pub mod page;
pub mod parser;
pub mod screen;
pub mod utf8;

pub use cell::{Attr, AttrFlags, Cell, Color, Palette, DEFAULT_PALETTE};
pub use character::{Char, CharBuf, ucs4_width};
pub use charset::{
    CharsetTable, DEC_SPECIAL_GRAPHICS, DEC_SUPPLEMENTAL_GRAPHICS, UNICODE_LOWER, UNICODE_UPPER,
};
pub use command::{Charset, Command};
pub use history::History;
pub use line::Line;
pub use page::Page;
pub use parser::{Parser, Seq, SeqFlags, SeqType, PARSER_ARG_MAX};
pub use screen::Screen;
pub use utf8::Utf8;

/// Age value meaning "no age recorded"; renderers treat it as always dirty.
pub const AGE_NULL: u64 = 0;

/// Errors surfaced by the terminal core.
///
/// Only genuine resource exhaustion escapes to the caller; every other
/// fallible path recovers in place (see the individual operations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A cell or line allocation failed. Structures already grown stay
    /// grown; the operation can be retried.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for Error {}
