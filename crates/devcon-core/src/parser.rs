//! VT/ANSI control-sequence parser.
//!
//! A deterministic state machine that classifies an incoming UCS-4 stream
//! into sequences: graphic characters, C0/C1 controls, escape sequences,
//! CSI functions, and DCS/OSC strings. It is based on the state diagram by
//! Paul Flo Williams (vt100.net), written from scratch and extended where
//! needed; it is compatible up to the VT500 series.
//!
//! The parser performs no actions itself — each completed sequence is handed
//! back to the caller for dispatch. Input must already be decoded to UCS-4;
//! see [`Utf8`](crate::utf8::Utf8).
//!
//! Two deviations from a literal reading of the diagram, both deliberate:
//! `0x9C` (ST) terminates a sequence from nearly every state, and unexpected
//! C1 controls cancel any sequence in progress before being handled.

use smallvec::SmallVec;

use crate::command::{self, Charset, Command};

/// Maximum number of CSI/DCS parameters retained per sequence.
pub const PARSER_ARG_MAX: usize = 16;

/// Maximum number of OSC payload bytes retained per sequence.
const PARSER_ST_MAX: usize = 4096;

bitflags::bitflags! {
    /// Intermediate and parameter markers collected during a sequence.
    ///
    /// Bit positions correspond to `1 << (ch - 0x20)` so the characters
    /// 0x20..=0x3F map directly onto the word. Digits, `:` and `;` never
    /// reach the collect action; their bits stay reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SeqFlags: u32 {
        const SPACE   = 1 << 0;  // ' '
        const BANG    = 1 << 1;  // '!'
        const DQUOTE  = 1 << 2;  // '"'
        const HASH    = 1 << 3;  // '#'
        const CASH    = 1 << 4;  // '$'
        const PERCENT = 1 << 5;  // '%'
        const AND     = 1 << 6;  // '&'
        const SQUOTE  = 1 << 7;  // '\''
        const POPEN   = 1 << 8;  // '('
        const PCLOSE  = 1 << 9;  // ')'
        const MULT    = 1 << 10; // '*'
        const PLUS    = 1 << 11; // '+'
        const COMMA   = 1 << 12; // ','
        const MINUS   = 1 << 13; // '-'
        const DOT     = 1 << 14; // '.'
        const SLASH   = 1 << 15; // '/'
        const LT      = 1 << 28; // '<'
        const EQUAL   = 1 << 29; // '='
        const GT      = 1 << 30; // '>'
        const WHAT    = 1 << 31; // '?'
    }
}

/// Classification of a parsed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqType {
    /// A character the state machine discards (e.g. DEL inside a sequence).
    Ignore,
    /// A printable character.
    Graphic,
    /// A C0/C1 control character.
    Control,
    /// A generic escape sequence.
    Escape,
    /// A control sequence function (CSI).
    Csi,
    /// A device control string; payload is recognized but discarded.
    Dcs,
    /// An operating system command string.
    Osc,
}

/// A fully assembled control sequence.
///
/// Borrowed from the parser after a dispatching [`feed`](Parser::feed);
/// every field is reset when the next sequence starts.
#[derive(Debug, Clone)]
pub struct Seq {
    /// Classification of this sequence.
    pub seq_type: SeqType,
    /// Resolved command, or [`Command::None`].
    pub command: Command,
    /// The terminating (or sole) character of the sequence.
    pub terminator: u32,
    /// Collected intermediate markers.
    pub intermediates: SeqFlags,
    /// Charset selected by an SCS escape, or [`Charset::None`].
    pub charset: Charset,
    /// Number of parameters in `args`.
    pub n_args: usize,
    /// Parameters; unset entries are -1 (meaning "default").
    pub args: [i32; PARSER_ARG_MAX],
    /// OSC string payload, capped at 4 KiB.
    pub st: SmallVec<[u8; 64]>,
}

impl Seq {
    fn new() -> Self {
        Seq {
            seq_type: SeqType::Ignore,
            command: Command::None,
            terminator: 0,
            intermediates: SeqFlags::empty(),
            charset: Charset::None,
            n_args: 0,
            args: [-1; PARSER_ARG_MAX],
            st: SmallVec::new(),
        }
    }

    /// The parameter at `idx`, or `default` when absent or unset.
    #[must_use]
    pub fn arg(&self, idx: usize, default: i32) -> i32 {
        match self.args.get(idx) {
            Some(&v) if idx < self.n_args && v >= 0 => v,
            _ => default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Esc,
    EscInt,
    CsiEntry,
    CsiParam,
    CsiInt,
    CsiIgnore,
    DcsEntry,
    DcsParam,
    DcsInt,
    DcsPass,
    DcsIgnore,
    OscString,
    StIgnore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Clear,
    Ignore,
    Print,
    Execute,
    Collect,
    Param,
    EscDispatch,
    CsiDispatch,
    DcsStart,
    DcsCollect,
    DcsConsume,
    DcsDispatch,
    OscStart,
    OscCollect,
    OscConsume,
    OscDispatch,
}

/// The control-sequence state machine.
#[derive(Debug, Clone)]
pub struct Parser {
    seq: Seq,
    state: State,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

impl Parser {
    /// Create a parser in ground state.
    #[must_use]
    pub fn new() -> Self {
        Parser {
            seq: Seq::new(),
            state: State::Ground,
        }
    }

    /// Reset to ground state, abandoning any sequence in progress.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear();
    }

    /// Feed one UCS-4 value into the state machine.
    ///
    /// Returns the completed sequence when this character finishes one; the
    /// borrow is valid until the next `feed`. Graphic and control characters
    /// complete immediately.
    pub fn feed(&mut self, raw: u32) -> Option<&Seq> {
        // Unexpected C1 controls cancel a sequence in progress and start a
        // new one immediately; C0 controls are handled per state.
        let dispatched = match raw {
            0x18 => self.transition(raw, Some(State::Ground), Action::Ignore),
            0x1a => self.transition(raw, Some(State::Ground), Action::Execute),
            0x1b => self.transition(raw, Some(State::Esc), Action::Clear),
            0x90 => self.transition(raw, Some(State::DcsEntry), Action::Clear),
            0x98 | 0x9e | 0x9f => self.transition(raw, Some(State::StIgnore), Action::None),
            0x9b => self.transition(raw, Some(State::CsiEntry), Action::Clear),
            0x9d => self.transition(raw, Some(State::OscString), Action::Clear),
            0x80..=0x8f | 0x91..=0x97 | 0x99..=0x9a => {
                self.transition(raw, Some(State::Ground), Action::Execute)
            }
            _ => self.feed_to_state(raw),
        };

        if dispatched { Some(&self.seq) } else { None }
    }

    fn feed_to_state(&mut self, raw: u32) -> bool {
        match self.state {
            State::Ground => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Execute),
                0x9c => self.transition(raw, None, Action::Ignore),
                _ => self.transition(raw, None, Action::Print),
            },
            State::Esc => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Execute),
                0x20..=0x2f => self.transition(raw, Some(State::EscInt), Action::Collect),
                0x50 => self.transition(raw, Some(State::DcsEntry), Action::Clear),
                0x5b => self.transition(raw, Some(State::CsiEntry), Action::Clear),
                0x5d => self.transition(raw, Some(State::OscString), Action::Clear),
                0x58 | 0x5e | 0x5f => self.transition(raw, Some(State::StIgnore), Action::None),
                0x30..=0x7e => self.transition(raw, Some(State::Ground), Action::EscDispatch),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, Some(State::EscInt), Action::Collect),
            },
            State::EscInt => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Execute),
                0x20..=0x2f => self.transition(raw, None, Action::Collect),
                0x30..=0x7e => self.transition(raw, Some(State::Ground), Action::EscDispatch),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, None, Action::Collect),
            },
            State::CsiEntry => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Execute),
                0x20..=0x2f => self.transition(raw, Some(State::CsiInt), Action::Collect),
                0x3a => self.transition(raw, Some(State::CsiIgnore), Action::None),
                0x30..=0x39 | 0x3b => self.transition(raw, Some(State::CsiParam), Action::Param),
                0x3c..=0x3f => self.transition(raw, Some(State::CsiParam), Action::Collect),
                0x40..=0x7e => self.transition(raw, Some(State::Ground), Action::CsiDispatch),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, Some(State::CsiIgnore), Action::None),
            },
            State::CsiParam => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Execute),
                0x20..=0x2f => self.transition(raw, Some(State::CsiInt), Action::Collect),
                0x30..=0x39 | 0x3b => self.transition(raw, None, Action::Param),
                0x3a | 0x3c..=0x3f => self.transition(raw, Some(State::CsiIgnore), Action::None),
                0x40..=0x7e => self.transition(raw, Some(State::Ground), Action::CsiDispatch),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, Some(State::CsiIgnore), Action::None),
            },
            State::CsiInt => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Execute),
                0x20..=0x2f => self.transition(raw, None, Action::Collect),
                0x30..=0x3f => self.transition(raw, Some(State::CsiIgnore), Action::None),
                0x40..=0x7e => self.transition(raw, Some(State::Ground), Action::CsiDispatch),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, Some(State::CsiIgnore), Action::None),
            },
            State::CsiIgnore => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Execute),
                0x20..=0x3f => self.transition(raw, None, Action::None),
                0x40..=0x7e => self.transition(raw, Some(State::Ground), Action::None),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, None, Action::None),
            },
            State::DcsEntry => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Ignore),
                0x20..=0x2f => self.transition(raw, Some(State::DcsInt), Action::Collect),
                0x3a => self.transition(raw, Some(State::DcsIgnore), Action::None),
                0x30..=0x39 | 0x3b => self.transition(raw, Some(State::DcsParam), Action::Param),
                0x3c..=0x3f => self.transition(raw, Some(State::DcsParam), Action::Collect),
                0x40..=0x7e => self.transition(raw, Some(State::DcsPass), Action::DcsConsume),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, Some(State::DcsPass), Action::DcsConsume),
            },
            State::DcsParam => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Ignore),
                0x20..=0x2f => self.transition(raw, Some(State::DcsInt), Action::Collect),
                0x30..=0x39 | 0x3b => self.transition(raw, None, Action::Param),
                0x3a | 0x3c..=0x3f => self.transition(raw, Some(State::DcsIgnore), Action::None),
                0x40..=0x7e => self.transition(raw, Some(State::DcsPass), Action::DcsConsume),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, Some(State::DcsPass), Action::DcsConsume),
            },
            State::DcsInt => match raw {
                0x00..=0x1f => self.transition(raw, None, Action::Ignore),
                0x20..=0x2f => self.transition(raw, None, Action::Collect),
                0x30..=0x3f => self.transition(raw, Some(State::DcsIgnore), Action::None),
                0x40..=0x7e => self.transition(raw, Some(State::DcsPass), Action::DcsConsume),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, Some(State::DcsPass), Action::DcsConsume),
            },
            State::DcsPass => match raw {
                0x00..=0x7e => self.transition(raw, None, Action::DcsCollect),
                0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::DcsDispatch),
                _ => self.transition(raw, None, Action::DcsCollect),
            },
            State::DcsIgnore => match raw {
                0x00..=0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::None),
                _ => self.transition(raw, None, Action::None),
            },
            State::OscString => match raw {
                0x00..=0x06 | 0x08..=0x1f => self.transition(raw, None, Action::Ignore),
                0x20..=0x7f => self.transition(raw, None, Action::OscCollect),
                0x07 | 0x9c => self.transition(raw, Some(State::Ground), Action::OscDispatch),
                _ => self.transition(raw, None, Action::OscCollect),
            },
            State::StIgnore => match raw {
                0x00..=0x7f => self.transition(raw, None, Action::Ignore),
                0x9c => self.transition(raw, Some(State::Ground), Action::Ignore),
                _ => self.transition(raw, None, Action::None),
            },
        }
    }

    /// Perform a state transition and its action; returns whether a
    /// sequence was dispatched.
    fn transition(&mut self, raw: u32, state: Option<State>, action: Action) -> bool {
        if let Some(state) = state {
            self.state = state;
        }

        match action {
            Action::None => false,
            Action::Clear => {
                self.clear();
                false
            }
            Action::Ignore => {
                self.clear();
                self.seq.seq_type = SeqType::Ignore;
                self.seq.terminator = raw;
                true
            }
            Action::Print => {
                self.clear();
                self.seq.seq_type = SeqType::Graphic;
                self.seq.command = Command::Graphic;
                self.seq.terminator = raw;
                true
            }
            Action::Execute => {
                self.clear();
                self.seq.seq_type = SeqType::Control;
                self.seq.terminator = raw;
                self.seq.command = command::resolve_control(&self.seq);
                true
            }
            Action::Collect => {
                if (0x20..=0x3f).contains(&raw) {
                    // The state machine already restricts which markers reach
                    // this action; repeated markers simply re-set their bit.
                    self.seq.intermediates |= SeqFlags::from_bits_retain(1 << (raw - 0x20));
                }
                false
            }
            Action::Param => {
                self.param(raw);
                false
            }
            Action::EscDispatch => {
                self.seq.seq_type = SeqType::Escape;
                self.seq.terminator = raw;
                let (cmd, charset) = command::resolve_escape(&self.seq);
                self.seq.command = cmd;
                self.seq.charset = charset;
                true
            }
            Action::CsiDispatch => {
                // A pending partial argument still counts.
                if self.seq.n_args < PARSER_ARG_MAX
                    && (self.seq.n_args > 0 || self.seq.args[self.seq.n_args] >= 0)
                {
                    self.seq.n_args += 1;
                }
                self.seq.seq_type = SeqType::Csi;
                self.seq.terminator = raw;
                self.seq.command = command::resolve_csi(&self.seq);
                true
            }
            Action::DcsStart | Action::DcsCollect | Action::DcsConsume => {
                // DCS payloads are recognized but never executed; only the
                // terminator is remembered for the dispatch below.
                if action == Action::DcsConsume {
                    self.seq.terminator = raw;
                }
                false
            }
            Action::DcsDispatch => {
                self.seq.seq_type = SeqType::Dcs;
                self.seq.command = Command::None;
                true
            }
            Action::OscStart | Action::OscConsume => false,
            Action::OscCollect => {
                self.osc_collect(raw);
                false
            }
            Action::OscDispatch => {
                self.seq.seq_type = SeqType::Osc;
                self.seq.command = Command::None;
                self.seq.terminator = raw;
                true
            }
        }
    }

    fn clear(&mut self) {
        self.seq.command = Command::None;
        self.seq.terminator = 0;
        self.seq.intermediates = SeqFlags::empty();
        self.seq.charset = Charset::None;
        self.seq.n_args = 0;
        self.seq.args = [-1; PARSER_ARG_MAX];
        self.seq.st.clear();
    }

    fn param(&mut self, raw: u32) {
        if raw == u32::from(b';') {
            if self.seq.n_args < PARSER_ARG_MAX {
                self.seq.n_args += 1;
            }
            return;
        }

        if self.seq.n_args >= PARSER_ARG_MAX {
            return;
        }

        if let Some(digit) = char::from_u32(raw).and_then(|c| c.to_digit(10)) {
            let arg = &mut self.seq.args[self.seq.n_args];
            let value = i64::from((*arg).max(0)) * 10 + i64::from(digit);
            // The VT510 clamps at 9999 but accepts commands up to 2^15-1;
            // 0xffff keeps every command representable without overflow.
            *arg = value.min(0xffff) as i32;
        }
    }

    fn osc_collect(&mut self, raw: u32) {
        let mut buf = [0u8; 4];
        let len = crate::utf8::encode(&mut buf, raw);
        if len == 0 || self.seq.st.len() + len > PARSER_ST_MAX {
            return;
        }
        self.seq.st.extend_from_slice(&buf[..len]);
    }
}
