//! Command resolver: classify assembled control sequences.
//!
//! The state machine in [`parser`](crate::parser) only detects *whole*
//! sequences; it does not know what they mean. The pure functions here take a
//! fully assembled [`Seq`](crate::parser::Seq) and map terminator +
//! intermediates (+ argument count where finals are ambiguous) to a command
//! id. The tables cover the VT500-era command set plus the xterm extensions
//! commonly seen in the wild; recognizing a command does not imply the screen
//! implements it.

use crate::parser::{Seq, SeqFlags};

/// Commands a control sequence can resolve to.
///
/// Naming follows the standard mnemonics (CUU, DECSTBM, ...). `None` means
/// the sequence was well-formed but matches no known command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Command {
    /// Placeholder: sequence recognized, command unknown.
    #[default]
    None,
    /// A plain graphic character.
    Graphic,

    Bel,
    Bs,
    Cbt,
    Cha,
    Cht,
    Cnl,
    Cpl,
    Cr,
    Cub,
    Cud,
    Cuf,
    Cup,
    Cuu,
    Da1,
    Da2,
    Da3,
    Dc1,
    Dc3,
    Dch,
    DecAln,
    DecAnm,
    DecBi,
    DecCara,
    DecCra,
    DecDc,
    DecDhlBottom,
    DecDhlTop,
    DecDwl,
    DecEfr,
    DecElf,
    DecElr,
    DecEra,
    DecFi,
    DecFra,
    DecIc,
    DecId,
    DecInvm,
    DecKbd,
    DecKpam,
    DecKpnm,
    DecLfkc,
    DecLl,
    DecLtod,
    DecPcterm,
    DecPka,
    DecPkfmr,
    DecRara,
    DecRc,
    DecReqtparm,
    DecRpkt,
    DecRqcra,
    DecRqde,
    DecRqkt,
    DecRqlp,
    DecRqmAnsi,
    DecRqmDec,
    DecRqpkfm,
    DecRqpsr,
    DecRqtsr,
    DecRqupss,
    DecSace,
    DecSasd,
    DecSc,
    DecSca,
    DecScl,
    DecScp,
    DecScpp,
    DecScs,
    DecScusr,
    DecSddt,
    DecSdpt,
    DecSed,
    DecSel,
    DecSera,
    DecSfc,
    DecSkcv,
    DecSlck,
    DecSle,
    DecSlpp,
    /// `CSI s` is DECSLRM with DECLRMM enabled, ANSI save-cursor otherwise;
    /// the screen decides.
    DecSlrmOrSc,
    DecSmbv,
    DecSmkr,
    DecSnls,
    DecSpp,
    DecSppcs,
    DecSprtt,
    DecSr,
    DecSrfr,
    DecSscls,
    DecSsdt,
    DecSsl,
    DecSt8c,
    DecStbm,
    DecStr,
    DecStrl,
    DecSwbv,
    DecSwl,
    DecTid,
    DecTme,
    DecTst,
    Dl,
    DsrAnsi,
    DsrDec,
    Ech,
    Ed,
    El,
    Enq,
    Epa,
    Ff,
    Hpa,
    Hpr,
    Ht,
    Hts,
    Hvp,
    Ich,
    Il,
    Ind,
    Lf,
    Ls1r,
    Ls2,
    Ls2r,
    Ls3,
    Ls3r,
    McAnsi,
    McDec,
    Nel,
    Np,
    Null,
    Pp,
    Ppa,
    Ppb,
    Ppr,
    Rc,
    Rep,
    Ri,
    Ris,
    RmAnsi,
    RmDec,
    S7c1t,
    S8c1t,
    /// Select character set: the resolved charset is in `Seq::charset`.
    Scs,
    Sd,
    Sgr,
    Si,
    SmAnsi,
    SmDec,
    So,
    Spa,
    Ss2,
    Ss3,
    St,
    Su,
    Sub,
    Tbc,
    Vpa,
    Vpr,
    Vt,
    XtermCllhp,
    XtermIhmt,
    XtermMlhp,
    XtermMuhp,
    XtermRpm,
    XtermRrv,
    XtermRtm,
    XtermSacl1,
    XtermSacl2,
    XtermSacl3,
    XtermSdcs,
    XtermSgfx,
    XtermSpm,
    XtermSrv,
    XtermStm,
    XtermSucs,
    XtermWm,
}

/// Character sets selectable through SCS sequences.
///
/// DEC sets follow the Digital hardware, NRCS are the National Replacement
/// Character Sets, ISO sets follow ISO-8859. The user-preferred supplemental
/// set is host-definable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    None,

    // 96-compat charsets.
    IsoLatin1Supplemental,
    IsoLatin2Supplemental,
    IsoLatin5Supplemental,
    IsoGreekSupplemental,
    IsoHebrewSupplemental,
    IsoLatinCyrillic,

    // 94-compat charsets.
    DecSpecialGraphic,
    DecSupplemental,
    DecTechnical,
    CyrillicDec,
    DutchNrcs,
    FinnishNrcs,
    FrenchNrcs,
    FrenchCanadianNrcs,
    GermanNrcs,
    GreekDec,
    GreekNrcs,
    HebrewDec,
    HebrewNrcs,
    ItalianNrcs,
    NorwegianDanishNrcs,
    PortugueseNrcs,
    RussianNrcs,
    ScsNrcs,
    SpanishNrcs,
    SwedishNrcs,
    SwissNrcs,
    TurkishDec,
    TurkishNrcs,

    // Special charsets.
    UserprefSupplemental,
}

impl Charset {
    /// The British NRCS is identical to ISO Latin-1 supplemental.
    pub const BRITISH_NRCS: Charset = Charset::IsoLatin1Supplemental;
    /// The American NRCS (ASCII) is identical to ISO Latin-2 supplemental.
    pub const AMERICAN_NRCS: Charset = Charset::IsoLatin2Supplemental;

    /// Whether this is one of the 96-code-position charsets.
    #[must_use]
    pub fn is_96(self) -> bool {
        matches!(
            self,
            Charset::IsoLatin1Supplemental
                | Charset::IsoLatin2Supplemental
                | Charset::IsoLatin5Supplemental
                | Charset::IsoGreekSupplemental
                | Charset::IsoHebrewSupplemental
                | Charset::IsoLatinCyrillic
        )
    }

    /// Whether this is a host-definable special charset.
    #[must_use]
    pub fn is_special(self) -> bool {
        matches!(self, Charset::UserprefSupplemental)
    }
}

/// SCS lookup table: final byte + intermediate flags → charset.
///
/// Entries are scanned in order, so earlier tiers win conflicts. The one
/// real collision — `H` designating either ISO Hebrew supplemental or the
/// secondary Swedish NRCS alias — resolves to the ISO 96-set, which is what
/// the VT510 does.
const CHARSET_CMDS: &[(u32, SeqFlags, Charset)] = &[
    // Primary designators.
    ('A' as u32, SeqFlags::empty(), Charset::IsoLatin1Supplemental),
    ('B' as u32, SeqFlags::empty(), Charset::IsoLatin2Supplemental),
    ('M' as u32, SeqFlags::empty(), Charset::IsoLatin5Supplemental),
    ('F' as u32, SeqFlags::empty(), Charset::IsoGreekSupplemental),
    ('H' as u32, SeqFlags::empty(), Charset::IsoHebrewSupplemental),
    ('L' as u32, SeqFlags::empty(), Charset::IsoLatinCyrillic),
    ('0' as u32, SeqFlags::empty(), Charset::DecSpecialGraphic),
    ('5' as u32, SeqFlags::PERCENT, Charset::DecSupplemental),
    ('>' as u32, SeqFlags::empty(), Charset::DecTechnical),
    ('4' as u32, SeqFlags::AND, Charset::CyrillicDec),
    ('4' as u32, SeqFlags::empty(), Charset::DutchNrcs),
    ('5' as u32, SeqFlags::empty(), Charset::FinnishNrcs),
    ('R' as u32, SeqFlags::empty(), Charset::FrenchNrcs),
    ('9' as u32, SeqFlags::empty(), Charset::FrenchCanadianNrcs),
    ('K' as u32, SeqFlags::empty(), Charset::GermanNrcs),
    ('?' as u32, SeqFlags::DQUOTE, Charset::GreekDec),
    ('>' as u32, SeqFlags::DQUOTE, Charset::GreekNrcs),
    ('4' as u32, SeqFlags::DQUOTE, Charset::HebrewDec),
    ('=' as u32, SeqFlags::PERCENT, Charset::HebrewNrcs),
    ('Y' as u32, SeqFlags::empty(), Charset::ItalianNrcs),
    ('`' as u32, SeqFlags::empty(), Charset::NorwegianDanishNrcs),
    ('6' as u32, SeqFlags::PERCENT, Charset::PortugueseNrcs),
    ('5' as u32, SeqFlags::AND, Charset::RussianNrcs),
    ('3' as u32, SeqFlags::PERCENT, Charset::ScsNrcs),
    ('Z' as u32, SeqFlags::empty(), Charset::SpanishNrcs),
    ('7' as u32, SeqFlags::empty(), Charset::SwedishNrcs),
    ('=' as u32, SeqFlags::empty(), Charset::SwissNrcs),
    ('0' as u32, SeqFlags::PERCENT, Charset::TurkishDec),
    ('2' as u32, SeqFlags::PERCENT, Charset::TurkishNrcs),
    ('<' as u32, SeqFlags::empty(), Charset::UserprefSupplemental),
    // Secondary designators.
    ('C' as u32, SeqFlags::empty(), Charset::FinnishNrcs),
    ('f' as u32, SeqFlags::empty(), Charset::FrenchNrcs),
    ('Q' as u32, SeqFlags::empty(), Charset::FrenchCanadianNrcs),
    ('E' as u32, SeqFlags::empty(), Charset::NorwegianDanishNrcs),
    // ('H', empty) for Swedish NRCS is shadowed by ISO Hebrew above.
    ('H' as u32, SeqFlags::empty(), Charset::SwedishNrcs),
    // Tertiary designators.
    ('6' as u32, SeqFlags::empty(), Charset::NorwegianDanishNrcs),
];

fn charset_from_cmd(raw: u32, flags: SeqFlags, require_96: bool) -> Option<Charset> {
    CHARSET_CMDS
        .iter()
        .find(|&&(r, f, cs)| {
            r == raw && f == flags && (!require_96 || cs.is_96() || cs.is_special())
        })
        .map(|&(_, _, cs)| cs)
}

/// Resolve a C0/C1 control character to its command.
///
/// Controls the state machine consumes itself (CAN, ESC, DCS, CSI, ...)
/// resolve to `Command::None`.
#[must_use]
pub fn resolve_control(seq: &Seq) -> Command {
    match seq.terminator {
        0x00 => Command::Null,
        0x05 => Command::Enq,
        0x07 => Command::Bel,
        0x08 => Command::Bs,
        0x09 => Command::Ht,
        0x0a => Command::Lf,
        0x0b => Command::Vt,
        0x0c => Command::Ff,
        0x0d => Command::Cr,
        0x0e => Command::So,
        0x0f => Command::Si,
        0x11 => Command::Dc1,
        0x13 => Command::Dc3,
        0x1a => Command::Sub,
        0x84 => Command::Ind,
        0x85 => Command::Nel,
        0x88 => Command::Hts,
        0x8d => Command::Ri,
        0x8e => Command::Ss2,
        0x8f => Command::Ss3,
        0x96 => Command::Spa,
        0x97 => Command::Epa,
        0x9a => Command::DecId,
        0x9c => Command::St,
        _ => Command::None,
    }
}

/// Resolve an escape sequence from its terminator and intermediates.
///
/// Charset designations (SCS) additionally return the selected charset.
#[must_use]
pub fn resolve_escape(seq: &Seq) -> (Command, Charset) {
    let flags = seq.intermediates;
    let designators = SeqFlags::POPEN
        | SeqFlags::PCLOSE
        | SeqFlags::MULT
        | SeqFlags::PLUS
        | SeqFlags::MINUS
        | SeqFlags::DOT
        | SeqFlags::SLASH;

    let marker = flags & designators;
    if marker.bits().count_ones() == 1 {
        // `(`/`)`/`*`/`+` designate 94-charsets, `-`/`.`/`/` only 96-sets.
        let require_96 = marker
            .intersects(SeqFlags::MINUS | SeqFlags::DOT | SeqFlags::SLASH);
        if let Some(cs) = charset_from_cmd(seq.terminator, flags & !designators, require_96) {
            return (Command::Scs, cs);
        }
        // Looked like a charset designation but was not one; fall through.
    }

    let command = match (seq.terminator, flags) {
        (t, f) if t == '3' as u32 && f == SeqFlags::HASH => Command::DecDhlTop,
        (t, f) if t == '4' as u32 && f == SeqFlags::HASH => Command::DecDhlBottom,
        (t, f) if t == '5' as u32 && f == SeqFlags::HASH => Command::DecSwl,
        (t, f) if t == '6' as u32 && f.is_empty() => Command::DecBi,
        (t, f) if t == '6' as u32 && f == SeqFlags::HASH => Command::DecDwl,
        (t, f) if t == '7' as u32 && f.is_empty() => Command::DecSc,
        (t, f) if t == '8' as u32 && f.is_empty() => Command::DecRc,
        (t, f) if t == '8' as u32 && f == SeqFlags::HASH => Command::DecAln,
        (t, f) if t == '9' as u32 && f.is_empty() => Command::DecFi,
        (t, f) if t == '<' as u32 && f.is_empty() => Command::DecAnm,
        (t, f) if t == '=' as u32 && f.is_empty() => Command::DecKpam,
        (t, f) if t == '>' as u32 && f.is_empty() => Command::DecKpnm,
        (t, f) if t == '@' as u32 && f == SeqFlags::PERCENT => Command::XtermSdcs,
        (t, f) if t == 'D' as u32 && f.is_empty() => Command::Ind,
        (t, f) if t == 'E' as u32 && f.is_empty() => Command::Nel,
        (t, f) if t == 'F' as u32 && f.is_empty() => Command::XtermCllhp,
        (t, f) if t == 'F' as u32 && f == SeqFlags::SPACE => Command::S7c1t,
        (t, f) if t == 'G' as u32 && f == SeqFlags::SPACE => Command::S8c1t,
        (t, f) if t == 'G' as u32 && f == SeqFlags::PERCENT => Command::XtermSucs,
        (t, f) if t == 'H' as u32 && f.is_empty() => Command::Hts,
        (t, f) if t == 'L' as u32 && f == SeqFlags::SPACE => Command::XtermSacl1,
        (t, f) if t == 'M' as u32 && f.is_empty() => Command::Ri,
        (t, f) if t == 'M' as u32 && f == SeqFlags::SPACE => Command::XtermSacl2,
        (t, f) if t == 'N' as u32 && f.is_empty() => Command::Ss2,
        (t, f) if t == 'N' as u32 && f == SeqFlags::SPACE => Command::XtermSacl3,
        (t, f) if t == 'O' as u32 && f.is_empty() => Command::Ss3,
        (t, f) if t == 'V' as u32 && f.is_empty() => Command::Spa,
        (t, f) if t == 'W' as u32 && f.is_empty() => Command::Epa,
        (t, f) if t == 'Z' as u32 && f.is_empty() => Command::DecId,
        (t, f) if t == '\\' as u32 && f.is_empty() => Command::St,
        (t, f) if t == 'c' as u32 && f.is_empty() => Command::Ris,
        (t, f) if t == 'l' as u32 && f.is_empty() => Command::XtermMlhp,
        (t, f) if t == 'm' as u32 && f.is_empty() => Command::XtermMuhp,
        (t, f) if t == 'n' as u32 && f.is_empty() => Command::Ls2,
        (t, f) if t == 'o' as u32 && f.is_empty() => Command::Ls3,
        (t, f) if t == '|' as u32 && f.is_empty() => Command::Ls3r,
        (t, f) if t == '}' as u32 && f.is_empty() => Command::Ls2r,
        (t, f) if t == '~' as u32 && f.is_empty() => Command::Ls1r,
        _ => Command::None,
    };

    (command, Charset::None)
}

/// Resolve a CSI sequence from terminator, intermediates, and arguments.
///
/// The known-ambiguous finals are resolved here where the argument count
/// decides (`T`, `r` with `?`) and deferred to the screen where mode state
/// is needed (`s`).
#[must_use]
pub fn resolve_csi(seq: &Seq) -> Command {
    let flags = seq.intermediates;
    let none = SeqFlags::empty();

    // Terminator values are plain ASCII finals (0x40..=0x7e).
    let Some(term) = char::from_u32(seq.terminator) else {
        return Command::None;
    };

    match term {
        'A' if flags == none => Command::Cuu,
        'a' if flags == none => Command::Hpr,
        'B' if flags == none => Command::Cud,
        'b' if flags == none => Command::Rep,
        'C' if flags == none => Command::Cuf,
        'c' if flags == none => Command::Da1,
        'c' if flags == SeqFlags::GT => Command::Da2,
        'c' if flags == SeqFlags::EQUAL => Command::Da3,
        'D' if flags == none => Command::Cub,
        'd' if flags == none => Command::Vpa,
        'E' if flags == none => Command::Cnl,
        'e' if flags == none => Command::Vpr,
        'F' if flags == none => Command::Cpl,
        'f' if flags == none => Command::Hvp,
        'G' if flags == none => Command::Cha,
        'g' if flags == none => Command::Tbc,
        'g' if flags == SeqFlags::MULT => Command::DecLfkc,
        'H' if flags == none => Command::Cup,
        'h' if flags == none => Command::SmAnsi,
        'h' if flags == SeqFlags::WHAT => Command::SmDec,
        'I' if flags == none => Command::Cht,
        'i' if flags == none => Command::McAnsi,
        'i' if flags == SeqFlags::WHAT => Command::McDec,
        'J' if flags == none => Command::Ed,
        'J' if flags == SeqFlags::WHAT => Command::DecSed,
        'K' if flags == none => Command::El,
        'K' if flags == SeqFlags::WHAT => Command::DecSel,
        'L' if flags == none => Command::Il,
        'l' if flags == none => Command::RmAnsi,
        'l' if flags == SeqFlags::WHAT => Command::RmDec,
        'M' if flags == none => Command::Dl,
        'm' if flags == none => Command::Sgr,
        'm' if flags == SeqFlags::GT => Command::XtermSrv,
        'n' if flags == none => Command::DsrAnsi,
        'n' if flags == SeqFlags::GT => Command::XtermRrv,
        'n' if flags == SeqFlags::WHAT => Command::DsrDec,
        'P' if flags == none => Command::Dch,
        'P' if flags == SeqFlags::SPACE => Command::Ppa,
        'p' if flags == none => Command::DecSsl,
        'p' if flags == SeqFlags::SPACE => Command::DecSscls,
        'p' if flags == SeqFlags::BANG => Command::DecStr,
        'p' if flags == SeqFlags::DQUOTE => Command::DecScl,
        'p' if flags == SeqFlags::CASH => Command::DecRqmAnsi,
        'p' if flags == SeqFlags::CASH.union(SeqFlags::WHAT) => Command::DecRqmDec,
        'p' if flags == SeqFlags::PCLOSE => Command::DecSdpt,
        'p' if flags == SeqFlags::MULT => Command::DecSppcs,
        'p' if flags == SeqFlags::PLUS => Command::DecSr,
        'p' if flags == SeqFlags::COMMA => Command::DecLtod,
        'p' if flags == SeqFlags::GT => Command::XtermSpm,
        'Q' if flags == SeqFlags::SPACE => Command::Ppr,
        'q' if flags == none => Command::DecLl,
        'q' if flags == SeqFlags::SPACE => Command::DecScusr,
        'q' if flags == SeqFlags::DQUOTE => Command::DecSca,
        'q' if flags == SeqFlags::CASH => Command::DecSddt,
        'q' if flags == SeqFlags::MULT => Command::DecSr,
        'q' if flags == SeqFlags::PLUS => Command::DecElf,
        'q' if flags == SeqFlags::COMMA => Command::DecTid,
        'R' if flags == SeqFlags::SPACE => Command::Ppb,
        'r' if flags == none => Command::DecStbm,
        'r' if flags == SeqFlags::SPACE => Command::DecSkcv,
        'r' if flags == SeqFlags::CASH => Command::DecCara,
        'r' if flags == SeqFlags::MULT => Command::DecScs,
        'r' if flags == SeqFlags::PLUS => Command::DecSmkr,
        'r' if flags == SeqFlags::WHAT => {
            // XTERM-RPM takes a single argument, DECPCTERM takes two; split
            // on the count and forward to the closer match.
            if seq.n_args <= 1 {
                Command::XtermRpm
            } else {
                Command::DecPcterm
            }
        }
        'S' if flags == none => Command::Su,
        'S' if flags == SeqFlags::WHAT => Command::XtermSgfx,
        's' if flags == none => Command::DecSlrmOrSc,
        's' if flags == SeqFlags::CASH => Command::DecSprtt,
        's' if flags == SeqFlags::MULT => Command::DecSfc,
        's' if flags == SeqFlags::WHAT => Command::XtermSpm,
        'T' if flags == none => {
            // XTERM-IHMT wants exactly five arguments, SD at most one; be
            // lenient and split at five to allow unused arguments.
            if seq.n_args >= 5 {
                Command::XtermIhmt
            } else {
                Command::Sd
            }
        }
        'T' if flags == SeqFlags::GT => Command::XtermRtm,
        't' if flags == none => {
            // XTERM-WM and DECSLPP overlap for small first arguments; xterm
            // compatibility wins.
            Command::XtermWm
        }
        't' if flags == SeqFlags::SPACE => Command::DecSwbv,
        't' if flags == SeqFlags::DQUOTE => Command::DecSrfr,
        't' if flags == SeqFlags::CASH => Command::DecRara,
        't' if flags == SeqFlags::GT => Command::XtermStm,
        'U' if flags == none => Command::Np,
        'u' if flags == none => Command::Rc,
        'u' if flags == SeqFlags::SPACE => Command::DecSmbv,
        'u' if flags == SeqFlags::DQUOTE => Command::DecStrl,
        'u' if flags == SeqFlags::WHAT => Command::DecRqupss,
        'u' if flags == SeqFlags::CASH && seq.args[0] == 1 => Command::DecRqtsr,
        'u' if flags == SeqFlags::MULT => Command::DecScp,
        'u' if flags == SeqFlags::COMMA => Command::DecRqkt,
        'V' if flags == none => Command::Pp,
        'v' if flags == SeqFlags::SPACE => Command::DecSlck,
        'v' if flags == SeqFlags::DQUOTE => Command::DecRqde,
        'v' if flags == SeqFlags::CASH => Command::DecCra,
        'v' if flags == SeqFlags::COMMA => Command::DecRpkt,
        'W' if flags == SeqFlags::WHAT && seq.args[0] == 5 => Command::DecSt8c,
        'w' if flags == SeqFlags::CASH => Command::DecRqpsr,
        'w' if flags == SeqFlags::SQUOTE => Command::DecEfr,
        'w' if flags == SeqFlags::PLUS => Command::DecSpp,
        'X' if flags == none => Command::Ech,
        'x' if flags == none => Command::DecReqtparm,
        'x' if flags == SeqFlags::CASH => Command::DecFra,
        'x' if flags == SeqFlags::MULT => Command::DecSace,
        'x' if flags == SeqFlags::PLUS => Command::DecRqpkfm,
        'y' if flags == none => Command::DecTst,
        'y' if flags == SeqFlags::MULT => Command::DecRqcra,
        'y' if flags == SeqFlags::PLUS => Command::DecPkfmr,
        'Z' if flags == none => Command::Cbt,
        'z' if flags == SeqFlags::CASH => Command::DecEra,
        'z' if flags == SeqFlags::SQUOTE => Command::DecElr,
        'z' if flags == SeqFlags::MULT => Command::DecInvm,
        'z' if flags == SeqFlags::PLUS => Command::DecPka,
        '@' if flags == none => Command::Ich,
        '`' if flags == none => Command::Hpa,
        '{' if flags == SeqFlags::CASH => Command::DecSera,
        '{' if flags == SeqFlags::SQUOTE => Command::DecSle,
        '|' if flags == SeqFlags::CASH => Command::DecScpp,
        '|' if flags == SeqFlags::SQUOTE => Command::DecRqlp,
        '|' if flags == SeqFlags::MULT => Command::DecSnls,
        '}' if flags == SeqFlags::SPACE => Command::DecKbd,
        '}' if flags == SeqFlags::CASH => Command::DecSasd,
        '}' if flags == SeqFlags::SQUOTE => Command::DecIc,
        '~' if flags == SeqFlags::SPACE => Command::DecTme,
        '~' if flags == SeqFlags::CASH => Command::DecSsdt,
        '~' if flags == SeqFlags::SQUOTE => Command::DecDc,
        _ => Command::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn feed_str(parser: &mut Parser, input: &str) -> Option<(Command, Charset, usize)> {
        let mut last = None;
        for ch in input.chars() {
            if let Some(seq) = parser.feed(u32::from(ch)) {
                last = Some((seq.command, seq.charset, seq.n_args));
            }
        }
        last
    }

    #[test]
    fn csi_finals_resolve() {
        let mut parser = Parser::new();
        assert_eq!(feed_str(&mut parser, "\x1b[H").unwrap().0, Command::Cup);
        assert_eq!(feed_str(&mut parser, "\x1b[2J").unwrap().0, Command::Ed);
        assert_eq!(feed_str(&mut parser, "\x1b[1;31m").unwrap().0, Command::Sgr);
        assert_eq!(feed_str(&mut parser, "\x1b[?25h").unwrap().0, Command::SmDec);
        assert_eq!(feed_str(&mut parser, "\x1b[!p").unwrap().0, Command::DecStr);
        assert_eq!(feed_str(&mut parser, "\x1b[\"q").unwrap().0, Command::DecSca);
        assert_eq!(feed_str(&mut parser, "\x1b[r").unwrap().0, Command::DecStbm);
    }

    #[test]
    fn ambiguous_t_resolves_by_argument_count() {
        let mut parser = Parser::new();
        assert_eq!(feed_str(&mut parser, "\x1b[T").unwrap().0, Command::Sd);
        assert_eq!(feed_str(&mut parser, "\x1b[2T").unwrap().0, Command::Sd);
        assert_eq!(
            feed_str(&mut parser, "\x1b[1;2;3;4;5T").unwrap().0,
            Command::XtermIhmt
        );
    }

    #[test]
    fn ambiguous_question_r_resolves_by_argument_count() {
        let mut parser = Parser::new();
        assert_eq!(feed_str(&mut parser, "\x1b[?1r").unwrap().0, Command::XtermRpm);
        assert_eq!(
            feed_str(&mut parser, "\x1b[?1;2r").unwrap().0,
            Command::DecPcterm
        );
    }

    #[test]
    fn bare_s_stays_compound() {
        let mut parser = Parser::new();
        assert_eq!(
            feed_str(&mut parser, "\x1b[s").unwrap().0,
            Command::DecSlrmOrSc
        );
    }

    #[test]
    fn escape_finals_resolve() {
        let mut parser = Parser::new();
        assert_eq!(feed_str(&mut parser, "\x1bc").unwrap().0, Command::Ris);
        assert_eq!(feed_str(&mut parser, "\x1b7").unwrap().0, Command::DecSc);
        assert_eq!(feed_str(&mut parser, "\x1b8").unwrap().0, Command::DecRc);
        assert_eq!(feed_str(&mut parser, "\x1b#8").unwrap().0, Command::DecAln);
        assert_eq!(feed_str(&mut parser, "\x1bD").unwrap().0, Command::Ind);
        assert_eq!(feed_str(&mut parser, "\x1bM").unwrap().0, Command::Ri);
        assert_eq!(feed_str(&mut parser, "\x1bE").unwrap().0, Command::Nel);
    }

    #[test]
    fn scs_designates_charsets() {
        let mut parser = Parser::new();
        let (cmd, cs, _) = feed_str(&mut parser, "\x1b(0").unwrap();
        assert_eq!(cmd, Command::Scs);
        assert_eq!(cs, Charset::DecSpecialGraphic);

        let (cmd, cs, _) = feed_str(&mut parser, "\x1b)B").unwrap();
        assert_eq!(cmd, Command::Scs);
        assert_eq!(cs, Charset::AMERICAN_NRCS);

        let (cmd, cs, _) = feed_str(&mut parser, "\x1b(%5").unwrap();
        assert_eq!(cmd, Command::Scs);
        assert_eq!(cs, Charset::DecSupplemental);
    }

    #[test]
    fn scs_conflict_prefers_iso_96_set() {
        // ESC - H: 96-only designator, 'H' must resolve to ISO Hebrew,
        // not the Swedish NRCS alias.
        let mut parser = Parser::new();
        let (cmd, cs, _) = feed_str(&mut parser, "\x1b-H").unwrap();
        assert_eq!(cmd, Command::Scs);
        assert_eq!(cs, Charset::IsoHebrewSupplemental);

        // ESC ( H: 94-designator accepts the first match, still ISO Hebrew
        // by table order (VT510 compatible).
        let (cmd, cs, _) = feed_str(&mut parser, "\x1b(H").unwrap();
        assert_eq!(cmd, Command::Scs);
        assert_eq!(cs, Charset::IsoHebrewSupplemental);
    }

    #[test]
    fn charset_96_designator_rejects_94_sets() {
        // ESC - 0: DEC special graphics is a 94-set; a 96-only designator
        // must not select it.
        let mut parser = Parser::new();
        let (cmd, _, _) = feed_str(&mut parser, "\x1b-0").unwrap();
        assert_eq!(cmd, Command::None);
    }

    #[test]
    fn control_characters_resolve() {
        let mut parser = Parser::new();
        assert_eq!(feed_str(&mut parser, "\x07").unwrap().0, Command::Bel);
        assert_eq!(feed_str(&mut parser, "\x0d").unwrap().0, Command::Cr);
        assert_eq!(feed_str(&mut parser, "\x0a").unwrap().0, Command::Lf);
        assert_eq!(feed_str(&mut parser, "\x09").unwrap().0, Command::Ht);
    }
}
