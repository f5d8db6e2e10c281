//! End-to-end conformance scenarios for the terminal core.
//!
//! Each test drives the public API the way the surrounding console does and
//! checks exact cell, history, and parser state afterwards.

use devcon_core::{
    Attr, Char, CharBuf, Command, History, Page, Parser, SeqType, Utf8,
};

fn resolve_first(ch: &Char) -> Option<char> {
    let mut buf = CharBuf::default();
    ch.resolve(&mut buf).first().copied().and_then(char::from_u32)
}

fn page(cols: usize, rows: usize) -> Page {
    let mut page = Page::new();
    page.reserve(cols, rows, Attr::default(), 0).unwrap();
    page.resize(cols, rows, Attr::default(), 0, None);
    page
}

#[test]
fn scroll_up_hands_lines_to_history() {
    let mut page = page(4, 4);
    let mut history = History::with_max_lines(8);

    for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
        page.write(0, y, Char::from_ucs4(u32::from(tag)), 1, Attr::default(), 1, false);
    }

    page.scroll_up(2, Attr::default(), 1, Some(&mut history));

    assert_eq!(
        resolve_first(&page.get_cell(0, 0).unwrap().ch),
        Some('C')
    );
    assert_eq!(
        resolve_first(&page.get_cell(0, 1).unwrap().ch),
        Some('D')
    );
    for y in 2..4 {
        for x in 0..4 {
            assert!(page.get_cell(x, y).unwrap().ch.is_null());
        }
    }

    assert_eq!(history.len(), 2);
    let first = history.pop(4, Attr::default(), 2).unwrap();
    assert_eq!(resolve_first(&first.cell(0).unwrap().ch), Some('B'));
    let second = history.pop(4, Attr::default(), 2).unwrap();
    assert_eq!(resolve_first(&second.cell(0).unwrap().ch), Some('A'));
}

#[test]
fn insert_write_shifts_and_drops_tail() {
    let mut page = page(4, 1);
    for (x, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
        page.write(x, 0, Char::from_ucs4(u32::from(tag)), 1, Attr::default(), 1, false);
    }

    page.write(1, 0, Char::from_ucs4(u32::from('X')), 1, Attr::default(), 2, true);

    let row: Vec<Option<char>> = (0..4)
        .map(|x| resolve_first(&page.get_cell(x, 0).unwrap().ch))
        .collect();
    assert_eq!(row, vec![Some('A'), Some('X'), Some('B'), Some('C')]);
    assert_eq!(page.line(0).unwrap().fill(), 4);
}

#[test]
fn erase_skips_protected_cell_and_adjusts_fill() {
    use devcon_core::AttrFlags;

    let mut page = page(5, 1);
    for (x, tag) in ['A', 'B', 'C', 'D', 'E'].into_iter().enumerate() {
        let attr = if x == 2 {
            Attr {
                flags: AttrFlags::PROTECT,
                ..Attr::default()
            }
        } else {
            Attr::default()
        };
        page.write(x, 0, Char::from_ucs4(u32::from(tag)), 1, attr, 1, false);
    }

    page.erase(0, 0, 5, 0, Attr::default(), 2, true);

    let row: Vec<Option<char>> = (0..5)
        .map(|x| resolve_first(&page.get_cell(x, 0).unwrap().ch))
        .collect();
    assert_eq!(row, vec![None, None, Some('C'), None, None]);
    assert_eq!(page.line(0).unwrap().fill(), 3);
}

#[test]
fn combining_soft_limit_keeps_sixty_five_points() {
    let mut ch = Char::from_ucs4(u32::from('a'));
    for i in 0..64u32 {
        ch = ch.merge(0x300 + i);
    }

    let mut buf = CharBuf::default();
    assert_eq!(ch.resolve(&mut buf).len(), 65);

    // The 65th combining mark is dropped, the length stays put.
    ch = ch.merge(0x364);
    assert_eq!(ch.resolve(&mut buf).len(), 65);
}

#[test]
fn parser_dispatches_cup_with_args() {
    let mut parser = Parser::new();

    let mut dispatched = None;
    for &raw in &[0x1b_u32, 0x5b, 0x31, 0x3b, 0x32, 0x48] {
        if let Some(seq) = parser.feed(raw) {
            dispatched = Some((
                seq.seq_type,
                seq.command,
                seq.n_args,
                seq.args[0],
                seq.args[1],
                seq.intermediates.bits(),
            ));
        }
    }

    assert_eq!(
        dispatched,
        Some((SeqType::Csi, Command::Cup, 2, 1, 2, 0))
    );
}

#[test]
fn utf8_fallback_flows_through_parser() {
    let mut decoder = Utf8::new();
    let mut parser = Parser::new();

    let mut seen = Vec::new();
    for &byte in &[0xc3_u8, 0x28, 0x1b, 0x63] {
        let points = decoder.feed(byte).to_vec();
        for raw in points {
            if let Some(seq) = parser.feed(raw) {
                seen.push((seq.seq_type, seq.command, seq.terminator));
            }
        }
    }

    assert_eq!(
        seen,
        vec![
            (SeqType::Graphic, Command::Graphic, 0xc3),
            (SeqType::Graphic, Command::Graphic, 0x28),
            (SeqType::Escape, Command::Ris, u32::from('c')),
        ]
    );
}

#[test]
fn scroll_up_then_down_restores_visible_lines() {
    let mut page = page(4, 4);
    let mut history = History::with_max_lines(8);

    for (y, tag) in ['A', 'B', 'C', 'D'].into_iter().enumerate() {
        page.write(0, y, Char::from_ucs4(u32::from(tag)), 1, Attr::default(), 1, false);
    }

    page.scroll_up(3, Attr::default(), 2, Some(&mut history));
    assert_eq!(history.len(), 3);
    page.scroll_down(3, Attr::default(), 3, Some(&mut history));

    let col: Vec<Option<char>> = (0..4)
        .map(|y| resolve_first(&page.get_cell(0, y).unwrap().ch))
        .collect();
    assert_eq!(col, vec![Some('A'), Some('B'), Some('C'), Some('D')]);
    assert!(history.is_empty());
}

#[test]
fn no_line_lives_in_page_and_history_at_once() {
    // Ownership transfer is a move; counting lines on both sides across a
    // scroll round-trip shows nothing is duplicated or lost.
    let mut page = page(3, 3);
    let mut history = History::with_max_lines(16);

    for round in 0..4 {
        page.scroll_up(2, Attr::default(), round + 1, Some(&mut history));
        assert_eq!(page.n_lines(), 3);
        assert_eq!(history.len(), ((round as usize) + 1) * 2);
    }

    while history.pop(3, Attr::default(), 9).is_some() {}
    assert_eq!(page.n_lines(), 3);
}
