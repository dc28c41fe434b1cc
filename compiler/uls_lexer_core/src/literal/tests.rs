use super::*;
use crate::token::TokenArena;
use pretty_assertions::assert_eq;

fn quote(start: &str, end: &str, escapes: Option<EscapeMap>) -> QuoteType {
    let view = TokenArena::new().find_by_name("ID").unwrap();
    let q = QuoteType::new(start, end, view);
    match escapes {
        Some(map) => q.with_escapes(map),
        None => q,
    }
}

fn decode(q: &QuoteType, body: &str) -> Result<Vec<u8>, DecodeError> {
    q.decode(body.as_bytes()).map(|d| d.text)
}

/// Feed `body` to the decoder in chunks of `chunk` bytes, the way the
/// input layer does when refills happen inside the literal.
fn decode_chunked(q: &QuoteType, body: &[u8], chunk: usize) -> Result<Decoded, DecodeError> {
    let mut out = Vec::new();
    let mut avail = chunk.min(body.len());
    let mut pos = 0;
    let mut newlines = 0;
    let mut state = DecodeState::Plain;
    while state != DecodeState::Done {
        let at_end = avail == body.len();
        let (next, adv) = q.step(state, &body[pos..avail], at_end, &mut out)?;
        pos += adv.consumed;
        newlines += adv.newlines;
        let stalled = next == state && adv.consumed == 0;
        state = next;
        if stalled || avail - pos < adv.need {
            if at_end {
                if stalled {
                    return Err(DecodeError::Unterminated);
                }
                continue;
            }
            avail = (avail + chunk).min(body.len());
        }
    }
    Ok(Decoded {
        text: out,
        raw_len: pos + q.end().len(),
        newlines,
    })
}

// === Plain text and end marks ===

#[test]
fn plain_body_stops_before_end_mark() {
    let q = quote("\"", "\"", None);
    let d = q.decode(b"abc\" tail").unwrap();
    assert_eq!(d.text, b"abc");
    assert_eq!(d.raw_len, 4);
    assert_eq!(d.newlines, 0);
}

#[test]
fn asymmetric_multi_byte_end_mark() {
    let q = quote("<<", ">>", None);
    assert!(q.flags().contains(QuoteFlags::ASYMMETRIC));
    let d = q.decode(b"a > b>> rest").unwrap();
    assert_eq!(d.text, b"a > b");
    assert_eq!(d.raw_len, 7);
}

#[test]
fn right_exclusive_leaves_end_mark() {
    let q = quote("#", "\n", None).with_flags(QuoteFlags::R_EXCLUSIVE);
    let d = q.decode(b"pragma once\nint").unwrap();
    assert_eq!(d.text, b"pragma once");
    assert_eq!(d.raw_len, 11);
    assert_eq!(d.newlines, 0);
}

#[test]
fn missing_end_mark_is_unterminated() {
    let q = quote("'", "'", Some(EscapeMap::modern()));
    assert_eq!(decode(&q, "abc"), Err(DecodeError::Unterminated));
    assert_eq!(decode(&q, "abc\\"), Err(DecodeError::Unterminated));
    let long = quote("[[", "]]", None);
    assert_eq!(decode(&long, "x]"), Err(DecodeError::Unterminated));
}

#[test]
fn newline_needs_multiline() {
    let single = quote("\"", "\"", None);
    assert_eq!(decode(&single, "a\nb\""), Err(DecodeError::Newline));
    let multi = quote("\"", "\"", None).with_flags(QuoteFlags::MULTILINE);
    let d = multi.decode(b"a\nb\n\"").unwrap();
    assert_eq!(d.text, b"a\nb\n");
    assert_eq!(d.newlines, 2);
}

#[test]
fn escaped_newline_is_counted_in_single_line_literal() {
    let q = quote("\"", "\"", Some(EscapeMap::legacy()));
    let d = q.decode(b"a\\\nb\"").unwrap();
    assert_eq!(d.text, b"a\\\nb");
    assert_eq!(d.newlines, 1);
}

#[test]
fn nothing_and_open_quotes_have_no_body() {
    let q = quote("@@", "", None).with_flags(QuoteFlags::OPEN);
    assert!(!q.has_body());
    let d = q.decode(b"whatever").unwrap();
    assert_eq!(d.text, b"");
    assert_eq!(d.raw_len, 0);
}

// === Escapes ===

#[test]
fn hex_escape_emits_byte() {
    let q = quote("\"", "\"", Some(EscapeMap::legacy_full()));
    assert_eq!(decode(&q, "a\\x41b\"").unwrap(), b"aAb");
    assert_eq!(decode(&q, "\\xff\"").unwrap(), vec![0xFF]);
}

#[test]
fn hex_digits_stop_at_first_non_digit() {
    let q = quote("\"", "\"", Some(EscapeMap::legacy_full()));
    assert_eq!(decode(&q, "\\x4g\"").unwrap(), b"\x04g");
    assert_eq!(decode(&q, "\\x4\"").unwrap(), b"\x04");
}

#[test]
fn numeric_escape_without_digits_is_invalid() {
    let q = quote("\"", "\"", Some(EscapeMap::legacy_full()));
    assert_eq!(decode(&q, "\\xg\""), Err(DecodeError::InvalidEscape('x')));
}

#[test]
fn octal_escape_is_seeded_by_selector() {
    let q = quote("\"", "\"", Some(EscapeMap::legacy_full()));
    assert_eq!(decode(&q, "\\101\"").unwrap(), b"A");
    assert_eq!(decode(&q, "\\0\"").unwrap(), b"\0");
    assert_eq!(decode(&q, "\\18\"").unwrap(), b"\x018");
    assert_eq!(decode(&q, "\\1234\"").unwrap(), b"S4");
}

#[test]
fn unicode_escapes_emit_utf8() {
    let q = quote("\"", "\"", Some(EscapeMap::modern()));
    assert_eq!(decode(&q, "\\u00e9\"").unwrap(), "é".as_bytes());
    assert_eq!(decode(&q, "\\U0001F600\"").unwrap(), "😀".as_bytes());
    assert_eq!(decode(&q, "\\uD800\""), Err(DecodeError::InvalidEscape('u')));
}

#[test]
fn fixed_escapes() {
    let q = quote("\"", "\"", Some(EscapeMap::modern()));
    assert_eq!(decode(&q, "\\n\\t\\\"\\\\\\0\"").unwrap(), b"\n\t\"\\\0");
}

#[test]
fn unknown_escape_is_copied_verbatim() {
    let q = quote("\"", "\"", Some(EscapeMap::modern()));
    assert_eq!(decode(&q, "\\q\\é\"").unwrap(), "\\q\\é".as_bytes());
    let verbatim = quote("\"", "\"", Some(EscapeMap::verbatim()));
    assert_eq!(decode(&verbatim, "\\n\"").unwrap(), b"\\n");
}

#[test]
fn escaped_end_mark_does_not_terminate() {
    let q = quote("'", "'", Some(EscapeMap::legacy_full()));
    let d = q.decode(b"it\\'s' x").unwrap();
    assert_eq!(d.text, b"it's");
    assert_eq!(d.raw_len, 6);
}

#[test]
fn without_escape_map_backslash_is_plain() {
    let q = quote("\"", "\"", None);
    assert_eq!(decode(&q, "a\\\"").unwrap(), b"a\\");
}

#[test]
fn malformed_utf8_selector() {
    let q = quote("\"", "\"", Some(EscapeMap::modern()));
    assert_eq!(q.decode(b"\\\xFF\"").unwrap_err(), DecodeError::Encoding);
}

#[test]
fn every_escape_kind_round_trips_to_code_points() {
    let mut map = EscapeMap::modern();
    map.set(
        u32::from(b'x'),
        EscapeKind::Numeric {
            radix: Radix::Hex,
            max_digits: 2,
            emit: Emit::Unicode,
            seeded: false,
        },
    )
    .unwrap();
    map.set(
        u32::from(b'o'),
        EscapeKind::Numeric {
            radix: Radix::Octal,
            max_digits: 3,
            emit: Emit::Unicode,
            seeded: false,
        },
    )
    .unwrap();
    let q = quote("\"", "\"", Some(map));
    let text = decode(&q, "\\t\\x41\\o102\\u00e9\\U0001F600\"").unwrap();
    let chars: Vec<char> = String::from_utf8(text).unwrap().chars().collect();
    assert_eq!(chars, vec!['\t', 'A', 'B', 'é', '😀']);
}

// === Resumption across refills ===

#[test]
fn split_inside_escape_resumes() {
    let q = quote("\"", "\"", Some(EscapeMap::modern()));
    let mut out = Vec::new();
    let (state, adv) = q.step(DecodeState::Plain, b"ab\\u0", false, &mut out).unwrap();
    assert_eq!(state, DecodeState::EscapeSelect);
    assert_eq!(adv.consumed, 3);
    let (state, adv) = q.step(state, b"u0", false, &mut out).unwrap();
    assert!(matches!(state, DecodeState::EscapeDigits { remaining: 4, .. }));
    assert_eq!(adv.need, 4);
    let (state, adv) = q.step(state, b"0", false, &mut out).unwrap();
    assert!(matches!(state, DecodeState::EscapeDigits { remaining: 3, read: 1, .. }));
    assert_eq!(adv.consumed, 1);
    let (state, _) = q.step(state, b"0e9\"", false, &mut out).unwrap();
    assert_eq!(state, DecodeState::Plain);
    let (state, adv) = q.step(state, b"\"", false, &mut out).unwrap();
    assert_eq!(state, DecodeState::Done);
    assert_eq!(adv.consumed, 0);
    assert_eq!(out, "abé".as_bytes());
}

#[test]
fn split_end_mark_asks_for_more() {
    let q = quote("<<", ">>", None);
    let mut out = Vec::new();
    let (state, adv) = q.step(DecodeState::Plain, b"ab>", false, &mut out).unwrap();
    assert_eq!(state, DecodeState::Plain);
    assert_eq!(adv.consumed, 2);
    assert_eq!(adv.need, 2);
    let (state, _) = q.step(state, b">>", false, &mut out).unwrap();
    assert_eq!(state, DecodeState::Done);
    assert_eq!(out, b"ab");
}

#[test]
fn incomplete_selector_waits() {
    let q = quote("\"", "\"", Some(EscapeMap::modern()));
    let mut out = Vec::new();
    let e_acute = "é".as_bytes();
    let (state, adv) = q
        .step(DecodeState::EscapeSelect, &e_acute[..1], false, &mut out)
        .unwrap();
    assert_eq!(state, DecodeState::EscapeSelect);
    assert_eq!(adv, Advance { consumed: 0, need: 2, newlines: 0 });
}

#[derive(Debug)]
struct Upper;

impl LiteralAnalyzer for Upper {
    fn step(
        &self,
        quote: &QuoteType,
        state: DecodeState,
        input: &[u8],
        at_end: bool,
        out: &mut Vec<u8>,
    ) -> Result<(DecodeState, Advance), DecodeError> {
        let start = out.len();
        let result = state.step(quote, input, at_end, out)?;
        out[start..].make_ascii_uppercase();
        Ok(result)
    }
}

#[test]
fn custom_analyzer_replaces_decoding() {
    let q = quote("`", "`", None).with_analyzer(Arc::new(Upper));
    assert_eq!(decode(&q, "shout`").unwrap(), b"SHOUT");
}

mod proptest_split {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn chunking_never_changes_output(
            body in "([a-z ]|\\\\n|\\\\x4[0-9a-f]|\\\\u00e[0-9]|\\\\[0-7]{1,3}|é){0,12}",
            chunk in 1usize..8,
        ) {
            let mut map = EscapeMap::modern();
            map.set(u32::from(b'x'), EscapeKind::Numeric {
                radix: Radix::Hex, max_digits: 2, emit: Emit::Byte, seeded: false,
            }).unwrap();
            for ch in b'1'..=b'7' {
                map.set(u32::from(ch), EscapeKind::Numeric {
                    radix: Radix::Octal, max_digits: 2, emit: Emit::Byte, seeded: true,
                }).unwrap();
            }
            map.set(u32::from(b'0'), EscapeKind::Numeric {
                radix: Radix::Octal, max_digits: 2, emit: Emit::Byte, seeded: true,
            }).unwrap();
            let q = quote("\"", "\"", Some(map));
            let raw = format!("{body}\"");
            let whole = q.decode(raw.as_bytes()).unwrap();
            let split = decode_chunked(&q, raw.as_bytes(), chunk).unwrap();
            prop_assert_eq!(whole, split);
        }
    }
}
