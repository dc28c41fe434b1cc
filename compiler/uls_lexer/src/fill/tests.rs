use std::io::{self, Read};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use uls_lexer_core::{EscapeMap, QuoteFlags};

use super::*;
use crate::spec::QuoteDef;

/// Reader returning one byte per call.
struct OneByte(io::Cursor<Vec<u8>>);

impl Read for OneByte {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(1);
        self.0.read(&mut buf[..n])
    }
}

fn c_like() -> Arc<LexSpec> {
    LexSpec::builder("c-like")
        .quote(QuoteDef::new("\"", "\"").escapes(EscapeMap::legacy_full()))
        .comment("/*", "*/", CommentFlags::empty())
        .line_comment("//")
        .build()
        .unwrap()
}

fn raw(text: &str, trickle: bool) -> RawInput {
    let bytes = text.as_bytes().to_vec();
    if trickle {
        RawInput::new(Box::new(OneByte(io::Cursor::new(bytes))))
    } else {
        RawInput::new(Box::new(io::Cursor::new(bytes)))
    }
}

fn cook_with(spec: &LexSpec, text: &str, trickle: bool) -> Result<Fill, LexErrorKind> {
    let mut raw = raw(text, trickle);
    let mut fill = Fill::default();
    let mut bol = true;
    refill(spec, &mut raw, &mut fill, &mut bol, None)?;
    Ok(fill)
}

fn cooked(fill: &Fill) -> &str {
    std::str::from_utf8(&fill.cooked).unwrap()
}

fn literals(fill: &Fill) -> Vec<String> {
    fill.segs
        .iter()
        .filter_map(|seg| seg.literal.as_ref())
        .map(|lit| String::from_utf8_lossy(fill.literal_text(lit)).into_owned())
        .collect()
}

// === Comments ===

#[test]
fn block_comment_becomes_one_space() {
    let fill = cook_with(&c_like(), "a /* x */ b\n", false).unwrap();
    assert_eq!(cooked(&fill), "a   b\n");
}

#[test]
fn block_comment_keeps_its_newlines() {
    let fill = cook_with(&c_like(), "a/*\n\n*/b", false).unwrap();
    assert_eq!(cooked(&fill), "a\n\nb");
}

#[test]
fn line_comment_ends_at_newline() {
    let fill = cook_with(&c_like(), "x // hi\ny", false).unwrap();
    assert_eq!(cooked(&fill), "x \ny");
}

#[test]
fn line_comment_may_end_at_eof() {
    let fill = cook_with(&c_like(), "x // end", false).unwrap();
    assert_eq!(cooked(&fill), "x  ");
}

#[test]
fn unterminated_block_comment_keeps_text_before_it() {
    let spec = c_like();
    let mut raw = raw("a\n/* x\n", false);
    let mut fill = Fill::default();
    let mut bol = true;
    let err = refill(&spec, &mut raw, &mut fill, &mut bol, None).unwrap_err();
    assert!(matches!(err, LexErrorKind::UnterminatedComment));
    assert_eq!(cooked(&fill), "a\n");
    assert_eq!(fill.at(), FillAt::Text);
}

#[test]
fn comment_marks_split_across_reads() {
    let fill = cook_with(&c_like(), "a/* x *\n*/b/", true).unwrap();
    assert_eq!(cooked(&fill), "a\nb/");
}

#[test]
fn nested_comments_track_depth() {
    let spec = LexSpec::builder("nested")
        .comment("(*", "*)", CommentFlags::NESTED)
        .build()
        .unwrap();
    let fill = cook_with(&spec, "a (* x (* y *) z *) b", false).unwrap();
    assert_eq!(cooked(&fill), "a   b");

    let err = cook_with(&spec, "(* (* *)", false).unwrap_err();
    assert!(matches!(err, LexErrorKind::UnterminatedComment));
}

#[test]
fn column0_comment_only_at_line_start() {
    let spec = LexSpec::builder("col0")
        .comment("#", "\n", CommentFlags::COLUMN0)
        .build()
        .unwrap();
    let fill = cook_with(&spec, "#c\nx # y\n", false).unwrap();
    assert_eq!(cooked(&fill), "\nx # y\n");
}

#[test]
fn one_line_block_comment_leaves_column0() {
    let spec = LexSpec::builder("col0")
        .comment("/*", "*/", CommentFlags::empty())
        .comment("#", "\n", CommentFlags::COLUMN0)
        .build()
        .unwrap();
    let fill = cook_with(&spec, "/* c */# x\n", false).unwrap();
    assert_eq!(cooked(&fill), " # x\n");

    let fill = cook_with(&spec, "/* c */\n# x\ny", false).unwrap();
    assert_eq!(cooked(&fill), " \n\ny");
}

// === Literals ===

#[test]
fn literal_splits_the_run() {
    let fill = cook_with(&c_like(), "a \"x\\ty\" b", false).unwrap();
    assert_eq!(cooked(&fill), "a  b");
    assert_eq!(fill.segs.len(), 2);
    assert_eq!(fill.segs[0].end, 2);
    assert_eq!(fill.segs[1], LexSeg { end: 4, literal: None });
    assert_eq!(literals(&fill), vec!["x\ty".to_string()]);
}

#[test]
fn literal_decodes_across_reads() {
    let text = "\"one\\ntwo\" \"\\\"q\\\"\"";
    let whole = cook_with(&c_like(), text, false).unwrap();
    let trickled = cook_with(&c_like(), text, true).unwrap();
    assert_eq!(literals(&whole), vec!["one\ntwo".to_string(), "\"q\"".to_string()]);
    assert_eq!(literals(&trickled), literals(&whole));
    assert_eq!(trickled.cooked, whole.cooked);
}

#[test]
fn unterminated_literal_is_fatal() {
    let err = cook_with(&c_like(), "\"abc", false).unwrap_err();
    assert!(matches!(err, LexErrorKind::UnterminatedLiteral));

    let err = cook_with(&c_like(), "\"ab\ncd\"", false).unwrap_err();
    assert!(matches!(err, LexErrorKind::UnterminatedLiteral));
}

#[test]
fn multiline_literal_counts_newlines() {
    let spec = LexSpec::builder("ml")
        .quote(QuoteDef::new("'''", "'''").flags(QuoteFlags::MULTILINE))
        .build()
        .unwrap();
    let fill = cook_with(&spec, "'''a\nb\n''' x", false).unwrap();
    let lit = fill.segs[0].literal.clone().unwrap();
    assert_eq!(lit.newlines, 2);
    assert_eq!(fill.literal_text(&lit), b"a\nb\n");
}

#[test]
fn nothing_quote_leaves_only_newlines() {
    let spec = LexSpec::builder("cont")
        .quote(QuoteDef::new("\\\n", "").flags(QuoteFlags::NOTHING))
        .build()
        .unwrap();
    let fill = cook_with(&spec, "a\\\nb", false).unwrap();
    assert_eq!(cooked(&fill), "a\nb");
    assert!(literals(&fill).is_empty());
}

#[test]
fn open_quote_yields_empty_literal() {
    let spec = LexSpec::builder("open")
        .quote(QuoteDef::new("%%", "").flags(QuoteFlags::OPEN))
        .build()
        .unwrap();
    let fill = cook_with(&spec, "a %% b", false).unwrap();
    assert_eq!(literals(&fill), vec![String::new()]);
    assert_eq!(cooked(&fill), "a  b");
}

#[test]
fn right_exclusive_quote_leaves_end_mark() {
    let spec = LexSpec::builder("rx")
        .quote(QuoteDef::new("<<", ">").flags(QuoteFlags::R_EXCLUSIVE))
        .build()
        .unwrap();
    let fill = cook_with(&spec, "<<ab>c", false).unwrap();
    assert_eq!(literals(&fill), vec!["ab".to_string()]);
    assert_eq!(cooked(&fill), ">c");
}

// === Chunking ===

#[test]
fn limit_stops_at_line_boundary() {
    let spec = c_like();
    let mut raw = raw("aaaa\nbbbb\ncccc\n", false);
    let mut fill = Fill::default();
    let mut bol = true;
    refill(&spec, &mut raw, &mut fill, &mut bol, Some(8)).unwrap();
    assert_eq!(cooked(&fill), "aaaa\nbbbb\n");

    refill(&spec, &mut raw, &mut fill, &mut bol, Some(8)).unwrap();
    assert_eq!(cooked(&fill), "cccc\n");
    assert!(raw.at_end());
}

#[test]
fn segment_count_is_bounded() {
    let spec = c_like();
    let text = "\"a\" ".repeat(MAX_SEGS + 10);
    let mut raw = raw(&text, false);
    let mut fill = Fill::default();
    let mut bol = true;
    refill(&spec, &mut raw, &mut fill, &mut bol, None).unwrap();
    assert_eq!(fill.segs.len(), MAX_SEGS);
    assert!(!raw.at_end());
}

#[test]
fn next_seg_walks_runs() {
    let mut fill = cook_with(&c_like(), "x\"s\"y", false).unwrap();
    assert_eq!(fill.rest_of_run(), b"x");
    fill.pos += 1;
    assert!(matches!(fill.at(), FillAt::Literal(_)));
    let lit = fill.next_seg().unwrap();
    assert_eq!(fill.literal_text(&lit), b"s");
    assert_eq!(fill.rest_of_run(), b"y");
    assert!(fill.next_seg().is_none());
    assert!(fill.is_exhausted());
}

#[test]
fn splice_shifts_later_runs() {
    let mut fill = cook_with(&c_like(), "ab\"s\"c", false).unwrap();
    fill.pos = 1;
    assert!(fill.splice(b"XY"));
    assert_eq!(cooked(&fill), "aXYbc");
    assert_eq!(fill.rest_of_run(), b"XYb");
    fill.next_seg();
    assert_eq!(fill.rest_of_run(), b"c");
    fill.next_seg();
    assert!(!fill.splice(b"z"));
}
