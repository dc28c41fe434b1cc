use pretty_assertions::assert_eq;

use super::*;
use crate::spec::RadixPrefix;

fn syntax() -> NumberSyntax {
    NumberSyntax {
        prefixes: vec![
            RadixPrefix {
                text: (*b"0x").into(),
                radix: 16,
            },
            RadixPrefix {
                text: (*b"0b").into(),
                radix: 2,
            },
        ],
        suffixes: vec!["ul".into(), "u".into(), "f".into()],
        separator: Some(b'_'),
        leading_dot: true,
    }
}

/// Lexeme text, bytes consumed and classification.
fn scan_str(text: &str) -> Option<(String, usize, NumberInfo)> {
    let mut out = Lexeme::new();
    let scanned = scan(&syntax(), text.as_bytes(), &mut out)?;
    Some((
        String::from_utf8(out.to_vec()).unwrap(),
        scanned.len,
        scanned.info,
    ))
}

// === Decimal ===

#[test]
fn plain_integer() {
    let (lexeme, len, info) = scan_str("123;").unwrap();
    assert_eq!((lexeme.as_str(), len), ("123", 3));
    assert!(info.is_int());
    assert_eq!(info.radix(), 10);
    assert!(!info.is_zero());
}

#[test]
fn integer_stops_before_identifier() {
    let (lexeme, len, info) = scan_str("123abc").unwrap();
    assert_eq!((lexeme.as_str(), len), ("123", 3));
    assert_eq!(info.suffix_index(), None);
}

#[test]
fn leading_zeros_are_decimal() {
    let (lexeme, _, info) = scan_str("007").unwrap();
    assert_eq!(lexeme, "007");
    assert_eq!(info.radix(), 10);
}

#[test]
fn fraction_needs_a_digit() {
    let (lexeme, len, info) = scan_str("1.5").unwrap();
    assert_eq!((lexeme.as_str(), len), ("1.5", 3));
    assert!(info.is_real());

    let (lexeme, len, info) = scan_str("1.x").unwrap();
    assert_eq!((lexeme.as_str(), len), ("1", 1));
    assert!(info.is_int());
}

#[test]
fn leading_dot_fraction() {
    let (lexeme, len, info) = scan_str(".25 ").unwrap();
    assert_eq!((lexeme.as_str(), len), (".25", 3));
    assert!(info.is_real());
    assert!(scan_str(".x").is_none());
}

#[test]
fn exponent_forms() {
    assert_eq!(scan_str("1e10").unwrap().0, "1e10");
    assert_eq!(scan_str("2.5E-3").unwrap().0, "2.5E-3");
    let (lexeme, len, info) = scan_str("3e+").unwrap();
    assert_eq!((lexeme.as_str(), len), ("3", 1));
    assert!(info.is_int());
}

#[test]
fn separators_are_stripped() {
    let (lexeme, len, _) = scan_str("1_000_000").unwrap();
    assert_eq!((lexeme.as_str(), len), ("1000000", 9));
    let (lexeme, len, _) = scan_str("1__0").unwrap();
    assert_eq!((lexeme.as_str(), len), ("1", 1));
    let (lexeme, len, _) = scan_str("1_").unwrap();
    assert_eq!((lexeme.as_str(), len), ("1", 1));
}

#[test]
fn zero_detection() {
    assert!(scan_str("0").unwrap().2.is_zero());
    assert!(scan_str("0.000").unwrap().2.is_zero());
    assert!(scan_str("0e5").unwrap().2.is_zero());
    assert!(scan_str("0x00").unwrap().2.is_zero());
    assert!(!scan_str("0.01").unwrap().2.is_zero());
}

// === Prefixes ===

#[test]
fn radix_prefixes() {
    let (lexeme, len, info) = scan_str("0xFF_ff ").unwrap();
    assert_eq!((lexeme.as_str(), len), ("0xFFff", 7));
    assert_eq!(info.radix(), 16);
    assert_eq!(info.digits_start(), 2);

    let (lexeme, _, info) = scan_str("0b101").unwrap();
    assert_eq!(lexeme, "0b101");
    assert_eq!(info.radix(), 2);
}

#[test]
fn prefix_without_digits_is_zero() {
    let (lexeme, len, info) = scan_str("0x").unwrap();
    assert_eq!((lexeme.as_str(), len), ("0", 1));
    assert_eq!(info.radix(), 10);

    let (lexeme, len, _) = scan_str("0b2").unwrap();
    assert_eq!((lexeme.as_str(), len), ("0", 1));
}

#[test]
fn zero_dot_skips_prefixes() {
    let (lexeme, _, info) = scan_str("0.5").unwrap();
    assert_eq!(lexeme, "0.5");
    assert!(info.is_real());
}

// === Suffixes ===

#[test]
fn longest_suffix_wins() {
    let (lexeme, len, info) = scan_str("10ul;").unwrap();
    assert_eq!((lexeme.as_str(), len), ("10", 4));
    assert_eq!(info.suffix_index(), Some(0));

    let (_, len, info) = scan_str("10u;").unwrap();
    assert_eq!(len, 3);
    assert_eq!(info.suffix_index(), Some(1));
}

#[test]
fn zero_followed_by_suffix() {
    let (lexeme, len, info) = scan_str("0u").unwrap();
    assert_eq!((lexeme.as_str(), len), ("0", 2));
    assert!(info.is_zero());
    assert_eq!(info.suffix_index(), Some(1));
}

#[test]
fn suffix_is_taken_without_boundary() {
    let (_, len, info) = scan_str("1fx").unwrap();
    assert_eq!(len, 2);
    assert_eq!(info.suffix_index(), Some(2));
}

// === Values ===

#[test]
fn values_from_lexemes() {
    let (lexeme, _, info) = scan_str("0xff").unwrap();
    assert_eq!(to_u64(lexeme.as_bytes(), &info), Some(255));
    assert_eq!(to_i64(lexeme.as_bytes(), &info), Some(255));
    assert_eq!(to_f64(lexeme.as_bytes(), &info), Some(255.0));

    let (lexeme, _, info) = scan_str("2.5").unwrap();
    assert_eq!(to_u64(lexeme.as_bytes(), &info), None);
    assert_eq!(to_f64(lexeme.as_bytes(), &info), Some(2.5));
}

#[test]
fn folded_minus_is_negative() {
    let mut out = Lexeme::new();
    out.push(b'-');
    let scanned = scan(&syntax(), b"42", &mut out).unwrap();
    assert_eq!(&out[..], b"-42");
    assert_eq!(scanned.info.digits_start(), 1);
    assert_eq!(to_i64(&out, &scanned.info), Some(-42));
    assert_eq!(to_u64(&out, &scanned.info), None);
}

#[test]
fn not_a_number_leaves_output_untouched() {
    let mut out = Lexeme::new();
    out.push(b'-');
    assert!(scan(&syntax(), b"abc", &mut out).is_none());
    assert_eq!(&out[..], b"-");
}

mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn decimal_integers_round_trip(n in any::<u64>()) {
            let text = n.to_string();
            let (lexeme, len, info) = scan_str(&text).unwrap();
            prop_assert_eq!(len, text.len());
            prop_assert_eq!(to_u64(lexeme.as_bytes(), &info), Some(n));
        }

        #[test]
        fn scan_never_overruns(text in "[0-9a-fx._eE+-]{0,12}") {
            let mut out = Lexeme::new();
            if let Some(scanned) = scan(&syntax(), text.as_bytes(), &mut out) {
                prop_assert!(scanned.len >= 1);
                prop_assert!(scanned.len <= text.len());
            }
        }
    }
}
