use super::*;

#[test]
fn decode_ascii() {
    assert_eq!(decode(b"abc"), Utf8::Char { ch: 0x61, len: 1 });
}

#[test]
fn decode_multibyte() {
    assert_eq!(
        decode("é!".as_bytes()),
        Utf8::Char {
            ch: u32::from('é'),
            len: 2
        }
    );
    assert_eq!(
        decode("😀".as_bytes()),
        Utf8::Char {
            ch: 0x1F600,
            len: 4
        }
    );
}

#[test]
fn decode_cut_sequence_is_incomplete() {
    let bytes = "€".as_bytes();
    assert_eq!(decode(&bytes[..2]), Utf8::Incomplete { need: 3 });
    assert_eq!(decode(b""), Utf8::Incomplete { need: 1 });
}

#[test]
fn decode_rejects_malformed() {
    assert_eq!(decode(&[0x80]), Utf8::Invalid);
    assert_eq!(decode(&[0xC3, 0x41]), Utf8::Invalid);
    // overlong encoding of '/'
    assert_eq!(decode(&[0xC0, 0xAF]), Utf8::Invalid);
    // surrogate
    assert_eq!(decode(&[0xED, 0xA0, 0x80]), Utf8::Invalid);
}

#[test]
fn encode_appends() {
    let mut out = b"x".to_vec();
    assert_eq!(encode(0x41, &mut out), Some(1));
    assert_eq!(encode(0x20AC, &mut out), Some(3));
    assert_eq!(out, "xA€".as_bytes());
}

#[test]
fn encode_rejects_surrogates() {
    let mut out = Vec::new();
    assert_eq!(encode(0xD800, &mut out), None);
    assert!(out.is_empty());
}

#[test]
fn char_count_mixed() {
    assert_eq!(char_count("aé€😀".as_bytes()), 4);
    assert_eq!(char_count(&[b'a', 0xFF, b'b']), 3);
}
