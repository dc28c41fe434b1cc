use super::*;

fn fixed(map: &EscapeMap, ch: u8) -> Option<Vec<u8>> {
    match map.get(u32::from(ch)) {
        Some(EscapeKind::Fixed(bytes)) => Some(bytes.to_vec()),
        _ => None,
    }
}

#[test]
fn legacy_covers_control_escapes() {
    let map = EscapeMap::legacy();
    assert_eq!(fixed(&map, b'n'), Some(vec![b'\n']));
    assert_eq!(fixed(&map, b'a'), Some(vec![0x07]));
    assert_eq!(fixed(&map, b'f'), Some(vec![0x0C]));
    assert!(map.get(u32::from(b'"')).is_none());
    assert!(map.get(u32::from(b'x')).is_none());
}

#[test]
fn legacy_full_adds_quotes_octal_and_hex() {
    let map = EscapeMap::legacy_full();
    assert_eq!(fixed(&map, b'"'), Some(vec![b'"']));
    assert_eq!(fixed(&map, b'\\'), Some(vec![b'\\']));
    assert_eq!(
        map.get(u32::from(b'1')),
        Some(&EscapeKind::Numeric {
            radix: Radix::Octal,
            max_digits: 2,
            emit: Emit::Byte,
            seeded: true,
        })
    );
    assert!(map.get(u32::from(b'8')).is_none());
    assert!(matches!(
        map.get(u32::from(b'x')),
        Some(EscapeKind::Numeric { radix: Radix::Hex, max_digits: 2, .. })
    ));
}

#[test]
fn modern_has_unicode_escapes() {
    let map = EscapeMap::modern();
    assert!(matches!(
        map.get(u32::from(b'U')),
        Some(EscapeKind::Numeric { max_digits: 8, emit: Emit::Unicode, .. })
    ));
    assert_eq!(fixed(&map, b'0'), Some(vec![0]));
    assert!(map.get(u32::from(b'a')).is_none());
}

#[test]
fn verbatim_maps_nothing() {
    let map = EscapeMap::verbatim();
    assert!((0x21u32..=0x7E).all(|ch| map.get(ch).is_none()));
    let moderate = EscapeMap::verbatim_moderate();
    assert_eq!(fixed(&moderate, b'\\'), Some(vec![b'\\']));
}

#[test]
fn only_printable_ascii_is_escapable() {
    let mut map = EscapeMap::verbatim();
    assert_eq!(
        map.set(u32::from(b' '), EscapeKind::Fixed(Box::new([b' ']))),
        Err(EscapeMapError::NotEscapable(0x20))
    );
    assert!(map.set(0x7F, EscapeKind::Fixed(Box::new([0]))).is_err());
    assert!(map.set(u32::from('é'), EscapeKind::Fixed(Box::new([0]))).is_err());
    assert!(map.set(u32::from(b'q'), EscapeKind::Fixed(Box::new([b'Q']))).is_ok());
    assert_eq!(fixed(&map, b'q'), Some(vec![b'Q']));
    assert!(map.remove(u32::from(b'q')).is_some());
    assert!(map.get(u32::from(b'q')).is_none());
}

#[test]
fn custom_symbol_moves_self_escape() {
    let map = EscapeMap::verbatim_moderate().with_symbol(b'&').unwrap();
    assert_eq!(map.symbol(), b'&');
    assert_eq!(fixed(&map, b'&'), Some(vec![b'&']));
    assert!(map.get(u32::from(b'\\')).is_none());
    assert_eq!(
        EscapeMap::legacy().with_symbol(b' '),
        Err(EscapeMapError::BadSymbol(b' '))
    );
}

#[test]
fn radix_digits() {
    assert_eq!(Radix::Octal.digit(b'7'), Some(7));
    assert_eq!(Radix::Octal.digit(b'8'), None);
    assert_eq!(Radix::Hex.digit(b'f'), Some(15));
    assert_eq!(Radix::Hex.digit(b'F'), Some(15));
    assert_eq!(Radix::Hex.digit(b'g'), None);
}

#[test]
fn presets_by_name() {
    assert_eq!(EscapeMap::preset("modern"), Some(EscapeMap::modern()));
    assert_eq!(EscapeMap::preset("nope"), None);
}
