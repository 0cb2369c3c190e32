use logbook_types::{EncodedNote, Error};
use proptest::prelude::*;

#[test]
fn ascii_is_unchanged_by_encoding() {
    let note = EncodedNote::encode("# Standup\n- shipped the importer");
    assert_eq!(note.as_wire(), "# Standup\n- shipped the importer");
}

#[test]
fn multibyte_text_is_stored_as_byte_string() {
    let note = EncodedNote::encode("café");
    // é is 0xC3 0xA9 in UTF-8
    assert_eq!(note.as_wire(), "caf\u{00C3}\u{00A9}");
    assert_eq!(note.decode().unwrap(), "café");
}

#[test]
fn decode_rejects_code_points_above_byte_range() {
    let note = EncodedNote::from_wire("naïve → wrong");
    let err = note.decode().unwrap_err();
    assert!(matches!(err, Error::InvalidNoteEncoding(_)));
    assert!(err.to_string().contains("U+2192"));
}

#[test]
fn decode_rejects_invalid_utf8() {
    let note = EncodedNote::from_wire("\u{00C3}");
    assert!(matches!(note.decode(), Err(Error::InvalidNoteEncoding(_))));
}

#[test]
fn empty_note() {
    let note = EncodedNote::default();
    assert!(note.is_empty());
    assert_eq!(note.decode().unwrap(), "");
}

proptest! {
    #[test]
    fn decode_inverts_encode(text in "\\PC{0,200}") {
        prop_assert_eq!(EncodedNote::encode(&text).decode().unwrap(), text);
    }

    #[test]
    fn encoded_form_stays_in_byte_range(text in "\\PC{0,200}") {
        let note = EncodedNote::encode(&text);
        prop_assert!(note.as_wire().chars().all(|c| u32::from(c) <= 0xFF));
        prop_assert_eq!(note.as_wire().chars().count(), text.len());
    }
}
