use std::io::Cursor;

use pretty_assertions::assert_eq;

use super::registry::Data;
use super::{decode, encode, lookup, register, CodecError, CodecSpec};

fn text(s: &str) -> Data {
    Data::Text(s.to_string())
}

fn enc(name: &str, input: &str) -> String {
    match encode(text(input), name, "strict") {
        Ok(Data::Text(s)) => s,
        other => panic!("expected text output, got {other:?}"),
    }
}

fn dec(name: &str, input: &str, errors: &str) -> String {
    match decode(text(input), name, errors) {
        Ok(Data::Text(s)) => s,
        other => panic!("expected text output, got {other:?}"),
    }
}

#[test]
fn rot13_known_value() {
    assert_eq!(enc("rot13", "Hello, World!"), "Uryyb, Jbeyq!");
    assert_eq!(enc("rot13", "Uryyb, Jbeyq!"), "Hello, World!");
}

#[test]
fn rot_shift_composes_to_identity() {
    let once = enc("rot7", "attack at dawn");
    assert_eq!(enc("rot19", &once), "attack at dawn");
}

#[test]
fn rot_decode_undoes_encode() {
    assert_eq!(dec("rot13", &enc("rot13", "abc XYZ"), "strict"), "abc XYZ");
}

#[test]
fn rot_name_variants() {
    assert_eq!(enc("rot-3", "abc"), "def");
    assert_eq!(enc("ROT_3", "abc"), "def");
}

#[test]
fn rot_shift_out_of_range_is_unknown() {
    assert!(matches!(lookup("rot26"), Err(CodecError::Unknown(_))));
    assert!(matches!(lookup("rot0"), Err(CodecError::Unknown(_))));
}

#[test]
fn dna_encode_single_byte() {
    // 'A' is 0b01000001: pairs 01 00 00 01
    assert_eq!(enc("dna", "A"), "CAAC");
}

#[test]
fn dna_round_trip() {
    let plain = "this is a test";
    assert_eq!(dec("dna", &enc("dna", plain), "strict"), plain);
}

#[test]
fn dna_decode_is_case_insensitive() {
    assert_eq!(dec("dna", "caac", "strict"), "A");
}

#[test]
fn dna_decode_error_modes() {
    let err = decode(text("ABCD"), "dna", "strict").unwrap_err();
    match err {
        CodecError::Decode { codec, ch, pos } => {
            assert_eq!(codec, "dna");
            assert_eq!(ch, 'B');
            assert_eq!(pos, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(dec("dna", "ABCD", "replace"), "[00??01??]");
    assert_eq!(dec("dna", "ABCD", "ignore"), "\u{1}");

    // fully out-of-domain group
    assert!(decode(text("ZZZZ"), "dna", "strict").is_err());
    assert_eq!(dec("dna", "ZZZZ", "replace"), "[????????]");
    assert_eq!(dec("dna", "ZZZZ", "ignore"), "");
}

#[test]
fn dna_bytes_in_bytes_out() {
    let out = encode(Data::Bytes(b"A".to_vec()), "dna", "strict").unwrap();
    assert_eq!(out, Data::Bytes(b"CAAC".to_vec()));
}

#[test]
fn leet_aliases_and_table() {
    assert_eq!(enc("leet", "leetspeak"), "l3375p34k");
    assert_eq!(enc("1337", "leetspeak"), "l3375p34k");
    assert_eq!(enc("13375p34k", "Oslo"), "05l0");
}

#[test]
fn leet_decode_prefers_uppercase() {
    assert_eq!(dec("leet", "1337", "strict"), "IEET");
}

#[test]
fn morse_known_value_and_round_trip() {
    let cipher = ".... . .-.. .-.. --- / .-- --- .-. .-.. -..";
    assert_eq!(enc("morse", "hello world"), cipher);
    assert_eq!(dec("morse", cipher, "strict"), "hello world");
}

#[test]
fn morse_is_lowercase_only() {
    let err = encode(text("Hi"), "morse", "strict").unwrap_err();
    match err {
        CodecError::Encode { codec, ch, pos } => {
            assert_eq!(codec, "morse");
            assert_eq!(ch, 'H');
            assert_eq!(pos, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(enc("morse", "Hi".to_lowercase().as_str()), ".... ..");
}

#[test]
fn morse_error_modes() {
    assert_eq!(dec("morse", ".- ......... -...", "replace"), "a#b");
    assert_eq!(dec("morse", ".- ......... -...", "ignore"), "ab");
    assert!(decode(text(".- ......... -..."), "morse", "strict").is_err());
    // the replace marker is distinct from the nucleotide codec's
    assert_eq!(enc_with("morse", "a~b", "replace"), ".- # -...");
}

fn enc_with(name: &str, input: &str, errors: &str) -> String {
    match encode(text(input), name, errors) {
        Ok(Data::Text(s)) => s,
        other => panic!("expected text output, got {other:?}"),
    }
}

#[test]
fn xor_encode_equals_decode() {
    let plain = "secret";
    let cipher = enc("xor-90", plain);
    assert_eq!(dec("xor-90", &cipher, "strict"), plain);
    assert_eq!(enc("xor-90", &cipher), plain);
}

#[test]
fn markdown_is_encode_only() {
    assert_eq!(enc("md", "# Title"), "<h1>Title</h1>\n");
    let err = decode(text("<p>x</p>"), "markdown", "strict").unwrap_err();
    assert!(matches!(err, CodecError::NotSupported { .. }));
}

#[test]
fn markdown_streams_are_omitted() {
    let info = lookup("markdown").unwrap();
    assert!(info.text_only());
    assert!(info.stream_writer(Vec::new(), "strict").unwrap().is_none());
    assert!(info
        .stream_reader(Cursor::new(Vec::new()), "strict")
        .unwrap()
        .is_none());
}

#[test]
fn unknown_encoding() {
    assert!(matches!(lookup("no-such"), Err(CodecError::Unknown(_))));
}

#[test]
fn unsupported_error_handling_is_rejected() {
    let err = encode(text("x"), "rot13", "loose").unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedErrorHandling(_)));
}

#[test]
fn incremental_encoder_yields_bytes() {
    let info = lookup("rot13").unwrap();
    let mut encoder = info.incremental_encoder("strict").unwrap();
    assert_eq!(encoder.encode("He").unwrap(), b"Ur".to_vec());
    assert_eq!(encoder.encode("llo").unwrap(), b"yyb".to_vec());
}

#[test]
fn incremental_decoder_yields_text() {
    let info = lookup("rot13").unwrap();
    let mut decoder = info.incremental_decoder("strict").unwrap();
    assert_eq!(decoder.decode("Uryyb").unwrap(), "Hello");
}

#[test]
fn stream_round_trip() {
    let info = lookup("rot13").unwrap();
    let mut writer = info.stream_writer(Vec::new(), "strict").unwrap().unwrap();
    writer.write(b"Hello").unwrap();
    let cipher = writer.into_inner();
    assert_eq!(cipher, b"Uryyb".to_vec());

    let mut reader = info
        .stream_reader(Cursor::new(cipher), "strict")
        .unwrap()
        .unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "Hello");
}

#[test]
fn stream_codec_through_a_file() {
    use std::fs::File;
    use std::io::{Seek, SeekFrom, Write as _};

    let info = lookup("xor42").unwrap();
    let mut file = tempfile::tempfile().unwrap();

    let mut writer = info.stream_writer(&mut file, "strict").unwrap().unwrap();
    writer.write(b"stashed").unwrap();
    let file: &mut File = writer.into_inner();
    file.flush().unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut reader = info.stream_reader(file, "strict").unwrap().unwrap();
    assert_eq!(reader.read_to_end().unwrap(), "stashed");
}

#[test]
fn registration_requires_a_direction() {
    let err = register(CodecSpec {
        name: "hollow",
        encode: None,
        decode: None,
        pattern: None,
        text_only: false,
    })
    .unwrap_err();
    assert!(matches!(err, CodecError::BadRegistration(_)));
}

#[test]
fn pattern_must_cover_whole_name() {
    // "rot13x" contains a rot match but is not one
    assert!(matches!(lookup("rot13x"), Err(CodecError::Unknown(_))));
}
