//! Leetspeak codec: letter/digit substitution table.

use std::sync::Arc;

use super::registry::{Coder, CodecSpec};
use super::{CodecError, Errors};

const LETTERS: &str = "abeiostABEIOSTZ";
const DIGITS: &str = "483105748310572";

fn encode(text: &str, _errors: Errors) -> Result<String, CodecError> {
    Ok(text
        .chars()
        .map(|c| match LETTERS.find(c) {
            Some(i) => DIGITS.as_bytes()[i] as char,
            None => c,
        })
        .collect())
}

/// Decoding is lossy: each digit maps back to the last letter bound to it
/// in the table, so the uppercase letters win.
fn decode(text: &str, _errors: Errors) -> Result<String, CodecError> {
    Ok(text
        .chars()
        .map(|c| match DIGITS.rfind(c) {
            Some(i) => LETTERS.as_bytes()[i] as char,
            None => c,
        })
        .collect())
}

pub(super) fn spec() -> CodecSpec {
    CodecSpec {
        name: "leet",
        encode: Some(Coder::Direct(Arc::new(encode))),
        decode: Some(Coder::Direct(Arc::new(decode))),
        pattern: Some(r"^(?:leet|1337|leetspeak|13375p34k)$"),
        text_only: false,
    }
}
