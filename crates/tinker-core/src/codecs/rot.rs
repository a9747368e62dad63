//! Rotation (Caesar) codec family: `rot1` through `rot25`, with optional
//! `-` or `_` separator. The captured shift parameterizes the factory.

use std::sync::Arc;

use super::registry::{Coder, CodecFn, CodecSpec};

fn rotate(text: &str, n: i32) -> String {
    let n = n.rem_euclid(26) as u8;
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a' + n) % 26) + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A' + n) % 26) + b'A') as char,
            _ => c,
        })
        .collect()
}

fn encoder(param: &str) -> CodecFn {
    let n: i32 = param.parse().unwrap_or(13);
    Arc::new(move |text, _errors| Ok(rotate(text, n)))
}

fn decoder(param: &str) -> CodecFn {
    let n: i32 = param.parse().unwrap_or(13);
    Arc::new(move |text, _errors| Ok(rotate(text, -n)))
}

pub(super) fn spec() -> CodecSpec {
    CodecSpec {
        name: "rotN",
        encode: Some(Coder::Factory(Arc::new(encoder))),
        decode: Some(Coder::Factory(Arc::new(decoder))),
        pattern: Some(r"(?i)^rot[-_]?([1-9]|1[0-9]|2[0-5])$"),
        text_only: false,
    }
}
