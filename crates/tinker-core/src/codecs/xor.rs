//! Single-byte XOR codec family: `xor1` through `xor255`. Encoding and
//! decoding are the same operation.

use std::sync::Arc;

use super::registry::{Coder, CodecFn, CodecSpec};
use super::{CodecError, Errors};

fn xor(text: &str, key: u32, errors: Errors) -> Result<String, CodecError> {
    let mut out = String::with_capacity(text.len());
    for (pos, c) in text.chars().enumerate() {
        match char::from_u32(c as u32 ^ key) {
            Some(x) => out.push(x),
            // xor landed in the surrogate range
            None => match errors {
                Errors::Strict => {
                    return Err(CodecError::Encode {
                        codec: "xor".to_string(),
                        ch: c,
                        pos,
                    })
                }
                Errors::Replace => out.push('?'),
                Errors::Ignore => {}
            },
        }
    }
    Ok(out)
}

fn coder(param: &str) -> CodecFn {
    let key: u32 = param.parse().unwrap_or(1);
    Arc::new(move |text, errors| xor(text, key % 256, errors))
}

pub(super) fn spec() -> CodecSpec {
    CodecSpec {
        name: "xorN",
        encode: Some(Coder::Factory(Arc::new(coder))),
        decode: Some(Coder::Factory(Arc::new(coder))),
        pattern: Some(r"(?i)^xor[-_]?([1-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])$"),
        text_only: false,
    }
}
