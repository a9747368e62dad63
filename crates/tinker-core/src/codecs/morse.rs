//! Morse codec: dash-dot tokens separated by spaces, `/` between words.
//! Lowercase letters, digits and common punctuation only; uppercase input
//! is out of domain.

use std::sync::Arc;

use super::registry::{Coder, CodecSpec};
use super::{CodecError, Errors};

const CODEC: &str = "morse";
const REPLACE: char = '#';

static TABLE: &[(char, &str)] = &[
    ('a', ".-"),
    ('b', "-..."),
    ('c', "-.-."),
    ('d', "-.."),
    ('e', "."),
    ('f', "..-."),
    ('g', "--."),
    ('h', "...."),
    ('i', ".."),
    ('j', ".---"),
    ('k', "-.-"),
    ('l', ".-.."),
    ('m', "--"),
    ('n', "-."),
    ('o', "---"),
    ('p', ".--."),
    ('q', "--.-"),
    ('r', ".-."),
    ('s', "..."),
    ('t', "-"),
    ('u', "..-"),
    ('v', "...-"),
    ('w', ".--"),
    ('x', "-..-"),
    ('y', "-.--"),
    ('z', "--.."),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('0', "-----"),
    (',', "--..--"),
    ('.', ".-.-.-"),
    (':', "---..."),
    ('?', "..--.."),
    ('/', "-..-."),
    ('-', "-....-"),
    ('=', "-...-"),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('@', ".--.-."),
    ('\'', ".----."),
    ('_', "..--.-"),
    ('!', "-.-.--"),
    ('&', ".-..."),
    ('"', ".-..-."),
    (';', "-.-.-."),
    ('$', "...-..-"),
    (' ', "/"),
];

fn code_for(c: char) -> Option<&'static str> {
    TABLE.iter().find(|(k, _)| *k == c).map(|(_, v)| *v)
}

fn char_for(code: &str) -> Option<char> {
    TABLE.iter().find(|(_, v)| *v == code).map(|(k, _)| *k)
}

fn encode(text: &str, errors: Errors) -> Result<String, CodecError> {
    let mut out = String::new();
    for (pos, c) in text.chars().enumerate() {
        match code_for(c) {
            Some(code) => {
                out.push_str(code);
                out.push(' ');
            }
            None => match errors {
                Errors::Strict => {
                    return Err(CodecError::Encode {
                        codec: CODEC.to_string(),
                        ch: c,
                        pos,
                    })
                }
                Errors::Replace => {
                    out.push(REPLACE);
                    out.push(' ');
                }
                Errors::Ignore => {}
            },
        }
    }
    out.pop();
    Ok(out)
}

/// Tokens are whitespace-separated; position in errors is the token index.
fn decode(text: &str, errors: Errors) -> Result<String, CodecError> {
    let mut out = String::new();
    for (pos, token) in text.split_whitespace().enumerate() {
        match char_for(token) {
            Some(c) => out.push(c),
            None => match errors {
                Errors::Strict => {
                    return Err(CodecError::Decode {
                        codec: CODEC.to_string(),
                        ch: token.chars().next().unwrap_or(' '),
                        pos,
                    })
                }
                Errors::Replace => out.push(REPLACE),
                Errors::Ignore => {}
            },
        }
    }
    Ok(out)
}

pub(super) fn spec() -> CodecSpec {
    CodecSpec {
        name: CODEC,
        encode: Some(Coder::Direct(Arc::new(encode))),
        decode: Some(Coder::Direct(Arc::new(decode))),
        pattern: None,
        text_only: false,
    }
}
