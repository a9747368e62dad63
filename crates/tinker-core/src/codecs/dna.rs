//! DNA codec: each byte becomes four nucleotide symbols, two bits per
//! symbol, most significant pair first.

use std::sync::Arc;

use super::registry::{Coder, CodecSpec};
use super::{CodecError, Errors};

const CODEC: &str = "dna";
const REPLACE: char = '?';

fn symbol(bits: u8) -> char {
    match bits {
        0b00 => 'A',
        0b01 => 'C',
        0b10 => 'G',
        _ => 'T',
    }
}

fn bits(symbol: char) -> Option<&'static str> {
    match symbol {
        'A' => Some("00"),
        'C' => Some("01"),
        'G' => Some("10"),
        'T' => Some("11"),
        _ => None,
    }
}

fn encode(text: &str, errors: Errors) -> Result<String, CodecError> {
    let mut out = String::with_capacity(text.len() * 4);
    for (pos, c) in text.chars().enumerate() {
        let code = c as u32;
        if code > 0xFF {
            match errors {
                Errors::Strict => {
                    return Err(CodecError::Encode {
                        codec: CODEC.to_string(),
                        ch: c,
                        pos,
                    })
                }
                Errors::Replace => {
                    push_byte(&mut out, REPLACE as u8);
                    continue;
                }
                Errors::Ignore => continue,
            }
        }
        push_byte(&mut out, code as u8);
    }
    Ok(out)
}

fn push_byte(out: &mut String, byte: u8) {
    for shift in [6u8, 4, 2, 0] {
        out.push(symbol((byte >> shift) & 0b11));
    }
}

/// Case-insensitive. Each group of four symbols yields one character; a
/// group whose bit-string cannot be parsed (replacement markers inside)
/// is emitted verbatim in brackets.
fn decode(text: &str, errors: Errors) -> Result<String, CodecError> {
    let symbols: Vec<char> = text.chars().map(|c| c.to_ascii_uppercase()).collect();
    let mut out = String::new();
    for (start, group) in symbols.chunks(4).enumerate().map(|(i, g)| (i * 4, g)) {
        let mut bs = String::with_capacity(8);
        for (offset, &c) in group.iter().enumerate() {
            match bits(c) {
                Some(pair) => bs.push_str(pair),
                None => match errors {
                    Errors::Strict => {
                        return Err(CodecError::Decode {
                            codec: CODEC.to_string(),
                            ch: c,
                            pos: start + offset,
                        })
                    }
                    Errors::Replace => {
                        bs.push(REPLACE);
                        bs.push(REPLACE);
                    }
                    Errors::Ignore => continue,
                },
            }
        }
        match u8::from_str_radix(&bs, 2) {
            Ok(code) => out.push(char::from(code)),
            Err(_) if !bs.is_empty() => {
                out.push('[');
                out.push_str(&bs);
                out.push(']');
            }
            Err(_) => {}
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
