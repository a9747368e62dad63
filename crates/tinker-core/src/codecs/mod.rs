//! Pluggable text codec registry.
//!
//! Codecs are registered process-wide under a canonical name and, optionally,
//! a name pattern whose first capture parameterizes the codec (so `rot13` and
//! `rot-3` resolve to the same family with different shifts). Lookups return
//! a [`CodecInfo`] exposing stateless, incremental and stream variants.

use std::sync::Once;

use thiserror::Error;

mod dna;
mod leet;
mod markdown;
mod morse;
pub mod registry;
mod rot;
mod xor;

#[cfg(test)]
mod tests;

pub use registry::{register, Coder, CodecFn, CodecInfo, CodecSpec, Data};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("'{codec}' codec can't encode character '{ch}' in position {pos}")]
    Encode { codec: String, ch: char, pos: usize },

    #[error("'{codec}' codec can't decode character '{ch}' in position {pos}")]
    Decode { codec: String, ch: char, pos: usize },

    #[error("unsupported error handling '{0}'")]
    UnsupportedErrorHandling(String),

    #[error("bad codec registration: {0}")]
    BadRegistration(&'static str),

    #[error("'{codec}' codec does not support {direction}")]
    NotSupported {
        codec: String,
        direction: &'static str,
    },

    #[error("unknown encoding '{0}'")]
    Unknown(String),

    #[error("stream i/o error")]
    Io(#[from] std::io::Error),
}

/// How a codec reacts to input it cannot translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errors {
    Strict,
    Replace,
    Ignore,
}

impl Errors {
    pub fn parse(name: &str) -> Result<Self, CodecError> {
        match name {
            "strict" => Ok(Errors::Strict),
            "replace" => Ok(Errors::Replace),
            "ignore" => Ok(Errors::Ignore),
            other => Err(CodecError::UnsupportedErrorHandling(other.to_string())),
        }
    }
}

static BUILTINS: Once = Once::new();

/// Register the built-in codec families. Idempotent; called automatically by
/// [`lookup`].
pub fn install_builtins() {
    BUILTINS.call_once(|| {
        for spec in [
            dna::spec(),
            leet::spec(),
            markdown::spec(),
            morse::spec(),
            rot::spec(),
            xor::spec(),
        ] {
            registry::register(spec).expect("builtin codec table is well-formed");
        }
    });
}

/// Resolve an encoding name against the registry.
pub fn lookup(name: &str) -> Result<CodecInfo, CodecError> {
    install_builtins();
    registry::resolve(name).ok_or_else(|| CodecError::Unknown(name.to_string()))
}

/// Encode `data` with the named codec. The output category matches the
/// input: text in, text out; bytes in, bytes out.
pub fn encode(data: Data, name: &str, errors: &str) -> Result<Data, CodecError> {
    lookup(name)?.encode(data, errors)
}

/// Decode `data` with the named codec.
pub fn decode(data: Data, name: &str, errors: &str) -> Result<Data, CodecError> {
    lookup(name)?.decode(data, errors)
}
