//! Process-global codec registry and the resolved codec handle.

use std::io::{Read, Write};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;

use super::{CodecError, Errors};

/// A bound translation function: text in, text out.
pub type CodecFn = Arc<dyn Fn(&str, Errors) -> Result<String, CodecError> + Send + Sync>;

/// One direction of a codec: either a ready function or a factory
/// parameterized by the name pattern's first capture.
#[derive(Clone)]
pub enum Coder {
    Direct(CodecFn),
    Factory(Arc<dyn Fn(&str) -> CodecFn + Send + Sync>),
}

/// Registration descriptor. At least one direction must be present.
pub struct CodecSpec {
    pub name: &'static str,
    pub encode: Option<Coder>,
    pub decode: Option<Coder>,
    pub pattern: Option<&'static str>,
    pub text_only: bool,
}

struct SearchHook {
    name: &'static str,
    encode: Option<Coder>,
    decode: Option<Coder>,
    pattern: Option<Regex>,
    text_only: bool,
}

static REGISTRY: Lazy<RwLock<Vec<SearchHook>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Append a codec to the registry.
pub fn register(spec: CodecSpec) -> Result<(), CodecError> {
    if spec.encode.is_none() && spec.decode.is_none() {
        return Err(CodecError::BadRegistration(
            "at least one of encode and decode must be defined",
        ));
    }
    let pattern = match spec.pattern {
        Some(p) => Some(
            Regex::new(p).map_err(|_| CodecError::BadRegistration("invalid name pattern"))?,
        ),
        None => None,
    };
    debug!(name = spec.name, "registering codec");
    REGISTRY.write().push(SearchHook {
        name: spec.name,
        encode: spec.encode,
        decode: spec.decode,
        pattern,
        text_only: spec.text_only,
    });
    Ok(())
}

/// Consult every search hook with the requested name; first match wins.
pub fn resolve(name: &str) -> Option<CodecInfo> {
    let registry = REGISTRY.read();
    for hook in registry.iter() {
        if let Some(info) = hook.resolve(name) {
            debug!(requested = name, codec = hook.name, "codec resolved");
            return Some(info);
        }
    }
    None
}

impl SearchHook {
    fn resolve(&self, name: &str) -> Option<CodecInfo> {
        let param = if name == self.name {
            None
        } else {
            let pattern = self.pattern.as_ref()?;
            let captures = pattern.captures(name)?;
            // the pattern must cover the entire requested name
            if captures.get(0)?.as_str() != name {
                return None;
            }
            captures.get(1).map(|m| m.as_str().to_string())
        };
        let encode = bind(self.encode.as_ref(), param.as_deref())?;
        let decode = bind(self.decode.as_ref(), param.as_deref())?;
        Some(CodecInfo {
            name: name.to_string(),
            encode,
            decode,
            text_only: self.text_only,
        })
    }
}

/// Bind a direction to the captured parameter. An absent direction binds to
/// `None`; a factory requested without a capture cannot bind, so the hook as
/// a whole does not match.
#[allow(clippy::option_option)]
fn bind(coder: Option<&Coder>, param: Option<&str>) -> Option<Option<CodecFn>> {
    match coder {
        None => Some(None),
        Some(Coder::Direct(f)) => Some(Some(f.clone())),
        Some(Coder::Factory(make)) => param.map(|p| Some(make(p))),
    }
}

/// A codec resolved for one requested name.
#[derive(Clone)]
pub struct CodecInfo {
    name: String,
    encode: Option<CodecFn>,
    decode: Option<CodecFn>,
    text_only: bool,
}

impl CodecInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text_only(&self) -> bool {
        self.text_only
    }

    pub fn encode(&self, input: Data, errors: &str) -> Result<Data, CodecError> {
        let errors = Errors::parse(errors)?;
        let f = self.encoder()?;
        let (text, was_bytes) = input.into_text();
        let out = f(&text, errors)?;
        Ok(Data::from_text(out, was_bytes))
    }

    pub fn decode(&self, input: Data, errors: &str) -> Result<Data, CodecError> {
        let errors = Errors::parse(errors)?;
        let f = self.decoder()?;
        let (text, was_bytes) = input.into_text();
        let out = f(&text, errors)?;
        Ok(Data::from_text(out, was_bytes))
    }

    /// Chunked encoder; output is always bytes.
    pub fn incremental_encoder(&self, errors: &str) -> Result<IncrementalEncoder, CodecError> {
        Ok(IncrementalEncoder {
            f: self.encoder()?.clone(),
            errors: Errors::parse(errors)?,
        })
    }

    /// Chunked decoder; output is always text.
    pub fn incremental_decoder(&self, errors: &str) -> Result<IncrementalDecoder, CodecError> {
        Ok(IncrementalDecoder {
            f: self.decoder()?.clone(),
            errors: Errors::parse(errors)?,
        })
    }

    /// Encoding writer over a byte sink. `None` for text-only codecs.
    pub fn stream_writer<W: Write>(
        &self,
        sink: W,
        errors: &str,
    ) -> Result<Option<StreamWriter<W>>, CodecError> {
        if self.text_only {
            return Ok(None);
        }
        Ok(Some(StreamWriter {
            sink,
            f: self.encoder()?.clone(),
            errors: Errors::parse(errors)?,
        }))
    }

    /// Decoding reader over a byte source. `None` for text-only codecs.
    pub fn stream_reader<R: Read>(
        &self,
        source: R,
        errors: &str,
    ) -> Result<Option<StreamReader<R>>, CodecError> {
        if self.text_only {
            return Ok(None);
        }
        Ok(Some(StreamReader {
            source,
            f: self.decoder()?.clone(),
            errors: Errors::parse(errors)?,
        }))
    }

    fn encoder(&self) -> Result<&CodecFn, CodecError> {
        self.encode.as_ref().ok_or_else(|| CodecError::NotSupported {
            codec: self.name.clone(),
            direction: "encoding",
        })
    }

    fn decoder(&self) -> Result<&CodecFn, CodecError> {
        self.decode.as_ref().ok_or_else(|| CodecError::NotSupported {
            codec: self.name.clone(),
            direction: "decoding",
        })
    }
}

/// Codec input/output: the primary result of encode/decode keeps the
/// category of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    Text(String),
    Bytes(Vec<u8>),
}

impl Data {
    /// Normalize to text, remembering whether the input was bytes. Byte
    /// input is decoded as UTF-8, falling back to a one-byte-per-char
    /// latin-1 style mapping.
    fn into_text(self) -> (String, bool) {
        match self {
            Data::Text(s) => (s, false),
            Data::Bytes(raw) => match String::from_utf8(raw) {
                Ok(s) => (s, true),
                Err(err) => {
                    let raw = err.into_bytes();
                    (raw.iter().map(|&b| b as char).collect(), true)
                }
            },
        }
    }

    fn from_text(text: String, bytes: bool) -> Data {
        if bytes {
            Data::Bytes(text_to_bytes(&text))
        } else {
            Data::Text(text)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Data::Text(s) => Some(s),
            Data::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::Text(_) => None,
            Data::Bytes(b) => Some(b),
        }
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::Text(s.to_string())
    }
}

impl From<&[u8]> for Data {
    fn from(b: &[u8]) -> Self {
        Data::Bytes(b.to_vec())
    }
}

/// Latin-1 when every char fits in a byte, UTF-8 otherwise.
fn text_to_bytes(text: &str) -> Vec<u8> {
    if text.chars().all(|c| (c as u32) < 256) {
        text.chars().map(|c| c as u8).collect()
    } else {
        text.as_bytes().to_vec()
    }
}

pub struct IncrementalEncoder {
    f: CodecFn,
    errors: Errors,
}

impl IncrementalEncoder {
    pub fn encode(&mut self, chunk: &str) -> Result<Vec<u8>, CodecError> {
        let out = (self.f)(chunk, self.errors)?;
        Ok(text_to_bytes(&out))
    }
}

pub struct IncrementalDecoder {
    f: CodecFn,
    errors: Errors,
}

impl IncrementalDecoder {
    pub fn decode(&mut self, chunk: &str) -> Result<String, CodecError> {
        (self.f)(chunk, self.errors)
    }
}

pub struct StreamWriter<W: Write> {
    sink: W,
    f: CodecFn,
    errors: Errors,
}

impl<W: Write> StreamWriter<W> {
    /// Encode a byte buffer and write the result to the sink.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, CodecError> {
        let (text, _) = Data::Bytes(buf.to_vec()).into_text();
        let out = (self.f)(&text, self.errors)?;
        let bytes = text_to_bytes(&out);
        self.sink.write_all(&bytes)?;
        Ok(bytes.len())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

pub struct StreamReader<R: Read> {
    source: R,
    f: CodecFn,
    errors: Errors,
}

impl<R: Read> StreamReader<R> {
    /// Drain the source and decode its contents to text.
    pub fn read_to_end(&mut self) -> Result<String, CodecError> {
        let mut raw = Vec::new();
        self.source.read_to_end(&mut raw)?;
        let (text, _) = Data::Bytes(raw).into_text();
        (self.f)(&text, self.errors)
    }
}
