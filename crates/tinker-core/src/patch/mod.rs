//! Patch engine: rewrites the source of live script functions, with a
//! bounded per-function undo history and line-oriented edit operations.

use thiserror::Error;

mod editor;
mod engine;
mod store;

pub use engine::Patcher;
pub use store::{SourceStore, HISTORY_DEPTH};


/// Errors raised by the patch engine and the line editor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    /// Malformed fragment replacement list (odd length)
    #[error("bad code replacement")]
    BadReplacement,

    /// Malformed line edit: bad, duplicate, or out-of-range index
    #[error("bad code {what}s ({detail})")]
    BadEdit { what: &'static str, detail: String },

    /// New source failed to parse
    #[error("invalid patched source: {0}")]
    Syntax(String),

    /// Whole-function replacement rejected: the supplied pre-image does not
    /// structurally match the live function
    #[error("replacement pre-image does not match the live function")]
    AstMismatch,

    /// Unknown callable handle
    #[error("unknown function handle")]
    UnknownFunction,
}
