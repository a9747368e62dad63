//! # Tinker Core
//!
//! Toolkit for live-patching an embedded scripting runtime, including:
//! - A small Python-flavoured mini-language (AST, parser, evaluator)
//! - A patch engine that rewrites the source of live script functions,
//!   with a bounded per-function undo history
//! - A line editor for index-based edits with indentation inference
//! - A pluggable, process-global text codec registry with built-in codecs
//! - A lazy binder that defers module/object construction behind proxies
//!
//! This crate provides the foundational components; report rendering,
//! configuration sniffing, and other command-line conveniences are built
//! on top of it elsewhere.

#![warn(clippy::all)]

pub mod ast;
pub mod codecs;
pub mod evaluator;
pub mod lazy;
pub mod parser;
pub mod patch;
pub mod runtime;

// Re-export commonly used types
pub use ast::{BinOp, Expr, Function, Stmt};
pub use codecs::{CodecError, CodecInfo, CodecSpec, Coder, Data, Errors};
pub use evaluator::{ControlFlow, Environment, Evaluator, EvaluatorError, Value};
pub use lazy::{lazy_module, lazy_object, Hooks, LazyError, LazyProxy, PostLoad, Scope};
pub use parser::{parse_function, ParseError};
pub use patch::{PatchError, Patcher, SourceStore, HISTORY_DEPTH};
pub use runtime::{FuncId, Module, Runtime, ScriptFn};

/// Tinker version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for Tinker core components
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tinker_core=info".parse().unwrap()),
        )
        .init();
}

/// Core runtime configuration
#[derive(Debug, Clone)]
pub struct TinkerConfig {
    /// Maximum evaluation (call) depth. Each script call costs several
    /// native stack frames, so the default is kept low enough that the
    /// guard trips long before the native stack does, even in debug
    /// builds on a 2 MiB thread stack.
    pub max_eval_depth: usize,
    /// Enable debug mode
    pub debug: bool,
}

impl Default for TinkerConfig {
    fn default() -> Self {
        Self {
            max_eval_depth: 64,
            debug: false,
        }
    }
}

/// Error types for Tinker core operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Patch engine or line editor error
    #[error("Patch error: {0}")]
    Patch(#[from] patch::PatchError),

    /// Codec registry or conversion error
    #[error("Codec error: {0}")]
    Codec(#[from] codecs::CodecError),

    /// Lazy binding error
    #[error("Lazy binding error: {0}")]
    Lazy(#[from] lazy::LazyError),

    /// Parser error
    #[error("Parse error: {0}")]
    Parse(#[from] parser::ParseError),

    /// Evaluation error
    #[error("Evaluation error: {0}")]
    Eval(#[from] evaluator::EvaluatorError),
}

/// Result type for Tinker core operations
pub type Result<T> = std::result::Result<T, Error>;
