// Core patching operations: install, whole-function replace with the AST
// safety rail, fragment replacement with a literal-substitution fallback,
// and the revert/restore pair over the source store.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::{parser::parse_function, runtime::FuncId, runtime::Runtime};

use super::{store::SourceStore, PatchError};

/// The AST safety rail lives in the runtime as a script function so that it
/// can be disabled by the engine itself.
const AST_GUARD_SOURCE: &str = "def __ast_guard():\n    return True\n";

/// Rewrites live function source. Single-threaded cooperative: a function
/// being patched while another thread invokes it has undefined behavior.
pub struct Patcher {
    runtime: Arc<Runtime>,
    store: Mutex<SourceStore>,
    guard: FuncId,
}

impl Patcher {
    /// Create a patcher bound to a runtime.
    ///
    /// Bootstrap: whole-function replacement normally refuses a pre-image
    /// whose AST differs from the live function. That rail is a script
    /// function, and it is disabled here by patching it through this very
    /// engine with history caching off - the engine has to work for its
    /// first edit, before any history exists.
    pub fn new(runtime: Arc<Runtime>) -> Result<Self, PatchError> {
        let guard = runtime
            .define(AST_GUARD_SOURCE)
            .map_err(|e| PatchError::Syntax(e.to_string()))?;
        let patcher = Self {
            runtime,
            store: Mutex::new(SourceStore::new()),
            guard,
        };
        patcher.replace_fragments_inner(guard, &["return True", "return False"], false)?;
        Ok(patcher)
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Current live source of a function.
    pub fn source(&self, id: FuncId) -> Result<String, PatchError> {
        self.runtime.source(id).ok_or(PatchError::UnknownFunction)
    }

    fn rail_enabled(&self) -> bool {
        self.runtime
            .call(self.guard, &[])
            .map(|v| v.is_truthy())
            .unwrap_or(true)
    }

    /// Replace the executable body of a function with new source, recording
    /// a history snapshot.
    pub fn install_source(&self, id: FuncId, new_source: &str) -> Result<(), PatchError> {
        self.install_inner(id, new_source, true)
    }

    /// Parse first, snapshot second, swap last: a failed install leaves no
    /// history entry and no visible effect.
    pub(super) fn install_inner(
        &self,
        id: FuncId,
        new_source: &str,
        cache: bool,
    ) -> Result<(), PatchError> {
        let func = self.runtime.function(id).ok_or(PatchError::UnknownFunction)?;
        let ast = parse_function(new_source).map_err(|e| PatchError::Syntax(e.to_string()))?;
        if cache {
            self.store.lock().snapshot(id, &func.source);
        }
        debug!(func = %id, bytes = new_source.len(), "installing patched source");
        self.runtime.install(id, new_source.to_string(), ast);
        Ok(())
    }

    /// Whole-function replacement, the host fast path: with the rail
    /// enabled, `old` must parse to an AST structurally equal to the live
    /// function's before `new` is installed.
    pub fn replace(&self, id: FuncId, old: &str, new: &str) -> Result<(), PatchError> {
        if self.rail_enabled() {
            let expected =
                parse_function(&dedent(old)).map_err(|e| PatchError::Syntax(e.to_string()))?;
            let live = self.runtime.function(id).ok_or(PatchError::UnknownFunction)?;
            if expected != live.ast {
                return Err(PatchError::AstMismatch);
            }
        }
        self.install_inner(id, &dedent(new), false)
    }

    /// Replace part(s) of a function without quoting its whole body.
    ///
    /// `parts` is a flat `old, new, old, new, ...` list. The whole-function
    /// fast path is attempted first; when the old fragment is not the whole
    /// function, literal text substitutions are applied to the live source
    /// and the result re-installed. Returns whether the source changed.
    pub fn replace_fragments(&self, id: FuncId, parts: &[&str]) -> Result<bool, PatchError> {
        self.replace_fragments_inner(id, parts, true)
    }

    fn replace_fragments_inner(
        &self,
        id: FuncId,
        parts: &[&str],
        cache: bool,
    ) -> Result<bool, PatchError> {
        let live = self.runtime.function(id).ok_or(PatchError::UnknownFunction)?;
        let pre = live.source.clone();

        let changed = match self.try_whole(id, parts) {
            Ok(changed) => changed,
            Err(_) => {
                if parts.len() % 2 != 0 {
                    return Err(PatchError::BadReplacement);
                }
                let mut new_source = pre.clone();
                for pair in parts.chunks(2) {
                    new_source = new_source.replace(pair[0], pair[1]);
                }
                self.replace(id, &pre, &new_source)?;
                new_source != pre
            }
        };

        if cache {
            self.store.lock().snapshot(id, &pre);
        }
        Ok(changed)
    }

    fn try_whole(&self, id: FuncId, parts: &[&str]) -> Result<bool, PatchError> {
        if parts.len() != 2 {
            return Err(PatchError::BadReplacement);
        }
        self.replace(id, parts[0], parts[1])?;
        Ok(dedent(parts[0]) != dedent(parts[1]))
    }

    /// Re-install the newest history entry. `Ok(false)` when there is no
    /// history; an install failure is an error, not a silent `false`.
    pub fn revert(&self, id: FuncId) -> Result<bool, PatchError> {
        let popped = self.store.lock().pop_history(id);
        match popped {
            None => Ok(false),
            Some(source) => {
                self.install_inner(id, &dedent(&source), false)?;
                Ok(true)
            }
        }
    }

    /// Re-install the pristine original and clear the undo history.
    /// `Ok(false)` when the function was never modified.
    pub fn restore(&self, id: FuncId) -> Result<bool, PatchError> {
        let original = self.store.lock().original(id).map(str::to_string);
        match original {
            None => Ok(false),
            Some(source) => {
                self.install_inner(id, &dedent(&source), false)?;
                self.store.lock().clear_history(id);
                Ok(true)
            }
        }
    }
}

/// Strip the common leading whitespace of all non-blank lines.
pub(super) fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    if margin == 0 {
        return text.to_string();
    }
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines() {
        out.push(line.get(margin..).unwrap_or(""));
    }
    let mut joined = out.join("\n");
    if text.ends_with('\n') {
        joined.push('\n');
    }
    joined
}
