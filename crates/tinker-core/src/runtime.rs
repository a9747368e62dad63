//! Tinker runtime - registry of live script functions and modules
//!
//! The runtime is the substrate the patch engine operates on: every function
//! keeps both its source text and its parsed AST, and either can be swapped
//! at any time between calls.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ast::Function,
    evaluator::{Evaluator, Value},
    parser::parse_function,
    TinkerConfig,
};

/// Function ID type - opaque identity of a live callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuncId(pub Uuid);

impl Default for FuncId {
    fn default() -> Self {
        Self::new()
    }
}

impl FuncId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for FuncId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", &self.0.to_string()[..8])
    }
}

/// A live script function: source text plus the AST that executes
#[derive(Debug)]
pub struct ScriptFn {
    pub id: FuncId,
    pub name: String,
    pub source: String,
    pub ast: Function,
}

/// A runtime module: a named collection of values (functions, constants)
#[derive(Debug)]
pub struct Module {
    pub name: String,
    items: RwLock<IndexMap<String, Value>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: RwLock::new(IndexMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.items.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.items.write().insert(key.into(), value);
    }

    pub fn item_names(&self) -> Vec<String> {
        self.items.read().keys().cloned().collect()
    }
}

/// Runtime holding the function and module registries.
///
/// The registries are `Send + Sync`, but the patch engine offers no
/// cross-thread consistency: a function being re-installed while another
/// thread is calling it may observe either version. Callers wanting
/// concurrent patch-and-call must serialize externally.
pub struct Runtime {
    functions: DashMap<FuncId, Arc<ScriptFn>>,
    names: DashMap<String, FuncId>,
    modules: DashMap<String, Arc<Module>>,
    config: TinkerConfig,
}

impl Runtime {
    pub fn new() -> Result<Self> {
        Self::with_config(TinkerConfig::default())
    }

    pub fn with_config(config: TinkerConfig) -> Result<Self> {
        let runtime = Self {
            functions: DashMap::new(),
            names: DashMap::new(),
            modules: DashMap::new(),
            config,
        };
        runtime.install_builtin_modules()?;
        Ok(runtime)
    }

    fn install_builtin_modules(&self) -> Result<()> {
        let sqrt = self.define("def sqrt(x):\n    return x ** 0.5\n")?;
        let math = Arc::new(Module::new("math"));
        math.set("sqrt", Value::Function(sqrt));
        math.set("pi", Value::Float(std::f64::consts::PI));
        self.register_module(math);
        Ok(())
    }

    pub fn config(&self) -> &TinkerConfig {
        &self.config
    }

    /// Parse and register a new function; returns its handle.
    pub fn define(&self, source: &str) -> Result<FuncId> {
        let ast = parse_function(source)?;
        let id = FuncId::new();
        let func = Arc::new(ScriptFn {
            id,
            name: ast.name.clone(),
            source: source.to_string(),
            ast,
        });
        self.names.insert(func.name.clone(), id);
        self.functions.insert(id, func);
        Ok(id)
    }

    /// Swap a live function's source and AST in place.
    pub(crate) fn install(&self, id: FuncId, source: String, ast: Function) {
        let name = ast.name.clone();
        if let Some(old) = self.functions.get(&id).map(|e| e.value().clone()) {
            if old.name != name && self.names.get(&old.name).map(|e| *e.value()) == Some(id) {
                self.names.remove(&old.name);
            }
        }
        self.names.insert(name.clone(), id);
        self.functions.insert(
            id,
            Arc::new(ScriptFn {
                id,
                name,
                source,
                ast,
            }),
        );
    }

    pub fn function(&self, id: FuncId) -> Option<Arc<ScriptFn>> {
        self.functions.get(&id).map(|e| e.value().clone())
    }

    /// Current live source of a function.
    pub fn source(&self, id: FuncId) -> Option<String> {
        self.functions.get(&id).map(|e| e.value().source.clone())
    }

    /// Resolve a function handle by name.
    pub fn lookup(&self, name: &str) -> Option<FuncId> {
        self.names.get(name).map(|e| *e.value())
    }

    /// Call a registered function with positional arguments.
    pub fn call(&self, id: FuncId, args: &[Value]) -> Result<Value> {
        let func = self
            .function(id)
            .ok_or_else(|| anyhow!("function {} not found", id))?;
        let evaluator = Evaluator::new(self);
        Ok(evaluator.call_function(&func.ast, args, 0)?)
    }

    /// Call a registered function by name.
    pub fn call_named(&self, name: &str, args: &[Value]) -> Result<Value> {
        let id = self
            .lookup(name)
            .ok_or_else(|| anyhow!("function '{}' not found", name))?;
        self.call(id, args)
    }

    /// Make a module available for import.
    pub fn register_module(&self, module: Arc<Module>) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Fetch a registered module by (qualified) name.
    pub fn module(&self, name: &str) -> Option<Arc<Module>> {
        self.modules.get(name).map(|e| e.value().clone())
    }
}
