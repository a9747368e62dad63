//! Lazy bindings: names in a scope that resolve to a placeholder proxy
//! until first use, at which point the real target is loaded, the scope is
//! rebound to it, and subsequent lookups bypass the proxy entirely.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::evaluator::Value;
use crate::runtime::Runtime;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum LazyError {
    #[error("module '{0}' not found")]
    ModuleNotFound(String),

    #[error("lazy load failed: {0}")]
    Load(#[source] anyhow::Error),
}

/// Produces the proxy's target. Runs at most once successfully; a failure
/// leaves the proxy unloaded so a later access can retry.
pub type LoadFn = Box<dyn Fn() -> Result<Value, LazyError> + Send + Sync>;

/// Post-load hook shapes: some callers want the loaded target, some don't.
pub enum PostLoad {
    Bare(Box<dyn Fn() + Send + Sync>),
    WithTarget(Box<dyn Fn(&Value) + Send + Sync>),
}

/// Optional callbacks around the one-time load.
#[derive(Default)]
pub struct Hooks {
    pub preload: Option<Box<dyn Fn() + Send + Sync>>,
    pub postload: Option<PostLoad>,
}

/// A name-to-binding map standing in for a caller's global frame.
#[derive(Default)]
pub struct Scope {
    bindings: RwLock<IndexMap<String, Binding>>,
}

#[derive(Clone)]
pub enum Binding {
    Value(Value),
    Lazy(Arc<LazyProxy>),
}

impl Scope {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.bindings.write().insert(name.into(), Binding::Value(value));
    }

    fn set_lazy(&self, name: impl Into<String>, proxy: Arc<LazyProxy>) {
        self.bindings.write().insert(name.into(), Binding::Lazy(proxy));
    }

    /// Look a name up, forcing a lazy binding if one is installed. The
    /// binding is cloned out of the lock before forcing so the loader can
    /// rebind into this scope.
    pub fn get(&self, name: &str) -> Result<Option<Value>, LazyError> {
        let binding = self.bindings.read().get(name).cloned();
        match binding {
            None => Ok(None),
            Some(Binding::Value(v)) => Ok(Some(v)),
            Some(Binding::Lazy(proxy)) => proxy.force().map(Some),
        }
    }

    /// Inspect a binding without triggering a load.
    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.bindings.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.bindings.read().keys().cloned().collect()
    }
}

/// Placeholder that collapses to its target on first use.
pub struct LazyProxy {
    names: Vec<String>,
    scope: Weak<Scope>,
    loader: LoadFn,
    hooks: Hooks,
    target: OnceCell<Value>,
}

impl LazyProxy {
    pub fn is_loaded(&self) -> bool {
        self.target.get().is_some()
    }

    /// Resolve the target, loading it on first call. Concurrent first
    /// accesses block on the same initialization and observe one target;
    /// hooks and rebinding run exactly once, inside that initialization.
    pub fn force(&self) -> Result<Value, LazyError> {
        self.target
            .get_or_try_init(|| {
                if let Some(pre) = &self.hooks.preload {
                    pre();
                }
                debug!(names = ?self.names, "loading lazy binding");
                let value = (self.loader)()?;
                if let Some(scope) = self.scope.upgrade() {
                    for name in &self.names {
                        scope.set(name.clone(), value.clone());
                    }
                }
                match &self.hooks.postload {
                    Some(PostLoad::Bare(f)) => f(),
                    Some(PostLoad::WithTarget(f)) => f(&value),
                    None => {}
                }
                Ok(value)
            })
            .cloned()
    }
}

/// Bind a module from the runtime's registry lazily under `name` (and
/// `alias`, when given). `package` qualifies the module name.
pub fn lazy_module(
    runtime: Arc<Runtime>,
    scope: &Arc<Scope>,
    name: &str,
    package: Option<&str>,
    alias: Option<&str>,
    hooks: Hooks,
) -> Arc<LazyProxy> {
    let qualified = match package {
        Some(p) => format!("{p}.{name}"),
        None => name.to_string(),
    };
    let loader: LoadFn = Box::new(move || {
        runtime
            .module(&qualified)
            .map(Value::Module)
            .ok_or_else(|| LazyError::ModuleNotFound(qualified.clone()))
    });
    let mut names = vec![name.to_string()];
    if let Some(alias) = alias {
        names.push(alias.to_string());
    }
    install(scope, names, loader, hooks)
}

/// Bind an arbitrary lazily-computed value under one or more names. A
/// produced value with writable items gets an `_instance` item pointing
/// back at itself; module imports through [`lazy_module`] do not.
pub fn lazy_object(
    scope: &Arc<Scope>,
    names: &[&str],
    loader: LoadFn,
    hooks: Hooks,
) -> Arc<LazyProxy> {
    let loader: LoadFn = Box::new(move || {
        let value = loader()?;
        if let Value::Module(module) = &value {
            module.set("_instance", value.clone());
        }
        Ok(value)
    });
    let names = names.iter().map(|n| n.to_string()).collect();
    install(scope, names, loader, hooks)
}

fn install(
    scope: &Arc<Scope>,
    names: Vec<String>,
    loader: LoadFn,
    hooks: Hooks,
) -> Arc<LazyProxy> {
    let proxy = Arc::new(LazyProxy {
        names,
        scope: Arc::downgrade(scope),
        loader,
        hooks,
        target: OnceCell::new(),
    });
    for name in &proxy.names {
        scope.set_lazy(name.clone(), proxy.clone());
    }
    proxy
}
