use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::evaluator::Value;
use crate::runtime::Runtime;

use super::{lazy_module, lazy_object, Binding, Hooks, LazyError, PostLoad, Scope};

#[test]
fn binding_stays_lazy_until_first_access() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let scope = Scope::new();
    let proxy = lazy_module(runtime, &scope, "math", None, None, Hooks::default());

    assert!(!proxy.is_loaded());
    assert!(matches!(scope.binding("math"), Some(Binding::Lazy(_))));
}

#[test]
fn first_access_loads_and_rebinds_both_names() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let scope = Scope::new();
    let proxy = lazy_module(
        runtime.clone(),
        &scope,
        "math",
        None,
        Some("m"),
        Hooks::default(),
    );

    let value = scope.get("math").unwrap().unwrap();
    assert!(proxy.is_loaded());
    let module = match &value {
        Value::Module(m) => m.clone(),
        other => panic!("expected module, got {}", other.type_name()),
    };

    // both names now hold the real module, not the proxy
    assert!(matches!(scope.binding("math"), Some(Binding::Value(_))));
    assert!(matches!(scope.binding("m"), Some(Binding::Value(_))));
    assert_eq!(scope.get("m").unwrap().unwrap(), value);

    // and the module actually works
    let sqrt = match module.get("sqrt").unwrap() {
        Value::Function(id) => id,
        other => panic!("expected function, got {}", other.type_name()),
    };
    let result = runtime.call(sqrt, &[Value::Integer(4)]).unwrap();
    assert_eq!(result, Value::Float(2.0));
}

#[test]
fn hooks_fire_exactly_once() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let scope = Scope::new();
    let pre = Arc::new(AtomicUsize::new(0));
    let post = Arc::new(AtomicUsize::new(0));

    let hooks = Hooks {
        preload: Some(Box::new({
            let pre = pre.clone();
            move || {
                pre.fetch_add(1, Ordering::SeqCst);
            }
        })),
        postload: Some(PostLoad::Bare(Box::new({
            let post = post.clone();
            move || {
                post.fetch_add(1, Ordering::SeqCst);
            }
        }))),
    };
    let proxy = lazy_module(runtime, &scope, "math", None, None, hooks);

    proxy.force().unwrap();
    proxy.force().unwrap();
    scope.get("math").unwrap();

    assert_eq!(pre.load(Ordering::SeqCst), 1);
    assert_eq!(post.load(Ordering::SeqCst), 1);
}

#[test]
fn postload_receives_the_target() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let scope = Scope::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let hooks = Hooks {
        preload: None,
        postload: Some(PostLoad::WithTarget(Box::new({
            let seen = seen.clone();
            move |value| {
                if matches!(value, Value::Module(_)) {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            }
        }))),
    };
    lazy_module(runtime, &scope, "math", None, None, hooks);

    scope.get("math").unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_module_errors_and_retries() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let scope = Scope::new();
    let proxy = lazy_module(runtime, &scope, "nope", None, None, Hooks::default());

    let err = scope.get("nope").unwrap_err();
    assert!(matches!(err, LazyError::ModuleNotFound(_)));
    // the failed load did not poison the proxy
    assert!(!proxy.is_loaded());
    assert!(scope.get("nope").is_err());
}

#[test]
fn failed_object_load_retries_until_success() {
    let scope = Scope::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let loader = {
        let attempts = attempts.clone();
        Box::new(move || {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(LazyError::Load(anyhow::anyhow!("transient")))
            } else {
                Ok(Value::Integer(7))
            }
        })
    };
    let proxy = lazy_object(&scope, &["answer"], loader, Hooks::default());

    assert!(scope.get("answer").is_err());
    assert_eq!(scope.get("answer").unwrap(), Some(Value::Integer(7)));
    assert!(proxy.is_loaded());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn lazy_module_leaves_the_registered_module_untouched() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let scope = Scope::new();
    lazy_module(runtime.clone(), &scope, "math", None, None, Hooks::default());

    scope.get("math").unwrap();
    // a module import is not an object construction; no self-reference is
    // injected into the shared registry entry
    let math = runtime.module("math").unwrap();
    assert!(math.get("_instance").is_none());
    assert_eq!(math.item_names(), vec!["sqrt".to_string(), "pi".to_string()]);
}

#[test]
fn loaded_module_object_gets_instance_item() {
    let scope = Scope::new();
    let module = Arc::new(crate::runtime::Module::new("widget"));
    let loader = {
        let module = module.clone();
        Box::new(move || Ok(Value::Module(module.clone())))
    };
    lazy_object(&scope, &["widget"], loader, Hooks::default());

    let value = scope.get("widget").unwrap().unwrap();
    assert_eq!(module.get("_instance").unwrap(), value);
}

#[test]
fn proxy_survives_a_dropped_scope() {
    let runtime = Arc::new(Runtime::new().unwrap());
    let scope = Scope::new();
    let proxy = lazy_module(runtime, &scope, "math", None, None, Hooks::default());
    drop(scope);

    // no scope to rebind, but the target still resolves
    let value = proxy.force().unwrap();
    assert!(matches!(value, Value::Module(_)));
}
