//! Callable shapes and their normalization
//!
//! Every supported way of naming "something to call" is described by a
//! [`CallableSpec`]. Resolution turns a spec into an [`Invocable`] once, at
//! assignment time, so that invoking never has to look anything up again.
//!
//! Supported shapes:
//! - plain function pointers (`fn(&mut [Value]) -> anyhow::Result<Value>`)
//! - closures
//! - invocable objects ([`CallableObject`])
//! - (object, method) pairs via [`Receiver`]
//! - names (`"lowercase"`, `"Type::method"`) looked up in a [`CallableCatalog`]
//!
//! Arguments are passed as `&mut [Value]`; a callable may rewrite its
//! arguments in place, which is how by-reference parameters are expressed.

use crate::error::{Result, TimerError};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// What every callable returns: a value, or the callee's own failure
pub type CallResult = anyhow::Result<Value>;

/// Plain function pointer shape
pub type NativeFn = fn(&mut [Value]) -> CallResult;

type DynCall = dyn Fn(&mut [Value]) -> CallResult + Send + Sync;

/// An object that can be called directly
///
/// Implemented for every suitable closure, so any `Fn(&mut [Value]) -> CallResult`
/// can be passed wherever a `CallableObject` is expected.
pub trait CallableObject: Send + Sync {
    fn call(&self, args: &mut [Value]) -> CallResult;
}

impl<F> CallableObject for F
where
    F: Fn(&mut [Value]) -> CallResult + Send + Sync,
{
    fn call(&self, args: &mut [Value]) -> CallResult {
        self(args)
    }
}

/// An object exposing named methods, the receiver half of an (object, method) pair
pub trait Receiver: Send + Sync {
    /// Name used in diagnostics, e.g. `Greeter`
    fn type_name(&self) -> &str;

    /// Whether `method` can be dispatched on this object
    fn responds_to(&self, method: &str) -> bool;

    /// Call `method` with `args`
    fn dispatch(&self, method: &str, args: &mut [Value]) -> CallResult;
}

/// A caller-supplied description of what to call
#[derive(Clone)]
pub enum CallableSpec {
    Function(NativeFn),
    Closure(Arc<DynCall>),
    Object(Arc<dyn CallableObject>),
    Method {
        receiver: Arc<dyn Receiver>,
        method: String,
    },
    Named {
        name: String,
        catalog: CallableCatalog,
    },
    /// Already resolved; passes through unchanged
    Resolved(Invocable),
}

impl CallableSpec {
    pub fn function(f: NativeFn) -> Self {
        CallableSpec::Function(f)
    }

    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&mut [Value]) -> CallResult + Send + Sync + 'static,
    {
        CallableSpec::Closure(Arc::new(f))
    }

    pub fn object(obj: Arc<dyn CallableObject>) -> Self {
        CallableSpec::Object(obj)
    }

    pub fn method(receiver: Arc<dyn Receiver>, method: impl Into<String>) -> Self {
        CallableSpec::Method {
            receiver,
            method: method.into(),
        }
    }

    /// A name resolved against the built-in catalog
    pub fn named(name: impl Into<String>) -> Self {
        Self::named_in(CallableCatalog::builtins(), name)
    }

    /// A name resolved against `catalog`
    pub fn named_in(catalog: &CallableCatalog, name: impl Into<String>) -> Self {
        CallableSpec::Named {
            name: name.into(),
            catalog: catalog.clone(),
        }
    }

    /// Normalize into an [`Invocable`], failing fast on anything unresolvable
    pub fn resolve(self) -> Result<Invocable> {
        let invocable = match self {
            CallableSpec::Function(f) => Invocable::new("fn", Arc::new(f)),
            CallableSpec::Closure(f) => Invocable::new("closure", f),
            CallableSpec::Object(obj) => {
                Invocable::new("object", Arc::new(move |args: &mut [Value]| obj.call(args)))
            }
            CallableSpec::Method { receiver, method } => {
                if !receiver.responds_to(&method) {
                    return Err(TimerError::UnresolvableCallable(format!(
                        "method `{}` does not exist on `{}`",
                        method,
                        receiver.type_name()
                    )));
                }
                let origin = format!("{}->{}", receiver.type_name(), method);
                Invocable::new(
                    origin,
                    Arc::new(move |args: &mut [Value]| receiver.dispatch(&method, args)),
                )
            }
            CallableSpec::Named { name, catalog } => {
                let f = catalog.lookup(&name)?;
                Invocable::new(name, Arc::new(f))
            }
            CallableSpec::Resolved(invocable) => invocable,
        };
        tracing::debug!(origin = %invocable.origin(), "resolved callable");
        Ok(invocable)
    }
}

impl fmt::Debug for CallableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallableSpec::Function(_) => f.write_str("Function(..)"),
            CallableSpec::Closure(_) => f.write_str("Closure(..)"),
            CallableSpec::Object(_) => f.write_str("Object(..)"),
            CallableSpec::Method { receiver, method } => f
                .debug_struct("Method")
                .field("receiver", &receiver.type_name())
                .field("method", method)
                .finish(),
            CallableSpec::Named { name, .. } => f.debug_tuple("Named").field(name).finish(),
            CallableSpec::Resolved(invocable) => f.debug_tuple("Resolved").field(invocable).finish(),
        }
    }
}

impl From<NativeFn> for CallableSpec {
    fn from(f: NativeFn) -> Self {
        CallableSpec::Function(f)
    }
}

impl From<&str> for CallableSpec {
    fn from(name: &str) -> Self {
        CallableSpec::named(name)
    }
}

impl From<String> for CallableSpec {
    fn from(name: String) -> Self {
        CallableSpec::named(name)
    }
}

impl From<Invocable> for CallableSpec {
    fn from(invocable: Invocable) -> Self {
        CallableSpec::Resolved(invocable)
    }
}

/// A resolved callable, ready to be called with no further lookups
#[derive(Clone)]
pub struct Invocable {
    origin: String,
    func: Arc<DynCall>,
}

impl Invocable {
    fn new(origin: impl Into<String>, func: Arc<DynCall>) -> Self {
        Self {
            origin: origin.into(),
            func,
        }
    }

    /// Where this invocable came from (`closure`, `Type::method`, ...)
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[inline]
    pub fn call(&self, args: &mut [Value]) -> CallResult {
        (self.func)(args)
    }
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocable")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
struct CatalogInner {
    functions: HashMap<String, NativeFn>,
    statics: HashMap<String, HashMap<String, NativeFn>>,
}

/// Symbol table for callables addressed by name
///
/// Holds free functions (`"lowercase"`) and static methods grouped by type
/// (`"Text::shout"`). Cloning is cheap; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct CallableCatalog {
    inner: Arc<CatalogInner>,
}

impl CallableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a free function under `name`
    pub fn with_function(mut self, name: impl Into<String>, f: NativeFn) -> Self {
        Arc::make_mut(&mut self.inner)
            .functions
            .insert(name.into(), f);
        self
    }

    /// Register a static method `type_name::method`
    pub fn with_static(
        mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        f: NativeFn,
    ) -> Self {
        Arc::make_mut(&mut self.inner)
            .statics
            .entry(type_name.into())
            .or_default()
            .insert(method.into(), f);
        self
    }

    /// Names of all registered free functions, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve `"function"` or `"Type::method"`
    pub fn lookup(&self, path: &str) -> Result<NativeFn> {
        let unresolvable = |reason: &str| {
            TimerError::UnresolvableCallable(format!("`{}`: {}", path, reason))
        };

        match path.split_once("::") {
            None => {
                if path.is_empty() {
                    return Err(unresolvable("empty name"));
                }
                self.inner
                    .functions
                    .get(path)
                    .copied()
                    .ok_or_else(|| unresolvable("function not found"))
            }
            Some((type_name, method)) => {
                if type_name.is_empty() || method.is_empty() || method.contains("::") {
                    return Err(unresolvable("malformed static method path"));
                }
                let methods = self
                    .inner
                    .statics
                    .get(type_name)
                    .ok_or_else(|| unresolvable("type not found"))?;
                methods
                    .get(method)
                    .copied()
                    .ok_or_else(|| unresolvable("method not found"))
            }
        }
    }

    /// The process-wide catalog of built-in functions
    pub fn builtins() -> &'static CallableCatalog {
        static BUILTINS: OnceLock<CallableCatalog> = OnceLock::new();
        BUILTINS.get_or_init(|| {
            CallableCatalog::new()
                .with_function("lowercase", builtins::lowercase)
                .with_function("uppercase", builtins::uppercase)
                .with_function("length", builtins::length)
                .with_function("reverse", builtins::reverse)
                .with_function("sum", builtins::sum)
                .with_function("sleep_ms", builtins::sleep_ms)
                .with_function("strtolower", builtins::lowercase)
                .with_function("strtoupper", builtins::uppercase)
                .with_function("strlen", builtins::length)
                .with_static("Text", "lowercase", builtins::lowercase)
                .with_static("Text", "uppercase", builtins::uppercase)
                .with_static("Text", "reverse", builtins::reverse)
                .with_static("Math", "sum", builtins::sum)
        })
    }
}

/// Built-in functions available by name
pub mod builtins {
    use super::CallResult;
    use anyhow::{anyhow, bail};
    use serde_json::Value;
    use std::time::Duration;

    fn first_str<'a>(args: &'a [Value], func: &str) -> anyhow::Result<&'a str> {
        args.first()
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("{} expects a string as its first argument", func))
    }

    pub fn lowercase(args: &mut [Value]) -> CallResult {
        Ok(Value::from(first_str(args, "lowercase")?.to_lowercase()))
    }

    pub fn uppercase(args: &mut [Value]) -> CallResult {
        Ok(Value::from(first_str(args, "uppercase")?.to_uppercase()))
    }

    pub fn length(args: &mut [Value]) -> CallResult {
        Ok(Value::from(first_str(args, "length")?.chars().count()))
    }

    pub fn reverse(args: &mut [Value]) -> CallResult {
        Ok(Value::from(first_str(args, "reverse")?.chars().rev().collect::<String>()))
    }

    pub fn sum(args: &mut [Value]) -> CallResult {
        let mut total = 0.0;
        let mut all_integers = true;
        for (i, arg) in args.iter().enumerate() {
            match arg {
                Value::Number(n) => {
                    all_integers &= n.is_i64();
                    total += n.as_f64().unwrap_or_default();
                }
                other => bail!("sum expects numbers, argument {} is {}", i, other),
            }
        }
        if all_integers {
            Ok(Value::from(total as i64))
        } else {
            Ok(Value::from(total))
        }
    }

    /// Sleep for the given number of milliseconds; returns null
    pub fn sleep_ms(args: &mut [Value]) -> CallResult {
        let ms = args
            .first()
            .and_then(Value::as_u64)
            .ok_or_else(|| anyhow!("sleep_ms expects a non-negative integer"))?;
        std::thread::sleep(Duration::from_millis(ms));
        Ok(Value::Null)
    }
}
