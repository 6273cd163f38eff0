//! A callable bound to a label
//!
//! [`CallableUnit`] owns one resolved callable and the one label it is
//! registered under. It can be triggered directly with [`CallableUnit::invoke`]
//! or through its label with [`CallableUnit::invoke_by_label`]; both end in
//! the same call.

use crate::callable::{CallableSpec, Invocable};
use crate::error::{Result, TimerError};
use crate::label::validate_label;
use serde_json::Value;

/// One label, one callable
///
/// # Example
///
/// ```
/// use callable_timer::callable_unit::CallableUnit;
/// use serde_json::json;
///
/// let unit = CallableUnit::new("lower", "lowercase").unwrap();
/// assert_eq!(unit.invoke(&mut [json!("BOO")]).unwrap(), json!("boo"));
/// assert_eq!(unit.invoke_by_label("lower", &mut [json!("BOO")]).unwrap(), json!("boo"));
/// ```
#[derive(Debug, Clone)]
pub struct CallableUnit {
    label: String,
    callable: Invocable,
}

impl CallableUnit {
    /// Bind `callable` to `label`
    ///
    /// Fails with [`TimerError::InvalidLabel`] or
    /// [`TimerError::UnresolvableCallable`]; the label is checked first.
    pub fn new(label: impl Into<String>, callable: impl Into<CallableSpec>) -> Result<Self> {
        let label = label.into();
        validate_label(&label)?;
        let callable = callable.into().resolve()?;
        Ok(Self { label, callable })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn callable(&self) -> &Invocable {
        &self.callable
    }

    /// Replace the bound callable; on failure the previous one is kept
    pub fn set_callable(&mut self, callable: impl Into<CallableSpec>) -> Result<&mut Self> {
        self.callable = callable.into().resolve()?;
        Ok(self)
    }

    /// Rename the unit; on failure the previous label is kept
    pub fn set_label(&mut self, label: impl Into<String>) -> Result<&mut Self> {
        let label = label.into();
        validate_label(&label)?;
        self.label = label;
        Ok(self)
    }

    /// Whether `requested` names this unit
    pub fn answers_to(&self, requested: &str) -> bool {
        self.label == requested
    }

    /// Invoke through the label; any other label is rejected without calling anything
    pub fn invoke_by_label(&self, requested: &str, args: &mut [Value]) -> Result<Value> {
        self.check_label(requested)?;
        self.invoke(args)
    }

    pub(crate) fn check_label(&self, requested: &str) -> Result<()> {
        if self.answers_to(requested) {
            Ok(())
        } else {
            Err(TimerError::UnregisteredLabel {
                requested: requested.to_string(),
                registered: self.label.clone(),
            })
        }
    }

    /// Call the bound callable with `args` and return its result verbatim
    ///
    /// Nothing else happens here: timed wrappers measure exactly this call.
    #[inline]
    pub fn invoke(&self, args: &mut [Value]) -> Result<Value> {
        self.callable.call(args).map_err(TimerError::Callee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::CallResult;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_new_with_builtin_name() {
        let unit = CallableUnit::new("strtolower", "strtolower").unwrap();
        assert_eq!(unit.label(), "strtolower");
        assert_eq!(unit.callable().origin(), "strtolower");
        assert_eq!(unit.invoke(&mut [json!("BOO")]).unwrap(), json!("boo"));
    }

    #[test]
    fn test_new_rejects_bad_label() {
        let err = CallableUnit::new("-strtolower", "strtolower").unwrap_err();
        assert!(matches!(err, TimerError::InvalidLabel(_)));
    }

    #[test]
    fn test_label_checked_before_callable() {
        let err = CallableUnit::new("1bad", "no_such_function").unwrap_err();
        assert!(matches!(err, TimerError::InvalidLabel(_)));
    }

    #[test]
    fn test_new_rejects_unresolvable_callable() {
        let err = CallableUnit::new("ok", "no_such_function").unwrap_err();
        assert!(matches!(err, TimerError::UnresolvableCallable(_)));
    }

    #[test]
    fn test_set_label_chains_and_validates() {
        let mut unit = CallableUnit::new("lower", "lowercase").unwrap();
        unit.set_label("down").unwrap().set_label("_down2").unwrap();
        assert_eq!(unit.label(), "_down2");

        assert!(matches!(
            unit.set_label("2down"),
            Err(TimerError::InvalidLabel(_))
        ));
        assert_eq!(unit.label(), "_down2");
    }

    #[test]
    fn test_set_callable_replaces_binding() {
        let mut unit = CallableUnit::new("convert", "lowercase").unwrap();
        unit.set_callable("uppercase").unwrap();
        assert_eq!(unit.invoke(&mut [json!("boo")]).unwrap(), json!("BOO"));

        assert!(unit.set_callable("Missing::thing").is_err());
        assert_eq!(unit.invoke(&mut [json!("boo")]).unwrap(), json!("BOO"));
    }

    #[test]
    fn test_invoke_by_label_matches_invoke() {
        let unit = CallableUnit::new("rev", "reverse").unwrap();
        let direct = unit.invoke(&mut [json!("abc")]).unwrap();
        let by_label = unit.invoke_by_label("rev", &mut [json!("abc")]).unwrap();
        assert_eq!(direct, by_label);
        assert_eq!(direct, json!("cba"));
    }

    #[test]
    fn test_invoke_by_wrong_label_never_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let unit = CallableUnit::new(
            "count",
            CallableSpec::closure(move |_: &mut [Value]| -> CallResult {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            }),
        )
        .unwrap();

        let err = unit.invoke_by_label("Count", &mut []).unwrap_err();
        match err {
            TimerError::UnregisteredLabel { requested, registered } => {
                assert_eq!(requested, "Count");
                assert_eq!(registered, "count");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        unit.invoke_by_label("count", &mut []).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invoke_propagates_callee_error() {
        let unit = CallableUnit::new(
            "boom",
            CallableSpec::closure(|_: &mut [Value]| -> CallResult { anyhow::bail!("kaboom") }),
        )
        .unwrap();
        let err = unit.invoke(&mut []).unwrap_err();
        assert_eq!(err.to_string(), "kaboom");
        assert!(err.callee_error().is_some());
    }

    #[test]
    fn test_invoke_mutates_arguments_in_place() {
        let unit = CallableUnit::new(
            "bump",
            CallableSpec::closure(|args: &mut [Value]| -> CallResult {
                let next = args[0].as_i64().unwrap_or(0) + 1;
                args[0] = json!(next);
                Ok(json!(format!("$arg = {}", next)))
            }),
        )
        .unwrap();
        let mut args = [json!(-1)];
        assert_eq!(unit.invoke(&mut args).unwrap(), json!("$arg = 0"));
        assert_eq!(args[0], json!(0));
    }
}
