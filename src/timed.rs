//! Timed invocation of a labelled callable
//!
//! [`TimedCallableUnit`] wraps a [`CallableUnit`] and, for every successful
//! call, produces a [`BenchmarkRecord`]: the arguments as they were handed
//! in, monotonic start/end timestamps, the return value and the call-site.
//!
//! # Invocation sequence
//!
//! ```text
//! invoke(args)
//!   ├─ snapshot = args.to_vec()         pre-call values, immune to in-place edits
//!   ├─ call_site ??= probe.capture()    unless set explicitly
//!   ├─ start = clock.now_nanos()
//!   ├─ result = unit.invoke(args)       callable may rewrite args here
//!   ├─ end = clock.now_nanos()
//!   ├─ call_site.take()                 always cleared, success or failure
//!   └─ on success: record → registry + last_benchmark, return result
//! ```
//!
//! A callable that fails produces no record and its error is returned
//! unchanged (as [`crate::error::TimerError::Callee`]).

use crate::benchmark::{BenchmarkRecord, BenchmarkRegistry};
use crate::call_site::{CallSite, CallSiteProbe, CallerLocationProbe};
use crate::callable::{CallableSpec, Invocable};
use crate::callable_unit::CallableUnit;
use crate::clock::{Clock, MonotonicClock};
use crate::config::TimerConfig;
use crate::error::Result;
use serde_json::Value;
use std::panic::Location;
use std::sync::Arc;

/// A [`CallableUnit`] that records a benchmark for every call
///
/// # Example
///
/// ```
/// use callable_timer::benchmark::BenchmarkRegistry;
/// use callable_timer::timed::TimedCallableUnit;
/// use serde_json::json;
///
/// let registry = BenchmarkRegistry::new();
/// let mut lower = TimedCallableUnit::new("lower", "lowercase")
///     .unwrap()
///     .with_registry(registry.clone());
///
/// assert_eq!(lower.invoke(&mut [json!("BOO")]).unwrap(), json!("boo"));
///
/// let record = lower.last_benchmark().unwrap();
/// assert_eq!(record.label, "lower");
/// assert_eq!(record.args, vec![json!("BOO")]);
/// assert_eq!(record.return_value, json!("boo"));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TimedCallableUnit {
    unit: CallableUnit,
    last_benchmark: Option<BenchmarkRecord>,
    call_site: Option<CallSite>,
    registry: BenchmarkRegistry,
    clock: Arc<dyn Clock>,
    probe: Arc<dyn CallSiteProbe>,
}

impl TimedCallableUnit {
    /// Bind `callable` to `label`, recording into the global registry
    pub fn new(label: impl Into<String>, callable: impl Into<CallableSpec>) -> Result<Self> {
        Ok(Self::from_unit(CallableUnit::new(label, callable)?))
    }

    /// Wrap an existing unit
    pub fn from_unit(unit: CallableUnit) -> Self {
        Self {
            unit,
            last_benchmark: None,
            call_site: None,
            registry: BenchmarkRegistry::global().clone(),
            clock: Arc::new(MonotonicClock::new()),
            probe: Arc::new(CallerLocationProbe),
        }
    }

    /// Record into `registry` instead of the global one
    pub fn with_registry(mut self, registry: BenchmarkRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn CallSiteProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Apply `config` (call-site mode)
    pub fn with_config(self, config: &TimerConfig) -> Self {
        self.with_probe(config.call_site.probe())
    }

    pub fn unit(&self) -> &CallableUnit {
        &self.unit
    }

    pub fn label(&self) -> &str {
        self.unit.label()
    }

    pub fn callable(&self) -> &Invocable {
        self.unit.callable()
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> Result<&mut Self> {
        self.unit.set_label(label)?;
        Ok(self)
    }

    pub fn set_callable(&mut self, callable: impl Into<CallableSpec>) -> Result<&mut Self> {
        self.unit.set_callable(callable)?;
        Ok(self)
    }

    /// Provenance to report for the next invocation (skips auto-capture)
    pub fn set_call_site(&mut self, call_site: Option<CallSite>) {
        self.call_site = call_site;
    }

    pub fn call_site(&self) -> Option<&CallSite> {
        self.call_site.as_ref()
    }

    /// Most recent record produced by this unit
    pub fn last_benchmark(&self) -> Option<&BenchmarkRecord> {
        self.last_benchmark.as_ref()
    }

    /// Registry this unit records into
    pub fn registry(&self) -> &BenchmarkRegistry {
        &self.registry
    }

    /// Every record in this unit's registry, from all units sharing it
    pub fn all_benchmarks(&self) -> Vec<BenchmarkRecord> {
        self.registry.all()
    }

    pub fn clear_all_benchmarks(&self) {
        self.registry.clear();
    }

    /// Invoke through the label
    ///
    /// The call-site is captured here, at the entry point the caller used.
    /// A label mismatch fails with [`crate::error::TimerError::UnregisteredLabel`], calls
    /// nothing and clears the call-site.
    #[track_caller]
    pub fn invoke_by_label(&mut self, requested: &str, args: &mut [Value]) -> Result<Value> {
        self.capture_call_site(Location::caller());
        if let Err(err) = self.unit.check_label(requested) {
            self.call_site = None;
            return Err(err);
        }
        self.timed_invoke(args, Location::caller())
    }

    /// Invoke directly, recording a benchmark on success
    #[track_caller]
    pub fn invoke(&mut self, args: &mut [Value]) -> Result<Value> {
        self.timed_invoke(args, Location::caller())
    }

    fn capture_call_site(&mut self, caller: &'static Location<'static>) {
        if self.call_site.is_none() {
            self.call_site = self.probe.capture(caller);
        }
    }

    fn timed_invoke(
        &mut self,
        args: &mut [Value],
        caller: &'static Location<'static>,
    ) -> Result<Value> {
        let snapshot = args.to_vec();
        self.capture_call_site(caller);

        let start_time = self.clock.now_nanos();
        let outcome = self.unit.invoke(args);
        let end_time = self.clock.now_nanos();

        let call_site = self.call_site.take();
        let result = outcome?;

        let record = BenchmarkRecord::new(
            self.unit.label(),
            snapshot,
            start_time,
            end_time,
            result.clone(),
            call_site.as_ref(),
        );
        tracing::trace!(
            label = %record.label,
            seconds = record.total_execution_time_in_seconds,
            call_site = %record.call_site_display(),
            "recorded benchmark"
        );
        self.registry.append(record.clone());
        self.last_benchmark = Some(record);

        Ok(result)
    }

    /// One-shot: build a unit, invoke it once, record into the global registry
    ///
    /// # Example
    ///
    /// ```
    /// use callable_timer::timed::TimedCallableUnit;
    /// use serde_json::json;
    ///
    /// let upper = TimedCallableUnit::call_func("upper", "uppercase", &mut [json!("boo")]).unwrap();
    /// assert_eq!(upper, json!("BOO"));
    /// ```
    #[track_caller]
    pub fn call_func(
        label: impl Into<String>,
        callable: impl Into<CallableSpec>,
        args: &mut [Value],
    ) -> Result<Value> {
        Self::call_func_in(BenchmarkRegistry::global(), label, callable, args)
    }

    /// [`TimedCallableUnit::call_func`] recording into `registry`
    #[track_caller]
    pub fn call_func_in(
        registry: &BenchmarkRegistry,
        label: impl Into<String>,
        callable: impl Into<CallableSpec>,
        args: &mut [Value],
    ) -> Result<Value> {
        Self::new(label, callable)?
            .with_registry(registry.clone())
            .invoke(args)
    }
}

impl From<CallableUnit> for TimedCallableUnit {
    fn from(unit: CallableUnit) -> Self {
        Self::from_unit(unit)
    }
}
