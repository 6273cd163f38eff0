//! Benchmark records and the registry that collects them
//!
//! One [`BenchmarkRecord`] is produced per successful timed invocation.
//! Serialized field names are stable:
//!
//! ```text
//! label, args, start_time, end_time, total_execution_time_in_seconds,
//! return_value, call_site_file, call_site_line
//! ```
//!
//! `start_time`/`end_time` are nanoseconds from [`crate::clock`];
//! `call_site_file`/`call_site_line` fall back to `"Unknown"`.

use crate::call_site::CallSite;
use crate::clock::elapsed_seconds;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Placeholder used when no call-site is available
pub const UNKNOWN: &str = "Unknown";

/// Timing, arguments, result and provenance of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Label of the unit at call time
    pub label: String,
    /// Argument values as supplied, before the callable ran
    pub args: Vec<Value>,
    /// Monotonic start, nanoseconds
    pub start_time: u64,
    /// Monotonic end, nanoseconds (never before `start_time`)
    pub end_time: u64,
    /// `(end_time - start_time) / NANOS_PER_SECOND`
    pub total_execution_time_in_seconds: f64,
    /// What the callable returned (`null` for nothing)
    pub return_value: Value,
    pub call_site_file: String,
    /// Line number, `None` serializes as `"Unknown"`
    #[serde(with = "line_or_unknown")]
    pub call_site_line: Option<u32>,
}

impl BenchmarkRecord {
    /// Build a record; a reversed clock reading is clamped to a zero-length span
    pub fn new(
        label: impl Into<String>,
        args: Vec<Value>,
        start_time: u64,
        end_time: u64,
        return_value: Value,
        call_site: Option<&CallSite>,
    ) -> Self {
        let end_time = end_time.max(start_time);
        Self {
            label: label.into(),
            args,
            start_time,
            end_time,
            total_execution_time_in_seconds: elapsed_seconds(start_time, end_time),
            return_value,
            call_site_file: call_site
                .map(|site| site.file.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            call_site_line: call_site.map(|site| site.line),
        }
    }

    /// Elapsed time in nanoseconds
    pub fn duration_nanos(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }

    /// Call site as `file:line`, or `Unknown`
    pub fn call_site_display(&self) -> String {
        match self.call_site_line {
            Some(line) => format!("{}:{}", self.call_site_file, line),
            None => UNKNOWN.to_string(),
        }
    }
}

mod line_or_unknown {
    use super::UNKNOWN;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(line: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match line {
            Some(line) => serializer.serialize_u32(*line),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .and_then(|line| u32::try_from(line).ok())
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid line number: {}", n))),
            Value::String(s) if s == UNKNOWN => Ok(None),
            Value::Null => Ok(None),
            other => Err(de::Error::custom(format!("invalid call_site_line: {}", other))),
        }
    }
}

/// Ordered, append-only collection of benchmark records
///
/// A cheap handle: clones share the same storage. [`BenchmarkRegistry::global`]
/// is the process-wide instance timed units use unless given another one.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRegistry {
    records: Arc<Mutex<Vec<BenchmarkRecord>>>,
}

impl BenchmarkRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static BenchmarkRegistry {
        static GLOBAL: OnceLock<BenchmarkRegistry> = OnceLock::new();
        GLOBAL.get_or_init(BenchmarkRegistry::new)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<BenchmarkRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a record at the end
    pub fn append(&self, record: BenchmarkRecord) {
        self.lock().push(record);
    }

    /// Snapshot of every record, in append order
    pub fn all(&self) -> Vec<BenchmarkRecord> {
        self.lock().clone()
    }

    /// Most recently appended record
    pub fn last(&self) -> Option<BenchmarkRecord> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every record
    pub fn clear(&self) {
        let mut records = self.lock();
        tracing::debug!(dropped = records.len(), "clearing benchmark registry");
        records.clear();
    }

    #[cfg(test)]
    fn same_as(&self, other: &BenchmarkRegistry) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}
