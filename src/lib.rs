//! callable-timer - wrap any callable and time every invocation
//!
//! A [`callable_unit::CallableUnit`] binds one label to one callable and can
//! be invoked directly or through its label. A [`timed::TimedCallableUnit`]
//! adds measurement: for each successful call it records the arguments as
//! supplied, monotonic start/end timestamps, the return value and the
//! call-site into a [`benchmark::BenchmarkRegistry`].

pub mod benchmark;
pub mod call_site;
pub mod callable;
pub mod callable_unit;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod label;
pub mod report;
pub mod timed;

pub use benchmark::{BenchmarkRecord, BenchmarkRegistry};
pub use call_site::CallSite;
pub use callable::{CallResult, CallableSpec};
pub use callable_unit::CallableUnit;
pub use error::{Result, TimerError};
pub use timed::TimedCallableUnit;
