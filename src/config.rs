//! Timer configuration
//!
//! Only one knob matters at run time: how call-sites are captured.
//! `CALLABLE_TIMER_CALL_SITE` selects it from the environment
//! (`caller`, `backtrace`, `off`); CLI flags override the environment.

use crate::call_site::{BacktraceProbe, CallSiteProbe, CallerLocationProbe, DisabledProbe};
use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable consulted by [`TimerConfig::from_env`]
pub const CALL_SITE_ENV: &str = "CALLABLE_TIMER_CALL_SITE";

/// How timed units find out where they were invoked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CallSiteMode {
    /// Location of the invoking code
    #[default]
    Caller,
    /// Walk the stack for the first frame outside the timer
    Backtrace,
    /// Never capture; records say `Unknown`
    Off,
}

impl CallSiteMode {
    pub fn probe(self) -> Arc<dyn CallSiteProbe> {
        match self {
            CallSiteMode::Caller => Arc::new(CallerLocationProbe),
            CallSiteMode::Backtrace => Arc::new(BacktraceProbe),
            CallSiteMode::Off => Arc::new(DisabledProbe),
        }
    }
}

impl FromStr for CallSiteMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "caller" => Ok(CallSiteMode::Caller),
            "backtrace" => Ok(CallSiteMode::Backtrace),
            "off" | "none" | "disabled" => Ok(CallSiteMode::Off),
            other => bail!(
                "Invalid call-site mode: {}. Expected one of: caller, backtrace, off",
                other
            ),
        }
    }
}

/// Settings applied to newly built timed units
///
/// # Example
/// ```
/// use callable_timer::config::{CallSiteMode, TimerConfig};
///
/// let config = TimerConfig::default();
/// assert_eq!(config.call_site, CallSiteMode::Caller);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Call-site capture strategy
    pub call_site: CallSiteMode,
}

impl TimerConfig {
    pub fn with_call_site(mut self, mode: CallSiteMode) -> Self {
        self.call_site = mode;
        self
    }

    /// Defaults, overridden by `CALLABLE_TIMER_CALL_SITE` when set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(mode) = lookup(CALL_SITE_ENV) {
            config.call_site = mode.parse()?;
        }
        Ok(config)
    }
}
