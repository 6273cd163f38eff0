//! Call-site provenance
//!
//! Every public invocation entry point is `#[track_caller]`, so the
//! location it receives is already the frame just above the instrumentation.
//! A [`CallSiteProbe`] decides what to make of it:
//!
//! - [`CallerLocationProbe`] returns that location as-is (default)
//! - [`BacktraceProbe`] walks the real stack with the `backtrace` crate,
//!   skipping this crate's own frames and runtime frames
//! - [`DisabledProbe`] never reports anything; records then say `Unknown`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Maximum number of frames inspected by [`BacktraceProbe`]
const MAX_STACK_DEPTH: usize = 64;

/// Crate prefixes whose frames are never reported as the call site
const SKIPPED_SYMBOL_PREFIXES: &[&str] = &[
    "callable_timer::",
    "<callable_timer::",
    "backtrace::",
    "<backtrace::",
    "std::",
    "<std::",
    "core::",
    "<core::",
    "alloc::",
    "<alloc::",
];

/// File and line an invocation was triggered from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
}

impl CallSite {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Pluggable source of call-site provenance
pub trait CallSiteProbe: Send + Sync + fmt::Debug {
    /// `caller` is the `#[track_caller]` location of the public entry point
    fn capture(&self, caller: &'static Location<'static>) -> Option<CallSite>;
}

/// Reports the `#[track_caller]` location
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerLocationProbe;

impl CallSiteProbe for CallerLocationProbe {
    fn capture(&self, caller: &'static Location<'static>) -> Option<CallSite> {
        Some(CallSite::from(caller))
    }
}

/// Never reports a call site
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProbe;

impl CallSiteProbe for DisabledProbe {
    fn capture(&self, _caller: &'static Location<'static>) -> Option<CallSite> {
        None
    }
}

/// Walks the current stack and reports the first frame outside this crate
///
/// Needs line tables to resolve file and line. When no frame qualifies
/// (stripped binaries, unsupported platforms) the `#[track_caller]`
/// location is reported instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceProbe;

impl BacktraceProbe {
    fn is_skipped(symbol_name: &str) -> bool {
        SKIPPED_SYMBOL_PREFIXES
            .iter()
            .any(|prefix| symbol_name.starts_with(prefix))
    }
}

impl BacktraceProbe {
    fn capture_with(
        &self,
        caller: &'static Location<'static>,
        is_skipped: impl Fn(&str) -> bool,
    ) -> Option<CallSite> {
        walk_stack(is_skipped).or_else(|| {
            tracing::debug!(caller = %caller, "no resolvable frame, using caller location");
            Some(CallSite::from(caller))
        })
    }
}

impl CallSiteProbe for BacktraceProbe {
    fn capture(&self, caller: &'static Location<'static>) -> Option<CallSite> {
        self.capture_with(caller, Self::is_skipped)
    }
}

fn walk_stack(is_skipped: impl Fn(&str) -> bool) -> Option<CallSite> {
    let mut found = None;
    let mut depth = 0;

    backtrace::trace(|frame| {
        depth += 1;
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() {
                return;
            }
            let name = match symbol.name() {
                Some(name) => format!("{:#}", name),
                None => return,
            };
            if is_skipped(&name) {
                return;
            }
            if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                found = Some(CallSite::new(display_path(file), line));
            }
        });
        found.is_none() && depth < MAX_STACK_DEPTH
    });

    found
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
