//! Pass event boundary.
//!
//! Generation logic never prints. Everything observable about a pass flows
//! through `GeneratorEvent` into an `EventSink` chosen by the caller.
use crate::diagnostic::Diagnostic;
use std::fmt::{self, Display};

///
/// GeneratorEvent
///

#[derive(Clone, Copy, Debug)]
pub enum GeneratorEvent<'a> {
    MarkerRegistered,
    PassStart {
        files: usize,
    },
    Scanned {
        candidates: usize,
        groups: usize,
    },
    UnitEmitted {
        key: &'a str,
        properties: usize,
    },
    UnitSkipped {
        key: &'a str,
    },
    Reported {
        diagnostic: &'a Diagnostic,
    },
    PassFinish {
        units: usize,
        diagnostics: usize,
    },
    PassCancelled,
}

impl Display for GeneratorEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkerRegistered => f.write_str("marker definition registered"),
            Self::PassStart { files } => write!(f, "pass start: {files} file(s)"),
            Self::Scanned { candidates, groups } => {
                write!(f, "scanned {candidates} candidate(s) in {groups} type(s)")
            }
            Self::UnitEmitted { key, properties } => {
                write!(f, "emitted {key} with {properties} propert(ies)")
            }
            Self::UnitSkipped { key } => write!(f, "skipped {key}: no valid properties"),
            Self::Reported { diagnostic } => write!(f, "{diagnostic}"),
            Self::PassFinish { units, diagnostics } => {
                write!(f, "pass finish: {units} unit(s), {diagnostics} diagnostic(s)")
            }
            Self::PassCancelled => f.write_str("pass cancelled"),
        }
    }
}

///
/// EventSink
///

pub trait EventSink: Send + Sync {
    fn record(&self, event: GeneratorEvent<'_>);
}

///
/// NoopSink
/// Default sink; drops every event.
///

pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _: GeneratorEvent<'_>) {}
}

///
/// DebugSink
/// Prints events as `[debug]` lines, enabled by `GeneratorConfig::debug`.
///

pub struct DebugSink;

impl EventSink for DebugSink {
    fn record(&self, event: GeneratorEvent<'_>) {
        println!("[debug] {event}");
    }
}
