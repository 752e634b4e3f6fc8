use crate::{
    emit::NameError,
    model::{Location, ResolveError},
    normalize::NormalizeError,
};
use std::fmt::{self, Display};

///
/// Severity
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

///
/// DiagnosticCode
///
/// Stable codes surfaced to the host.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DiagnosticCode {
    MalformedName,
    Resolution,
    Syntax,
    DuplicateMarker,
}

impl DiagnosticCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedName => "RP0001",
            Self::Resolution => "RP0002",
            Self::Syntax => "RP0003",
            Self::DuplicateMarker => "RP0004",
        }
    }

    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::DuplicateMarker => Severity::Warning,
            Self::MalformedName | Self::Resolution | Self::Syntax => Severity::Error,
        }
    }
}

///
/// Diagnostic
///
/// One reportable problem, attached to the originating declaration when the
/// generator knows it, or to the unit key for whole-unit failures.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub location: Option<Location>,
    pub unit: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            unit: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn in_unit(mut self, key: impl Into<String>) -> Self {
        self.unit = Some(key.into());
        self
    }

    #[must_use]
    pub fn malformed_name(err: &NameError, location: Location) -> Self {
        Self::new(DiagnosticCode::MalformedName, err.to_string()).at(location)
    }

    #[must_use]
    pub fn resolution(err: &ResolveError, location: Location) -> Self {
        Self::new(DiagnosticCode::Resolution, err.to_string()).at(location)
    }

    #[must_use]
    pub fn syntax(err: &NormalizeError, key: &str) -> Self {
        Self::new(DiagnosticCode::Syntax, err.to_string()).in_unit(key)
    }

    #[must_use]
    pub fn duplicate_marker(field: &str, count: usize, location: Location) -> Self {
        Self::new(
            DiagnosticCode::DuplicateMarker,
            format!("marker applied {count} times to `{field}`; it is honoured once"),
        )
        .at(location)
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.code.severity()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity(), self.code.as_str(), self.message)?;

        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        if let Some(unit) = &self.unit {
            write!(f, " in unit '{unit}'")?;
        }

        Ok(())
    }
}
