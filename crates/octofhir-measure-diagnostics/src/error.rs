//! Measure error types

use crate::{ErrorCode, RecordRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the run cannot proceed
    Error,
    /// Warning - a record was degraded but the run continues
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message with record location and context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Input record the diagnostic refers to
    pub record: Option<RecordRef>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            record: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            record: None,
            help: None,
        }
    }

    /// Set the record location
    pub fn with_record(mut self, record: RecordRef) -> Self {
        self.record = Some(record);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Member the diagnostic refers to, if any
    pub fn member_id(&self) -> Option<&str> {
        self.record.as_ref().and_then(|r| r.member_id.as_deref())
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue().bold(),
        };
        let mut out = format!("{}: {} - {}", severity, self.code, self.message);
        if let Some(record) = &self.record {
            out.push_str(&format!(" at {}", record.to_string().cyan()));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(record) = &self.record {
            write!(f, " at {}", record)?;
        }
        Ok(())
    }
}

/// Main measure error type
///
/// Only structural failures are represented here. Per-record data-quality
/// problems are reported as [`Diagnostic`] warnings and never surface as errors.
#[derive(Debug, Clone, Error)]
pub enum MeasureError {
    /// Input schema error (required column absent, malformed table)
    #[error("{code}: {message}")]
    Schema {
        code: ErrorCode,
        message: String,
        table: Option<String>,
        context: Option<String>,
    },

    /// Measure configuration error
    #[error("{code}: {message}")]
    Configuration {
        code: ErrorCode,
        message: String,
        measure: Option<String>,
        context: Option<String>,
    },

    /// Evaluation error
    #[error("{code}: {message}")]
    Evaluation {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Multiple errors collected
    #[error("Multiple errors: {}", .0.len())]
    Multiple(Vec<MeasureError>),
}

impl MeasureError {
    /// Create a schema error
    pub fn schema(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Schema {
            code,
            message: message.into(),
            table: None,
            context: None,
        }
    }

    /// Create a schema error for a specific table
    pub fn schema_in(code: ErrorCode, table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            code,
            message: message.into(),
            table: Some(table.into()),
            context: None,
        }
    }

    /// Create a configuration error
    pub fn configuration(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Configuration {
            code,
            message: message.into(),
            measure: None,
            context: None,
        }
    }

    /// Create a configuration error for a specific measure
    pub fn configuration_for(
        code: ErrorCode,
        measure: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            code,
            message: message.into(),
            measure: Some(measure.into()),
            context: None,
        }
    }

    /// Create an evaluation error
    pub fn evaluation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Evaluation {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to the error
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::Schema { context, .. }
            | Self::Configuration { context, .. }
            | Self::Evaluation { context, .. }
            | Self::System { context, .. } => *context = Some(ctx.into()),
            Self::Multiple(_) => {}
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Schema { code, .. } => *code,
            Self::Configuration { code, .. } => *code,
            Self::Evaluation { code, .. } => *code,
            Self::System { code, .. } => *code,
            Self::Multiple(errors) => errors.first().map(|e| e.code()).unwrap_or(ErrorCode::new(0)),
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Schema { code, message, table, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(table) = table {
                    diag = diag.with_help(format!("in table '{}'", table));
                }
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                diag
            }
            Self::Configuration { code, message, measure, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(measure) = measure {
                    diag = diag.with_help(format!("in measure '{}'", measure));
                }
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                diag
            }
            Self::Evaluation { code, message, context } | Self::System { code, message, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                diag
            }
            Self::Multiple(errors) => {
                if let Some(first) = errors.first() {
                    first.to_diagnostic()
                } else {
                    Diagnostic::error(ErrorCode::new(0), "Unknown error")
                }
            }
        }
    }
}
