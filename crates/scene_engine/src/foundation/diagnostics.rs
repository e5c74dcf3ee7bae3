//! Structured diagnostics
//!
//! Warnings and errors raised by the core are recorded as [`Diagnostic`]
//! records instead of being printed. The [`DiagnosticLog`] keeps them for
//! inspection and optionally echoes each one through the `log` facade.

use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Recoverable problem; a default was substituted or a call was ignored
    Warning,
    /// Operation failed without side effects (e.g. write to an unknown field)
    Error,
    /// Programming error that aborted construction of a component
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Fatal => write!(f, "FATAL"),
        }
    }
}

/// A single structured diagnostic record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the problem
    pub severity: Severity,
    /// Component (or system) type the problem relates to, if any
    pub component_type: Option<String>,
    /// Property the problem relates to, if any
    pub property: Option<String>,
    /// Human readable description
    pub message: String,
    /// Extra context such as the entity name or the rejected value
    pub context: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the given severity
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            component_type: None,
            property: None,
            message: message.into(),
            context: None,
        }
    }

    /// Create a warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a non-fatal error
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a fatal diagnostic
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// Attach the component type (builder pattern)
    pub fn with_component(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = Some(component_type.into());
        self
    }

    /// Attach the property name (builder pattern)
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Attach free-form context (builder pattern)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Forward the record to the `log` facade at a matching level
    pub fn emit(&self) {
        match self.severity {
            Severity::Warning => log::warn!("{self}"),
            Severity::Error | Severity::Fatal => log::error!("{self}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity)?;
        if let Some(component) = &self.component_type {
            write!(f, "({component})")?;
        }
        if let Some(property) = &self.property {
            write!(f, " '{property}':")?;
        }
        write!(f, " {}", self.message)?;
        if let Some(context) = &self.context {
            write!(f, " [{context}]")?;
        }
        Ok(())
    }
}

/// Collector for diagnostics raised while operating on a world
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    records: Vec<Diagnostic>,
    echo: bool,
    retain: bool,
}

impl DiagnosticLog {
    /// Create a log that retains records and echoes them through `log`
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            echo: true,
            retain: true,
        }
    }

    /// Control whether records are forwarded to the `log` facade
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Control whether records are kept for later inspection
    pub fn with_retention(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.echo {
            diagnostic.emit();
        }
        if self.retain {
            self.records.push(diagnostic);
        }
    }

    /// Record several diagnostics in order
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// All retained records, oldest first
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Retained records with the given severity
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(move |d| d.severity == severity)
    }

    /// Number of retained warnings
    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    /// Remove and return every retained record
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are retained
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_all_parts() {
        let diagnostic = Diagnostic::warning("value rejected")
            .with_component("Geometry")
            .with_property("primitive")
            .with_context("cone");
        assert_eq!(
            diagnostic.to_string(),
            "[WARNING](Geometry) 'primitive': value rejected [cone]"
        );
    }

    #[test]
    fn test_log_retention_and_take() {
        let mut log = DiagnosticLog::new().with_echo(false);
        log.push(Diagnostic::warning("first"));
        log.push(Diagnostic::error("second"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.warning_count(), 1);

        let taken = log.take();
        assert_eq!(taken.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_log_without_retention_keeps_nothing() {
        let mut log = DiagnosticLog::new().with_echo(false).with_retention(false);
        log.push(Diagnostic::fatal("bad schema"));
        assert!(log.is_empty());
    }
}
