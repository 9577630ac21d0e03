//! Error adapter for converting [`CliError`] to miette diagnostics.
//!
//! This module provides the bridge between the crate's standard error types
//! and miette's rich diagnostic formatting. Document errors are shown as a
//! labelled snippet of the document; every other error gets a diagnostic
//! code and, where a fix is obvious, a help line.

use std::{fmt, ops::Range};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use pgm_builder::PgmError;

use crate::{config::ConfigError, error::CliError};

/// Adapter for an error located in the input document.
pub struct DocumentAdapter<'a> {
    message: &'a str,
    span: Option<Range<usize>>,
    src: &'a str,
}

impl<'a> DocumentAdapter<'a> {
    /// Create a new document adapter.
    pub fn new(message: &'a str, span: Option<Range<usize>>, src: &'a str) -> Self {
        Self { message, span, src }
    }
}

impl fmt::Debug for DocumentAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentAdapter")
            .field("message", &self.message)
            .field("span", &self.span)
            .finish()
    }
}

impl fmt::Display for DocumentAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid document")
    }
}

impl std::error::Error for DocumentAdapter<'_> {}

impl MietteDiagnostic for DocumentAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("pgm::document"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.span.is_some() {
            None
        } else {
            Some(Box::new(self.message))
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span.clone()?;
        let label = LabeledSpan::new_primary_with_span(
            Some(self.message.to_string()),
            SourceSpan::from(span),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for errors without a location in the document.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Io(_) => "pgm::io",
            CliError::Config(ConfigError::Parse { .. }) => "pgm::config::parse",
            CliError::Config(ConfigError::MissingFile(_)) => "pgm::config::missing",
            CliError::Document { .. } => "pgm::document",
            CliError::Pgm(err) => pgm_code(err),
            CliError::Serialize(_) => "pgm::serialize",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            CliError::Pgm(err) => pgm_help(err)?,
            CliError::Config(ConfigError::MissingFile(_)) => {
                "check the path given with --config"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

fn pgm_code(err: &PgmError) -> &'static str {
    match err {
        PgmError::InvalidPlacement { .. } => "pgm::invalid_placement",
        PgmError::MissingDependencyTarget { .. } => "pgm::missing_dependency_target",
        PgmError::UnsupportedExponent(_) => "pgm::unsupported_exponent",
        PgmError::UnknownNodeReference { .. } => "pgm::unknown_node_reference",
        PgmError::UnknownAnchor { .. } => "pgm::unknown_anchor",
        PgmError::DuplicateNodeName { .. } => "pgm::duplicate_node_name",
        PgmError::EmptyPlate { .. } => "pgm::empty_plate",
        PgmError::CyclicDependency(_) => "pgm::cyclic_dependency",
    }
}

fn pgm_help(err: &PgmError) -> Option<&'static str> {
    let help = match err {
        PgmError::InvalidPlacement { .. } => {
            "give either `xy` or exactly one relative placement such as `above`"
        }
        PgmError::MissingDependencyTarget { .. } => {
            "add `of = [...]`, or place the parameter relative to the node it belongs to"
        }
        PgmError::UnsupportedExponent(_) => "set an explicit `name` for this node",
        PgmError::DuplicateNodeName { .. } => "set an explicit `name` on one of the nodes",
        PgmError::EmptyPlate { .. } => "add `members` or `[[plate.node]]` entries to the plate",
        PgmError::CyclicDependency(_) => "anchor at least one of these nodes at fixed coordinates",
        PgmError::UnknownNodeReference { .. } | PgmError::UnknownAnchor { .. } => return None,
    };
    Some(help)
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// An error with a location in the document.
    Document(DocumentAdapter<'a>),
    /// An error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Document(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Document(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Document(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Document(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Document(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Document(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`CliError`] into a list of reportable errors.
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    match err {
        CliError::Document { message, span, src } => vec![Reportable::Document(
            DocumentAdapter::new(message, span.clone(), src),
        )],
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use pgm_builder::Node;

    use super::*;

    #[test]
    fn test_document_error_is_labelled() {
        let err = CliError::Document {
            message: "unknown field `colour`".to_string(),
            span: Some(4..10),
            src: "xy = colour".to_string(),
        };

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        let Reportable::Document(adapter) = &reportables[0] else {
            panic!("Expected Document");
        };
        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label(), Some("unknown field `colour`"));
        assert!(labels[0].primary());
        assert!(adapter.help().is_none());
    }

    #[test]
    fn test_document_error_without_span() {
        let err = CliError::Document {
            message: "missing field `symbol`".to_string(),
            span: None,
            src: String::new(),
        };

        let reportables = to_reportables(&err);
        assert!(reportables[0].labels().is_none());
        assert_eq!(
            reportables[0].help().map(|help| help.to_string()).as_deref(),
            Some("missing field `symbol`")
        );
    }

    #[test]
    fn test_pgm_error_code_and_help() {
        let err = CliError::from(Node::param("$y$").at(0.0, 0.0).build().unwrap_err());

        let reportables = to_reportables(&err);
        let Reportable::Error(adapter) = &reportables[0] else {
            panic!("Expected Error");
        };
        assert_eq!(
            adapter.code().map(|code| code.to_string()).as_deref(),
            Some("pgm::missing_dependency_target")
        );
        assert!(adapter.help().is_some());
        assert!(adapter.to_string().contains("`y`"));
    }

    #[test]
    fn test_io_error() {
        let err = CliError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));

        let reportables = to_reportables(&err);
        assert_eq!(reportables[0].to_string(), "I/O error: gone");
        assert_eq!(
            reportables[0].code().map(|code| code.to_string()).as_deref(),
            Some("pgm::io")
        );
    }
}
