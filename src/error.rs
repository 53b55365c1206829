/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Depsize error types so proxy, manifest and
    resolver failures surface with consistent context and
    exit semantics.

  Security / Safety Notes:
    Errors carry proxy URLs and module coordinates only; no
    credentials or response bodies are embedded.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate failures and consolidate
    exit codes for the binary entry point.

  Revision History:
    2025-11-12 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Depsize operations.
pub type Result<T> = std::result::Result<T, DepsizeError>;

/// Enumerates high-level error domains surfaced by Depsize.
#[derive(Debug, Error)]
pub enum DepsizeError {
    #[error("{method} {url}: {status} {status_text}")]
    ProxyRequest {
        method: &'static str,
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("HEAD {url}: missing {header} header")]
    MissingMetadata { url: String, header: &'static str },
    #[error("Parse: {0}")]
    Parse(String),
    #[error("decoding JSON: {0}")]
    Decode(String),
    #[error("reading response: {0}")]
    Read(String),
    #[error("parsing go.mod file: line {line}: {message}")]
    ManifestParse { line: usize, message: String },
    #[error("getting size for {module} {version}: {source}")]
    DependencyResolution {
        module: String,
        version: String,
        #[source]
        source: Box<DepsizeError>,
    },
    #[error("Invalid module: {0}")]
    InvalidModule(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
}

impl DepsizeError {
    /// Wrap a lower-level failure with the module coordinates it belongs to.
    pub fn for_dependency(module: &str, version: &str, source: DepsizeError) -> Self {
        DepsizeError::DependencyResolution {
            module: module.to_string(),
            version: version.to_string(),
            source: Box::new(source),
        }
    }

    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            DepsizeError::ProxyRequest { .. } => ExitCode::from(30),
            DepsizeError::Network(_) => ExitCode::from(31),
            DepsizeError::MissingMetadata { .. } => ExitCode::from(32),
            DepsizeError::Read(_) => ExitCode::from(33),
            DepsizeError::Parse(_) => ExitCode::from(34),
            DepsizeError::Decode(_) => ExitCode::from(35),
            DepsizeError::ManifestParse { .. } => ExitCode::from(36),
            DepsizeError::DependencyResolution { .. } => ExitCode::from(37),
            DepsizeError::InvalidModule(_) => ExitCode::from(12),
            DepsizeError::Config(_) => ExitCode::from(20),
            DepsizeError::Serialization(_) => ExitCode::from(38),
            DepsizeError::Filesystem(_) => ExitCode::from(40),
            DepsizeError::Runtime(_) => ExitCode::from(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn dependency_error_names_module_and_keeps_cause() {
        let cause = DepsizeError::ProxyRequest {
            method: "HEAD",
            url: "https://proxy.test/golang.org/x/text/@v/v0.3.0.zip".into(),
            status: 404,
            status_text: "Not Found".into(),
        };
        let err = DepsizeError::for_dependency("golang.org/x/text", "v0.3.0", cause);

        assert_eq!(
            err.to_string(),
            "getting size for golang.org/x/text v0.3.0: HEAD https://proxy.test/golang.org/x/text/@v/v0.3.0.zip: 404 Not Found"
        );
        let source = err.source().expect("wrapped cause");
        assert!(source.to_string().contains("404"));
    }

    #[test]
    fn manifest_errors_report_line() {
        let err = DepsizeError::ManifestParse {
            line: 3,
            message: "unknown directive: frobnicate".into(),
        };
        assert_eq!(
            err.to_string(),
            "parsing go.mod file: line 3: unknown directive: frobnicate"
        );
    }
}
