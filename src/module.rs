/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::module
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing module coordinates and the
    sizes resolved for them.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    serde for report serialization.

  Operational Scope:
    Used by the proxy client, manifest parser, resolver and
    report renderer to pass module identities and byte counts.

  Revision History:
    2025-11-12 COD  Introduced module coordinate types.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Serializable structures for report output
============================================================*/

use std::fmt;

use serde::Serialize;

use crate::error::{DepsizeError, Result};

/// Version sentinel that triggers `@latest` resolution instead of a proxy lookup.
pub const LATEST: &str = "latest";

/// A module path paired with a version. An empty version means "any version"
/// and only appears on the old side of a replace directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleVersion {
    pub path: String,
    pub version: String,
}

impl ModuleVersion {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }

    /// Copy with the path lowercased, matching what the proxy is asked for.
    pub fn normalized(&self) -> Self {
        Self {
            path: self.path.to_lowercase(),
            version: self.version.clone(),
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{} {}", self.path, self.version)
        }
    }
}

/// Caller-supplied module reference. The path is lowercased on construction;
/// the version may still be [`LATEST`] until the client resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    path: String,
    version: String,
}

impl ModuleRef {
    pub fn new(path: &str, version: Option<&str>) -> Result<Self> {
        let path = path.trim();
        if path.is_empty() {
            return Err(DepsizeError::InvalidModule(
                "module path must not be empty".into(),
            ));
        }
        let version = match version.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => LATEST.to_string(),
        };
        Ok(Self {
            path: path.to_lowercase(),
            version,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_latest(&self) -> bool {
        self.version == LATEST
    }

    /// Replace the version, typically with the concrete tag `@latest` returned.
    pub fn with_version(self, version: String) -> Self {
        Self {
            path: self.path,
            version,
        }
    }
}

/// A dependency whose artifact size has been looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    pub module: String,
    pub version: String,
    pub size: u64,
}

impl ResolvedDependency {
    pub fn new(module: String, version: String, size: u64) -> Self {
        Self {
            module,
            version,
            size,
        }
    }
}
