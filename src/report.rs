/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Assemble size results into a report and render it as
    plain text or JSON for operators and scripts.

  Security / Safety Notes:
    Formatting only; no I/O performed in this module.

  Dependencies:
    serde + serde_json for the JSON rendering.

  Operational Scope:
    Final stage of the depsize binary after the client and
    resolver have produced their results.

  Revision History:
    2025-11-12 COD  Authored report renderer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic formatting for auditability
    - Saturating arithmetic for totals
============================================================*/

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::{DepsizeError, Result};
use crate::module::ResolvedDependency;

/// Size report for a root module and, in recursive mode, its dependencies.
#[derive(Debug, Serialize)]
pub struct SizeReport {
    pub module: String,
    pub version: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<ResolvedDependency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl SizeReport {
    pub fn single(module: String, version: String, size: u64) -> Self {
        Self {
            module,
            version,
            size,
            dependencies: None,
            total: None,
        }
    }

    /// Attach dependencies and compute the grand total (root + dependencies).
    pub fn with_dependencies(mut self, dependencies: Vec<ResolvedDependency>) -> Self {
        let total = dependencies
            .iter()
            .fold(self.size, |acc, dep| acc.saturating_add(dep.size));
        self.dependencies = Some(dependencies);
        self.total = Some(total);
        self
    }

    /// Plain text rendering, one entry per line.
    pub fn render_text(&self, human: bool) -> String {
        let fmt_size = |bytes: u64| {
            if human {
                human_bytes(bytes)
            } else {
                bytes.to_string()
            }
        };

        let mut out = String::new();
        let _ = writeln!(out, "{} {} {}", self.module, self.version, fmt_size(self.size));
        if let Some(dependencies) = &self.dependencies {
            for dep in dependencies {
                let _ = writeln!(out, "    {} {} {}", dep.module, dep.version, fmt_size(dep.size));
            }
        }
        if let Some(total) = self.total {
            let _ = writeln!(out, "total {}", fmt_size(total));
        }
        out
    }

    pub fn render_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| DepsizeError::Serialization(format!("Failed to encode report: {err}")))
    }
}

/// SI-scaled byte count: `999 B`, `1.2 kB`, `83 MB`.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
    const BASE: f64 = 1000.0;

    if bytes < 10 {
        return format!("{bytes} B");
    }
    let mut exponent = 0;
    let mut threshold = 1000_u64;
    while exponent < UNITS.len() - 1 && bytes >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1000);
    }
    let scaled = (bytes as f64 / BASE.powi(exponent as i32) * 10.0 + 0.5).floor() / 10.0;
    if scaled < 10.0 {
        format!("{scaled:.1} {}", UNITS[exponent])
    } else {
        format!("{scaled:.0} {}", UNITS[exponent])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SizeReport {
        SizeReport::single("example.com/app".into(), "v1.0.0".into(), 1000).with_dependencies(vec![
            ResolvedDependency::new("example.com/large".into(), "v1.0.0".into(), 9999),
            ResolvedDependency::new("example.com/small".into(), "v0.2.0".into(), 100),
        ])
    }

    #[test]
    fn human_bytes_uses_si_units() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(9), "9 B");
        assert_eq!(human_bytes(999), "999 B");
        assert_eq!(human_bytes(1234), "1.2 kB");
        assert_eq!(human_bytes(82_854_982), "83 MB");
        assert_eq!(human_bytes(1_000_000_000), "1.0 GB");
    }

    #[test]
    fn total_includes_root_and_dependencies() {
        assert_eq!(sample().total, Some(11099));
    }

    #[test]
    fn text_rendering_lists_dependencies_and_total() {
        assert_eq!(
            sample().render_text(false),
            "example.com/app v1.0.0 1000\n    example.com/large v1.0.0 9999\n    example.com/small v0.2.0 100\ntotal 11099\n"
        );
    }

    #[test]
    fn single_report_has_no_total() {
        let report = SizeReport::single("example.com/app".into(), "v1.0.0".into(), 1234);
        assert_eq!(report.render_text(true), "example.com/app v1.0.0 1.2 kB\n");
    }

    #[test]
    fn json_rendering_omits_absent_sections() {
        let report = SizeReport::single("example.com/app".into(), "v1.0.0".into(), 5);
        let json = report.render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["size"], 5);
        assert!(value.get("dependencies").is_none());

        let json = sample().render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 11099);
        assert_eq!(value["dependencies"][0]["module"], "example.com/large");
    }
}
