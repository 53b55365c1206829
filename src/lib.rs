/*============================================================
  Synavera Project: Depsize
  Module: depsize_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Library surface for depsize: proxy selection, module
    proxy client, go.mod parsing and dependency sizing.

  Security / Safety Notes:
    Read-only network access; no filesystem writes outside
    the logger.

  Dependencies:
    See individual modules.

  Operational Scope:
    Consumed by the depsize binary and by integration tests.

  Revision History:
    2025-11-12 COD  Split core library from the binary.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Core returns errors; only the binary logs and exits
============================================================*/

pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod modfile;
pub mod module;
pub mod proxy;
pub mod report;
pub mod resolver;

pub use client::ProxyClient;
pub use error::{DepsizeError, Result};
pub use module::{ModuleRef, ModuleVersion, ResolvedDependency, LATEST};
pub use resolver::DependencyResolver;
