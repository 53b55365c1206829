/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::resolver
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Reconcile a module's go.mod requirements with its replace
    directives and size every surviving dependency.

  Security / Safety Notes:
    Local-path replacements are dropped, never read from disk.
    All network access goes through ProxyClient.

  Dependencies:
    tokio for bounded concurrent size lookups.

  Operational Scope:
    Backs the recursive mode of the depsize binary. One level
    deep: only the root manifest's direct requirements.

  Revision History:
    2025-11-12 COD  Authored dependency resolver.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fail-fast: one failed lookup aborts the whole resolution
    - Deterministic ordering for reproducible output
    - Parser injected through a trait seam
============================================================*/

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::client::ProxyClient;
use crate::error::{DepsizeError, Result};
use crate::modfile::{GoModParser, Manifest, ManifestParser, ReplacementTarget};
use crate::module::{ModuleVersion, ResolvedDependency};

/// Sizes the direct dependencies of a module as served by the proxy.
pub struct DependencyResolver {
    client: ProxyClient,
    parser: Arc<dyn ManifestParser>,
    max_parallel_requests: usize,
}

impl DependencyResolver {
    /// Resolver using the go.mod grammar.
    pub fn new(client: ProxyClient, max_parallel_requests: usize) -> Self {
        Self::with_parser(client, Arc::new(GoModParser), max_parallel_requests)
    }

    pub fn with_parser(
        client: ProxyClient,
        parser: Arc<dyn ManifestParser>,
        max_parallel_requests: usize,
    ) -> Self {
        Self {
            client,
            parser,
            max_parallel_requests: max_parallel_requests.max(1),
        }
    }

    /// Fetch and parse the manifest for `module` at `version` (`latest` allowed).
    pub async fn manifest(&self, module: &str, version: &str) -> Result<Manifest> {
        let body = self.client.fetch_manifest(module, version).await?;
        self.parser.parse(&body)
    }

    /// Direct dependencies of `module` at `version`, largest first.
    pub async fn deps(&self, module: &str, version: &str) -> Result<Vec<ResolvedDependency>> {
        let manifest = self.manifest(module, version).await?;
        self.resolve(&manifest).await
    }

    /// Size the working set of an already parsed manifest, largest first.
    pub async fn resolve(&self, manifest: &Manifest) -> Result<Vec<ResolvedDependency>> {
        let mut resolved = self.measure(working_set(manifest)).await?;
        sort_by_size(&mut resolved);
        Ok(resolved)
    }

    async fn measure(&self, modules: BTreeSet<ModuleVersion>) -> Result<Vec<ResolvedDependency>> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_requests));
        let mut tasks = JoinSet::new();

        for module in modules {
            let client = self.client.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| DepsizeError::Runtime("size semaphore closed".into()))?;
                let size = client
                    .size(&module.path, &module.version)
                    .await
                    .map_err(|err| {
                        DepsizeError::for_dependency(&module.path, &module.version, err)
                    })?;
                Ok::<_, DepsizeError>(ResolvedDependency::new(module.path, module.version, size))
            });
        }

        // Returning early drops the JoinSet, which aborts lookups still in flight.
        let mut resolved = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let dependency = joined
                .map_err(|err| DepsizeError::Runtime(format!("size task failed: {err}")))??;
            resolved.push(dependency);
        }
        Ok(resolved)
    }
}

/// Apply replace directives, in order, to the manifest's requirements.
///
/// Keys are lowercased module paths plus version. A replacement without an old
/// version removes every version of that module. Local-path targets add nothing.
pub fn working_set(manifest: &Manifest) -> BTreeSet<ModuleVersion> {
    let mut set: BTreeSet<ModuleVersion> = manifest
        .requirements
        .iter()
        .map(|requirement| requirement.module.normalized())
        .collect();

    for replacement in &manifest.replacements {
        let old = replacement.old.normalized();
        if old.version.is_empty() {
            set.retain(|module| module.path != old.path);
        } else {
            set.remove(&old);
        }
        match &replacement.new {
            ReplacementTarget::Module(new) => {
                set.insert(new.normalized());
            }
            ReplacementTarget::Local(_) => {}
        }
    }

    set
}

/// Size descending, then module path and version ascending.
pub fn sort_by_size(deps: &mut [ResolvedDependency]) {
    deps.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then_with(|| a.module.cmp(&b.module))
            .then_with(|| a.version.cmp(&b.version))
    });
}
