/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::proxy
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Select the module proxy endpoint from GOPROXY-style
    values supplied by the caller.

  Security / Safety Notes:
    Pure string handling; the environment is read by the
    binary entry point, never here.

  Dependencies:
    None beyond std.

  Operational Scope:
    Invoked once per run to derive the base URL handed to the
    proxy client.

  Revision History:
    2025-11-12 COD  Authored proxy locator.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic selection with no hidden global state
    - Explicit precedence between configuration sources
============================================================*/

/// Proxy queried when no endpoint is configured.
pub const DEFAULT_PROXY: &str = "https://proxy.golang.org";

/// Reduce a GOPROXY-style value to the single endpoint that will be queried.
///
/// Fallback entries after the first comma are ignored; there is no retry
/// across proxies.
pub fn select_proxy(value: &str) -> String {
    if value.is_empty() {
        return DEFAULT_PROXY.to_string();
    }
    match value.find(',') {
        Some(idx) if idx > 0 => value[..idx].to_string(),
        _ => value.to_string(),
    }
}

/// Pick the first non-empty source in precedence order (flag, environment,
/// config file) and run it through [`select_proxy`].
pub fn resolve_endpoint(
    explicit: Option<&str>,
    environment: Option<&str>,
    configured: Option<&str>,
) -> String {
    let raw = [explicit, environment, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or_default();
    select_proxy(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_uses_default() {
        assert_eq!(select_proxy(""), DEFAULT_PROXY);
    }

    #[test]
    fn comma_list_keeps_first_entry() {
        assert_eq!(select_proxy("http://a,http://b"), "http://a");
        assert_eq!(select_proxy("https://goproxy.io,direct"), "https://goproxy.io");
    }

    #[test]
    fn single_value_is_unmodified() {
        assert_eq!(select_proxy("http://corp-proxy:8080/"), "http://corp-proxy:8080/");
    }

    #[test]
    fn leading_comma_keeps_whole_value() {
        assert_eq!(select_proxy(",http://b"), ",http://b");
    }

    #[test]
    fn endpoint_precedence_skips_empty_sources() {
        assert_eq!(
            resolve_endpoint(Some("http://flag"), Some("http://env"), Some("http://cfg")),
            "http://flag"
        );
        assert_eq!(
            resolve_endpoint(None, Some(""), Some("http://cfg,http://other")),
            "http://cfg"
        );
        assert_eq!(resolve_endpoint(None, None, None), DEFAULT_PROXY);
    }
}
