/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::client
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Query a Go module proxy for latest versions, artifact
    sizes and go.mod manifests.

  Security / Safety Notes:
    Performs read-only GET/HEAD requests against the selected
    proxy. No credentials are transmitted and archive bodies
    are never downloaded.

  Dependencies:
    reqwest for HTTP, serde for response parsing.

  Operational Scope:
    Supplies the resolver and the binary entry point with
    module metadata; one request per call, no retries.

  Revision History:
    2025-11-12 COD  Implemented asynchronous proxy client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Structured response parsing with explicit error paths
    - Configurable timeouts
    - Header-only size probes
============================================================*/

use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::Response;
use serde::Deserialize;

use crate::config::ProxyConfig;
use crate::error::{DepsizeError, Result};
use crate::module::LATEST;

/// Client for the module proxy protocol (`@latest`, `@v/<ver>.zip`, `@v/<ver>.mod`).
#[derive(Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    /// Construct a client for `base_url` using the transport settings in `config`.
    pub fn new(base_url: &str, config: &ProxyConfig) -> Result<Self> {
        // Decoding a compressed response strips Content-Length, which is the size.
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .no_gzip()
            .no_brotli()
            .build()
            .map_err(|err| DepsizeError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the proxy for the latest published version of `module`.
    pub async fn latest(&self, module: &str) -> Result<String> {
        let url = format!("{}/{}/@latest", self.base_url, module.to_lowercase());
        let response = self.send("GET", &url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| DepsizeError::Read(format!("{url}: {err}")))?;
        let info: LatestInfo = serde_json::from_slice(&body)
            .map_err(|err| DepsizeError::Decode(format!("{url}: {err}")))?;
        if info.version.is_empty() {
            return Err(DepsizeError::Decode(format!("{url}: empty Version field")));
        }
        Ok(info.version)
    }

    /// Return `version` unchanged unless it is the `latest` sentinel.
    pub async fn resolve_version(&self, module: &str, version: &str) -> Result<String> {
        if version == LATEST {
            self.latest(module).await
        } else {
            Ok(version.to_string())
        }
    }

    /// Size in bytes of the module zip, read from `Content-Length` of a HEAD probe.
    pub async fn size(&self, module: &str, version: &str) -> Result<u64> {
        let module = module.to_lowercase();
        let version = self.resolve_version(&module, version).await?;
        let url = format!("{}/{}/@v/{}.zip", self.base_url, module, version);
        let response = self.send("HEAD", &url).await?;
        content_length(&url, response.headers())
    }

    /// Raw go.mod bytes for `module` at `version`.
    pub async fn fetch_manifest(&self, module: &str, version: &str) -> Result<Vec<u8>> {
        let module = module.to_lowercase();
        let version = self.resolve_version(&module, version).await?;
        let url = format!("{}/{}/@v/{}.mod", self.base_url, module, version);
        let response = self.send("GET", &url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| DepsizeError::Read(format!("{url}: {err}")))?;
        Ok(body.to_vec())
    }

    async fn send(&self, method: &'static str, url: &str) -> Result<Response> {
        let request = match method {
            "HEAD" => self.client.head(url),
            _ => self.client.get(url),
        };
        let response = request
            .send()
            .await
            .map_err(|err| DepsizeError::Network(format!("{method} {url}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DepsizeError::ProxyRequest {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct LatestInfo {
    #[serde(rename = "Version")]
    version: String,
}

fn content_length(url: &str, headers: &HeaderMap) -> Result<u64> {
    let value = headers
        .get(CONTENT_LENGTH)
        .ok_or_else(|| DepsizeError::MissingMetadata {
            url: url.to_string(),
            header: "content-length",
        })?;
    let text = value
        .to_str()
        .map_err(|err| DepsizeError::Parse(format!("content-length for {url}: {err}")))?;
    text.trim()
        .parse::<u64>()
        .map_err(|err| DepsizeError::Parse(format!("content-length {text:?} for {url}: {err}")))
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> ProxyClient {
        ProxyClient::new(&server.uri(), &ProxyConfig::default()).unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ProxyClient::new("https://proxy.test/", &ProxyConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://proxy.test");
    }

    #[test]
    fn content_length_header_rules() {
        let url = "https://proxy.test/a/@v/v1.0.0.zip";
        let mut headers = HeaderMap::new();
        assert!(matches!(
            content_length(url, &headers),
            Err(DepsizeError::MissingMetadata { .. })
        ));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("12ab"));
        assert!(matches!(
            content_length(url, &headers),
            Err(DepsizeError::Parse(_))
        ));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("-4"));
        assert!(matches!(
            content_length(url, &headers),
            Err(DepsizeError::Parse(_))
        ));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("48213"));
        assert_eq!(content_length(url, &headers).unwrap(), 48213);
    }

    #[tokio::test]
    async fn latest_decodes_version_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/golang.org/x/mod/@latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Version": "v0.14.0",
                "Time": "2023-10-26T17:46:42Z"
            })))
            .mount(&server)
            .await;

        let version = client_for(&server).latest("golang.org/x/mod").await.unwrap();
        assert_eq!(version, "v0.14.0");
    }

    #[tokio::test]
    async fn latest_rejects_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/golang.org/x/mod/@latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).latest("golang.org/x/mod").await.unwrap_err();
        assert!(matches!(err, DepsizeError::Decode(_)));
    }

    #[tokio::test]
    async fn latest_reports_proxy_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/example.com/gone/@latest"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let err = client_for(&server).latest("example.com/gone").await.unwrap_err();
        match err {
            DepsizeError::ProxyRequest {
                method,
                url,
                status,
                status_text,
            } => {
                assert_eq!(method, "GET");
                assert_eq!(url, format!("{}/example.com/gone/@latest", server.uri()));
                assert_eq!(status, 410);
                assert_eq!(status_text, "Gone");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn size_reads_content_length_and_lowercases_module() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/github.com/burntsushi/toml/@v/v1.3.2.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1536]))
            .expect(1)
            .mount(&server)
            .await;

        let size = client_for(&server)
            .size("github.com/BurntSushi/toml", "v1.3.2")
            .await
            .unwrap();
        assert_eq!(size, 1536);
    }

    #[tokio::test]
    async fn size_survives_content_encoded_response() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/example.com/a/@v/v1.0.0.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-encoding", "gzip")
                    .set_body_bytes(vec![0u8; 1234]),
            )
            .mount(&server)
            .await;

        let size = client_for(&server)
            .size("example.com/a", "v1.0.0")
            .await
            .unwrap();
        assert_eq!(size, 1234);
    }

    #[tokio::test]
    async fn size_of_latest_matches_size_of_resolved_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/golang.org/x/sync/@latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "Version": "v0.5.0" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/golang.org/x/sync/@v/v0.5.0.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 777]))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let via_latest = client.size("golang.org/x/sync", LATEST).await.unwrap();
        let resolved = client.latest("golang.org/x/sync").await.unwrap();
        let direct = client.size("golang.org/x/sync", &resolved).await.unwrap();
        assert_eq!(via_latest, direct);
        assert_eq!(direct, 777);
    }

    #[tokio::test]
    async fn size_propagates_latest_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/example.com/missing/@latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .size("example.com/missing", LATEST)
            .await
            .unwrap_err();
        assert!(matches!(err, DepsizeError::ProxyRequest { status: 404, .. }));
    }

    #[tokio::test]
    async fn size_reports_missing_artifact() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/example.com/a/@v/v9.9.9.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .size("example.com/a", "v9.9.9")
            .await
            .unwrap_err();
        match err {
            DepsizeError::ProxyRequest { method, status, .. } => {
                assert_eq!(method, "HEAD");
                assert_eq!(status, 404);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fetch_manifest_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/example.com/app/@v/v1.0.0.mod"))
            .respond_with(ResponseTemplate::new(200).set_body_string("module example.com/app\n"))
            .mount(&server)
            .await;

        let body = client_for(&server)
            .fetch_manifest("Example.com/App", "v1.0.0")
            .await
            .unwrap();
        assert_eq!(body, b"module example.com/app\n");
    }
}
