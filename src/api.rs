//! Formula registry client.
//!
//! [`RegistryClient`] is the one component that talks to the network. It
//! fetches formula metadata JSON from the Homebrew formulae API (backed by
//! the durable [`MetadataCache`] plus a session-scoped in-memory memo) and
//! streams bottle tarballs from GHCR after acquiring a short-lived bearer
//! token. Transient failures are retried with a fixed 2-second spacing.
//!
//! The [`Registry`] trait is the seam the install engine and resolver are
//! written against; the test suite substitutes an in-memory implementation.

use crate::cache::{DEFAULT_TTL_HOURS, MetadataCache};
use crate::error::Result;
use crate::progress::{ProgressSink, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const API_BASE: &str = "https://formulae.brew.sh/api";
const GHCR_TOKEN_URL: &str = "https://ghcr.io/token?service=ghcr.io&scope=repository:homebrew/core";
const USER_AGENT: &str = "BrPackageManager/0.2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Formula metadata from the registry JSON API. Only the fields br consumes
/// are modeled; everything else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub versions: Versions,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub bottle: Option<Bottle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Versions {
    #[serde(default)]
    pub stable: Option<String>,
}

/// Bottle information from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bottle {
    #[serde(default)]
    pub stable: Option<BottleData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BottleData {
    /// OS flavor → downloadable file.
    #[serde(default)]
    pub files: HashMap<String, BottleFile>,
}

/// One downloadable bottle variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleFile {
    pub url: String,
    pub sha256: String,
}

impl Formula {
    /// The bottle file for `flavor`, if the formula ships one.
    pub fn bottle_for(&self, flavor: &str) -> Option<&BottleFile> {
        self.bottle
            .as_ref()
            .and_then(|b| b.stable.as_ref())
            .and_then(|s| s.files.get(flavor))
    }
}

/// GHCR token response.
#[derive(Deserialize)]
struct GhcrToken {
    token: String,
}

/// Operations the install engine needs from the upstream registry.
///
/// `fetch_metadata` returns `Ok(None)` both for an authoritative 404 and for
/// exhausted retries; callers decide whether absence is fatal.
pub trait Registry: Send + Sync {
    fn fetch_metadata(
        &self,
        name: &str,
        force_refresh: bool,
    ) -> impl Future<Output = Result<Option<Formula>>> + Send;

    /// Short-lived bearer token scoped to one package's bottle repository.
    fn fetch_token(&self, name: &str) -> impl Future<Output = Result<String>> + Send;

    /// Stream a bottle to `dest`, reporting bytes to `sink` under `task`.
    /// Returns the byte count written.
    fn download_bottle(
        &self,
        url: &str,
        token: &str,
        dest: &Path,
        sink: &dyn ProgressSink,
        task: TaskId,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// HTTP registry client with layered caching.
#[derive(Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    cache: Arc<MetadataCache>,
    /// Session-scoped memo; avoids refetching the same metadata across
    /// multiple roots in one invocation. Dies with the process.
    session: moka::future::Cache<String, Formula>,
}

impl RegistryClient {
    pub fn new(cache: Arc<MetadataCache>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            cache,
            session: moka::future::Cache::new(1000),
        })
    }

    async fn fetch_metadata_impl(&self, name: &str, force_refresh: bool) -> Result<Option<Formula>> {
        if !force_refresh {
            if let Some(hit) = self.session.get(name).await {
                debug!("session memo hit for {}", name);
                return Ok(Some(hit));
            }
            if let Some(hit) = self.cache.get(name)? {
                debug!("cache hit for {}", name);
                self.session.insert(name.to_string(), hit.clone()).await;
                return Ok(Some(hit));
            }
        }

        let url = format!("{}/formula/{}.json", API_BASE, name);

        for attempt in 1..=RETRY_ATTEMPTS {
            debug!(
                "fetching metadata for {} (attempt {}/{})",
                name, attempt, RETRY_ATTEMPTS
            );
            match self.client.get(&url).send().await {
                Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => {
                    // Authoritative: the package does not exist.
                    return Ok(None);
                }
                Ok(resp) if resp.status().is_success() => {
                    let formula: Formula = resp.json().await?;
                    self.cache.set(name, &formula, DEFAULT_TTL_HOURS)?;
                    self.session
                        .insert(name.to_string(), formula.clone())
                        .await;
                    return Ok(Some(formula));
                }
                Ok(resp) => {
                    debug!("HTTP {} for {}", resp.status(), name);
                }
                Err(e) => {
                    debug!("API error for {}: {}", name, e);
                }
            }
            if attempt < RETRY_ATTEMPTS {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }

        Ok(None)
    }

    async fn fetch_token_impl(&self, name: &str) -> Result<String> {
        let url = format!("{}/{}:pull", GHCR_TOKEN_URL, name);
        let resp: GhcrToken = self.client.get(&url).send().await?.json().await?;
        Ok(resp.token)
    }

    async fn download_once(
        &self,
        url: &str,
        token: &str,
        dest: &Path,
        sink: &dyn ProgressSink,
        task: TaskId,
    ) -> Result<u64> {
        // File::create truncates, so a retry restarts the stream cleanly.
        let mut file = tokio::fs::File::create(dest).await?;

        let mut resp = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?
            .error_for_status()?;

        if let Some(total) = resp.content_length() {
            sink.set_total(task, total);
        }

        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            sink.advance(task, chunk.len() as u64);
        }
        file.flush().await?;

        Ok(written)
    }

    async fn download_bottle_impl(
        &self,
        url: &str,
        token: &str,
        dest: &Path,
        sink: &dyn ProgressSink,
        task: TaskId,
    ) -> Result<u64> {
        let mut last_err = None;

        for attempt in 1..=RETRY_ATTEMPTS {
            match self.download_once(url, token, dest, sink, task).await {
                Ok(written) => return Ok(written),
                Err(e) => {
                    debug!("download attempt {}/{} failed: {}", attempt, RETRY_ATTEMPTS, e);
                    last_err = Some(e);
                    if attempt < RETRY_ATTEMPTS {
                        sink.set_label(task, &format!("Retry {} ...", attempt));
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(last_err.expect("at least one download attempt ran"))
    }
}

impl Registry for RegistryClient {
    async fn fetch_metadata(&self, name: &str, force_refresh: bool) -> Result<Option<Formula>> {
        self.fetch_metadata_impl(name, force_refresh).await
    }

    async fn fetch_token(&self, name: &str) -> Result<String> {
        self.fetch_token_impl(name).await
    }

    async fn download_bottle(
        &self,
        url: &str,
        token: &str,
        dest: &Path,
        sink: &dyn ProgressSink,
        task: TaskId,
    ) -> Result<u64> {
        self.download_bottle_impl(url, token, dest, sink, task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_parses_registry_payload() {
        let json = serde_json::json!({
            "name": "wget",
            "desc": "Internet file retriever",
            "homepage": "https://www.gnu.org/software/wget/",
            "versions": { "stable": "1.25.0", "head": "HEAD" },
            "dependencies": ["libidn2", "openssl@3"],
            "bottle": {
                "stable": {
                    "rebuild": 0,
                    "files": {
                        "arm64_sequoia": {
                            "cellar": "/opt/homebrew/Cellar",
                            "url": "https://ghcr.io/v2/homebrew/core/wget/blobs/sha256:abc",
                            "sha256": "abc"
                        }
                    }
                }
            },
            "unmodeled_field": 42
        });

        let formula: Formula = serde_json::from_value(json).unwrap();
        assert_eq!(formula.name, "wget");
        assert_eq!(formula.versions.stable.as_deref(), Some("1.25.0"));
        assert_eq!(formula.dependencies, vec!["libidn2", "openssl@3"]);

        let file = formula.bottle_for("arm64_sequoia").unwrap();
        assert_eq!(file.sha256, "abc");
        assert!(formula.bottle_for("x86_64_linux").is_none());
    }

    #[test]
    fn formula_tolerates_missing_bottle_block() {
        let formula: Formula =
            serde_json::from_value(serde_json::json!({ "name": "lib-only" })).unwrap();
        assert!(formula.bottle.is_none());
        assert!(formula.bottle_for("arm64_sequoia").is_none());
        assert!(formula.versions.stable.is_none());
    }
}
