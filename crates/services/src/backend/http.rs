use std::env;

use async_trait::async_trait;
use practice_core::model::{CatalogEntry, ProgressUpdate, RunRecord, ScriptDraft};
use reqwest::Client;
use serde::Deserialize;

use super::{ProgressSink, ScriptCatalog};
use crate::error::BackendError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpBackendConfig {
    pub base_url: String,
    pub api_token: Option<String>,
}

impl HttpBackendConfig {
    /// Read `PRACTICE_API_BASE_URL` and `PRACTICE_API_TOKEN`.
    ///
    /// Returns `None` when no base url is set, which selects local storage.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("PRACTICE_API_BASE_URL").ok()?;
        let api_token = env::var("PRACTICE_API_TOKEN").ok();
        Self::new(base_url, api_token)
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Option<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return None;
        }
        let api_token = api_token.filter(|token| !token.trim().is_empty());
        Some(Self {
            base_url: base_url.trim().to_string(),
            api_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Talks to the academy backend over JSON/HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    #[must_use]
    pub fn new(config: HttpBackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.config.endpoint(path));
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogItem {
    script: ScriptDraft,
    #[serde(default)]
    progress: Option<RunRecord>,
}

/// Keep valid scripts; a malformed one should not hide the rest of the catalog.
fn into_entries(items: Vec<CatalogItem>) -> Vec<CatalogEntry> {
    items
        .into_iter()
        .filter_map(|item| {
            let id = item.script.id;
            match item.script.validate() {
                Ok(script) => Some(CatalogEntry {
                    script,
                    last_run: item.progress,
                }),
                Err(err) => {
                    log::warn!("skipping script {id} from backend: {err}");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl ScriptCatalog for HttpBackend {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, BackendError> {
        let response = self
            .request(reqwest::Method::GET, "scripts")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }

        let items: Vec<CatalogItem> = response.json().await?;
        Ok(into_entries(items))
    }
}

#[async_trait]
impl ProgressSink for HttpBackend {
    async fn persist_progress(&self, update: &ProgressUpdate) -> Result<(), BackendError> {
        let response = self
            .request(reqwest::Method::POST, "progress")
            .json(update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
