use std::sync::Arc;

use reqwest::Url;

use storage::repository::Storage;

use crate::Clock;
use crate::backend::{HttpBackend, HttpBackendConfig, LocalBackend, ProgressSink, ScriptCatalog};
use crate::error::AppServicesError;
use crate::practice::PracticeLoopService;

/// Where the catalog comes from and where progress goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendChoice {
    Remote(HttpBackendConfig),
    Local,
}

/// Assembles app-facing services.
#[derive(Clone)]
pub struct AppServices {
    backend: BackendChoice,
    practice_loop: Arc<PracticeLoopService>,
}

impl AppServices {
    /// Wire services against local storage, or the remote backend when configured.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::InvalidBaseUrl` if the remote url is not http(s).
    pub fn new(
        storage: &Storage,
        clock: Clock,
        remote: Option<HttpBackendConfig>,
    ) -> Result<Self, AppServicesError> {
        let (backend, catalog, sink) = match remote {
            Some(config) => {
                check_base_url(&config.base_url)?;
                log::info!("using remote practice backend at {}", config.base_url);
                let http = Arc::new(HttpBackend::new(config.clone()));
                let catalog: Arc<dyn ScriptCatalog> = http.clone();
                let sink: Arc<dyn ProgressSink> = http;
                (BackendChoice::Remote(config), catalog, sink)
            }
            None => {
                log::info!("using local practice storage");
                let local = Arc::new(LocalBackend::from_storage(storage));
                let catalog: Arc<dyn ScriptCatalog> = local.clone();
                let sink: Arc<dyn ProgressSink> = local;
                (BackendChoice::Local, catalog, sink)
            }
        };

        Ok(Self {
            backend,
            practice_loop: Arc::new(PracticeLoopService::new(clock, catalog, sink)),
        })
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the remote url is invalid.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        remote: Option<HttpBackendConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(&storage, clock, remote)
    }

    #[must_use]
    pub fn backend(&self) -> &BackendChoice {
        &self.backend
    }

    #[must_use]
    pub fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }
}

/// Accept only absolute http(s) urls with a host.
fn check_base_url(raw: &str) -> Result<(), AppServicesError> {
    let url = Url::parse(raw).map_err(|_| AppServicesError::InvalidBaseUrl(raw.to_string()))?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    if !matches!(url.scheme(), "http" | "https") || !has_host {
        return Err(AppServicesError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::time::fixed_clock;

    #[test]
    fn local_storage_is_the_default() {
        let services = AppServices::new(&Storage::in_memory(), fixed_clock(), None).unwrap();
        assert_eq!(services.backend(), &BackendChoice::Local);
    }

    #[test]
    fn remote_url_must_be_http() {
        let config = HttpBackendConfig::new("ftp://academy.test", None).unwrap();
        let err = AppServices::new(&Storage::in_memory(), fixed_clock(), Some(config));
        assert!(matches!(err, Err(AppServicesError::InvalidBaseUrl(_))));
    }

    #[test]
    fn malformed_remote_urls_are_rejected() {
        for raw in ["http://", "http://exa mple.test", "https://:::", "academy.test/api"] {
            let config = HttpBackendConfig::new(raw, None).unwrap();
            let res = AppServices::new(&Storage::in_memory(), fixed_clock(), Some(config));
            assert!(
                matches!(res, Err(AppServicesError::InvalidBaseUrl(ref url)) if url == raw),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn well_formed_remote_url_selects_http_backend() {
        let config = HttpBackendConfig::new("https://academy.test/api/", None).unwrap();
        let services =
            AppServices::new(&Storage::in_memory(), fixed_clock(), Some(config.clone())).unwrap();
        assert_eq!(services.backend(), &BackendChoice::Remote(config));
    }
}
