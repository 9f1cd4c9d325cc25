//! File-backed credential acquisition.
//!
//! The browser-automation login runs outside this process and publishes its
//! session as a JSON array of `{name, value, domain?}` cookies. The file's
//! modification time is the issuance timestamp — the login rewrites the file
//! on every successful refresh, so mtime tracks session age without needing
//! a timestamp inside the payload.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stoktakip_scraper::refresh::BoxError;
use stoktakip_scraper::{CredentialProvider, CredentialSet, RawCookie};

pub struct FileCookieProvider {
    path: PathBuf,
}

impl FileCookieProvider {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CredentialProvider for FileCookieProvider {
    async fn acquire(&self) -> Result<CredentialSet, BoxError> {
        let raw = tokio::fs::read(&self.path).await?;
        let cookies: Vec<RawCookie> = serde_json::from_slice(&raw)?;
        let issued_at = tokio::fs::metadata(&self.path)
            .await?
            .modified()
            .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
        Ok(CredentialSet::from_cookies(&cookies, issued_at))
    }
}
