//! HTTP client for the authenticated storefront pages.
//!
//! Every request carries the caller's credential snapshot as a `Cookie`
//! header plus a browser-identity header set drawn from a small rotating
//! pool, and runs under the engine's [`RetryPolicy`].

use std::time::Duration;

use reqwest::{header, Client, StatusCode};

use crate::credentials::CredentialSet;
use crate::error::ScrapeError;
use crate::retry::RetryPolicy;

/// Desktop browser identities rotated per request to avoid presenting one
/// fingerprint across the whole batch.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/98.0.4758.102 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:93.0) Gecko/20100101 Firefox/93.0",
];

/// A successfully fetched document. Owned by the single in-flight pipeline
/// step; nothing here is shared across tasks.
#[derive(Debug)]
pub struct FetchOutcome {
    pub status: u16,
    pub body: String,
}

/// Storefront page fetcher.
///
/// Classification: HTTP 200 is the only success — the page endpoints answer
/// 200 even for unknown SKUs, so any other status is a transient upstream
/// condition and retried, as are transport errors. Each attempt gets the
/// client's full timeout; attempts never share a budget.
pub struct FetchClient {
    client: Client,
    retry: RetryPolicy,
}

impl FetchClient {
    /// Creates a `FetchClient` with a per-attempt request timeout and the
    /// given retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, retry: RetryPolicy) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, retry })
    }

    /// Fetches `url` with the given credential snapshot, retrying transient
    /// failures per the policy.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::RetryExhausted`] — transport errors or non-200
    ///   statuses persisted through every attempt.
    /// - [`ScrapeError::Http`] — the response body could not be read.
    pub async fn fetch(
        &self,
        url: &str,
        credentials: &CredentialSet,
    ) -> Result<FetchOutcome, ScrapeError> {
        let cookie_header = credentials.cookie_header();
        self.retry
            .run(|| {
                let url = url.to_owned();
                let cookie_header = cookie_header.clone();
                async move {
                    let response = self
                        .client
                        .get(&url)
                        .header(header::USER_AGENT, random_user_agent())
                        .header(
                            header::ACCEPT,
                            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                        )
                        .header(header::ACCEPT_LANGUAGE, "en-GB,en;q=0.9,tr;q=0.5")
                        .header(header::CACHE_CONTROL, "no-cache")
                        .header(header::PRAGMA, "no-cache")
                        .header(header::UPGRADE_INSECURE_REQUESTS, "1")
                        .header(header::COOKIE, &cookie_header)
                        .send()
                        .await?;

                    let status = response.status();
                    if status != StatusCode::OK {
                        return Err(ScrapeError::Status {
                            status: status.as_u16(),
                            url,
                        });
                    }

                    let body = response.text().await?;
                    Ok(FetchOutcome {
                        status: status.as_u16(),
                        body,
                    })
                }
            })
            .await
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENTS[rand::random_range(0..USER_AGENTS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_always_comes_from_the_pool() {
        for _ in 0..64 {
            let ua = random_user_agent();
            assert!(USER_AGENTS.contains(&ua));
        }
    }
}
