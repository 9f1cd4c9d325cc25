//! Session credential lifecycle.
//!
//! The storefront only serves price/stock markup to an authenticated browser
//! session, and that session is perishable: the login automation republishes
//! a fresh cookie set every few minutes and anything older than the TTL is
//! rejected upstream. [`CredentialStore`] is the single shared holder —
//! workers take value-copy snapshots, the refresher is the only writer, and
//! a snapshot is never observably torn.

use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tokio::sync::Notify;

use crate::error::ScrapeError;

/// Raw cookie triple as handed over by the external login automation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Immutable authenticated-session artifact: an ordered name→value cookie
/// mapping plus its issuance time.
///
/// Built exactly once per login at the ingestion boundary; the engine never
/// re-normalises downstream and never mutates a set in place — stores replace
/// wholesale.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    cookies: Vec<(String, String)>,
    issued_at: DateTime<Utc>,
}

impl CredentialSet {
    /// Normalises the raw triple list into an ordered, name-deduplicated
    /// mapping. A repeated name keeps its first position but takes the last
    /// value seen; the `domain` field is dropped (requests target one host).
    #[must_use]
    pub fn from_cookies(raw: &[RawCookie], issued_at: DateTime<Utc>) -> Self {
        let mut cookies: Vec<(String, String)> = Vec::with_capacity(raw.len());
        for cookie in raw {
            if cookie.name.is_empty() {
                tracing::warn!("skipping malformed cookie with empty name");
                continue;
            }
            match cookies.iter_mut().find(|(name, _)| *name == cookie.name) {
                Some(entry) => entry.1 = cookie.value.clone(),
                None => cookies.push((cookie.name.clone(), cookie.value.clone())),
            }
        }
        Self { cookies, issued_at }
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Renders the set as a `Cookie` request-header value.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        let mut header = String::new();
        for (name, value) in &self.cookies {
            if !header.is_empty() {
                header.push_str("; ");
            }
            header.push_str(name);
            header.push('=');
            header.push_str(value);
        }
        header
    }
}

/// Shared holder for the current [`CredentialSet`].
///
/// Read-mostly: workers call [`snapshot`](Self::snapshot) or
/// [`wait_fresh`](Self::wait_fresh); the background refresher is the only
/// caller of [`replace`](Self::replace). Replacement is a single atomic
/// publish and wakes every waiter.
pub struct CredentialStore {
    ttl: TimeDelta,
    current: RwLock<Option<CredentialSet>>,
    refreshed: Notify,
}

impl CredentialStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            current: RwLock::new(None),
            refreshed: Notify::new(),
        }
    }

    /// Value copy of the current set.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::CredentialsUnavailable`] if no set has ever been
    /// published.
    pub fn snapshot(&self) -> Result<CredentialSet, ScrapeError> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .ok_or(ScrapeError::CredentialsUnavailable)
    }

    /// Atomically publishes `set` and wakes all [`wait_fresh`](Self::wait_fresh)
    /// callers.
    pub fn replace(&self, set: CredentialSet) {
        {
            let mut guard = self
                .current
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *guard = Some(set);
        }
        self.refreshed.notify_waiters();
    }

    /// True iff `set` is younger than the TTL at `now`.
    #[must_use]
    pub fn is_valid(&self, set: &CredentialSet, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(set.issued_at) < self.ttl
    }

    /// Returns a fresh snapshot, waiting up to `timeout` for the refresher to
    /// publish one if the current set is stale or absent.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::CredentialsStale`] if a set exists but aged past the
    ///   TTL and no refresh arrived within `timeout`.
    /// - [`ScrapeError::CredentialsUnavailable`] if no set was ever published
    ///   within `timeout`.
    pub async fn wait_fresh(&self, timeout: Duration) -> Result<CredentialSet, ScrapeError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // Register interest before inspecting state so a publish between
            // the check and the await is not lost.
            let refreshed = self.refreshed.notified();

            let stale_age_secs = {
                let guard = self
                    .current
                    .read()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                match guard.as_ref() {
                    Some(set) if self.is_valid(set, Utc::now()) => return Ok(set.clone()),
                    Some(set) => Some(
                        Utc::now()
                            .signed_duration_since(set.issued_at())
                            .num_seconds(),
                    ),
                    None => None,
                }
            };

            if tokio::time::timeout_at(deadline, refreshed).await.is_err() {
                return Err(match stale_age_secs {
                    Some(age_secs) => ScrapeError::CredentialsStale { age_secs },
                    None => ScrapeError::CredentialsUnavailable,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn cookie(name: &str, value: &str) -> RawCookie {
        RawCookie {
            name: name.to_owned(),
            value: value.to_owned(),
            domain: None,
        }
    }

    fn set_issued_at(issued_at: DateTime<Utc>) -> CredentialSet {
        CredentialSet::from_cookies(&[cookie("sid", "abc123")], issued_at)
    }

    #[test]
    fn normalisation_preserves_order_and_dedupes_last_value_wins() {
        let raw = [
            cookie("sid", "first"),
            cookie("lang", "tr"),
            cookie("sid", "second"),
        ];
        let set = CredentialSet::from_cookies(&raw, Utc::now());
        assert_eq!(set.cookie_header(), "sid=second; lang=tr");
    }

    #[test]
    fn normalisation_skips_empty_names() {
        let raw = [cookie("", "x"), cookie("sid", "abc")];
        let set = CredentialSet::from_cookies(&raw, Utc::now());
        assert_eq!(set.cookie_header(), "sid=abc");
    }

    #[test]
    fn snapshot_fails_when_nothing_published() {
        let store = CredentialStore::new(Duration::from_secs(600));
        assert!(matches!(
            store.snapshot(),
            Err(ScrapeError::CredentialsUnavailable)
        ));
    }

    #[test]
    fn snapshot_is_a_value_copy_unaffected_by_replace() {
        let store = CredentialStore::new(Duration::from_secs(600));
        let issued = Utc::now();
        store.replace(CredentialSet::from_cookies(&[cookie("sid", "one")], issued));
        let held = store.snapshot().unwrap();
        store.replace(CredentialSet::from_cookies(&[cookie("sid", "two")], issued));
        assert_eq!(held.cookie_header(), "sid=one");
        assert_eq!(store.snapshot().unwrap().cookie_header(), "sid=two");
    }

    #[test]
    fn is_valid_boundary_at_ttl_600() {
        let store = CredentialStore::new(Duration::from_secs(600));
        let issued = Utc::now();
        let set = set_issued_at(issued);
        assert!(store.is_valid(&set, issued + TimeDelta::seconds(599)));
        assert!(!store.is_valid(&set, issued + TimeDelta::seconds(600)));
        assert!(!store.is_valid(&set, issued + TimeDelta::seconds(601)));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_fresh_returns_once_refresher_publishes() {
        let store = Arc::new(CredentialStore::new(Duration::from_secs(600)));
        let publisher = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            publisher.replace(set_issued_at(Utc::now()));
        });
        let set = store
            .wait_fresh(Duration::from_secs(30))
            .await
            .expect("refresh should arrive within the bound");
        assert_eq!(set.cookie_header(), "sid=abc123");
    }

    #[tokio::test(start_paused = true)]
    async fn wait_fresh_times_out_unavailable_when_never_published() {
        let store = CredentialStore::new(Duration::from_secs(600));
        let result = store.wait_fresh(Duration::from_secs(5)).await;
        assert!(matches!(result, Err(ScrapeError::CredentialsUnavailable)));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_fresh_times_out_stale_when_set_aged_out() {
        let store = CredentialStore::new(Duration::from_secs(600));
        store.replace(set_issued_at(Utc::now() - TimeDelta::seconds(1_000)));
        let result = store.wait_fresh(Duration::from_secs(5)).await;
        assert!(
            matches!(result, Err(ScrapeError::CredentialsStale { age_secs }) if age_secs >= 1_000),
            "expected CredentialsStale, got: {result:?}"
        );
    }
}
