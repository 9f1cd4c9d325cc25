use crate::app_config::AppConfig;
use crate::ConfigError;

/// Default endpoints for the storefront. Overridable through the environment
/// so tests and staging mirrors can point the engine elsewhere.
const DEFAULT_BASE_PRODUCT_URL: &str = "https://www.hafele.com.tr/prod-live/web/WFS/Haefele-HTR-Site/tr_TR/-/TRY/ViewProduct-GetPriceAndAvailabilityInformationPDS";
const DEFAULT_SEARCH_URL: &str = "https://www.hafele.com.tr/prod-live/web/WFS/Haefele-HTR-Site/tr_TR/-/TRY/ViewParametricSearch-SimpleOfferSearch";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any present env var has an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any present env var has an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("STOKTAKIP_LOG_LEVEL", "info");
    let base_product_url = or_default("STOKTAKIP_BASE_PRODUCT_URL", DEFAULT_BASE_PRODUCT_URL);
    let search_url = or_default("STOKTAKIP_SEARCH_URL", DEFAULT_SEARCH_URL);
    let cookie_path = PathBuf::from(or_default(
        "STOKTAKIP_COOKIE_PATH",
        "./shared/cookies.json",
    ));

    let quantity_hint = parse_u32("STOKTAKIP_QUANTITY_HINT", "20000")?;
    let concurrency = parse_usize("STOKTAKIP_CONCURRENCY", "10")?;
    let request_timeout_secs = parse_u64("STOKTAKIP_REQUEST_TIMEOUT_SECS", "60")?;
    let max_attempts = parse_u32("STOKTAKIP_MAX_ATTEMPTS", "3")?;
    let retry_base_delay_ms = parse_u64("STOKTAKIP_RETRY_BASE_DELAY_MS", "1000")?;
    let retry_max_delay_ms = parse_u64("STOKTAKIP_RETRY_MAX_DELAY_MS", "10000")?;
    let retry_backoff_multiplier = parse_f64("STOKTAKIP_RETRY_BACKOFF_MULTIPLIER", "2.0")?;
    let retry_jitter = parse_bool("STOKTAKIP_RETRY_JITTER", "true")?;
    let cookie_ttl_secs = parse_u64("STOKTAKIP_COOKIE_TTL_SECS", "600")?;
    let refresh_interval_secs = parse_u64("STOKTAKIP_REFRESH_INTERVAL_SECS", "480")?;
    let snapshot_wait_secs = parse_u64("STOKTAKIP_SNAPSHOT_WAIT_SECS", "90")?;
    let ordered_output = parse_bool("STOKTAKIP_ORDERED_OUTPUT", "false")?;

    Ok(AppConfig {
        log_level,
        base_product_url,
        search_url,
        quantity_hint,
        concurrency,
        request_timeout_secs,
        max_attempts,
        retry_base_delay_ms,
        retry_max_delay_ms,
        retry_backoff_multiplier,
        retry_jitter,
        cookie_ttl_secs,
        refresh_interval_secs,
        snapshot_wait_secs,
        cookie_path,
        ordered_output,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.base_product_url, DEFAULT_BASE_PRODUCT_URL);
        assert_eq!(cfg.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(cfg.quantity_hint, 20_000);
        assert_eq!(cfg.concurrency, 10);
        assert_eq!(cfg.request_timeout_secs, 60);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.retry_base_delay_ms, 1_000);
        assert_eq!(cfg.retry_max_delay_ms, 10_000);
        assert!((cfg.retry_backoff_multiplier - 2.0).abs() < f64::EPSILON);
        assert!(cfg.retry_jitter);
        assert_eq!(cfg.cookie_ttl_secs, 600);
        assert_eq!(cfg.refresh_interval_secs, 480);
        assert_eq!(cfg.snapshot_wait_secs, 90);
        assert_eq!(
            cfg.cookie_path,
            std::path::PathBuf::from("./shared/cookies.json")
        );
        assert!(!cfg.ordered_output);
    }

    #[test]
    fn build_app_config_concurrency_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("STOKTAKIP_CONCURRENCY", "25");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.concurrency, 25);
    }

    #[test]
    fn build_app_config_concurrency_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("STOKTAKIP_CONCURRENCY", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOKTAKIP_CONCURRENCY"),
            "expected InvalidEnvVar(STOKTAKIP_CONCURRENCY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_max_attempts_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("STOKTAKIP_MAX_ATTEMPTS", "5");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_attempts, 5);
    }

    #[test]
    fn build_app_config_cookie_ttl_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("STOKTAKIP_COOKIE_TTL_SECS", "ten minutes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOKTAKIP_COOKIE_TTL_SECS"),
            "expected InvalidEnvVar(STOKTAKIP_COOKIE_TTL_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_jitter_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("STOKTAKIP_RETRY_JITTER", "false");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(!cfg.retry_jitter);
    }

    #[test]
    fn build_app_config_jitter_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("STOKTAKIP_RETRY_JITTER", "yes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOKTAKIP_RETRY_JITTER"),
            "expected InvalidEnvVar(STOKTAKIP_RETRY_JITTER), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_base_url_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("STOKTAKIP_BASE_PRODUCT_URL", "http://localhost:8080/pds");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.base_product_url, "http://localhost:8080/pds");
    }
}
