use tracing::warn;

/// All configuration loaded from environment variables at startup.
/// Nothing here is required: a missing or unparseable value falls back to
/// its default with a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Webhook
    pub webhook_passphrase: String,
    pub webhook_endpoint: String,
    pub webhook_host: String,
    pub webhook_port: u16,

    // Scheduler
    pub scheduler_interval_seconds: u64,
    pub enable_scheduler: bool,

    // Trading hours
    pub allow_weekend_trading: bool,
    pub trading_hours_start: String,
    pub trading_hours_end: String,

    // Logging
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_passphrase: String::new(),
            webhook_endpoint: "/webhook".to_string(),
            webhook_host: "0.0.0.0".to_string(),
            webhook_port: 5000,
            scheduler_interval_seconds: 15,
            enable_scheduler: true,
            allow_weekend_trading: false,
            trading_hours_start: "00:00".to_string(),
            trading_hours_end: "23:59".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// One day. Longer evaluation periods are clamped to this.
    pub const MAX_SCHEDULER_INTERVAL_SECONDS: u64 = 86_400;

    /// Load configuration from the process environment.
    /// Loads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let webhook_endpoint = lookup("WEBHOOK_ENDPOINT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| if v.starts_with('/') { v } else { format!("/{v}") })
            .unwrap_or(defaults.webhook_endpoint);

        let scheduler_interval_seconds =
            match parsed::<u64, _>(&lookup, "SCHEDULER_INTERVAL_SECONDS") {
                Some(0) => {
                    warn!("SCHEDULER_INTERVAL_SECONDS must be at least 1, using default");
                    defaults.scheduler_interval_seconds
                }
                Some(secs) if secs > Self::MAX_SCHEDULER_INTERVAL_SECONDS => {
                    warn!(
                        value = secs,
                        max = Self::MAX_SCHEDULER_INTERVAL_SECONDS,
                        "SCHEDULER_INTERVAL_SECONDS too large, clamping"
                    );
                    Self::MAX_SCHEDULER_INTERVAL_SECONDS
                }
                Some(secs) => secs,
                None => defaults.scheduler_interval_seconds,
            };

        Config {
            webhook_passphrase: lookup("WEBHOOK_PASSPHRASE").unwrap_or_default(),
            webhook_endpoint,
            webhook_host: lookup("WEBHOOK_HOST").unwrap_or(defaults.webhook_host),
            webhook_port: parsed(&lookup, "WEBHOOK_PORT").unwrap_or(defaults.webhook_port),
            scheduler_interval_seconds,
            enable_scheduler: lookup("ENABLE_SCHEDULER")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.enable_scheduler),
            allow_weekend_trading: lookup("ALLOW_WEEKEND_TRADING")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.allow_weekend_trading),
            trading_hours_start: lookup("TRADING_HOURS_START")
                .unwrap_or(defaults.trading_hours_start),
            trading_hours_end: lookup("TRADING_HOURS_END").unwrap_or(defaults.trading_hours_end),
            log_level: lookup("LOG_LEVEL")
                .map(|v| v.to_lowercase())
                .unwrap_or(defaults.log_level),
        }
    }
}

/// `LOG_LEVEL` alone, for installing the subscriber before the full config
/// is loaded so its warnings are not lost.
pub fn log_level_from_env() -> String {
    let _ = dotenvy::dotenv();
    std::env::var("LOG_LEVEL")
        .map(|v| v.to_lowercase())
        .unwrap_or_else(|_| Config::default().log_level)
}

/// `true`, `1` and `yes` (any case) enable a flag; anything else disables it.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn flags_accept_true_one_yes() {
        for raw in ["True", "1", "YES", "true"] {
            let cfg = config_from(&[("ALLOW_WEEKEND_TRADING", raw)]);
            assert!(cfg.allow_weekend_trading, "{raw} should enable the flag");
        }
        let cfg = config_from(&[("ENABLE_SCHEDULER", "off")]);
        assert!(!cfg.enable_scheduler);
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let cfg = config_from(&[
            ("SCHEDULER_INTERVAL_SECONDS", "fast"),
            ("WEBHOOK_PORT", "99999"),
        ]);
        assert_eq!(cfg.scheduler_interval_seconds, 15);
        assert_eq!(cfg.webhook_port, 5000);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = config_from(&[("SCHEDULER_INTERVAL_SECONDS", "0")]);
        assert_eq!(cfg.scheduler_interval_seconds, 15);
    }

    #[test]
    fn oversized_interval_is_clamped() {
        let cfg = config_from(&[("SCHEDULER_INTERVAL_SECONDS", "18446744073709551615")]);
        assert_eq!(cfg.scheduler_interval_seconds, Config::MAX_SCHEDULER_INTERVAL_SECONDS);
    }

    #[test]
    fn endpoint_gets_leading_slash() {
        let cfg = config_from(&[("WEBHOOK_ENDPOINT", "tv-hook")]);
        assert_eq!(cfg.webhook_endpoint, "/tv-hook");
    }

    #[test]
    fn trading_hours_are_kept_raw() {
        let cfg = config_from(&[("TRADING_HOURS_START", "22:00"), ("TRADING_HOURS_END", "bogus")]);
        assert_eq!(cfg.trading_hours_start, "22:00");
        assert_eq!(cfg.trading_hours_end, "bogus");
    }
}
