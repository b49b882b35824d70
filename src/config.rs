//! Configuration loading from environment variables and an optional TOML file.
//!
//! Secrets and per-deployment values (`ENV`, `API_TOKEN`, `MARGIN`, mail
//! credentials) come from the environment. Policy constants such as the
//! reminder threshold and the SMTP relay live in `transferwisely.toml` and
//! fall back to built-in defaults when the file or a key is absent.
//!
//! Everything is resolved once at process start into an immutable
//! [`AppConfig`] that is passed by reference into every component.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::types::{WiselyError, WiselyResult};

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "transferwisely.toml";

const HOST_PRODUCTION: &str = "api.transferwise.com";
const HOST_SANDBOX: &str = "api.sandbox.transferwise.tech";

const DEFAULT_INTERVAL_HOURS: u64 = 1;
/// Upper bound for `INTERVAL`: one year.
const MAX_INTERVAL_HOURS: u64 = 24 * 365;
const DEFAULT_EXPIRY_THRESHOLD_HOURS: i64 = 36;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SENDER_NAME: &str = "Transferwisely";

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Which provider deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    /// Parse `ENV` case-insensitively. Anything else disables operation.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "sandbox" => Some(Self::Sandbox),
            _ => None,
        }
    }

    pub fn host(&self) -> &'static str {
        match self {
            Self::Production => HOST_PRODUCTION,
            Self::Sandbox => HOST_SANDBOX,
        }
    }

    pub fn base_url(&self) -> String {
        format!("https://{}/", self.host())
    }
}

// ---------------------------------------------------------------------------
// File settings
// ---------------------------------------------------------------------------

/// Contents of the optional TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FileSettings {
    pub policy: PolicyConfig,
    pub smtp: SmtpConfig,
}

/// Tunable policy constants.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Send a reminder when the booked quote expires sooner than this.
    pub expiry_threshold_hours: i64,
    pub http_timeout_secs: u64,
    /// Margin used when `MARGIN` is not set.
    pub default_margin: Decimal,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            expiry_threshold_hours: DEFAULT_EXPIRY_THRESHOLD_HOURS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            default_margin: dec!(0),
        }
    }
}

impl PolicyConfig {
    /// Reject values that cannot be turned into durations.
    pub fn validate(&self) -> WiselyResult<()> {
        if self.expiry_threshold_hours < 0
            || chrono::Duration::try_hours(self.expiry_threshold_hours).is_none()
        {
            return Err(WiselyError::Config(format!(
                "policy.expiry_threshold_hours out of range: {}",
                self.expiry_threshold_hours
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
        }
    }
}

impl FileSettings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &str) -> WiselyResult<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WiselyError::Config(format!("Failed to read config file {path}: {e}")))?;
        Self::parse(&contents)
            .map_err(|e| WiselyError::Config(format!("Failed to parse config file {path}: {e}")))
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

/// Mail delivery settings. Present only when all credentials are set.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub to: String,
    pub from: String,
    pub password: SecretString,
    pub smtp: SmtpConfig,
}

/// Fully resolved, immutable process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub api_token: SecretString,
    /// Minimum rate improvement required before rebooking.
    pub margin: Decimal,
    /// Hours between scheduled runs.
    pub interval_hours: u64,
    pub policy: PolicyConfig,
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    /// Load the TOML file (if any) and resolve the process environment.
    pub fn load(path: &str) -> WiselyResult<Self> {
        let settings = FileSettings::load(path)?;
        Self::from_lookup(settings, |key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(settings: FileSettings, lookup: F) -> WiselyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = get("ENV")
            .and_then(|v| Environment::parse(&v))
            .ok_or(WiselyError::MissingCredentials)?;
        let api_token = get("API_TOKEN").ok_or(WiselyError::MissingCredentials)?;

        let margin = match get("MARGIN") {
            Some(raw) => Decimal::from_str(raw.trim())
                .map_err(|e| WiselyError::Config(format!("MARGIN '{raw}' is not a number: {e}")))?,
            None => settings.policy.default_margin,
        };
        if margin < Decimal::ZERO {
            return Err(WiselyError::Config(format!("MARGIN must not be negative, got {margin}")));
        }

        settings.policy.validate()?;

        let interval_hours = get("INTERVAL")
            .map(|raw| parse_interval_hours(&raw))
            .unwrap_or(DEFAULT_INTERVAL_HOURS);

        let mail = match (get("TO_MAIL"), get("FROM_MAIL"), get("MAIL_PASS")) {
            (Some(to), Some(from), Some(password)) => Some(MailConfig {
                to,
                from,
                password: SecretString::new(password),
                smtp: settings.smtp.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            environment,
            api_token: SecretString::new(api_token),
            margin,
            interval_hours,
            policy: settings.policy,
            mail,
        })
    }

    pub fn expiry_threshold(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.policy.expiry_threshold_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_EXPIRY_THRESHOLD_HOURS))
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.policy.http_timeout_secs)
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_hours.saturating_mul(3600))
    }
}

/// Hours between runs. Anything but a whole number in
/// `1..=MAX_INTERVAL_HOURS` is logged and replaced by the default.
fn parse_interval_hours(raw: &str) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(hours) if (1..=MAX_INTERVAL_HOURS).contains(&hours) => hours,
        Ok(hours) => {
            warn!(
                interval = hours,
                max = MAX_INTERVAL_HOURS,
                default = DEFAULT_INTERVAL_HOURS,
                "INTERVAL out of range, using default"
            );
            DEFAULT_INTERVAL_HOURS
        }
        Err(e) => {
            warn!(
                interval = raw,
                error = %e,
                default = DEFAULT_INTERVAL_HOURS,
                "INTERVAL is not a whole number of hours, using default"
            );
            DEFAULT_INTERVAL_HOURS
        }
    }
}
