use crate::domain::{Metal, Threshold};
use crate::error::ConfigError;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PRICE_API_BASE_URL: &str = "https://auragold.netlify.app";
pub const DEFAULT_EMAIL_FROM: &str = "Metal Price Tracker <onboarding@resend.dev>";
pub const DEFAULT_TEXTBELT_KEY: &str = "textbelt";
const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 30;
const MAX_CHECK_INTERVAL_MINUTES: u64 = 7 * 24 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub resend_api_key: Option<String>,
    pub email_to: Option<String>,
    pub email_from: String,
    pub phone_number: Option<String>,
    pub textbelt_key: String,
    pub fast2sms_api_key: Option<String>,
    pub alert_10_percent: bool,
    pub alert_20_percent: bool,
    pub check_interval_minutes: u64,
    pub gold_baseline_price: Option<Decimal>,
    pub silver_baseline_price: Option<Decimal>,
    pub price_api_base_url: String,
    pub http_timeout_secs: u64,
    pub state_dir: PathBuf,
    pub auto_rebaseline: bool,
    pub sentry_dsn: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let check_interval_minutes = match get("CHECK_INTERVAL_MINUTES") {
            Some(v) => parse_check_interval(&v)?,
            None => DEFAULT_CHECK_INTERVAL_MINUTES,
        };

        let http_timeout_secs = match get("PRICE_API_TIMEOUT_SECS") {
            Some(v) => parse_positive_u64("PRICE_API_TIMEOUT_SECS", &v)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            resend_api_key: get("RESEND_API_KEY"),
            email_to: get("EMAIL_TO"),
            email_from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            phone_number: get("PHONE_NUMBER"),
            textbelt_key: get("TEXTBELT_KEY").unwrap_or_else(|| DEFAULT_TEXTBELT_KEY.to_string()),
            fast2sms_api_key: get("FAST2SMS_API_KEY"),
            alert_10_percent: parse_bool("ALERT_10_PERCENT", get("ALERT_10_PERCENT"), true)?,
            alert_20_percent: parse_bool("ALERT_20_PERCENT", get("ALERT_20_PERCENT"), true)?,
            check_interval_minutes,
            gold_baseline_price: parse_baseline(
                Metal::Gold.baseline_env_key(),
                get(Metal::Gold.baseline_env_key()),
            )?,
            silver_baseline_price: parse_baseline(
                Metal::Silver.baseline_env_key(),
                get(Metal::Silver.baseline_env_key()),
            )?,
            price_api_base_url: get("PRICE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PRICE_API_BASE_URL.to_string()),
            http_timeout_secs,
            state_dir: get("STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            auto_rebaseline: parse_bool("AUTO_REBASELINE", get("AUTO_REBASELINE"), false)?,
            sentry_dsn: get("SENTRY_DSN"),
        })
    }

    pub fn email_configured(&self) -> bool {
        self.resend_api_key.is_some() && self.email_to.is_some()
    }

    pub fn sms_configured(&self) -> bool {
        self.phone_number.is_some()
    }

    pub fn require_notification_channel(&self) -> Result<(), ConfigError> {
        if self.email_configured() || self.sms_configured() {
            Ok(())
        } else {
            Err(ConfigError::NoChannels)
        }
    }

    pub fn enabled_thresholds(&self) -> Vec<Threshold> {
        let mut out = Vec::with_capacity(2);
        if self.alert_10_percent {
            out.push(Threshold::TenPercent);
        }
        if self.alert_20_percent {
            out.push(Threshold::TwentyPercent);
        }
        out
    }

    pub fn baseline_override(&self, metal: Metal) -> Option<Decimal> {
        match metal {
            Metal::Gold => self.gold_baseline_price,
            Metal::Silver => self.silver_baseline_price,
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes * 60)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false",
        }),
    }
}

// Upper bound keeps `check_interval` from overflowing.
fn parse_check_interval(value: &str) -> Result<u64, ConfigError> {
    let minutes = parse_positive_u64("CHECK_INTERVAL_MINUTES", value)?;
    if minutes > MAX_CHECK_INTERVAL_MINUTES {
        return Err(ConfigError::Invalid {
            key: "CHECK_INTERVAL_MINUTES",
            value: value.to_string(),
            reason: "must be at most 10080 minutes (one week)",
        });
    }
    Ok(minutes)
}

fn parse_positive_u64(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a positive integer",
        }),
    }
}

// Zero means "no override", matching how the variables are usually left in .env templates.
fn parse_baseline(key: &'static str, value: Option<String>) -> Result<Option<Decimal>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let price = Decimal::from_str(&value).map_err(|_| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: "expected a decimal price",
    })?;
    if price.is_zero() {
        return Ok(None);
    }
    if price.is_sign_negative() {
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: "price must not be negative",
        });
    }
    Ok(Some(price))
}
