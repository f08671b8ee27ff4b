use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    pub const ALL: [Metal; 2] = [Metal::Gold, Metal::Silver];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
        }
    }

    /// Environment variable holding an optional baseline override.
    pub fn baseline_env_key(self) -> &'static str {
        match self {
            Self::Gold => "GOLD_BASELINE_PRICE",
            Self::Silver => "SILVER_BASELINE_PRICE",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(Self::Gold),
            "silver" => Ok(Self::Silver),
            other => Err(format!("unknown metal {other:?} (expected gold or silver)")),
        }
    }
}

/// Percentage drop levels that can trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Threshold {
    #[serde(rename = "10")]
    TenPercent,
    #[serde(rename = "20")]
    TwentyPercent,
}

impl Threshold {
    pub const ALL: [Threshold; 2] = [Threshold::TenPercent, Threshold::TwentyPercent];

    pub fn percent(self) -> u32 {
        match self {
            Self::TenPercent => 10,
            Self::TwentyPercent => 20,
        }
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.percent())
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
