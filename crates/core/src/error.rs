use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::metal::Metal;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{metal} price request failed: {source}")]
    Request {
        metal: Metal,
        #[source]
        source: reqwest::Error,
    },

    #[error("{metal} price API returned HTTP {status}: {body}")]
    Status {
        metal: Metal,
        status: StatusCode,
        body: String,
    },

    #[error("{metal} price response is not valid JSON: {source}")]
    Malformed {
        metal: Metal,
        #[source]
        source: serde_json::Error,
    },

    #[error("{metal} price API reported success=false")]
    Unsuccessful { metal: Metal },

    #[error("{metal} price API returned an empty data array")]
    Empty { metal: Metal },

    #[error("{metal} price must be positive (got {price})")]
    InvalidPrice {
        metal: Metal,
        price: rust_decimal::Decimal,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{provider} rejected the message: {detail}")]
    Rejected {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider} credential is not a valid header value")]
    InvalidHeader { provider: &'static str },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error(
        "no notification channel configured: set RESEND_API_KEY and EMAIL_TO for email, or PHONE_NUMBER for SMS"
    )]
    NoChannels,
}
