pub mod alerts;
pub mod config;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod pricing;
pub mod storage;

pub use error::{ConfigError, FetchError, NotifyError};
