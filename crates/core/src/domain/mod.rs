pub mod metal;
pub mod quote;

pub use metal::{Metal, Threshold};
pub use quote::{drop_percent, AlertEvent, Baseline, BaselineSource, PriceQuote};
