pub mod config;
pub mod types;

pub use config::{DispatchConfig, RingbridgeConfig, TriggerConfig};
pub use types::*;
