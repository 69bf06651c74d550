//! ringbridge.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Default size of a single read when buffering a raw input body.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Default number of bytes a raw input body may occupy in memory before
/// the normalizer switches to streaming it (8 MB).
pub const DEFAULT_RAW_BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RingbridgeConfig {
    pub dispatch: DispatchConfig,
    pub trigger: TriggerConfig,
}

/// Knobs for response materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Reject replies that do not take part in materialization instead of
    /// ignoring them.
    pub strict: bool,
    /// Size of each read when a raw input body is buffered.
    pub read_chunk_size: usize,
    /// Bytes of a raw input body held in memory before it is streamed.
    pub raw_body_limit: usize,
    /// Buffer raw input bodies fully, whatever their size.
    pub unbounded_raw_bodies: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strict: false,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            raw_body_limit: DEFAULT_RAW_BODY_LIMIT,
            unbounded_raw_bodies: false,
        }
    }
}

impl DispatchConfig {
    /// Buffering cap for raw input bodies, `None` when unbounded.
    pub fn raw_body_cap(&self) -> Option<usize> {
        if self.unbounded_raw_bodies {
            None
        } else {
            Some(self.raw_body_limit)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub bind: SocketAddr,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl RingbridgeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: RingbridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dispatch.read_chunk_size == 0 {
            anyhow::bail!("dispatch.read_chunk_size must be > 0");
        }
        if !self.dispatch.unbounded_raw_bodies && self.dispatch.raw_body_limit == 0 {
            anyhow::bail!("dispatch.raw_body_limit must be > 0 unless unbounded_raw_bodies is set");
        }
        Ok(())
    }
}
