//! Shared types used across ringbridge crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Invocation convention a handler is registered with.
///
/// Fixed at registration time; the dispatcher never inspects the handler
/// to guess its convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerMode {
    /// Handler receives the live context plus merged parameters.
    #[default]
    NativeContext,
    /// Handler receives a plain request record synthesized from the request.
    PlainRequest,
}

impl HandlerMode {
    pub fn label(&self) -> &'static str {
        match self {
            HandlerMode::NativeContext => "native-context",
            HandlerMode::PlainRequest => "plain-request",
        }
    }
}

impl fmt::Display for HandlerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// URI scheme reported to plain-request handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
