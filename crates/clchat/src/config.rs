//! Startup configuration: port, host, and handshake token.

use std::fmt;
use std::str::FromStr;

use clchat_protocol::HANDSHAKE_TOKEN;

use crate::ConfigError;

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 5000;

/// Lowest port accepted.
pub const MIN_PORT: u16 = 1076;

/// Highest port accepted.
pub const MAX_PORT: u16 = 65534;

/// Host the initiator connects to by default.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Address the responder listens on.
pub const LISTEN_HOST: &str = "0.0.0.0";

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// A validated TCP port in `MIN_PORT..=MAX_PORT`.
///
/// Can only be built through `FromStr` or `TryFrom<i64>`, so holding a
/// `Port` means the range check already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(u16);

impl Default for Port {
    fn default() -> Self {
        Self(DEFAULT_PORT)
    }
}

impl TryFrom<i64> for Port {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(MIN_PORT)..=i64::from(MAX_PORT)).contains(&value) {
            // Range check above guarantees this fits.
            Ok(Self(value as u16))
        } else {
            Err(ConfigError::OutOfRange(value))
        }
    }
}

impl FromStr for Port {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChatConfig
// ---------------------------------------------------------------------------

/// Everything a role driver needs to open its connection.
///
/// Built once at startup and passed by reference; nothing changes it
/// afterwards. Override single fields with struct update syntax:
///
/// ```rust
/// use clchat::{ChatConfig, Port};
///
/// let config = ChatConfig {
///     port: "6000".parse::<Port>().unwrap(),
///     ..ChatConfig::default()
/// };
/// assert_eq!(config.listen_addr(), "0.0.0.0:6000");
/// assert_eq!(config.connect_addr(), "127.0.0.1:6000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Port the responder listens on and the initiator connects to.
    pub port: Port,

    /// Host the initiator connects to.
    pub host: String,

    /// Handshake token both sides must agree on.
    pub token: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            port: Port::default(),
            host: DEFAULT_HOST.to_string(),
            token: HANDSHAKE_TOKEN.to_string(),
        }
    }
}

impl ChatConfig {
    /// Address for the responder's listener.
    pub fn listen_addr(&self) -> String {
        format!("{LISTEN_HOST}:{}", self.port)
    }

    /// Address the initiator dials. IPv6 literals get brackets.
    pub fn connect_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
