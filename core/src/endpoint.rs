//! Connection URI parsing.

use crate::error::DiagError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Port used when the URI carries none.
pub const DEFAULT_PORT: u16 = 7687;

const SUPPORTED_SCHEMES: &[&str] = &["bolt"];

/// Network address of the target graph database service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parse a `scheme://host[:port]` URI. The host is passed through as-is.
    pub fn parse(uri: &str) -> Result<Self, DiagError> {
        let uri = uri.trim();
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| DiagError::UnsupportedScheme { uri: uri.to_string() })?;
        if !SUPPORTED_SCHEMES.contains(&scheme) {
            return Err(DiagError::UnsupportedScheme { uri: uri.to_string() });
        }
        // anything after the authority is not ours to interpret
        let authority = rest.split(|c: char| c == '/' || c == '?' || c == '#').next().unwrap_or_default();
        let (host, port) = split_host_port(authority).ok_or_else(|| DiagError::InvalidPort { uri: uri.to_string() })?;
        if host.is_empty() {
            return Err(DiagError::MissingHost { uri: uri.to_string() });
        }
        Ok(Endpoint { scheme: scheme.to_string(), host: host.to_string(), port })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split `host[:port]`, keeping IPv6 brackets with the host. `None` means a bad port.
fn split_host_port(authority: &str) -> Option<(&str, u16)> {
    let (host, port) = if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => {
                let (host, tail) = authority.split_at(end + 1);
                if tail.is_empty() {
                    (host, None)
                } else {
                    (host, Some(tail.strip_prefix(':')?))
                }
            }
            None => return None,
        }
    } else {
        match authority.rsplit_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (authority, None),
        }
    };
    match port {
        None => Some((host, DEFAULT_PORT)),
        Some(p) => match p.parse::<u16>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some((host, n)),
        },
    }
}

impl FromStr for Endpoint {
    type Err = DiagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}
