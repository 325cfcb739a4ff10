//! Client identity derivation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel key used when no address information is available
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Identity string admission quotas are tracked under
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_CLIENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CLIENT
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the admission key for a caller.
///
/// Takes the left-most non-empty entry of a comma-separated forwarded-address
/// chain, then the peer address, then [`UNKNOWN_CLIENT`].
pub fn derive_client_key(forwarded_for: Option<&str>, peer_addr: Option<&str>) -> ClientKey {
    let forwarded = forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    if let Some(first) = forwarded {
        return ClientKey::new(first);
    }

    peer_addr
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(ClientKey::new)
        .unwrap_or_else(ClientKey::unknown)
}
