// Trigger Domain Model
//
// A trigger is a health-check URL registered for one system. Its status and
// retry fields are owned by the evaluator; see application::escalation for
// the state machine.

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;
use url::{Host, Url};

/// Trigger ID (SQLite rowid)
pub type TriggerId = i64;

/// System reference a trigger, document or template belongs to
pub type SystemId = String;

/// Trigger status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
    Ok,
    Error,
    /// Terminal until externally reset; never probed again
    Triggered,
}

impl TriggerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerStatus::Ok => "ok",
            TriggerStatus::Error => "error",
            TriggerStatus::Triggered => "triggered",
        }
    }
}

impl std::fmt::Display for TriggerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ok" => Ok(TriggerStatus::Ok),
            "error" => Ok(TriggerStatus::Error),
            "triggered" => Ok(TriggerStatus::Triggered),
            other => Err(DomainError::InvalidTriggerStatus(other.to_string())),
        }
    }
}

/// Trigger Entity
///
/// Invariant: `retry_count > 0` iff `last_failed_at.is_some()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    pub system_id: SystemId,
    pub url: String,

    /// Minimum seconds a failure streak must last before escalation
    pub buffer_seconds: i64,

    pub status: TriggerStatus,
    pub retry_count: u32,
    /// First failure of the current streak (unix seconds)
    pub last_failed_at: Option<i64>,
    pub last_checked_at: Option<i64>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Trigger {
    /// Create a fresh, healthy trigger
    ///
    /// `id` is assigned by the store on insert; pass 0 for unsaved triggers.
    pub fn new(
        id: TriggerId,
        system_id: impl Into<String>,
        url: impl Into<String>,
        buffer_seconds: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            system_id: system_id.into(),
            url: url.into(),
            buffer_seconds,
            status: TriggerStatus::Ok,
            retry_count: 0,
            last_failed_at: None,
            last_checked_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.status == TriggerStatus::Triggered
    }

    /// True while the trigger carries any failure state
    pub fn in_failure_streak(&self) -> bool {
        self.retry_count > 0 || self.status != TriggerStatus::Ok
    }
}

/// Validate a URL before it is registered as a trigger
///
/// Requires http/https and a host. IP-literal hosts must be public; hostname
/// resolution is left to the caller (see `is_public_ip`).
pub fn validate_probe_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| DomainError::InvalidProbeUrl(format!("{raw}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(DomainError::InvalidProbeUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    match url.host() {
        None => return Err(DomainError::InvalidProbeUrl("missing host".to_string())),
        Some(Host::Domain(domain)) if domain.is_empty() => {
            return Err(DomainError::InvalidProbeUrl("missing host".to_string()));
        }
        Some(Host::Ipv4(ip)) if !is_public_ip(IpAddr::V4(ip)) => {
            return Err(DomainError::InvalidProbeUrl(format!(
                "{ip} is a private or local address"
            )));
        }
        Some(Host::Ipv6(ip)) if !is_public_ip(IpAddr::V6(ip)) => {
            return Err(DomainError::InvalidProbeUrl(format!(
                "{ip} is a private or local address"
            )));
        }
        Some(_) => {}
    }

    Ok(url)
}

/// Whether an address is routable on the public internet
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            let link_local_multicast = a == 224 && b == 0 && c == 0;
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || link_local_multicast)
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_public_ip(IpAddr::V4(mapped));
            }
            let first = v6.segments()[0];
            let unique_local = first & 0xfe00 == 0xfc00;
            let link_local = first & 0xffc0 == 0xfe80;
            let link_local_multicast = first == 0xff02;
            !(v6.is_loopback()
                || v6.is_unspecified()
                || unique_local
                || link_local
                || link_local_multicast)
        }
    }
}
