//! Derives the UI-facing liveness classification from the raw heartbeat
//! state. A device that reported offline is offline no matter how recent its
//! last heartbeat; an online device whose heartbeat has gone stale is
//! unresponsive rather than offline.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use crate::entities::DeviceStatus;

#[derive(Serialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Online,
    Unresponsive,
    Offline,
}

pub fn effective_status(
    status: DeviceStatus,
    last_seen: DateTime<Utc>,
    now: DateTime<Utc>,
    timeout: Duration,
) -> EffectiveStatus {
    if status == DeviceStatus::Offline {
        return EffectiveStatus::Offline;
    }
    if now.signed_duration_since(last_seen) <= timeout {
        EffectiveStatus::Online
    } else {
        EffectiveStatus::Unresponsive
    }
}
