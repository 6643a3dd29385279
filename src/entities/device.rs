use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use crate::entities::playlist::{PlaylistId, MIN_NAME_LEN};
use crate::error::{Result, VitrineError};

pub type DeviceId = String;

pub const MIN_DEVICE_ID_LEN: usize = 3;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

/// Wall-clock time of day, serialized as `HH:MM`. Schedule windows carry no
/// timezone; they are interpreted in the device's local time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn parse(value: &str) -> Result<Self> {
        let time = NaiveTime::parse_from_str(value, "%H:%M")
            .map_err(|_| VitrineError::validation("time", format!("'{value}' is not a valid HH:MM time")))?;
        Ok(Self(time))
    }

    pub fn as_time(&self) -> NaiveTime {
        self.0
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        TimeOfDay::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// A recurring weekly playback window bound to one playlist.
/// `days_of_week` uses 0-6 with Sunday as 0.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub playlist_id: PlaylistId,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub days_of_week: Vec<u8>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub playlist_id: PlaylistId,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub days_of_week: Vec<u8>,
}

impl ScheduleEntryDraft {
    pub fn into_entry(self) -> Result<ScheduleEntry> {
        let entry = ScheduleEntry {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            playlist_id: self.playlist_id,
            start_time: self.start_time,
            end_time: self.end_time,
            days_of_week: self.days_of_week,
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl ScheduleEntry {
    pub fn validate(&self) -> Result<()> {
        // Overnight windows are rejected outright rather than wrapping.
        if self.start_time >= self.end_time {
            return Err(VitrineError::validation("endTime", "end time must be later than start time"));
        }
        if self.days_of_week.iter().any(|day| *day > 6) {
            return Err(VitrineError::validation("daysOfWeek", "days of week must be in the range 0-6"));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDevice {
    pub id: DeviceId,
    pub name: String,
    pub status: DeviceStatus,
    pub last_seen: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_playlist_id: Option<PlaylistId>,
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    pub id: DeviceId,
    pub name: String,
}

/// Admin-side replacement of the editable device fields. A missing or null
/// `current_playlist_id` clears the fallback assignment; there is no sentinel
/// value.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    pub name: String,
    #[serde(default)]
    pub current_playlist_id: Option<PlaylistId>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntryDraft>,
}

impl DisplayDevice {
    /// Devices start offline; the first heartbeat is what proves liveness.
    pub fn register(registration: DeviceRegistration) -> Result<Self> {
        validate_device_id(&registration.id)?;
        validate_device_name(&registration.name)?;
        Ok(Self {
            id: registration.id,
            name: registration.name,
            status: DeviceStatus::Offline,
            last_seen: Utc::now(),
            current_playlist_id: None,
            schedule: vec![],
        })
    }

    pub fn updated(&self, update: DeviceUpdate) -> Result<Self> {
        validate_device_name(&update.name)?;
        let schedule = update.schedule.into_iter()
            .map(ScheduleEntryDraft::into_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: self.id.clone(),
            name: update.name,
            status: self.status,
            last_seen: self.last_seen,
            current_playlist_id: update.current_playlist_id,
            schedule,
        })
    }
}

pub fn validate_device_id(id: &str) -> Result<()> {
    if id.len() < MIN_DEVICE_ID_LEN {
        return Err(VitrineError::validation("id", format!("device id must be at least {MIN_DEVICE_ID_LEN} characters")));
    }
    if id.chars().any(|x| !x.is_ascii_alphanumeric() && x != '-' && x != '_') {
        return Err(VitrineError::validation("id", "device id may only contain letters, digits, '-' and '_'"));
    }
    Ok(())
}

fn validate_device_name(name: &str) -> Result<()> {
    if name.chars().count() < MIN_NAME_LEN {
        return Err(VitrineError::validation("name", format!("name must be at least {MIN_NAME_LEN} characters")));
    }
    Ok(())
}
