//! Decides which playlist a device should be showing at a given instant.
//!
//! Schedule windows are matched against the instant's day-of-week and
//! time-of-day (start inclusive, end exclusive). Overlapping windows are
//! resolved deterministically: the latest-starting window wins, with the
//! entry id as the final tie-break. When nothing matches, the device's
//! fallback playlist applies, if any.

use chrono::{Datelike, NaiveDateTime};
use crate::entities::{DisplayDevice, PlaylistId, ScheduleEntry};

pub fn resolve_playback(device: &DisplayDevice, at: NaiveDateTime) -> Option<PlaylistId> {
    active_entry(&device.schedule, at)
        .map(|entry| entry.playlist_id.clone())
        .or_else(|| device.current_playlist_id.clone())
}

fn active_entry(schedule: &[ScheduleEntry], at: NaiveDateTime) -> Option<&ScheduleEntry> {
    let day = at.weekday().num_days_from_sunday() as u8;
    let time = at.time();
    schedule.iter()
        .filter(|entry| entry.days_of_week.contains(&day))
        .filter(|entry| entry.start_time.as_time() <= time && time < entry.end_time.as_time())
        .max_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use crate::entities::{DeviceStatus, TimeOfDay};

    fn entry(id: &str, playlist_id: &str, start: &str, end: &str, days: &[u8]) -> ScheduleEntry {
        ScheduleEntry {
            id: id.to_string(),
            playlist_id: playlist_id.to_string(),
            start_time: TimeOfDay::parse(start).unwrap(),
            end_time: TimeOfDay::parse(end).unwrap(),
            days_of_week: days.to_vec(),
        }
    }

    fn device(fallback: Option<&str>, schedule: Vec<ScheduleEntry>) -> DisplayDevice {
        DisplayDevice {
            id: "lobby-1".to_string(),
            name: "Lobby screen".to_string(),
            status: DeviceStatus::Online,
            last_seen: Utc::now(),
            current_playlist_id: fallback.map(|x| x.to_string()),
            schedule,
        }
    }

    // 2024-01-08 is a Monday (day 1)
    fn monday_at(time: &str) -> NaiveDateTime {
        let time = TimeOfDay::parse(time).unwrap().as_time();
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_time(time)
    }

    #[test]
    fn matching_window_wins_over_fallback() {
        let device = device(Some("fallback"), vec![entry("e1", "morning", "08:00", "12:00", &[1])]);
        assert_eq!(resolve_playback(&device, monday_at("09:00")).as_deref(), Some("morning"));
    }

    #[test]
    fn start_is_inclusive_and_end_is_exclusive() {
        let device = device(None, vec![entry("e1", "morning", "08:00", "12:00", &[1])]);
        assert_eq!(resolve_playback(&device, monday_at("08:00")).as_deref(), Some("morning"));
        assert_eq!(resolve_playback(&device, monday_at("12:00")), None);
    }

    #[test]
    fn window_on_another_day_does_not_match() {
        let device = device(Some("fallback"), vec![entry("e1", "weekend", "08:00", "12:00", &[0, 6])]);
        assert_eq!(resolve_playback(&device, monday_at("09:00")).as_deref(), Some("fallback"));
    }

    #[test]
    fn overlapping_windows_resolve_to_the_latest_start() {
        let device = device(None, vec![
            entry("e1", "all-day", "08:00", "20:00", &[1]),
            entry("e2", "lunch", "11:30", "13:30", &[1]),
        ]);
        assert_eq!(resolve_playback(&device, monday_at("12:00")).as_deref(), Some("lunch"));
        assert_eq!(resolve_playback(&device, monday_at("09:00")).as_deref(), Some("all-day"));
    }

    #[test]
    fn equal_starts_tie_break_on_entry_id() {
        let device = device(None, vec![
            entry("e1", "first", "08:00", "12:00", &[1]),
            entry("e2", "second", "08:00", "13:00", &[1]),
        ]);
        // deterministic regardless of schedule order
        assert_eq!(resolve_playback(&device, monday_at("09:00")).as_deref(), Some("second"));

        let reversed = self::device(None, vec![
            entry("e2", "second", "08:00", "13:00", &[1]),
            entry("e1", "first", "08:00", "12:00", &[1]),
        ]);
        assert_eq!(resolve_playback(&reversed, monday_at("09:00")).as_deref(), Some("second"));
    }

    #[test]
    fn no_match_and_no_fallback_resolves_to_none() {
        let device = device(None, vec![entry("e1", "morning", "08:00", "12:00", &[1])]);
        assert_eq!(resolve_playback(&device, monday_at("15:00")), None);
    }

    #[test]
    fn empty_schedule_uses_the_fallback() {
        let device = device(Some("fallback"), vec![]);
        assert_eq!(resolve_playback(&device, monday_at("15:00")).as_deref(), Some("fallback"));
    }
}
