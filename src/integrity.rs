//! Cascade logic for deletions. The document store has no foreign keys, so
//! removing a content item or playlist has to fan out to every record holding
//! a weak reference to it. Both delete paths funnel through here; the caller
//! persists each returned batch with a single `write_batch`.

use chrono::{DateTime, Utc};
use crate::entities::{DisplayDevice, Playlist};
use crate::storage::DbOperation;

/// Strips `content_id` from every playlist referencing it. Playlists that do
/// not reference it produce no operation; the ones that do also get their
/// `updated_at` refreshed.
pub fn content_removal_ops(
    content_id: &str,
    playlists: impl IntoIterator<Item = Playlist>,
    now: DateTime<Utc>,
) -> Vec<DbOperation> {
    let mut operations = Vec::new();
    for mut playlist in playlists {
        if !playlist.item_ids.iter().any(|id| id == content_id) {
            continue;
        }
        playlist.item_ids.retain(|id| id != content_id);
        playlist.updated_at = now;
        operations.push(DbOperation::UpdatePlaylist { playlist });
    }
    operations
}

/// Clears `playlist_id` from every device pointing at it, both as the
/// fallback assignment and in schedule entries.
pub fn playlist_removal_ops(
    playlist_id: &str,
    devices: impl IntoIterator<Item = DisplayDevice>,
) -> Vec<DbOperation> {
    let mut operations = Vec::new();
    for mut device in devices {
        let fallback_hit = device.current_playlist_id.as_deref() == Some(playlist_id);
        let schedule_hit = device.schedule.iter().any(|entry| entry.playlist_id == playlist_id);
        if !fallback_hit && !schedule_hit {
            continue;
        }
        if fallback_hit {
            device.current_playlist_id = None;
        }
        device.schedule.retain(|entry| entry.playlist_id != playlist_id);
        operations.push(DbOperation::UpdateDevice { device });
    }
    operations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::*;

    fn playlist(id: &str, item_ids: &[&str]) -> Playlist {
        let now = Utc::now();
        Playlist {
            id: id.to_string(),
            name: format!("playlist {id}"),
            description: None,
            item_ids: item_ids.iter().map(|x| x.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn device(id: &str, fallback: Option<&str>, scheduled: &[&str]) -> DisplayDevice {
        DisplayDevice {
            id: id.to_string(),
            name: format!("device {id}"),
            status: DeviceStatus::Offline,
            last_seen: Utc::now(),
            current_playlist_id: fallback.map(|x| x.to_string()),
            schedule: scheduled.iter().enumerate().map(|(i, playlist_id)| ScheduleEntry {
                id: format!("{id}-e{i}"),
                playlist_id: playlist_id.to_string(),
                start_time: TimeOfDay::parse("08:00").unwrap(),
                end_time: TimeOfDay::parse("18:00").unwrap(),
                days_of_week: vec![1, 2, 3, 4, 5],
            }).collect(),
        }
    }

    #[test]
    fn content_removal_touches_only_referencing_playlists() {
        let playlists = vec![
            playlist("p1", &["a", "b", "c"]),
            playlist("p2", &["x", "y"]),
            playlist("p3", &["b"]),
        ];
        let now = Utc::now();

        let operations = content_removal_ops("b", playlists, now);
        assert_eq!(operations.len(), 2);
        for operation in &operations {
            let DbOperation::UpdatePlaylist { playlist } = operation else {
                panic!("unexpected operation: {operation:?}");
            };
            assert!(!playlist.item_ids.iter().any(|id| id == "b"));
            assert_eq!(playlist.updated_at, now);
        }
    }

    #[test]
    fn content_removal_preserves_remaining_order() {
        let operations = content_removal_ops("b", vec![playlist("p1", &["a", "b", "c"])], Utc::now());
        let DbOperation::UpdatePlaylist { playlist } = &operations[0] else {
            panic!("expected an update");
        };
        assert_eq!(playlist.item_ids, vec!["a", "c"]);
    }

    #[test]
    fn content_removal_may_empty_a_playlist() {
        // the playlist survives with zero items; read-time projection shows
        // it as empty rather than erroring
        let operations = content_removal_ops("a", vec![playlist("p1", &["a"])], Utc::now());
        let DbOperation::UpdatePlaylist { playlist } = &operations[0] else {
            panic!("expected an update");
        };
        assert!(playlist.item_ids.is_empty());
    }

    #[test]
    fn playlist_removal_clears_fallback_and_schedule() {
        let devices = vec![
            device("d1", Some("p1"), &[]),
            device("d2", Some("p2"), &["p1", "p2"]),
            device("d3", None, &["p2"]),
        ];

        let operations = playlist_removal_ops("p1", devices);
        assert_eq!(operations.len(), 2);

        let DbOperation::UpdateDevice { device: d1 } = &operations[0] else {
            panic!("expected an update");
        };
        assert_eq!(d1.id, "d1");
        assert!(d1.current_playlist_id.is_none());

        let DbOperation::UpdateDevice { device: d2 } = &operations[1] else {
            panic!("expected an update");
        };
        assert_eq!(d2.id, "d2");
        assert_eq!(d2.current_playlist_id.as_deref(), Some("p2"));
        assert_eq!(d2.schedule.len(), 1);
        assert_eq!(d2.schedule[0].playlist_id, "p2");
    }

    #[test]
    fn unreferenced_records_produce_no_operations() {
        assert!(content_removal_ops("zzz", vec![playlist("p1", &["a"])], Utc::now()).is_empty());
        assert!(playlist_removal_ops("zzz", vec![device("d1", Some("p1"), &["p2"])]).is_empty());
    }
}
