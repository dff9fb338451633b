use chrono::{TimeZone, Utc};

use crate::record::{Record, RecordStatus};

/// Deterministic sample dataset, served when the backing file is missing or
/// unreadable so the leaderboard always has something to show.
pub fn sample_records() -> Vec<Record> {
    let timestamp = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    let date = "2025-06-01";

    vec![
        Record {
            id: "1".to_string(),
            name: "Alex Chen".to_string(),
            distance: 10.5,
            pace: "5:20".to_string(),
            date: date.to_string(),
            reflections: "Felt strong today, first time past the 10k mark!".to_string(),
            photo: None,
            timestamp,
            updated_at: None,
            status: RecordStatus::Approved,
        },
        Record {
            id: "2".to_string(),
            name: "Maria Silva".to_string(),
            distance: 8.2,
            pace: "4:45".to_string(),
            date: date.to_string(),
            reflections: "Speed session, pace is coming along.".to_string(),
            photo: None,
            timestamp,
            updated_at: None,
            status: RecordStatus::Approved,
        },
        Record {
            id: "3".to_string(),
            name: "Tom Okafor".to_string(),
            distance: 21.1,
            pace: "6:10".to_string(),
            date: date.to_string(),
            reflections: "Finished the half marathon. Tired but proud.".to_string(),
            photo: None,
            timestamp,
            updated_at: None,
            status: RecordStatus::Approved,
        },
    ]
}
