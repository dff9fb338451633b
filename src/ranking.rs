use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::record::Record;
use crate::scoring::score;

/// Leaderboard sort key. Defaults to the combined score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Score,
    Distance,
    Pace,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key '{0}', expected score, distance or pace")]
pub struct UnknownSortKey(String);

impl std::str::FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score" => Ok(SortKey::Score),
            "distance" => Ok(SortKey::Distance),
            "pace" => Ok(SortKey::Pace),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::Distance => "distance",
            SortKey::Pace => "pace",
        }
    }
}

/// A record annotated with its computed score. Serializes as the record's own
/// fields plus `score`, the shape the leaderboard consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub score: f64,
}

/// Order records for display under the given sort key.
///
/// Scores are attached, never written back to the store. The sort is stable,
/// so ties keep their original relative order, and the output is always a
/// permutation of the input.
pub fn rank(records: &[Record], key: SortKey) -> Vec<RankedRecord> {
    let mut ranked: Vec<RankedRecord> = records
        .iter()
        .map(|record| RankedRecord {
            score: score(record.distance, &record.pace),
            record: record.clone(),
        })
        .collect();

    match key {
        SortKey::Distance => ranked.sort_by(|a, b| {
            b.record
                .distance
                .partial_cmp(&a.record.distance)
                .unwrap_or(Ordering::Equal)
        }),
        // Faster pace (fewer seconds per km) first; a malformed pace sorts last.
        SortKey::Pace => ranked.sort_by_key(|r| r.record.pace_seconds().unwrap_or(u32::MAX)),
        SortKey::Score => {
            ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        }
    }

    ranked
}

/// Aggregate leaderboard statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    #[serde(rename = "totalDistance")]
    pub total_distance: f64,
    #[serde(rename = "athleteCount")]
    pub athlete_count: usize,
    /// Mean pace-seconds rendered back as "M:SS": minutes truncated, the
    /// remainder seconds rounded and zero-padded.
    #[serde(rename = "averagePace")]
    pub average_pace: String,
}

pub fn stats(records: &[Record]) -> Stats {
    if records.is_empty() {
        return Stats {
            total_distance: 0.0,
            athlete_count: 0,
            average_pace: "0:00".to_string(),
        };
    }

    let total_distance: f64 = records.iter().map(|r| r.distance).sum();
    let total_pace_seconds: u64 = records
        .iter()
        .map(|r| u64::from(r.pace_seconds().unwrap_or(0)))
        .sum();
    let average = total_pace_seconds as f64 / records.len() as f64;
    let minutes = (average / 60.0).floor() as u64;
    let seconds = (average % 60.0).round() as u64;

    Stats {
        total_distance,
        athlete_count: records.len(),
        average_pace: format!("{}:{:02}", minutes, seconds),
    }
}
