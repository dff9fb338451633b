use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Moderation state of a submitted record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::str::FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecordStatus::Pending),
            "approved" => Ok(RecordStatus::Approved),
            "rejected" => Ok(RecordStatus::Rejected),
            other => Err(format!(
                "unknown status '{}', expected pending, approved or rejected",
                other
            )),
        }
    }
}

/// Photo attachment for a record.
///
/// Older data files stored a plain URL string; newer ones store the
/// three-rendition Cloudinary structure. Both shapes round-trip through the
/// untagged representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Photo {
    Asset {
        original: String,
        optimized: String,
        thumbnail: String,
    },
    Url(String),
}

impl Photo {
    /// Single URL to show in a listing, preferring the web-optimized rendition.
    pub fn display_url(&self) -> &str {
        match self {
            Photo::Url(url) => url,
            Photo::Asset { optimized, .. } => optimized,
        }
    }

    pub fn thumbnail_url(&self) -> &str {
        match self {
            Photo::Url(url) => url,
            Photo::Asset { thumbnail, .. } => thumbnail,
        }
    }
}

/// One athlete's logged running session plus server-assigned metadata.
///
/// `id` and `timestamp` are assigned at creation and never change; `updated_at`
/// is absent until the first successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    /// Kilometers, always > 0 for a persisted record.
    pub distance: f64,
    /// Seconds per kilometer as "M:SS", e.g. "5:30".
    pub pace: String,
    /// ISO 8601 calendar date, no time component.
    pub date: String,
    #[serde(default)]
    pub reflections: String,
    #[serde(default)]
    pub photo: Option<Photo>,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: RecordStatus,
}

impl Record {
    /// Parsed pace in seconds per kilometer, if the stored pace is well-formed.
    pub fn pace_seconds(&self) -> Option<u32> {
        crate::scoring::pace_seconds(&self.pace)
    }

    /// Merge a partial update into this record.
    ///
    /// Only fields present in the patch are touched; `id` and `timestamp` are
    /// not representable in a patch and therefore never change. The caller is
    /// responsible for re-validating the merged result.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(distance) = patch.distance {
            self.distance = distance;
        }
        if let Some(pace) = &patch.pace {
            self.pace = pace.trim().to_string();
        }
        if let Some(date) = &patch.date {
            let date = date.trim();
            if !date.is_empty() {
                self.date = date.to_string();
            }
        }
        if let Some(reflections) = &patch.reflections {
            self.reflections = reflections.trim().to_string();
        }
        if let Some(photo) = &patch.photo {
            self.photo = photo.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Caller-supplied candidate for a new record.
///
/// Server-assigned fields (`id`, `timestamp`) are deliberately absent; a
/// submitted `status` is honored but defaults to pending. `distance` accepts
/// either a JSON number or a numeric string, since submitting forms send both;
/// anything unparseable becomes NaN and is rejected by the validator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub name: String,
    #[serde(default = "f64_nan", deserialize_with = "lenient_f64")]
    pub distance: f64,
    pub pace: String,
    pub date: Option<String>,
    pub reflections: Option<String>,
    pub photo: Option<Photo>,
    pub status: Option<RecordStatus>,
}

/// Partial update for an existing record. Every field is optional; the
/// double-`Option` on `photo` distinguishes "leave as is" (absent) from
/// "clear the photo" (explicit null).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub distance: Option<f64>,
    pub pace: Option<String>,
    pub date: Option<String>,
    pub reflections: Option<String>,
    #[serde(deserialize_with = "some_photo")]
    pub photo: Option<Option<Photo>>,
    pub status: Option<RecordStatus>,
}

fn f64_nan() -> f64 {
    f64::NAN
}

/// Accept a number, a numeric string, or null; anything else parses to NaN so
/// the validator can reject it with a field-level error instead of a serde one.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n,
        Raw::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        Raw::Null => f64::NAN,
    })
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_f64(deserializer).map(Some)
}

fn some_photo<'de, D>(deserializer: D) -> Result<Option<Option<Photo>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Photo>::deserialize(deserializer).map(Some)
}
