//! Skin-condition record shapes.
//!
//! Field names serialize in camelCase so persisted lists keep the same layout
//! as records written by the web client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Characters of the image data URL kept as its preview identifier.
pub const IMAGE_PREVIEW_CHARS: usize = 100;

/// Characters of the backend analysis text kept as the record summary.
pub const ANALYSIS_SUMMARY_CHARS: usize = 200;

/// A single logged skin condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinConditionRecord {
    /// Creation time in milliseconds since the epoch; unique within a list.
    pub id: i64,
    /// RFC 3339 creation timestamp.
    pub date: String,
    pub condition: String,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,
}

/// Condensed result of a backend skin analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalysisSummary {
    /// Build a summary, truncating the analysis text.
    pub fn new(skin_type: Option<String>, concerns: Vec<String>, analysis: &str) -> Self {
        Self {
            skin_type,
            concerns: Some(concerns),
            summary: (!analysis.is_empty()).then(|| truncate_chars(analysis, ANALYSIS_SUMMARY_CHARS)),
        }
    }
}

/// Weather at the time a record was saved, as reported by the weather service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp: String,
    pub humidity: String,
    pub desc: String,
}

impl SkinConditionRecord {
    /// A manually entered record, optionally tagged with current weather.
    pub fn manual(condition: impl Into<String>, weather: Option<WeatherSnapshot>) -> Self {
        Self {
            weather,
            ..Self::created_at(condition.into(), Utc::now())
        }
    }

    /// A record saved automatically after an image analysis.
    ///
    /// Only a truncated preview of `image_data` is kept.
    pub fn from_analysis(
        condition: impl Into<String>,
        analysis: Option<AnalysisSummary>,
        image_data: Option<&str>,
    ) -> Self {
        Self {
            has_image: image_data.is_some(),
            image_preview: image_data.map(|data| format!("{}...", truncate_chars(data, IMAGE_PREVIEW_CHARS))),
            analysis,
            ..Self::created_at(condition.into(), Utc::now())
        }
    }

    pub(crate) fn created_at(condition: String, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis(),
            date: now.to_rfc3339(),
            condition,
            has_image: false,
            image_preview: None,
            analysis: None,
            weather: None,
        }
    }

    /// Whether the record carries a usable condition text.
    pub fn is_valid(&self) -> bool {
        !self.condition.trim().is_empty()
    }

    /// Creation time, if `date` parses.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
