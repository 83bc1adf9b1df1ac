//! Building history records from weather reports and analysis results.

use skinme_history::{
    AnalysisSummary, HistoryError, HistoryList, HistoryStore, SkinConditionRecord, WeatherSnapshot,
};
use skinme_weather::WeatherReport;

use crate::types::SkinAnalysis;

/// Weather fields captured alongside a manual record.
pub fn weather_snapshot(report: &WeatherReport) -> Option<WeatherSnapshot> {
    let current = report.data.current()?;
    Some(WeatherSnapshot {
        temp: current.temp_c.clone(),
        humidity: current.humidity.clone(),
        desc: current.description().to_string(),
    })
}

/// Condensed analysis kept with an auto-saved record.
pub fn analysis_summary(analysis: &SkinAnalysis) -> AnalysisSummary {
    AnalysisSummary::new(
        analysis.skin_type.clone(),
        analysis.concerns.clone(),
        &analysis.analysis,
    )
}

/// Save a manually entered condition to the manual list, tagged with the
/// current weather when available.
///
/// Returns `Ok(false)` for an empty condition.
///
/// # Errors
/// Returns an error if the list cannot be written.
pub fn record_condition(
    history: &HistoryStore,
    condition: &str,
    weather: Option<&WeatherReport>,
) -> Result<bool, HistoryError> {
    let record = SkinConditionRecord::manual(condition, weather.and_then(weather_snapshot));
    history.append(record, HistoryList::Manual)
}
