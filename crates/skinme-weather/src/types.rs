use serde::{Deserialize, Serialize};
use skinme_core::{AppError, Language};

/// Value shown in every numeric field when no weather could be fetched.
pub const PLACEHOLDER: &str = "--";

/// `{"value": ...}` wrapper used throughout the wttr.in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

impl TextValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Current conditions block (`current_condition[0]`).
///
/// wttr.in reports every number as a string; they stay strings here and are
/// parsed where a number is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentCondition {
    #[serde(rename = "temp_C", default)]
    pub temp_c: String,
    #[serde(rename = "FeelsLikeC", default)]
    pub feels_like_c: String,
    #[serde(default)]
    pub humidity: String,
    #[serde(rename = "weatherDesc", default)]
    pub weather_desc: Vec<TextValue>,
}

impl CurrentCondition {
    /// First weather description, or an empty string.
    pub fn description(&self) -> &str {
        self.weather_desc
            .first()
            .map(|d| d.value.as_str())
            .unwrap_or("")
    }
}

/// Nearest named area reported for the query location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NearestArea {
    #[serde(rename = "areaName", default)]
    pub area_name: Vec<TextValue>,
    #[serde(default)]
    pub region: Vec<TextValue>,
}

/// The subset of the `?format=j1` response the client uses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WttrResponse {
    #[serde(default)]
    pub current_condition: Vec<CurrentCondition>,
    #[serde(default)]
    pub nearest_area: Vec<NearestArea>,
}

impl WttrResponse {
    pub fn current(&self) -> Option<&CurrentCondition> {
        self.current_condition.first()
    }

    /// Area name, then region, of the nearest area. `None` when neither is present.
    pub fn area_name(&self) -> Option<&str> {
        let area = self.nearest_area.first()?;
        fn non_empty(values: &[TextValue]) -> Option<&str> {
            values
                .first()
                .map(|v| v.value.as_str())
                .filter(|v| !v.is_empty())
        }
        non_empty(&area.area_name).or_else(|| non_empty(&area.region))
    }

    /// Degraded result used when no endpoint answered.
    pub fn placeholder(language: Language) -> Self {
        let (desc, area) = match language {
            Language::Zh => ("无法获取天气", "未知"),
            Language::En => ("Weather unavailable", "Unknown"),
        };
        Self {
            current_condition: vec![CurrentCondition {
                temp_c: PLACEHOLDER.to_string(),
                feels_like_c: PLACEHOLDER.to_string(),
                humidity: PLACEHOLDER.to_string(),
                weather_desc: vec![TextValue::new(desc)],
            }],
            nearest_area: vec![NearestArea {
                area_name: vec![TextValue::new(area)],
                region: Vec::new(),
            }],
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service not supported")]
    Unsupported,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// Warning shown while the IP fallback is used instead.
    pub fn warning(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Unsupported, Language::Zh) => "设备不支持地理定位",
            (Self::Unsupported, Language::En) => "Geolocation not supported on this device",
            (_, Language::Zh) => "无法获取位置，使用默认位置",
            (_, Language::En) => "Unable to get location, using default",
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather endpoint returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<WeatherError> for AppError {
    fn from(err: WeatherError) -> Self {
        use skinme_core::error::ReqwestErrorExt;
        use skinme_core::WeatherError as AppWeatherError;

        match err {
            WeatherError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherError::Status(status) => {
                AppError::Weather(AppWeatherError::ApiError(format!("status {}", status)))
            }
            WeatherError::Parse(msg) => AppError::Weather(AppWeatherError::ApiError(msg)),
        }
    }
}
