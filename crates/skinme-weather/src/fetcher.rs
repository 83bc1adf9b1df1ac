//! Weather acquisition as an explicit fallback state machine.
//!
//! ```text
//! Idle -> ResolvingLocation -> FetchingByCoordinates -> Ready
//!                  |                     |
//!                  | (no location)       | (fetch failed)
//!                  v                     v
//!              FetchingByIp  <-----------+
//!                  |
//!                  +-> Ready | FailedFallback (placeholder data)
//! ```

use chrono::{DateTime, Utc};
use skinme_core::Language;

use crate::advice::derive_advice;
use crate::location::LocationSource;
use crate::provider::WttrClient;
use crate::types::{Location, WttrResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    ResolvingLocation,
    FetchingByCoordinates,
    FetchingByIp,
    Ready,
    /// Both endpoints failed; the report holds placeholder data.
    FailedFallback,
}

/// Outcome of one run of the fetcher. Never an error: the worst case is
/// placeholder data.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub data: WttrResponse,
    /// Coordinates, when the location resolved.
    pub location: Option<Location>,
    /// Localized reason the device location was not used.
    pub location_warning: Option<String>,
    /// `Ready` or `FailedFallback`.
    pub state: FetchState,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReport {
    pub fn is_placeholder(&self) -> bool {
        self.state == FetchState::FailedFallback
    }

    /// Skincare advice for the current conditions.
    pub fn advice(&self, language: Language) -> Option<String> {
        self.data.current().map(|c| derive_advice(c, language))
    }

    /// Area label, falling back to a generic "current location".
    pub fn area_label(&self, language: Language) -> String {
        match self.data.area_name() {
            Some(name) => name.to_string(),
            None => match language {
                Language::Zh => "当前位置".to_string(),
                Language::En => "Current location".to_string(),
            },
        }
    }
}

pub struct WeatherFetcher {
    client: WttrClient,
    location: Box<dyn LocationSource>,
    language: Language,
    state: FetchState,
    transitions: Vec<FetchState>,
}

impl WeatherFetcher {
    pub fn new(client: WttrClient, location: Box<dyn LocationSource>, language: Language) -> Self {
        Self {
            client,
            location,
            language,
            state: FetchState::Idle,
            transitions: vec![FetchState::Idle],
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// States visited by the most recent `refresh`, starting with `Idle`.
    pub fn transitions(&self) -> &[FetchState] {
        &self.transitions
    }

    /// Run the whole machine from `Idle`.
    pub async fn refresh(&mut self) -> WeatherReport {
        self.transitions.clear();
        self.transition(FetchState::Idle);
        self.transition(FetchState::ResolvingLocation);

        let location = match self.location.resolve().await {
            Ok(loc) => loc,
            Err(e) => {
                tracing::warn!("Location unavailable ({}), using IP weather", e);
                let warning = e.warning(self.language).to_string();
                return self.fetch_by_ip(None, Some(warning)).await;
            }
        };

        tracing::info!("Got location: {}, {}", location.latitude, location.longitude);
        self.transition(FetchState::FetchingByCoordinates);

        match self
            .client
            .fetch_by_coordinates(location.latitude, location.longitude)
            .await
        {
            Ok(data) => self.finish(data, Some(location), None, FetchState::Ready),
            Err(e) => {
                tracing::warn!("Weather by coordinates failed: {}", e);
                self.fetch_by_ip(Some(location), None).await
            }
        }
    }

    async fn fetch_by_ip(
        &mut self,
        location: Option<Location>,
        warning: Option<String>,
    ) -> WeatherReport {
        self.transition(FetchState::FetchingByIp);

        match self.client.fetch_by_ip().await {
            Ok(data) => self.finish(data, location, warning, FetchState::Ready),
            Err(e) => {
                tracing::warn!("Weather by IP failed, using placeholder: {}", e);
                let data = WttrResponse::placeholder(self.language);
                self.finish(data, location, warning, FetchState::FailedFallback)
            }
        }
    }

    fn finish(
        &mut self,
        data: WttrResponse,
        location: Option<Location>,
        location_warning: Option<String>,
        state: FetchState,
    ) -> WeatherReport {
        self.transition(state);
        if state == FetchState::Ready {
            tracing::info!("Weather ready for {}", data.area_name().unwrap_or("unknown area"));
        }
        WeatherReport {
            data,
            location,
            location_warning,
            state,
            fetched_at: Utc::now(),
        }
    }

    fn transition(&mut self, next: FetchState) {
        tracing::debug!("Weather fetch: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }
}
