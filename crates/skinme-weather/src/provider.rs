//! wttr.in client.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::types::{WeatherError, WttrResponse};

pub const WTTR_BASE_URL: &str = "https://wttr.in";
const USER_AGENT: &str = "SkinMe/0.1.0";

#[derive(Debug, Clone)]
pub struct WttrClient {
    client: Arc<Client>,
    base_url: String,
}

impl WttrClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current weather at the given coordinates.
    ///
    /// # Errors
    /// Network failure, non-success status, or an unusable body.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WttrResponse, WeatherError> {
        let url = format!("{}/{},{}?format=j1", self.base_url, latitude, longitude);
        self.get(&url).await
    }

    /// Current weather at the location the server infers from the caller's IP.
    ///
    /// # Errors
    /// Network failure, non-success status, or an unusable body.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_by_ip(&self) -> Result<WttrResponse, WeatherError> {
        let url = format!("{}/?format=j1", self.base_url);
        self.get(&url).await
    }

    async fn get(&self, url: &str) -> Result<WttrResponse, WeatherError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Weather endpoint returned status {}", status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let data: WttrResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        if data.current().is_none() {
            return Err(WeatherError::Parse(
                "response has no current_condition".to_string(),
            ));
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body(temp: &str) -> serde_json::Value {
        serde_json::json!({
            "current_condition": [{
                "temp_C": temp,
                "FeelsLikeC": temp,
                "humidity": "40",
                "weatherDesc": [{"value": "Clear"}]
            }],
            "nearest_area": [{"areaName": [{"value": "Hangzhou"}]}]
        })
    }

    fn client(server: &MockServer) -> WttrClient {
        WttrClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_by_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/30.25,120.16"))
            .and(query_param("format", "j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("26")))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server).fetch_by_coordinates(30.25, 120.16).await.unwrap();
        assert_eq!(data.current().unwrap().temp_c, "26");
        assert_eq!(data.area_name(), Some("Hangzhou"));
    }

    #[tokio::test]
    async fn test_fetch_by_ip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("12")))
            .mount(&server)
            .await;

        let data = client(&server).fetch_by_ip().await.unwrap();
        assert_eq!(data.current().unwrap().temp_c, "12");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client(&server).fetch_by_ip().await;
        assert!(matches!(result, Err(WeatherError::Status(503))));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Unknown location"))
            .mount(&server)
            .await;

        let result = client(&server).fetch_by_ip().await;
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_current_condition() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let result = client(&server).fetch_by_ip().await;
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }
}
