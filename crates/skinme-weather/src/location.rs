//! Device location sources.
//!
//! There is no portable geolocation API for a command-line client, so the
//! location comes from configuration. `IpOnly` reports the capability as
//! unsupported, which sends the fetcher straight to the IP-based lookup.

use async_trait::async_trait;

use crate::types::{Location, LocationError};

/// Resolves the device's coordinates.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn resolve(&self) -> Result<Location, LocationError>;
}

/// Coordinates supplied by the user.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredLocation {
    location: Location,
}

impl ConfiguredLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            location: Location {
                latitude,
                longitude,
            },
        }
    }
}

#[async_trait]
impl LocationSource for ConfiguredLocation {
    async fn resolve(&self) -> Result<Location, LocationError> {
        let Location {
            latitude,
            longitude,
        } = self.location;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::Unavailable(format!(
                "coordinates out of range: {}, {}",
                latitude, longitude
            )));
        }
        Ok(self.location)
    }
}

/// No location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpOnly;

#[async_trait]
impl LocationSource for IpOnly {
    async fn resolve(&self) -> Result<Location, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Pick a source from optional configured coordinates.
pub fn from_coordinates(coordinates: Option<(f64, f64)>) -> Box<dyn LocationSource> {
    match coordinates {
        Some((lat, lon)) => Box::new(ConfiguredLocation::new(lat, lon)),
        None => Box::new(IpOnly),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_location_resolves() {
        let loc = ConfiguredLocation::new(31.23, 121.47).resolve().await.unwrap();
        assert_eq!(loc.latitude, 31.23);
        assert_eq!(loc.longitude, 121.47);
    }

    #[tokio::test]
    async fn test_out_of_range_is_unavailable() {
        let result = ConfiguredLocation::new(123.0, 0.0).resolve().await;
        assert!(matches!(result, Err(LocationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_ip_only_is_unsupported() {
        assert_eq!(IpOnly.resolve().await, Err(LocationError::Unsupported));
    }

    #[tokio::test]
    async fn test_from_coordinates() {
        assert!(from_coordinates(None).resolve().await.is_err());
        assert!(from_coordinates(Some((1.0, 2.0))).resolve().await.is_ok());
    }
}
