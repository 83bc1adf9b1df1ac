//! Weather service for SkinMe
//!
//! Resolves the device location (falling back to IP-based lookup), fetches
//! current conditions from a wttr.in compatible endpoint and turns them into
//! skincare advice.

pub mod advice;
pub mod fetcher;
pub mod location;
pub mod provider;
pub mod types;

pub use advice::{derive_advice, AdviceRule};
pub use fetcher::{FetchState, WeatherFetcher, WeatherReport};
pub use location::{ConfiguredLocation, IpOnly, LocationSource};
pub use provider::WttrClient;
pub use types::*;
