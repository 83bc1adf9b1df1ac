//! SkinMe backend services: product search, chat, skin analysis, and the
//! session state that ties them to the local history.

pub mod client;
pub mod error;
pub mod links;
pub mod records;
pub mod session;
pub mod types;

pub use client::{BackendClient, DEFAULT_BACKEND_URL, DEFAULT_TOP_K};
pub use error::ServiceError;
pub use links::{amazon_search_url, ewg_lookup_url};
pub use records::{record_condition, weather_snapshot};
pub use session::{format_analysis_reply, ChatSession};
pub use types::{
    ChatMessage, ChatReply, ImageUpload, RecommendedProduct, Role, SearchResponse, SearchResult,
    SkinAnalysis,
};
