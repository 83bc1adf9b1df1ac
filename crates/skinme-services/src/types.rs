//! Backend request/response shapes and chat transcript types.

use serde::{Deserialize, Serialize};

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the in-memory chat transcript. Sent back to the backend as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Data URL of an attached image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<RecommendedProduct>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image: None,
            products: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: None,
            products: None,
        }
    }

    pub fn with_image(mut self, data_url: impl Into<String>) -> Self {
        self.image = Some(data_url.into());
        self
    }

    pub fn with_products(mut self, products: Vec<RecommendedProduct>) -> Self {
        self.products = Some(products);
        self
    }
}

/// A product recommended by the skin analysis.
///
/// The backend sends empty strings for unknown fields; use the accessors to
/// treat those as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ewg_url: Option<String>,
}

impl RecommendedProduct {
    pub fn brand(&self) -> Option<&str> {
        non_empty(&self.brand)
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn amazon_url(&self) -> Option<&str> {
        non_empty(&self.amazon_url)
    }

    pub fn ewg_url(&self) -> Option<&str> {
        non_empty(&self.ewg_url)
    }
}

/// `GET /api/search` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One semantic search hit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub product_name: Option<String>,
    /// Free-form product metadata (brand, category, amazon_url, ewg_url, ...).
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SearchResult {
    /// String metadata field, if present and non-empty.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Display name for the hit.
    pub fn display_name(&self) -> &str {
        non_empty(&self.product_name)
            .or_else(|| self.metadata_str("product_name"))
            .unwrap_or("Unknown Product")
    }

    /// Body text: the matched document, else `text`.
    pub fn body(&self) -> Option<&str> {
        non_empty(&self.document).or_else(|| non_empty(&self.text))
    }
}

/// `POST /api/chat/` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub history: &'a [ChatMessage],
}

/// `POST /api/chat/` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub suggested_products: Option<Vec<String>>,
    #[serde(default)]
    pub follow_up_questions: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `POST /api/analyze-skin` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkinAnalysis {
    pub analysis: String,
    #[serde(default)]
    pub skin_type: Option<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub recommended_products: Vec<RecommendedProduct>,
}

/// An image picked for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload, guessing the content type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Read an image from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        use base64::Engine;
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_serialization() {
        let msg = ChatMessage::user("油皮用什么洁面?");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"油皮用什么洁面?"}"#);
    }

    #[test]
    fn test_analysis_defaults() {
        let analysis: SkinAnalysis =
            serde_json::from_str(r#"{"analysis": "Combination skin"}"#).unwrap();
        assert!(analysis.concerns.is_empty());
        assert!(analysis.recommended_products.is_empty());
        assert!(analysis.skin_type.is_none());
    }

    #[test]
    fn test_empty_product_fields_are_absent() {
        let product: RecommendedProduct = serde_json::from_str(
            r#"{"name": "Hydrating Cleanser", "brand": "", "amazon_url": "", "relevance": 0.812}"#,
        )
        .unwrap();
        assert_eq!(product.brand(), None);
        assert_eq!(product.amazon_url(), None);
        assert_eq!(product.relevance, Some(0.812));
    }

    #[test]
    fn test_search_result_accessors() {
        let result: SearchResult = serde_json::from_str(
            r#"{
                "document": "Gentle foaming cleanser",
                "metadata": {"brand": "CeraVe", "ewg_url": "", "book": "Foaming Cleanser"},
                "distance": 0.21
            }"#,
        )
        .unwrap();
        assert_eq!(result.metadata_str("brand"), Some("CeraVe"));
        assert_eq!(result.metadata_str("ewg_url"), None);
        assert_eq!(result.display_name(), "Unknown Product");
        assert_eq!(result.body(), Some("Gentle foaming cleanser"));
    }

    #[test]
    fn test_image_upload_data_url() {
        let upload = ImageUpload::new("face.png", vec![1, 2, 3]);
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let upload = ImageUpload::new("face", vec![]);
        assert_eq!(upload.mime_type, "application/octet-stream");
    }
}
