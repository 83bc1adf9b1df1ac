//! In-memory session state for search, chat and skin analysis.
//!
//! A failed backend call never ends the session: query failures set an error
//! banner, chat and analysis failures become assistant messages.

use skinme_core::Language;
use skinme_history::{HistoryList, HistoryStore, SkinConditionRecord};
use std::sync::Arc;

use crate::client::{BackendClient, DEFAULT_TOP_K};
use crate::records::analysis_summary;
use crate::types::{ChatMessage, ImageUpload, SearchResponse, SkinAnalysis};

/// Characters of a product description shown in the analysis reply.
const PRODUCT_DESCRIPTION_CHARS: usize = 100;

pub struct ChatSession {
    client: BackendClient,
    history: Arc<HistoryStore>,
    language: Language,
    top_k: usize,
    transcript: Vec<ChatMessage>,
    busy: bool,
    query_results: Option<SearchResponse>,
    query_error: Option<String>,
}

impl ChatSession {
    pub fn new(client: BackendClient, history: Arc<HistoryStore>, language: Language) -> Self {
        Self {
            client,
            history,
            language,
            top_k: DEFAULT_TOP_K,
            transcript: Vec::new(),
            busy: false,
            query_results: None,
            query_error: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// True while a backend call is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn query_results(&self) -> Option<&SearchResponse> {
        self.query_results.as_ref()
    }

    /// Error banner from the last failed query.
    pub fn query_error(&self) -> Option<&str> {
        self.query_error.as_deref()
    }

    /// Run a product search. Returns false when `query` is blank.
    pub async fn run_query(&mut self, query: &str) -> bool {
        if query.trim().is_empty() {
            return false;
        }

        self.busy = true;
        self.query_error = None;

        match self.client.search(query, self.top_k).await {
            Ok(results) => self.query_results = Some(results),
            Err(e) => {
                tracing::warn!("Query failed: {}", e);
                self.query_error = Some(e.to_string());
            }
        }

        self.busy = false;
        true
    }

    /// Send a chat message. Returns the assistant's reply (or error message),
    /// or `None` when `input` is blank.
    pub async fn send_chat(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }

        // History sent to the backend excludes the message being asked.
        let history = self.transcript.clone();
        self.transcript.push(ChatMessage::user(input));
        self.busy = true;

        let reply = match self.client.chat(input, &history).await {
            Ok(reply) => ChatMessage::assistant(reply.response),
            Err(e) => {
                tracing::warn!("Chat failed: {}", e);
                ChatMessage::assistant(format!("{}{}", self.error_prefix(), e))
            }
        };

        self.busy = false;
        self.transcript.push(reply);
        self.transcript.last()
    }

    /// Analyze a skin photo. On success the photo and the analysis join the
    /// transcript and a record is auto-saved to the analysis history.
    pub async fn analyze_image(
        &mut self,
        image: &ImageUpload,
        additional_info: Option<&str>,
    ) -> &ChatMessage {
        self.busy = true;
        let result = self.client.analyze_skin(image, additional_info).await;
        self.busy = false;

        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Image analysis failed: {}", e);
                let message = format!("{}{}", self.analysis_error_prefix(), e);
                return self.push(ChatMessage::assistant(message));
            }
        };

        let condition = additional_info
            .filter(|i| !i.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_photo_message().to_string());
        let data_url = image.data_url();

        self.transcript
            .push(ChatMessage::user(condition.clone()).with_image(data_url.clone()));

        let reply = ChatMessage::assistant(format_analysis_reply(&analysis, self.language))
            .with_products(analysis.recommended_products.clone());

        let record = SkinConditionRecord::from_analysis(
            condition,
            Some(analysis_summary(&analysis)),
            Some(&data_url),
        );
        if let Err(e) = self.history.append(record, HistoryList::AutoAnalysis) {
            tracing::warn!("Failed to auto-save analysis record: {}", e);
        }

        self.push(reply)
    }

    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.transcript.push(message);
        &self.transcript[self.transcript.len() - 1]
    }

    fn error_prefix(&self) -> &'static str {
        match self.language {
            Language::Zh => "错误: ",
            Language::En => "Error: ",
        }
    }

    fn analysis_error_prefix(&self) -> &'static str {
        match self.language {
            Language::Zh => "分析错误: ",
            Language::En => "Analysis error: ",
        }
    }

    fn default_photo_message(&self) -> &'static str {
        match self.language {
            Language::Zh => "上传了皮肤照片进行分析",
            Language::En => "Uploaded a skin photo for analysis",
        }
    }
}

/// Markdown-ish assistant reply for a skin analysis.
pub fn format_analysis_reply(analysis: &SkinAnalysis, language: Language) -> String {
    let (heading, products_heading, relevance_label) = match language {
        Language::Zh => ("**皮肤分析结果**", "**推荐产品**:", "相关度"),
        Language::En => ("**Skin Analysis Results**", "**Recommended Products**:", "Relevance"),
    };

    let mut reply = format!("{}\n\n{}\n\n", heading, analysis.analysis);

    if !analysis.recommended_products.is_empty() {
        reply.push_str(products_heading);
        reply.push('\n');

        for (idx, product) in analysis.recommended_products.iter().enumerate() {
            reply.push_str(&format!("\n{}. **{}**", idx + 1, product.name));
            if let Some(brand) = product.brand() {
                reply.push_str(&format!(" - {}", brand));
            }
            if let Some(category) = product.category() {
                reply.push_str(&format!(" ({})", category));
            }
            let relevance = product
                .relevance
                .map(|r| r.to_string())
                .unwrap_or_else(|| "--".to_string());
            reply.push_str(&format!("\n   {}: {}", relevance_label, relevance));
            if let Some(description) = product.description() {
                let short: String = description.chars().take(PRODUCT_DESCRIPTION_CHARS).collect();
                reply.push_str(&format!("\n   {}...", short));
            }
            reply.push('\n');
        }
    }

    reply
}
