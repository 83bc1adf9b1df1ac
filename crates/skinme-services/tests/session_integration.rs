//! ChatSession behavior against a mock backend and an in-memory history.

use std::sync::Arc;
use std::time::Duration;

use skinme_core::Language;
use skinme_history::{HistoryEvent, HistoryList, HistoryStore, KeyValueStore, MemoryStore};
use skinme_services::{BackendClient, ChatSession, ImageUpload, Role};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    kv: Arc<MemoryStore>,
    history: Arc<HistoryStore>,
    session: ChatSession,
}

fn fixture(server: &MockServer, language: Language) -> Fixture {
    let kv = Arc::new(MemoryStore::new());
    let history = Arc::new(HistoryStore::new(kv.clone()));
    let client = BackendClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let session = ChatSession::new(client, history.clone(), language);
    Fixture {
        kv,
        history,
        session,
    }
}

fn stored(kv: &MemoryStore) -> (Option<String>, Option<String>) {
    (
        kv.get(HistoryList::AutoAnalysis.storage_key()).unwrap(),
        kv.get(HistoryList::Manual.storage_key()).unwrap(),
    )
}

#[tokio::test]
async fn test_query_failure_sets_banner_and_keeps_history() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut fx = fixture(&mock_server, Language::En);
    let before = stored(&fx.kv);

    assert!(fx.session.run_query("vitamin c serum").await);

    assert_eq!(fx.session.query_error(), Some("Query failed (503)"));
    assert!(fx.session.query_results().is_none());
    assert!(!fx.session.is_busy());
    assert_eq!(stored(&fx.kv), before);
}

#[tokio::test]
async fn test_query_success_clears_previous_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": "toner",
            "total": 1,
            "results": [{"product_name": "Hydrating Toner"}]
        })))
        .mount(&mock_server)
        .await;

    let mut fx = fixture(&mock_server, Language::En);

    fx.session.run_query("toner").await;
    assert!(fx.session.query_error().is_some());

    fx.session.run_query("toner").await;
    assert!(fx.session.query_error().is_none());
    let results = fx.session.query_results().unwrap();
    assert_eq!(results.results[0].display_name(), "Hydrating Toner");
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut fx = fixture(&mock_server, Language::Zh);

    assert!(!fx.session.run_query("   ").await);
    assert!(fx.session.send_chat("\n\t").await.is_none());
    assert!(fx.session.transcript().is_empty());
}

#[tokio::test]
async fn test_chat_history_excludes_new_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .and(body_partial_json(serde_json::json!({
            "message": "first question",
            "history": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "first answer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .and(body_partial_json(serde_json::json!({
            "message": "second question",
            "history": [
                {"role": "user", "content": "first question"},
                {"role": "assistant", "content": "first answer"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "second answer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut fx = fixture(&mock_server, Language::En);

    fx.session.send_chat("first question").await;
    let reply = fx.session.send_chat("second question").await.unwrap();
    assert_eq!(reply.content, "second answer");
    assert_eq!(fx.session.transcript().len(), 4);
}

#[tokio::test]
async fn test_chat_error_becomes_assistant_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "detail": "OpenAI API is not configured"
        })))
        .mount(&mock_server)
        .await;

    let mut fx = fixture(&mock_server, Language::Zh);
    let before = stored(&fx.kv);

    let reply = fx.session.send_chat("你好").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(
        reply.content,
        "错误: Chat failed (500): OpenAI API is not configured"
    );

    let transcript = fx.session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(stored(&fx.kv), before);
}

#[tokio::test]
async fn test_analysis_success_auto_saves_record() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-skin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "analysis": "Combination skin with an oily T-zone.",
            "skin_type": "combination",
            "concerns": ["oiliness"],
            "recommended_products": [
                {"name": "Oil Control Gel", "brand": "Neutrogena", "relevance": 0.8}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut fx = fixture(&mock_server, Language::Zh);
    let mut events = fx.history.subscribe();
    let image = ImageUpload::new("face.jpg", b"jpeg-bytes".to_vec());

    let reply = fx.session.analyze_image(&image, None).await;
    assert_eq!(reply.role, Role::Assistant);
    assert!(reply.content.starts_with("**皮肤分析结果**"));
    assert_eq!(reply.products.as_ref().map(Vec::len), Some(1));

    let transcript = fx.session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].content, "上传了皮肤照片进行分析");
    assert!(transcript[0]
        .image
        .as_deref()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));

    assert_eq!(
        events.recv().await.unwrap(),
        HistoryEvent::Updated(HistoryList::AutoAnalysis)
    );

    let saved = fx.history.load(HistoryList::AutoAnalysis);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].condition, "上传了皮肤照片进行分析");
    assert!(saved[0].has_image);
    let analysis = saved[0].analysis.as_ref().unwrap();
    assert_eq!(analysis.skin_type.as_deref(), Some("combination"));
    assert!(fx.history.load(HistoryList::Manual).is_empty());
}

#[tokio::test]
async fn test_analysis_failure_leaves_history_untouched() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze-skin"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&mock_server)
        .await;

    let mut fx = fixture(&mock_server, Language::En);
    let mut events = fx.history.subscribe();
    let before = stored(&fx.kv);
    let image = ImageUpload::new("face.png", b"png-bytes".to_vec());

    let reply = fx.session.analyze_image(&image, Some("dry patches")).await;
    assert_eq!(reply.content, "Analysis error: Image analysis failed (413)");

    // Only the error message joins the transcript.
    assert_eq!(fx.session.transcript().len(), 1);
    assert_eq!(stored(&fx.kv), before);
    assert!(events.try_recv().is_err());
}
