//! Integration tests for BackendClient using wiremock.
//!
//! These tests verify request shapes and error mapping against a mock backend.

use std::time::Duration;

use skinme_services::{BackendClient, ChatMessage, ImageUpload, ServiceError};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "oily skin cleanser"))
        .and(query_param("top_k", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": "oily skin cleanser",
            "total": 2,
            "results": [
                {
                    "product_name": "Foaming Facial Cleanser",
                    "document": "Removes excess oil",
                    "metadata": {"brand": "CeraVe"},
                    "distance": 0.18,
                    "image_url": "https://ui-avatars.com/api/?name=FF"
                },
                {"product_name": "Salicylic Acid Cleanser", "distance": 0.25}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let results = client(&mock_server).search("oily skin cleanser", 5).await.unwrap();

    assert_eq!(results.total, Some(2));
    assert_eq!(results.results.len(), 2);
    assert_eq!(results.results[0].display_name(), "Foaming Facial Cleanser");
    assert_eq!(results.results[0].metadata_str("brand"), Some("CeraVe"));
    assert_eq!(results.results[1].distance, Some(0.25));
}

#[tokio::test]
async fn test_search_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "detail": "Search error: connection refused"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).search("serum", 5).await;

    match result {
        Err(ServiceError::BadResponse {
            operation,
            status,
            detail,
        }) => {
            assert_eq!(operation, "Query");
            assert_eq!(status, 500);
            assert_eq!(detail.as_deref(), Some("Search error: connection refused"));
        }
        other => panic!("expected BadResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).search("serum", 5).await;
    assert!(matches!(result, Err(ServiceError::Parse(_))));
}

#[tokio::test]
async fn test_chat_sends_message_and_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .and(body_partial_json(serde_json::json!({
            "message": "What about sunscreen?",
            "history": [
                {"role": "user", "content": "I have dry skin"},
                {"role": "assistant", "content": "Use a cream cleanser."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message_id": "c0ffee",
            "response": "Pick SPF 30 or higher.",
            "suggested_products": [],
            "follow_up_questions": ["Do you wear makeup?"],
            "timestamp": "2026-01-30T12:00:00"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let history = vec![
        ChatMessage::user("I have dry skin"),
        ChatMessage::assistant("Use a cream cleanser."),
    ];
    let reply = client(&mock_server)
        .chat("What about sunscreen?", &history)
        .await
        .unwrap();

    assert_eq!(reply.response, "Pick SPF 30 or higher.");
    assert_eq!(reply.follow_up_questions.unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).chat("hi", &[]).await;
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Chat failed (422)");
}

#[tokio::test]
async fn test_analyze_skin_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-skin"))
        .and(body_string_contains("name=\"image\"; filename=\"cheek.jpg\""))
        .and(body_string_contains("name=\"additional_info\""))
        .and(body_string_contains("itchy after shaving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "analysis": "Sensitive skin with mild irritation.",
            "skin_type": "sensitive",
            "concerns": ["irritation", "redness"],
            "recommendations": ["Use fragrance-free products"],
            "recommended_products": [
                {"name": "Cicaplast Baume B5", "brand": "La Roche-Posay", "relevance": 0.91}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let image = ImageUpload::new("cheek.jpg", b"not-really-a-jpeg".to_vec());
    let analysis = client(&mock_server)
        .analyze_skin(&image, Some("itchy after shaving"))
        .await
        .unwrap();

    assert_eq!(analysis.skin_type.as_deref(), Some("sensitive"));
    assert_eq!(analysis.concerns, vec!["irritation", "redness"]);
    assert_eq!(analysis.recommended_products[0].name, "Cicaplast Baume B5");
}

#[tokio::test]
async fn test_analyze_skin_omits_blank_info() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-skin"))
        .and(body_string_contains("name=\"additional_info\""))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-skin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "analysis": "Looks healthy."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let image = ImageUpload::new("face.png", vec![1, 2, 3]);
    let analysis = client(&mock_server).analyze_skin(&image, Some("  ")).await.unwrap();
    assert_eq!(analysis.analysis, "Looks healthy.");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1.
    let client = BackendClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let result = client.search("serum", 5).await;
    assert!(matches!(result, Err(ServiceError::Network(_))));
}
