//! HTTP-level tests for the Ollama backend against a wiremock server.

#![cfg(feature = "ollama")]

use canonry_core::{EmbeddingBackend, Error};
use canonry_inference::OllamaBackend;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> OllamaBackend {
    OllamaBackend::with_config(server.uri(), "labse".to_string(), 4)
}

#[tokio::test]
async fn embed_texts_parses_aligned_vectors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "model": "labse" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]]
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let out = backend
        .embed_texts(&["Alpha North".to_string(), "Beta South".to_string()])
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0], vec![1.0, 0.0, 0.0, 0.0]);
    assert_eq!(out[1], vec![0.0, 1.0, 0.0, 0.0]);
}

#[tokio::test]
async fn embed_texts_rejects_count_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0, 0.0, 0.0]]
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend
        .embed_texts(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Embedding(_)));
    assert!(err.to_string().contains("1 embeddings for 2 inputs"));
}

#[tokio::test]
async fn embed_texts_surfaces_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.embed_texts(&["a".to_string()]).await.unwrap_err();

    assert!(matches!(err, Error::Embedding(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn ensure_available_accepts_served_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "labse:latest" }, { "name": "nomic-embed-text:latest" }]
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    backend.ensure_available().await.unwrap();
}

#[tokio::test]
async fn ensure_available_rejects_missing_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "nomic-embed-text:latest" }]
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.ensure_available().await.unwrap_err();

    assert!(matches!(err, Error::ModelUnavailable(_)));
    assert!(err.to_string().contains("'labse'"));
}

#[tokio::test]
async fn ensure_available_rejects_unreachable_server() {
    // Nothing listens here; connection fails immediately.
    let backend =
        OllamaBackend::with_config("http://127.0.0.1:1".to_string(), "labse".to_string(), 4);
    let err = backend.ensure_available().await.unwrap_err();
    assert!(matches!(err, Error::ModelUnavailable(_)));
}
