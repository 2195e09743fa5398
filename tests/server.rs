//! Client and server talking over a loopback socket

mod common;

use assert_json_diff::assert_json_include;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

use batch_translator::server::api::serve;
use batch_translator::{TranslationError, TranslationRequest, TranslatorClient, TranslatorConfig};
use common::{numbered, texts, translated, FakeService};

/// Start a server backed by `engine` and return its port
async fn start(engine: FakeService) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(serve(listener, Arc::new(engine)));
    port
}

fn client_config(port: u16, batch_size: usize) -> TranslatorConfig {
    TranslatorConfig {
        host: "127.0.0.1".to_string(),
        port,
        batch_size,
        timeout_ms: 5000,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_job_round_trip() {
    let port = start(FakeService::new()).await;
    let client = TranslatorClient::connect(client_config(port, 50)).unwrap();

    let input = numbered(120);
    let report = client.translate_all(&input).await;

    let expected: Vec<String> = input.iter().map(|t| translated(t)).collect();
    assert_eq!(report.translations, expected);
    assert_eq!(report.chunk_count, 3);
    assert!(report.is_complete());

    client.close();
}

#[tokio::test]
async fn test_single_translate_round_trip() {
    let port = start(FakeService::new()).await;
    let client = TranslatorClient::connect(client_config(port, 50)).unwrap();

    assert_eq!(client.translate_text("house").await.unwrap(), translated("house"));
}

#[tokio::test]
async fn test_server_failure_falls_back_per_chunk() {
    let port = start(FakeService::new().failing_batches_with("c")).await;
    let client = TranslatorClient::connect(client_config(port, 2)).unwrap();

    let report = client.translate_all(&texts(&["a", "b", "c", "d"])).await;

    assert_eq!(
        report.translations,
        vec![translated("a"), translated("b"), "c".into(), "d".into()]
    );
    assert_eq!(report.degraded_chunks, vec![1]);
}

#[tokio::test]
async fn test_single_failure_carries_text() {
    let port = start(FakeService::new().failing_single("broken")).await;
    let client = TranslatorClient::connect(client_config(port, 50)).unwrap();

    let err = client.translate_text("broken").await.unwrap_err();
    match err {
        TranslationError::TranslateFailed { text, source } => {
            assert_eq!(text, "broken");
            assert!(matches!(*source, TranslationError::ApiError { status: 502, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_language_is_rejected() {
    let port = start(FakeService::new()).await;
    let client = TranslatorClient::connect(client_config(port, 50)).unwrap();

    let request = TranslationRequest::new("cat").with_target_lang("japanese!");
    let err = client.translate(&request).await.unwrap_err();
    match err {
        TranslationError::TranslateFailed { source, .. } => {
            assert!(matches!(*source, TranslationError::ApiError { status: 400, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_service_degrades_job() {
    // connect succeeds without a listener; failures show up per chunk
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = TranslatorClient::connect(client_config(port, 2)).unwrap();
    let input = texts(&["a", "b", "c"]);
    let report = client.translate_all(&input).await;

    assert_eq!(report.translations, input);
    assert_eq!(report.degraded_chunks, vec![0, 1]);
}

#[tokio::test]
async fn test_wire_format() {
    let port = start(FakeService::new()).await;
    let http = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    let health: serde_json::Value = http.get(&base).send().await.unwrap().json().await.unwrap();
    assert_json_include!(actual: health, expected: json!({"status": "ok"}));

    let response: serde_json::Value = http
        .post(format!("{}/v1/batch_translate", base))
        .json(&json!({"texts": ["one", "two"], "source_lang": "en", "target_lang": "ja"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_include!(
        actual: response,
        expected: json!({"translated_texts": ["t(one)", "t(two)"]})
    );

    let response = http
        .post(format!("{}/v1/translate", base))
        .json(&json!({"text": "one", "source_lang": "en", "target_lang": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_json_include!(actual: body, expected: json!({"error": {"code": "invalid_language"}}));
}

#[tokio::test]
async fn test_underscore_language_tags_are_accepted() {
    let port = start(FakeService::new()).await;
    let client = TranslatorClient::connect(client_config(port, 50)).unwrap();

    let request = TranslationRequest::new("cat")
        .with_source_lang("en_US")
        .with_target_lang("zh_Hant");
    assert_eq!(client.translate(&request).await.unwrap(), translated("cat"));
}
