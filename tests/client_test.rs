// End-to-end tests: TutorClient + ChatPanel against a real bound server

use std::path::PathBuf;
use std::sync::Arc;

use tutor::chat::{AnswerSource, ChatMessage, ChatRequest};
use tutor::client::{BubbleKind, ChatPanel, ClientError, TutorClient, NETWORK_FAILURE};
use tutor::config::{CredentialSource, OpenAiSettings};
use tutor::providers::OpenAIProvider;
use tutor::server::{build_app, AppState};

/// Start a server in fallback mode on an ephemeral port; returns its base URL.
async fn spawn_server() -> String {
    let content = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/contents.json");
    let provider = OpenAIProvider::new(&OpenAiSettings::default()).unwrap();
    let state = AppState::new(content, CredentialSource::Static(None), Arc::new(provider));
    let app = build_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_panel_round_trip_in_fallback_mode() {
    let client = TutorClient::new(spawn_server().await).unwrap();
    let mut panel = ChatPanel::new("math", "fractions");

    panel.submit(&client, "通分ってなに？").await.unwrap();

    assert!(panel.input_enabled());
    let last = panel.bubbles().last().unwrap();
    assert_eq!(last.kind, BubbleKind::Assistant);
    assert!(last.text.contains("質問: 通分ってなに？"));
    assert_eq!(panel.conversation().len(), 2);
    assert_eq!(panel.conversation()[0], ChatMessage::user("通分ってなに？"));
}

#[tokio::test]
async fn test_ask_reports_source() {
    let client = TutorClient::new(spawn_server().await).unwrap();
    let reply = client
        .ask(&ChatRequest {
            subject: "science".into(),
            unit: "light".into(),
            question: "光は曲がる？".into(),
            history: serde_json::Value::Null,
        })
        .await
        .unwrap();
    assert_eq!(reply.source, AnswerSource::Fallback);
}

#[tokio::test]
async fn test_not_found_surfaces_server_message() {
    let client = TutorClient::new(spawn_server().await).unwrap();
    let mut panel = ChatPanel::new("math", "geometry");

    panel.submit(&client, "三角形の面積は？").await.unwrap();

    assert!(panel.input_enabled());
    assert!(panel.conversation().is_empty());
    let last = panel.bubbles().last().unwrap();
    assert_eq!(last.kind, BubbleKind::System);
    assert_eq!(last.text, "指定された教材が見つかりません。");
}

#[tokio::test]
async fn test_network_failure_reenables_input() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = TutorClient::new(format!("http://127.0.0.1:{port}")).unwrap();

    let mut panel = ChatPanel::new("math", "fractions");
    let request = panel.begin_submit("q").unwrap();
    assert!(!panel.input_enabled());

    let outcome = client.ask(&request).await;
    assert!(matches!(outcome, Err(ClientError::Network(_))));
    panel.finish(outcome);

    assert!(panel.input_enabled());
    let last = panel.bubbles().last().unwrap();
    assert_eq!(last.kind, BubbleKind::System);
    assert_eq!(last.text, NETWORK_FAILURE);
}
