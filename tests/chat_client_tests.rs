//! End-to-end tests: the chat session talking to a real relay over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use supportchat::connector::http::{create_app, HttpState};
use supportchat::{
    ChatSession, HttpRelayTransport, RelayChatUseCase, Role, ScriptedCompletionProvider,
    SubmitOutcome, SystemClock, SystemInstruction, FALLBACK_REPLY, GREETING,
};

async fn spawn_relay(provider: Arc<ScriptedCompletionProvider>) -> SocketAddr {
    let relay = Arc::new(RelayChatUseCase::new(
        provider,
        SystemInstruction::new("Support prompt.").expect("instruction"),
    ));
    let app = create_app(HttpState::new(relay));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn session_for(url: String) -> ChatSession {
    ChatSession::new(Arc::new(HttpRelayTransport::new(url)), Arc::new(SystemClock))
}

#[tokio::test]
async fn session_receives_streamed_reply_through_relay() {
    let provider = Arc::new(ScriptedCompletionProvider::new(vec![
        Some("Use".to_string()),
        None,
        Some(" the".to_string()),
        Some(" Forgot Password link.".to_string()),
    ]));
    let addr = spawn_relay(provider.clone()).await;
    let session = session_for(format!("http://{addr}/api/chat"));

    let outcome = session.submit("How do I reset my password?").await;

    assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
    let messages = session.messages().await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].content(), "Use the Forgot Password link.");

    // The greeting travels with the history; the placeholder does not.
    let sent = &provider.requests()[0];
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].role, Role::System);
    assert_eq!(sent[1].content, GREETING);
    assert_eq!(sent[2].content, "How do I reset my password?");
}

#[tokio::test]
async fn provider_failure_mid_stream_shows_partial_and_fallback() {
    let provider = Arc::new(
        ScriptedCompletionProvider::new(vec![
            Some("Partial".to_string()),
            Some(" more".to_string()),
        ])
        .failing_after(1),
    );
    let addr = spawn_relay(provider).await;
    let session = session_for(format!("http://{addr}/api/chat"));

    let outcome = session.submit("hello").await;

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    let messages = session.messages().await;
    assert_eq!(messages.len(), 4);
    // Whether "Partial" arrives before the connection is torn down depends on flushing.
    assert!(["", "Partial"].contains(&messages[2].content()));
    assert_eq!(messages[3].content(), FALLBACK_REPLY);
}

#[tokio::test]
async fn relay_error_status_appends_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let session = session_for(format!("{}/api/chat", server.uri()));

    let outcome = session.submit("hello").await;

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    let messages = session.messages().await;
    assert_eq!(messages[2].content(), "");
    assert_eq!(messages[3].content(), FALLBACK_REPLY);
}

#[tokio::test]
async fn unreachable_relay_appends_fallback() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let session = session_for(format!("http://{addr}/api/chat"));

    let outcome = session.submit("hello").await;

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    assert_eq!(session.messages().await.last().unwrap().content(), FALLBACK_REPLY);
}
