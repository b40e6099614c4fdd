use huddle_server::ServerConfig;
use serde_json::json;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{TestServer, WsClient};

fn auth_config() -> ServerConfig {
    ServerConfig {
        auth_tokens: vec!["letmein".to_owned()],
        ..ServerConfig::default()
    }
}

#[tokio::test]
async fn test_auth_gate() {
    init_tracing();

    let server = TestServer::spawn(auth_config())
        .await
        .expect("Failed to start server");

    // Bad query token: closed with a policy violation
    let mut rejected = WsClient::connect(server.addr, "/ws?token=wrong")
        .await
        .expect("Handshake should still succeed");
    let code = rejected.recv_close().await.unwrap();
    assert_eq!(code, Some(1008));

    // Good query token: authenticated straight away
    let mut by_query = WsClient::connect(server.addr, "/ws?token=letmein")
        .await
        .unwrap();
    let authenticated = by_query.expect("authenticated").await.unwrap();
    assert!(authenticated["clientId"].is_string());

    // No token: everything but auth is ignored until it authenticates
    let mut by_message = server.connect().await.unwrap();
    by_message
        .send_json(json!({ "type": "join", "roomId": "gated" }))
        .await
        .unwrap();
    by_message
        .expect_silence(Duration::from_millis(200))
        .await
        .unwrap();
    assert_eq!(server.relay.registry().room_count(), 0);

    by_message
        .send_json(json!({ "type": "auth", "token": "letmein" }))
        .await
        .unwrap();
    let authenticated = by_message.expect("authenticated").await.unwrap();

    by_message
        .send_json(json!({ "type": "join", "roomId": "gated" }))
        .await
        .unwrap();
    let joined = by_message.expect("joined").await.unwrap();
    assert_eq!(joined["clientId"], authenticated["clientId"]);
    assert_eq!(joined["participants"], json!([]));

    // Wrong token over the message path also closes with 1008
    let mut wrong = server.connect().await.unwrap();
    wrong
        .send_json(json!({ "type": "auth", "token": "nope" }))
        .await
        .unwrap();
    assert_eq!(wrong.recv_close().await.unwrap(), Some(1008));
}
