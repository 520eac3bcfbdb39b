//! End-to-end tests against an in-process WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use logos_client::{ClientConfig, DashboardClient, Transport, WsTransport};
use logos_types::Frame;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Bind a listener on an ephemeral port and return it with its ws:// URL.
async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("ws://{}/ws/client", addr))
}

#[tokio::test]
async fn transport_exchanges_text_and_binary() {
    let (listener, url) = listener().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let first = ws.next().await.unwrap().unwrap();
        assert_eq!(first, Message::Text("\"RegisterDashboard\"".into()));

        ws.send(Message::Text(
            r#"{"StartTransfer":{"path":"a.txt","size":3,"target_version":1}}"#.into(),
        ))
        .await
        .unwrap();
        ws.send(Message::Binary(vec![1u8, 2, 3].into())).await.unwrap();
        ws.close(None).await.unwrap();
    });

    let transport = WsTransport::new();
    transport.connect(&url).await.unwrap();
    assert!(transport.is_connected());

    transport
        .send(Frame::Text("\"RegisterDashboard\"".into()))
        .await
        .unwrap();

    let header = transport.recv().await.unwrap();
    assert!(matches!(header, Frame::Text(ref t) if t.contains("StartTransfer")));
    assert_eq!(transport.recv().await.unwrap(), Frame::Binary(vec![1, 2, 3]));

    // Server closed after the payload
    assert!(transport.recv().await.is_err());
    assert!(!transport.is_connected());

    server.await.unwrap();
}

#[tokio::test]
async fn client_handshakes_and_downloads_over_websocket() {
    let (listener, url) = listener().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let mut received = Vec::new();
        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let text = text.to_string();
            received.push(text.clone());

            if text == "\"RequestStorageList\"" {
                ws.send(Message::Text(
                    r#"{"StorageList":{"storages":[{"id":"s1","name":"Docs"}]}}"#.into(),
                ))
                .await
                .unwrap();
            } else if text.contains("RequestFile") {
                ws.send(Message::Text(
                    r#"{"StartTransfer":{"path":"notes.txt","size":5,"target_version":4}}"#.into(),
                ))
                .await
                .unwrap();
                ws.send(Message::Binary(b"hello".to_vec().into()))
                    .await
                    .unwrap();
            }
        }
        received
    });

    let (downloads_tx, mut downloads) = mpsc::unbounded_channel();
    let (client, handle) =
        DashboardClient::new(ClientConfig::new(&url), WsTransport::new(), downloads_tx);
    let run = tokio::spawn(client.run());

    let mut storages = handle.state().storages.clone();
    tokio::time::timeout(Duration::from_secs(5), storages.wait_for(|s| !s.is_empty()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(handle.state().storages()[0].name, "Docs");

    handle.download_file("notes.txt").unwrap();
    let download = tokio::time::timeout(Duration::from_secs(5), downloads.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(download.path, "notes.txt");
    assert_eq!(download.bytes, b"hello");

    handle.shutdown().unwrap();
    run.await.unwrap().unwrap();

    let received = server.await.unwrap();
    assert_eq!(
        &received[..2],
        &[
            "\"RegisterDashboard\"".to_string(),
            "\"RequestStorageList\"".to_string()
        ]
    );
    assert!(received.contains(&r#"{"RequestFile":{"path":"notes.txt"}}"#.to_string()));
}
