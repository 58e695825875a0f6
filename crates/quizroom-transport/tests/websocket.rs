//! Integration tests for the WebSocket transport.
//!
//! Each test binds on an OS-assigned port and drives a real
//! tokio-tungstenite client against it.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use quizroom_transport::{
        Connection, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds a transport, connects one client, and returns both ends.
    async fn connected_pair() -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("should have local addr");

        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_text_frames_flow_both_ways() {
        let (conn, mut client) = connected_pair().await;
        assert!(conn.id().into_inner() > 0);

        conn.send(br#"{"event":"quiz-finished","args":[[]]}"#)
            .await
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON payloads should go out as text");
        assert_eq!(
            msg.into_text().unwrap().as_str(),
            r#"{"event":"quiz-finished","args":[[]]}"#
        );

        client
            .send(Message::text(
                r#"{"event":"join-room","args":["R1","alice"]}"#.to_string(),
            ))
            .await
            .unwrap();
        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"event":"join-room","args":["R1","alice"]}"#);

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_non_utf8_payload_goes_out_as_binary() {
        let (conn, mut client) = connected_pair().await;

        conn.send(&[0xff, 0x00, 0x10]).await.unwrap();

        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0x00, 0x10]);
    }

    #[tokio::test]
    async fn test_send_while_recv_is_pending() {
        // The handler parks in recv() while the writer task pushes
        // broadcasts; a send must not wait for the next inbound frame.
        let (conn, mut client) = connected_pair().await;
        let conn = Arc::new(conn);

        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        tokio::time::timeout(Duration::from_secs(1), conn.send(b"ping"))
            .await
            .expect("send should not block behind recv")
            .unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client.send(Message::Close(None)).await.unwrap();
        let result = reader.await.unwrap().expect("recv should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        let (conn, mut client) = connected_pair().await;

        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_recv_within_fails_on_silent_peer() {
        let (conn, _client) = connected_pair().await;

        let result = conn.recv_within(Duration::from_millis(50)).await;

        assert!(matches!(result, Err(TransportError::Idle(_))));
    }

    #[tokio::test]
    async fn test_recv_within_counts_pings_as_activity() {
        let (conn, mut client) = connected_pair().await;
        let conn = Arc::new(conn);

        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.recv_within(Duration::from_millis(150)).await })
        };

        // Six pings 50ms apart outlast the 150ms window twice over.
        for _ in 0..6 {
            client.send(Message::Ping(Default::default())).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        client
            .send(Message::text(r#"{"event":"join-room","args":["R1","bob"]}"#.to_string()))
            .await
            .unwrap();

        let received = reader
            .await
            .unwrap()
            .expect("pings should keep the connection alive")
            .expect("should have data");
        assert_eq!(received, br#"{"event":"join-room","args":["R1","bob"]}"#);
    }

    #[tokio::test]
    async fn test_ping_reaches_client() {
        let (conn, mut client) = connected_pair().await;

        conn.ping().await.expect("ping should send");

        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_ping());
    }
}
