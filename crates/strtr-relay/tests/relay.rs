// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Wire-level tests against a running relay.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use strtr_relay::proto::{ClientMessage, EventBuilder, Filter, Keys, Kind, SubscriptionId};
use strtr_relay::{Relay, RelayBuilder};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(relay: &Relay) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(relay.url())
        .await
        .expect("can't connect to local relay");
    ws
}

async fn send(ws: &mut WsClient, msg: ClientMessage) {
    ws.send(Message::Text(msg.as_json()))
        .await
        .expect("can't send frame");
}

async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(json) = msg {
            return serde_json::from_str(&json).expect("frame is not JSON");
        }
    }
}

#[tokio::test]
async fn test_publish_request_close() {
    let relay = Relay::run(RelayBuilder::new()).await.unwrap();
    let mut ws = connect(&relay).await;
    let keys = Keys::generate();

    // Publish
    let event = EventBuilder::text_note("hello relay").sign(&keys);
    send(&mut ws, ClientMessage::event(event.clone())).await;
    let ok = recv_json(&mut ws).await;
    assert_eq!(ok[0], "OK");
    assert_eq!(ok[1], event.id.to_hex());
    assert_eq!(ok[2], true);
    assert_eq!(ok[3], "");

    // Request stored events
    send(
        &mut ws,
        ClientMessage::req(
            SubscriptionId::new("sub1"),
            vec![Filter::new().kind(Kind::TEXT_NOTE)],
        ),
    )
    .await;
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame[0], "EVENT");
    assert_eq!(frame[1], "sub1");
    assert_eq!(frame[2]["id"], event.id.to_hex());
    let eose = recv_json(&mut ws).await;
    assert_eq!(eose[0], "EOSE");
    assert_eq!(eose[1], "sub1");

    send(&mut ws, ClientMessage::close(SubscriptionId::new("sub1"))).await;

    relay.shutdown();
}

#[tokio::test]
async fn test_live_broadcast_between_connections() {
    let relay = Relay::run(RelayBuilder::new()).await.unwrap();
    let mut subscriber = connect(&relay).await;
    let mut publisher = connect(&relay).await;
    let keys = Keys::generate();

    send(
        &mut subscriber,
        ClientMessage::req(
            SubscriptionId::new("live"),
            vec![Filter::new().kind(Kind::TEXT_NOTE)],
        ),
    )
    .await;
    let eose = recv_json(&mut subscriber).await;
    assert_eq!(eose[0], "EOSE");

    let event = EventBuilder::text_note("breaking news").sign(&keys);
    send(&mut publisher, ClientMessage::event(event.clone())).await;
    let ok = recv_json(&mut publisher).await;
    assert_eq!(ok[0], "OK");
    assert_eq!(ok[2], true);

    let frame = recv_json(&mut subscriber).await;
    assert_eq!(frame[0], "EVENT");
    assert_eq!(frame[1], "live");
    assert_eq!(frame[2]["id"], event.id.to_hex());

    relay.shutdown();
}

#[tokio::test]
async fn test_notices_for_bad_frames() {
    let relay = Relay::run(RelayBuilder::new()).await.unwrap();
    let mut ws = connect(&relay).await;

    ws.send(Message::Text("garbage".to_string())).await.unwrap();
    let notice = recv_json(&mut ws).await;
    assert_eq!(notice[0], "NOTICE");
    assert_eq!(notice[1], "malformed message: garbage");

    ws.send(Message::Text(r#"["COUNT","sub1",{}]"#.to_string()))
        .await
        .unwrap();
    let notice = recv_json(&mut ws).await;
    assert_eq!(notice[0], "NOTICE");
    assert_eq!(notice[1], "unsupported message type: COUNT");

    // The connection is still usable afterwards
    send(
        &mut ws,
        ClientMessage::req(SubscriptionId::new("sub1"), vec![Filter::new()]),
    )
    .await;
    let eose = recv_json(&mut ws).await;
    assert_eq!(eose[0], "EOSE");

    relay.shutdown();
}

#[tokio::test]
async fn test_req_with_only_dead_filters_is_closed() {
    let relay = Relay::run(RelayBuilder::new()).await.unwrap();
    let mut ws = connect(&relay).await;

    ws.send(Message::Text(
        r#"["REQ","dead",{"authors":[]}]"#.to_string(),
    ))
    .await
    .unwrap();

    let eose = recv_json(&mut ws).await;
    assert_eq!(eose[0], "EOSE");
    assert_eq!(eose[1], "dead");
    let closed = recv_json(&mut ws).await;
    assert_eq!(closed[0], "CLOSED");
    assert_eq!(closed[1], "dead");
    assert_eq!(closed[2], "error: no effective filter");

    relay.shutdown();
}
