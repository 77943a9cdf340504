// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! The websocket server: accept loop, per-connection tasks and shutdown

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::protocol::Message;

mod builder;
mod session;

pub use self::builder::{RelayBuilder, DEFAULT_PORT};
use self::session::Session;
use crate::error::Error;
use crate::ingest::Ingestor;
use crate::pool::{ClientId, SubscriptionPool};
use crate::store::EventStore;

/// A running relay.
///
/// Cheap to clone; all clones share the same store, pool and shutdown
/// channel.
#[derive(Debug, Clone)]
pub struct Relay {
    addr: SocketAddr,
    store: EventStore,
    pool: SubscriptionPool,
    ingestor: Ingestor,
    shutdown: broadcast::Sender<()>,
    next_client_id: Arc<AtomicU64>,
}

impl Relay {
    /// Bind the listener and start serving connections
    pub async fn run(builder: RelayBuilder) -> Result<Self, Error> {
        let ip: IpAddr = builder.addr.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port: u16 = builder.port.unwrap_or(0);

        let listener: TcpListener = TcpListener::bind((ip, port)).await?;
        let addr: SocketAddr = listener.local_addr()?;

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let store = EventStore::new();
        let pool = SubscriptionPool::new();
        let ingestor = Ingestor::new(store.clone(), pool.clone());

        let relay: Self = Self {
            addr,
            store,
            pool,
            ingestor,
            shutdown: shutdown_tx,
            next_client_id: Arc::new(AtomicU64::new(0)),
        };

        let r: Self = relay.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    output = listener.accept() => {
                        match output {
                            Ok((stream, addr)) => {
                                let r1: Self = r.clone();
                                tokio::spawn(async move {
                                    if let Err(e) = r1.handle_connection(stream, addr).await {
                                        tracing::error!("{e}");
                                    }
                                });
                            }
                            Err(e) => {
                                tracing::warn!("can't accept incoming connection: {e}");
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            tracing::info!("relay listener loop terminated");
        });

        Ok(relay)
    }

    /// The websocket url clients connect to
    #[inline]
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// The bound socket address
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The event store behind this relay
    #[inline]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Stop the accept loop and every connection task
    #[inline]
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    async fn handle_connection(&self, raw_stream: TcpStream, addr: SocketAddr) -> Result<(), Error> {
        let mut shutdown_rx = self.shutdown.subscribe();

        let ws_stream = tokio_tungstenite::accept_async(raw_stream).await?;
        tracing::debug!("websocket connection established: {addr}");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        // One queue per connection: query responses and pool broadcasts
        // drain to the socket in production order.
        let (tx, mut rx) = mpsc::unbounded_channel();

        let client_id = ClientId::new(self.next_client_id.fetch_add(1, Ordering::SeqCst));
        let mut session = Session::new(
            client_id,
            self.store.clone(),
            self.pool.clone(),
            self.ingestor.clone(),
            tx,
        );

        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(msg)) => match msg {
                            Message::Text(json) => {
                                tracing::trace!("received {json}");
                                session.handle_frame(&json).await;
                            }
                            Message::Binary(..) => {
                                session.notice("binary messages are not processed by this relay");
                            }
                            Message::Ping(val) => {
                                if ws_tx.send(Message::Pong(val)).await.is_err() {
                                    break;
                                }
                            }
                            Message::Pong(..) => {}
                            Message::Close(..) => break,
                            Message::Frame(..) => {}
                        },
                        Some(Err(e)) => {
                            tracing::debug!("can't handle websocket msg from {addr}: {e}");
                            break;
                        }
                        None => break,
                    }
                }
                out = rx.recv() => {
                    if let Some(msg) = out {
                        if let Err(e) = ws_tx.send(Message::Text(msg.as_json())).await {
                            tracing::debug!("can't send msg to {addr}: {e}");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }

        session.teardown().await;
        tracing::debug!("websocket connection terminated for {addr}");

        Ok(())
    }
}
