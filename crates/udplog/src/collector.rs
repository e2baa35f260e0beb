// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Collector-side receive loop.
//!
//! The collector binds one UDP socket and runs several receive tasks over it.
//! Every datagram is decoded on its own; decoded events are forwarded over a
//! channel and anything that fails to decode is logged and dropped so the
//! next datagram is processed as usual. What happens to events after the
//! channel is up to the receiver.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::constants::MAX_DATAGRAM_SIZE;
use crate::decoder::decode;
use crate::errors::{CollectorError, DecodeError};
use crate::event::Event;

/// Configuration for the collector socket
pub struct CollectorConfig {
    /// Host to bind UDP socket to (e.g., "127.0.0.1")
    pub host: String,
    /// Port to bind UDP socket to; 0 lets the OS pick one
    pub port: u16,
    /// Number of concurrent receive tasks sharing the socket
    pub workers: usize,
}

/// A decoded event together with the address it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedEvent {
    pub event: Event,
    pub source: SocketAddr,
}

/// Sending half of the event channel. Cheap to clone.
///
/// The channel is unbounded: forwarding never blocks a worker and never
/// drops an event, so if the receiver stops draining, queued events pile up
/// in memory without limit. Consumers are expected to keep up with the
/// datagram rate or stop the collector.
#[derive(Clone)]
pub struct EventHandle {
    tx: mpsc::UnboundedSender<ReceivedEvent>,
}

impl EventHandle {
    pub fn forward(
        &self,
        event: ReceivedEvent,
    ) -> Result<(), mpsc::error::SendError<ReceivedEvent>> {
        self.tx.send(event)
    }
}

/// Creates the channel a [`Collector`] forwards decoded events into.
pub fn event_channel() -> (EventHandle, mpsc::UnboundedReceiver<ReceivedEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventHandle { tx }, rx)
}

// BufferReader abstracts where datagrams come from.
enum BufferReader {
    UdpSocket(Arc<UdpSocket>),

    /// Mirror reader for testing - replays a fixed buffer
    #[allow(dead_code)]
    MirrorTest(Vec<u8>, SocketAddr),
}

impl BufferReader {
    async fn read(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        match self {
            BufferReader::UdpSocket(socket) => socket.recv_from(buf).await,
            BufferReader::MirrorTest(data, source) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok((len, *source))
            }
        }
    }
}

/// Collector server receiving, decoding and forwarding events.
pub struct Collector {
    cancel_token: CancellationToken,
    event_handle: EventHandle,
    buffer_reader: BufferReader,
    workers: usize,
}

impl Collector {
    /// Binds the collector socket.
    ///
    /// Decoded events are forwarded to `event_handle` until `cancel_token` is
    /// cancelled.
    pub async fn new(
        config: &CollectorConfig,
        event_handle: EventHandle,
        cancel_token: CancellationToken,
    ) -> Result<Collector, CollectorError> {
        let address = format!("{}:{}", config.host, config.port);
        let socket = UdpSocket::bind(&address)
            .await
            .map_err(|source| CollectorError::Bind { address, source })?;

        Ok(Collector {
            cancel_token,
            event_handle,
            buffer_reader: BufferReader::UdpSocket(Arc::new(socket)),
            workers: config.workers.max(1),
        })
    }

    /// Address the socket is bound to.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.buffer_reader {
            BufferReader::UdpSocket(socket) => socket.local_addr().ok(),
            BufferReader::MirrorTest(..) => None,
        }
    }

    /// Runs the receive tasks until the cancel token fires.
    pub async fn spin(self) {
        let workers = self.workers;
        let collector = Arc::new(self);
        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            let collector = Arc::clone(&collector);
            tasks.spawn(async move { collector.receive_loop(worker).await });
        }
        debug!("Collector started with {} receive tasks", workers);

        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!("Collector receive task failed: {}", e);
            }
        }
        debug!("Collector stopped");
    }

    async fn receive_loop(&self, worker: usize) {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = self.consume(&mut buf) => {}
            }
        }
        trace!("Receive task {} exiting", worker);
    }

    /// Receives one datagram and handles it.
    async fn consume(&self, buf: &mut [u8]) {
        match self.buffer_reader.read(buf).await {
            Ok((len, source)) => self.process(&buf[..len], source),
            Err(e) => error!("Error while reading socket: {}", e),
        }
    }

    fn process(&self, datagram: &[u8], source: SocketAddr) {
        match decode(datagram) {
            Ok(event) => {
                trace!("Received {:?} from {}", event, source);
                if let Err(e) = self.event_handle.forward(ReceivedEvent { event, source }) {
                    error!("Failed to forward event: {}", e);
                }
            }
            // stray traffic on the port is common, keep it out of the warn log
            Err(e @ DecodeError::UnknownType(_)) => {
                debug!("Dropping datagram from {}: {}", source, e);
            }
            Err(e) => warn!("Dropping datagram from {}: {}", source, e),
        }
    }
}
