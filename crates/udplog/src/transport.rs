// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fire-and-forget datagram transport.
//!
//! Each call opens its own socket, sends one datagram and drops the socket
//! when it goes out of scope, whichever way the call returns. Nothing is
//! shared between calls, so any number of tasks can send concurrently.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::{lookup_host, UdpSocket};
use tracing::trace;

use crate::errors::TransportError;

/// Sends `payload` as a single UDP datagram to `host:port`.
///
/// Returns once the OS has accepted the datagram. No reply is read and
/// delivery is not confirmed.
pub async fn send(host: &str, port: u16, payload: &[u8]) -> Result<(), TransportError> {
    let destination = resolve(host, port).await?;
    send_to(destination, payload).await
}

/// Sends `payload` to an already resolved address.
pub async fn send_to(destination: SocketAddr, payload: &[u8]) -> Result<(), TransportError> {
    let local: SocketAddr = if destination.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local).await.map_err(TransportError::Bind)?;

    let sent = socket
        .send_to(payload, destination)
        .await
        .map_err(TransportError::Send)?;
    if sent != payload.len() {
        return Err(TransportError::PartialSend {
            expected: payload.len(),
            sent,
        });
    }
    trace!("Sent {} bytes to {}", sent, destination);
    Ok(())
}

/// Resolves `host:port` to a single address.
///
/// When a name resolves to both families the first IPv4 address wins, so
/// `localhost` reaches a collector bound to `127.0.0.1` even where the
/// resolver lists `::1` first. IPv6 is used only for names with no IPv4
/// address.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let destination = format!("{host}:{port}");
    let addrs = lookup_host((host, port))
        .await
        .map_err(|source| TransportError::Resolve {
            destination: destination.clone(),
            source,
        })?;
    pick_address(addrs).ok_or(TransportError::NoAddress(destination))
}

fn pick_address(addrs: impl Iterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut fallback = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        fallback.get_or_insert(addr);
    }
    fallback
}
