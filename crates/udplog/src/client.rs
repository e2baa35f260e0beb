// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Producer-side handle bundling a destination with the three event shapes.

use serde::Serialize;

use crate::encoder;
use crate::errors::ClientError;
use crate::transport;

/// Ships events to one collector.
///
/// Cloning is cheap and clones share nothing mutable; every call opens and
/// releases its own socket.
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    port: u16,
}

impl Client {
    /// Creates a client for the collector at `host:port`.
    ///
    /// `host` is resolved on every send. Names that resolve to both address
    /// families use the IPv4 address, so a collector reached by a name such
    /// as `localhost` should listen on IPv4.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Sends `value` as a log record under `group`, stamped now.
    pub async fn log<T>(&self, group: &str, value: &T) -> Result<(), ClientError>
    where
        T: Serialize + ?Sized,
    {
        let datagram = encoder::encode_log(group, value)?;
        self.ship(&datagram).await
    }

    /// Adds one to `name` in the current minute.
    pub async fn incr(&self, name: &str) -> Result<(), ClientError> {
        let datagram = encoder::encode_counter_increment(name)?;
        self.ship(&datagram).await
    }

    /// Subtracts one from `name` in the current minute.
    pub async fn decr(&self, name: &str) -> Result<(), ClientError> {
        let datagram = encoder::encode_counter_decrement(name)?;
        self.ship(&datagram).await
    }

    async fn ship(&self, datagram: &[u8]) -> Result<(), ClientError> {
        transport::send(&self.host, self.port, datagram).await?;
        Ok(())
    }
}
