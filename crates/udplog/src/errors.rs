// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for encoding, decoding and shipping udplog datagrams.
//!
//! Encode-time errors are raised before any network I/O and never leave a
//! partial datagram behind. Transport errors are expected to be ignored or
//! logged by callers since the protocol already tolerates loss. Decode errors
//! only ever cost the offending datagram.

use std::io;

use thiserror::Error;

use crate::constants::{MAX_NAME_LEN, MAX_VALUE_LEN};

/// Failure of the value codec in either direction.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("value cannot be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("value bytes are not a valid encoding: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("value holds non-finite float {0}, which has no encoding")]
    NonFinite(f64),
    #[error("value nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Producer-side rejection of an event before it reaches the socket.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name is {0} bytes, limit is {max}", max = MAX_NAME_LEN)]
    NameTooLong(usize),
    #[error("serialized value is {0} bytes, limit is {max}", max = MAX_VALUE_LEN)]
    ValueTooLarge(usize),
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Collector-side rejection of a datagram.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("datagram truncated while reading {field}: need {needed} bytes, {remaining} left")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("unknown type tag {0:#04x}")]
    UnknownType(u8),
    #[error("malformed datagram: {0}")]
    Malformed(&'static str),
    #[error("datagram carries {0} bytes past the end of the event")]
    TrailingBytes(usize),
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Failure to put a datagram on the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot resolve {destination}: {source}")]
    Resolve {
        destination: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} resolved to no address")]
    NoAddress(String),
    #[error("cannot open socket: {0}")]
    Bind(#[source] io::Error),
    #[error("cannot send datagram: {0}")]
    Send(#[source] io::Error),
    #[error("datagram of {expected} bytes sent as {sent}")]
    PartialSend { expected: usize, sent: usize },
}

/// Anything that keeps a [`crate::Client`] call from emitting its datagram.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("cannot bind collector socket to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}
