// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! udplog: a connectionless wire protocol for shipping log records and
//! minute-bucketed counter mutations from many producers to one collector.
//!
//! Producers build a datagram with the [`encoder`] (log payloads go through
//! the [`value_codec`]) and hand it to the [`transport`], which sends exactly
//! one UDP datagram and forgets about it. The [`collector`] receives
//! datagrams, runs each one through the [`decoder`] independently and
//! forwards the resulting [`event::Event`]s over a channel.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod client;
pub mod clock;
pub mod collector;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod event;
mod finite;
pub mod transport;
pub mod value_codec;

pub use client::Client;
pub use decoder::decode;
pub use event::{CounterDirection, Event};
