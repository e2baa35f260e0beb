// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Framing constants shared by the encoder and the decoder.
//!
//! Layout (all multi-byte integers big-endian):
//!
//! ```text
//! tag:u8 | name_len:i8 | name | timestamp:u32 | [value_len:u16 | value]
//! ```
//!
//! The bracketed tail is only present for log records. There is no version
//! byte; this two-tag scheme is version 0 and any extension is a breaking
//! change.

/// Type tag of a log record.
pub const TAG_LOG: u8 = 0x01;
/// Type tag of a counter increment.
pub const TAG_COUNTER_INCREMENT: u8 = 0x02;
/// Type tag of a counter decrement.
pub const TAG_COUNTER_DECREMENT: u8 = 0x03;

/// Longest group/counter name; the length prefix is a signed byte.
pub const MAX_NAME_LEN: usize = i8::MAX as usize;
/// Longest serialized log value; the length prefix is a u16.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// Deepest array/object nesting a log value may have. `serde_json` refuses
/// to parse anything deeper, so the encoder refuses to write it.
pub const MAX_VALUE_DEPTH: usize = 127;

pub const TAG_SIZE: usize = 1;
pub const NAME_LEN_SIZE: usize = 1;
pub const TIMESTAMP_SIZE: usize = 4;
pub const VALUE_LEN_SIZE: usize = 2;

/// Largest datagram the format can describe. Collectors size their receive
/// buffer to this so no well-formed datagram is cut short.
pub const MAX_DATAGRAM_SIZE: usize =
    TAG_SIZE + NAME_LEN_SIZE + MAX_NAME_LEN + TIMESTAMP_SIZE + VALUE_LEN_SIZE + MAX_VALUE_LEN;

/// Width of a counter bucket in seconds.
pub const BUCKET_SECONDS: u32 = 60;
