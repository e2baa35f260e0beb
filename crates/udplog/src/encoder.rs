// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builds the exact byte sequence of each event shape.
//!
//! Every function validates all of its inputs before writing a single byte,
//! so a rejected event never yields a partial datagram.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::clock::{minute_bucket, unix_now};
use crate::constants::{
    MAX_NAME_LEN, NAME_LEN_SIZE, TAG_LOG, TAG_SIZE, TIMESTAMP_SIZE, VALUE_LEN_SIZE,
};
use crate::errors::EncodeError;
use crate::event::{CounterDirection, Event};
use crate::value_codec;

/// Encodes a log record for `group` stamped with the current time.
pub fn encode_log<T>(group: &str, value: &T) -> Result<Bytes, EncodeError>
where
    T: Serialize + ?Sized,
{
    encode_log_at(group, value, unix_now())
}

/// Encodes a log record for `group` stamped with `timestamp`.
pub fn encode_log_at<T>(group: &str, value: &T, timestamp: u32) -> Result<Bytes, EncodeError>
where
    T: Serialize + ?Sized,
{
    let name_len = checked_name_len(group)?;
    let payload = value_codec::serialize(value)?;
    let value_len =
        u16::try_from(payload.len()).map_err(|_| EncodeError::ValueTooLarge(payload.len()))?;

    let mut buf = BytesMut::with_capacity(
        TAG_SIZE + NAME_LEN_SIZE + group.len() + TIMESTAMP_SIZE + VALUE_LEN_SIZE + payload.len(),
    );
    put_header(&mut buf, TAG_LOG, name_len, group, timestamp);
    buf.put_u16(value_len);
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

/// Encodes one unit added to `name` in the current minute.
pub fn encode_counter_increment(name: &str) -> Result<Bytes, EncodeError> {
    encode_counter_at(name, CounterDirection::Increment, unix_now())
}

/// Encodes one unit removed from `name` in the current minute.
pub fn encode_counter_decrement(name: &str) -> Result<Bytes, EncodeError> {
    encode_counter_at(name, CounterDirection::Decrement, unix_now())
}

/// Encodes a counter mutation for the minute containing `timestamp`.
pub fn encode_counter_at(
    name: &str,
    direction: CounterDirection,
    timestamp: u32,
) -> Result<Bytes, EncodeError> {
    let name_len = checked_name_len(name)?;
    let mut buf = BytesMut::with_capacity(TAG_SIZE + NAME_LEN_SIZE + name.len() + TIMESTAMP_SIZE);
    put_header(
        &mut buf,
        direction.tag(),
        name_len,
        name,
        minute_bucket(timestamp),
    );
    Ok(buf.freeze())
}

/// Re-encodes an already constructed event.
pub fn encode_event(event: &Event) -> Result<Bytes, EncodeError> {
    match event {
        Event::Log {
            group,
            timestamp,
            value,
        } => encode_log_at(group, value, *timestamp),
        Event::Counter {
            name,
            bucket,
            direction,
        } => encode_counter_at(name, *direction, *bucket),
    }
}

fn checked_name_len(name: &str) -> Result<i8, EncodeError> {
    if name.is_empty() {
        return Err(EncodeError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(EncodeError::NameTooLong(name.len()));
    }
    i8::try_from(name.len()).map_err(|_| EncodeError::NameTooLong(name.len()))
}

fn put_header(buf: &mut BytesMut, tag: u8, name_len: i8, name: &str, timestamp: u32) {
    buf.put_u8(tag);
    buf.put_i8(name_len);
    buf.put_slice(name.as_bytes());
    buf.put_u32(timestamp);
}
