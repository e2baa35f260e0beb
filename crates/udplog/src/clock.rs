// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wall-clock helpers for the wire timestamp.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::BUCKET_SECONDS;

/// Seconds since the Unix epoch as carried on the wire.
///
/// A clock before the epoch reads as 0 and one past 2106 saturates at
/// `u32::MAX`; neither is representable in the u32 field.
pub fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Floors `timestamp` to the start of its minute.
#[inline]
pub fn minute_bucket(timestamp: u32) -> u32 {
    timestamp - timestamp % BUCKET_SECONDS
}
