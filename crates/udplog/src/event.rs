// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Events carried by a single datagram.

use serde_json::Value;

use crate::constants::{TAG_COUNTER_DECREMENT, TAG_COUNTER_INCREMENT, TAG_LOG};

/// Which way a counter moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterDirection {
    Increment,
    Decrement,
}

impl CounterDirection {
    /// The unit this mutation adds to its bucket.
    pub fn delta(self) -> i64 {
        match self {
            CounterDirection::Increment => 1,
            CounterDirection::Decrement => -1,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            CounterDirection::Increment => TAG_COUNTER_INCREMENT,
            CounterDirection::Decrement => TAG_COUNTER_DECREMENT,
        }
    }
}

/// One decoded datagram.
///
/// Events have no identity beyond their wire bytes; the protocol carries no
/// correlation id.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Arbitrary value observed at `timestamp`, grouped by name.
    Log {
        group: String,
        timestamp: u32,
        value: Value,
    },
    /// One unit added to or removed from `name`'s minute `bucket`.
    Counter {
        name: String,
        bucket: u32,
        direction: CounterDirection,
    },
}

impl Event {
    /// Type tag this event is framed with.
    pub fn tag(&self) -> u8 {
        match self {
            Event::Log { .. } => TAG_LOG,
            Event::Counter { direction, .. } => direction.tag(),
        }
    }

    /// Group of a log record or name of a counter.
    pub fn name(&self) -> &str {
        match self {
            Event::Log { group, .. } => group,
            Event::Counter { name, .. } => name,
        }
    }

    /// Log timestamp or counter bucket, seconds since the epoch.
    pub fn timestamp(&self) -> u32 {
        match self {
            Event::Log { timestamp, .. } => *timestamp,
            Event::Counter { bucket, .. } => *bucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tags_differ() {
        assert_ne!(
            CounterDirection::Increment.tag(),
            CounterDirection::Decrement.tag()
        );
        assert_eq!(CounterDirection::Increment.delta(), 1);
        assert_eq!(CounterDirection::Decrement.delta(), -1);
    }

    #[test]
    fn test_accessors() {
        let log = Event::Log {
            group: "group1".to_string(),
            timestamp: 1_700_000_000,
            value: Value::from("hello"),
        };
        assert_eq!(log.tag(), TAG_LOG);
        assert_eq!(log.name(), "group1");
        assert_eq!(log.timestamp(), 1_700_000_000);

        let counter = Event::Counter {
            name: "counter1".to_string(),
            bucket: 1_700_000_100,
            direction: CounterDirection::Decrement,
        };
        assert_eq!(counter.tag(), TAG_COUNTER_DECREMENT);
        assert_eq!(counter.name(), "counter1");
        assert_eq!(counter.timestamp(), 1_700_000_100);
    }
}
