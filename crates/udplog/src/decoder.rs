// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Collector-side parsing of a raw datagram into an [`Event`].
//!
//! Decoding never panics on hostile input: every field is bounds-checked
//! before it is read and any shortfall is reported as
//! [`DecodeError::Truncated`].

use bytes::Buf;

use crate::constants::{
    NAME_LEN_SIZE, TAG_COUNTER_DECREMENT, TAG_COUNTER_INCREMENT, TAG_LOG, TAG_SIZE,
    TIMESTAMP_SIZE, VALUE_LEN_SIZE,
};
use crate::errors::DecodeError;
use crate::event::{CounterDirection, Event};
use crate::value_codec;

/// Decodes exactly one event from `datagram`.
///
/// The whole datagram must be consumed; leftover bytes mean the sender and
/// the collector disagree on the layout and the datagram is rejected.
pub fn decode(datagram: &[u8]) -> Result<Event, DecodeError> {
    let mut reader = Reader { buf: datagram };

    let tag = reader.u8("type tag")?;
    let event = match tag {
        TAG_LOG => {
            let (group, timestamp) = reader.header()?;
            let len = usize::from(reader.u16("value length")?);
            let raw = reader.take(len, "value")?;
            let value = value_codec::deserialize(raw)?;
            Event::Log {
                group,
                timestamp,
                value,
            }
        }
        TAG_COUNTER_INCREMENT | TAG_COUNTER_DECREMENT => {
            let (name, bucket) = reader.header()?;
            let direction = if tag == TAG_COUNTER_INCREMENT {
                CounterDirection::Increment
            } else {
                CounterDirection::Decrement
            };
            Event::Counter {
                name,
                bucket,
                direction,
            }
        }
        other => return Err(DecodeError::UnknownType(other)),
    };

    if reader.buf.has_remaining() {
        return Err(DecodeError::TrailingBytes(reader.buf.remaining()));
    }
    Ok(event)
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn ensure(&self, needed: usize, field: &'static str) -> Result<(), DecodeError> {
        if self.buf.remaining() < needed {
            return Err(DecodeError::Truncated {
                field,
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        self.ensure(TAG_SIZE, field)?;
        Ok(self.buf.get_u8())
    }

    fn u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        self.ensure(VALUE_LEN_SIZE, field)?;
        Ok(self.buf.get_u16())
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        self.ensure(TIMESTAMP_SIZE, field)?;
        Ok(self.buf.get_u32())
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        self.ensure(len, field)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Name length, name and the 4-byte time field shared by every event.
    fn header(&mut self) -> Result<(String, u32), DecodeError> {
        self.ensure(NAME_LEN_SIZE, "name length")?;
        let len = self.buf.get_i8();
        if len <= 0 {
            return Err(DecodeError::Malformed("name length must be 1..=127"));
        }
        let raw = self.take(len.unsigned_abs().into(), "name")?;
        let name = std::str::from_utf8(raw)
            .map_err(|_| DecodeError::Malformed("name is not valid UTF-8"))?
            .to_owned();
        let time = self.u32("timestamp")?;
        Ok((name, time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_counter_at, encode_log_at};
    use crate::errors::ValueError;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    #[test]
    fn test_decode_log_example() {
        let bytes = encode_log_at("group1", "hello", 1_700_000_000).unwrap();
        let event = decode(&bytes).unwrap();
        assert_eq!(
            event,
            Event::Log {
                group: "group1".to_string(),
                timestamp: 1_700_000_000,
                value: json!("hello"),
            }
        );
    }

    #[test]
    fn test_decode_counter_example() {
        let bytes =
            encode_counter_at("counter1", CounterDirection::Increment, 1_700_000_123).unwrap();
        assert_eq!(
            decode(&bytes).unwrap(),
            Event::Counter {
                name: "counter1".to_string(),
                bucket: 1_700_000_100,
                direction: CounterDirection::Increment,
            }
        );
    }

    #[test]
    fn test_increment_and_decrement_decode_differently() {
        let incr = decode(&encode_counter_at("c", CounterDirection::Increment, 60).unwrap())
            .unwrap();
        let decr = decode(&encode_counter_at("c", CounterDirection::Decrement, 60).unwrap())
            .unwrap();
        assert_ne!(incr, decr);
        assert!(matches!(
            decr,
            Event::Counter {
                direction: CounterDirection::Decrement,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_and_single_byte_datagrams() {
        assert!(matches!(
            decode(&[]),
            Err(DecodeError::Truncated {
                field: "type tag",
                ..
            })
        ));
        assert!(matches!(
            decode(&[TAG_LOG]),
            Err(DecodeError::Truncated {
                field: "name length",
                ..
            })
        ));
        assert!(matches!(
            decode(&[TAG_COUNTER_INCREMENT]),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(decode(&[0x00]), Err(DecodeError::UnknownType(0))));
        assert!(matches!(decode(&[0xff]), Err(DecodeError::UnknownType(0xff))));
    }

    #[test]
    fn test_every_truncation_is_reported() {
        let bytes = encode_log_at("group1", &json!({"k": [1, 2, 3]}), 42).unwrap();
        for cut in 0..bytes.len() {
            assert!(
                matches!(decode(&bytes[..cut]), Err(DecodeError::Truncated { .. })),
                "cut at {cut}"
            );
        }
        assert!(decode(&bytes).is_ok());

        let bytes = encode_counter_at("counter1", CounterDirection::Decrement, 42).unwrap();
        for cut in 0..bytes.len() {
            assert!(matches!(
                decode(&bytes[..cut]),
                Err(DecodeError::Truncated { .. })
            ));
        }
    }

    #[test]
    fn test_truncated_reports_field() {
        // name claims 10 bytes, 3 present
        let err = decode(&[TAG_COUNTER_INCREMENT, 10, b'a', b'b', b'c']).unwrap_err();
        match err {
            DecodeError::Truncated {
                field,
                needed,
                remaining,
            } => {
                assert_eq!(field, "name");
                assert_eq!(needed, 10);
                assert_eq!(remaining, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bad_name_length() {
        assert!(matches!(
            decode(&[TAG_COUNTER_INCREMENT, 0, 0, 0, 0, 0]),
            Err(DecodeError::Malformed(_))
        ));
        // 0x80 is -128 as a signed length
        assert!(matches!(
            decode(&[TAG_COUNTER_INCREMENT, 0x80, b'a', 0, 0, 0, 0]),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_name() {
        assert!(matches!(
            decode(&[TAG_COUNTER_DECREMENT, 2, 0xc3, 0x28, 0, 0, 0, 60]),
            Err(DecodeError::Malformed("name is not valid UTF-8"))
        ));
    }

    #[test]
    fn test_invalid_value_bytes() {
        let mut bytes = vec![TAG_LOG, 1, b'g', 0, 0, 0, 1, 0, 3];
        bytes.extend_from_slice(b"{{{");
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::Value(ValueError::Deserialize(_)))
        ));
    }

    #[test]
    fn test_float_and_deep_values_roundtrip() {
        let deep = (0..crate::constants::MAX_VALUE_DEPTH)
            .fold(json!(2.346000074571566e-256), |inner, _| json!([inner]));
        let bytes = encode_log_at("g", &deep, 7).unwrap();
        match decode(&bytes).unwrap() {
            Event::Log { value, .. } => assert_eq!(value, deep),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_counter_at("c", CounterDirection::Increment, 0)
            .unwrap()
            .to_vec();
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(DecodeError::TrailingBytes(1))));
    }

    proptest! {
        #[test]
        fn prop_log_roundtrip(
            group in "[a-zA-Z0-9_.]{1,127}",
            text in "\\PC{0,64}",
            n in any::<i64>(),
            x in any::<f64>().prop_filter("finite", |f| f.is_finite()),
            timestamp in any::<u32>(),
        ) {
            let value = json!({"text": text.clone(), "n": n, "x": x, "list": [n, x, text]});
            let bytes = encode_log_at(&group, &value, timestamp).unwrap();
            let event = decode(&bytes).unwrap();
            prop_assert_eq!(event, Event::Log { group, timestamp, value });
        }

        #[test]
        fn prop_counter_bucket(name in "\\PC{1,30}", timestamp in any::<u32>()) {
            prop_assume!(name.len() <= 127);
            let bytes = encode_counter_at(&name, CounterDirection::Increment, timestamp).unwrap();
            let event = decode(&bytes).unwrap();
            prop_assert_eq!(event.timestamp(), timestamp / 60 * 60);
            prop_assert_eq!(event.name(), name.as_str());
        }

        #[test]
        fn prop_never_panics(datagram in prop::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode(&datagram);
        }

        #[test]
        fn prop_value_scalar_roundtrip(v in any::<bool>()) {
            let bytes = encode_log_at("g", &v, 0).unwrap();
            match decode(&bytes).unwrap() {
                Event::Log { value, .. } => prop_assert_eq!(value, Value::Bool(v)),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
