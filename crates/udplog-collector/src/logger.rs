// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log line formatter for the collector process.
//!
//! ```text
//! UDPLOG | LEVEL | [span_name{span_fields}:] message {event_fields}
//! ```

use std::fmt;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;

/// Prefixes every line with `UDPLOG` and the level so collector output can
/// be told apart from the events it prints.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "UDPLOG | {} | ", metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                // Filled in by the fmt layer on span creation; absent only if
                // the span was created before that layer was installed.
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_prefix_level_and_span() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_ansi(false)
            .with_writer(capture.clone())
            .event_format(Formatter)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("receive", worker = 2);
            let _guard = span.enter();
            tracing::warn!(bucket = 60, "dropped");
        });

        let out = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(out.starts_with("UDPLOG | WARN | receive{worker=2}: dropped"));
        assert!(out.contains("bucket=60"));
        assert!(out.ends_with('\n'));
    }
}
