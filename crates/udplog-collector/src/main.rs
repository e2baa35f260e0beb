// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod logger;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use udplog::collector::{event_channel, Collector, ReceivedEvent};
use udplog::config::Config;
use udplog::Event;

#[tokio::main]
pub async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            // No subscriber yet, this has to go straight to stderr.
            eprintln!("Error reading collector configuration: {e}");
            std::process::exit(1);
        }
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::new(format!(
            "udplog={0},udplog_collector={0}",
            config.log_level
        )))
        .event_format(logger::Formatter)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Setting default subscriber failed: {e}");
        std::process::exit(1);
    }

    debug!("Logging subsystem enabled");

    let (handle, rx) = event_channel();
    let cancel_token = CancellationToken::new();

    let collector =
        match Collector::new(&config.collector_config(), handle, cancel_token.clone()).await {
            Ok(c) => c,
            Err(e) => {
                error!("Cannot start collector: {e}");
                std::process::exit(1);
            }
        };

    info!(
        "udplog collector listening on {}:{} with {} receive tasks",
        config.host, config.port, config.workers
    );

    let collector_task = tokio::spawn(collector.spin());
    let printer_task = tokio::spawn(print_events(rx));

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for shutdown signal: {e}");
    }
    info!("Shutting down");
    cancel_token.cancel();

    if let Err(e) = collector_task.await {
        error!("Collector task failed: {e}");
    }
    // The collector owned the only sender, so the printer drains and ends.
    if let Err(e) = printer_task.await {
        error!("Event printer task failed: {e}");
    }
}

async fn print_events(mut rx: UnboundedReceiver<ReceivedEvent>) {
    while let Some(ReceivedEvent { event, source }) = rx.recv().await {
        match event {
            Event::Log {
                group,
                timestamp,
                value,
            } => info!(%source, %group, timestamp, %value, "log"),
            Event::Counter {
                name,
                bucket,
                direction,
            } => info!(%source, %name, bucket, delta = direction.delta(), "counter"),
        }
    }
}
