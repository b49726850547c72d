//! Log output for the binary.
//!
//! Events from `locseq` and the binary go through one `tracing_subscriber`
//! registry. The level comes from `RUST_LOG` (default `info`); the format is
//! either multi-line `pretty` for people or one JSON object per line for log
//! shippers. Everything is written to stderr so stdout carries only command
//! output.

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt,
};

use super::config::LogFormat;

pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    subscriber(format).try_init()?;
    Ok(())
}

fn subscriber(format: LogFormat) -> impl Subscriber + Send + Sync + 'static {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_target(false)
        .with_timer(ChronoLocal::rfc_3339());

    let layer = match format {
        LogFormat::Pretty => layer.with_file(true).pretty().boxed(),
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(layer)
}
