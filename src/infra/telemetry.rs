use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so that listing output on stdout stays machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "stickypage_compose_total",
            Unit::Count,
            "Total number of listing pages composed."
        );
        describe_counter!(
            "stickypage_compose_empty_total",
            Unit::Count,
            "Composed pages that held no items."
        );
        describe_counter!(
            "stickypage_compose_source_error_total",
            Unit::Count,
            "Compositions aborted by a failing pinned or ordinary source."
        );
        describe_histogram!(
            "stickypage_compose_items",
            Unit::Count,
            "Items placed on each composed page."
        );
        describe_histogram!(
            "stickypage_source_query_ms",
            Unit::Milliseconds,
            "Latency of individual topic source queries in milliseconds."
        );
    });
}
