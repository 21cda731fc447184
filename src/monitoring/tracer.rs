/*!
 * Structured Tracing
 * Subscriber setup and simulation spans using the tracing crate
 */

use crate::core::types::Tick;
use crate::process::SchedulingPolicy;
use tracing::{info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing on stderr
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SCHED_TRACE_JSON: Enable JSON output (default: false)
///
/// Stdout is left to the run report. Calling this twice is harmless; the
/// second subscriber is discarded.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SCHED_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one whole simulation run
#[inline]
pub fn span_run(policy: SchedulingPolicy, processes: usize) -> Span {
    span!(
        Level::INFO,
        "run",
        policy = policy.short_name(),
        processes,
        outcome = tracing::field::Empty,
    )
}

/// Span covering one simulated tick
#[inline]
pub fn span_tick(tick: Tick) -> Span {
    span!(Level::DEBUG, "tick", tick, pid = tracing::field::Empty)
}
