/*!
 * Monitoring
 * Structured logging setup for the simulator
 */

mod tracer;

pub use tracer::{init_tracing, span_run, span_tick};
