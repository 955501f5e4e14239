//! Observability setup for Botforge.

pub mod tracing_setup;
