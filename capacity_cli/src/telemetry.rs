//! Logging setup.
//!
//! Priority: `RUST_LOG` env var > configured level. Output goes to stderr so
//! the REPL on stdout stays readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_telemetry_with_level(log_level: &str) {
    let default_filter = format!("{},capacity_core={},capacity_cli={}", log_level, log_level, log_level);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .ok();
}
