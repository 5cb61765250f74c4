//! Logging initialization.
//!
//! Logs go to stderr so stdout carries only the report. `RUST_LOG` overrides
//! the verbosity flag; `CPI_LOG_FORMAT=json` switches to structured JSON lines.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json = std::env::var("CPI_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // A subscriber may already be installed (tests, embedders); keep it.
    let _ = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
}
