//! Logging configuration using tracing

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the logging subsystem.
///
/// Logs go to stderr so stdout stays free for rendered popups. The level is
/// controlled by the `KOTOBA_LOG` environment variable.
///
/// ```bash
/// KOTOBA_LOG=debug kotoba replay demo.jsonl
/// ```
pub fn init(json: bool) {
    let env_filter = EnvFilter::try_from_env("KOTOBA_LOG")
        .unwrap_or_else(|_| EnvFilter::new("kotoba_app=info,warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}
