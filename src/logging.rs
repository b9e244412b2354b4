//! Structured logging bootstrap using `tracing`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber writing to stderr.
///
/// Verbosity defaults to `info`; `RUST_LOG` overrides it.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(false)
        .with_level(true)
        .with_filter(env_filter);

    // Another subscriber may have raced us in; keep whichever won.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
