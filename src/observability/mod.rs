//! # Observability Infrastructure
//!
//! Structured logging setup for the plugin. Log output goes to stderr:
//! stdout belongs to the host wire protocol and must stay clean.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::errors::Result;

/// Initialize the tracing subscriber.
///
/// The filter honors `RUST_LOG`; without it the default level is `info`,
/// or `debug` when `verbose` is set. `json` switches the output to
/// JSON-formatted log lines. A subscriber installed elsewhere (e.g. by
/// integration tests) is tolerated.
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", default_level);
    }

    let builder = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);

    // A subscriber already installed elsewhere wins.
    let _ = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    Ok(())
}
