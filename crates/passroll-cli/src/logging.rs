//! Log output setup.
//!
//! Logs go to stderr so that `--json` output on stdout stays parseable.

use passroll::LogFormat;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,passroll=info",
        1 => "info,passroll=debug",
        _ => "debug,passroll=trace",
    }
}

/// Install the global subscriber.
pub fn init(format: LogFormat, verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
