use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a filter directive, e.g. `VISOR_LOG=visor_runtime=trace`.
pub const LOG_ENV: &str = "VISOR_LOG";

/// Install the global subscriber. Output goes to stderr so that command
/// output on stdout stays machine-readable. `VISOR_LOG` takes precedence
/// over `default_directive`.
pub fn init_logging(default_directive: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Default filter for a `-v` repeat count.
pub fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
