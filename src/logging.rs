//! Tracing setup

use tracing_subscriber::EnvFilter;

/// Initializes structured logging on stderr
///
/// `RUST_LOG` controls verbosity (default `warn`); `verbose` forces `debug`
/// for this crate.
///
/// ```ignore
/// setup_tracing(false);
/// tracing::info!("pipeline started");
/// ```
pub fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("catminer=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when embedded or under test
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
