// Logging
//
// Process-wide tracing setup plus the prompt audit log written after every
// successful provider answer.

pub mod prompt_log;

pub use prompt_log::{LoggedRequest, LoggedResponse, PromptLog, PromptLogEntry};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "tutor=info,tower_http=info";

/// Install the global tracing subscriber.
///
/// `verbose` raises the crate's own level to debug. Calling this twice is
/// harmless; the second install is ignored.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tutor=debug,tower_http=debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}
