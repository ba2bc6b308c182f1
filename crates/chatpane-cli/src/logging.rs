//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so it only logs when `CHATPANE_LOG` names a
//! file. Other commands log to stderr when `RUST_LOG` is set.

use std::fs::File;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "CHATPANE_LOG";

const DEFAULT_FILTER: &str = "chatpane=debug,chatpane_engine=debug,chatpane_tui=debug";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. `interactive` is true when the TUI runs.
pub fn init(interactive: bool) {
    if let Some(path) = std::env::var_os(LOG_ENV) {
        match File::create(&path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false);
                let _ = tracing_subscriber::registry()
                    .with(file_layer.with_filter(filter()))
                    .try_init();
            }
            Err(err) => {
                eprintln!("Failed to create log file {}: {err}", path.to_string_lossy());
            }
        }
    } else if !interactive && std::env::var_os("RUST_LOG").is_some() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }
}
