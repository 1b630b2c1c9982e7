// SPDX-License-Identifier: MIT
//
// Log setup.
//
// The terminal is the editor's canvas, so logs can never go to stdout or
// stderr while it runs. When a log file is configured, a `tracing-subscriber`
// fmt layer writes plain (uncolored) lines to it; otherwise no subscriber is
// installed and every `tracing` call in the crates is a no-op.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber if `config` names a log file.
///
/// Returns whether logging was enabled. Unparseable filter directives fall
/// back to `info`.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init(config: &Config) -> io::Result<bool> {
    let Some(path) = &config.log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_log_file() {
        assert!(!init(&Config::default()).unwrap());
    }

    #[test]
    fn unopenable_log_file_is_an_error() {
        let config = Config {
            log_file: Some("/nonexistent-dir/kiln/kiln.log".into()),
            ..Config::default()
        };
        assert!(init(&config).is_err());
    }
}
