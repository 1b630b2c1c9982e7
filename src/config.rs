// SPDX-License-Identifier: MIT
//
// Runtime configuration — command line flags and environment variables.
//
// kiln has no configuration file. Everything tunable arrives through a
// handful of `KILN_*` variables and three flags:
//
//   KILN_LOG              path of a log file (logging is off when unset)
//   KILN_LOG_FILTER       tracing filter directives, default "info"
//   KILN_READ_TIMEOUT_MS  raw-mode read timeout, default 100
//
//   --keys      print each decoded key instead of editing
//   --version   print the version and exit
//   --help      print usage and exit
//
// Parsing takes the argument list and an environment lookup as parameters
// so tests never touch the real process environment.

use std::path::PathBuf;

use kiln_term::terminal::ReadTimeout;
use thiserror::Error;

/// Usage text for `--help`.
pub const USAGE: &str = "\
Usage: kiln [OPTIONS]

Options:
  --keys         Show the decoded form of each key pressed (Ctrl-Q to stop)
  -V, --version  Print version and exit
  -h, --help     Print this help and exit

Environment:
  KILN_LOG              Write logs to this file
  KILN_LOG_FILTER       Log filter directives (default: info)
  KILN_READ_TIMEOUT_MS  Terminal read timeout in milliseconds (default: 100)";

/// What the process was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The full-screen editor.
    #[default]
    Edit,
    /// The key inspector.
    Keys,
    Help,
    Version,
}

/// A configuration problem. These are usage errors, reported before the
/// terminal is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unrecognized argument '{0}'")]
    UnknownArgument(String),

    #[error("KILN_READ_TIMEOUT_MS must be a whole number of milliseconds, got '{0}'")]
    InvalidTimeout(String),
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    /// Where to write logs. `None` disables logging.
    pub log_file: Option<PathBuf>,
    /// `tracing_subscriber::EnvFilter` directives.
    pub log_filter: String,
    pub read_timeout: ReadTimeout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Edit,
            log_file: None,
            log_filter: "info".to_owned(),
            read_timeout: ReadTimeout::default(),
        }
    }
}

impl Config {
    /// Build the configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// See [`from_sources`](Self::from_sources).
    pub fn from_process() -> Result<Self, ConfigError> {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Build the configuration from `args` (without the program name) and
    /// an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownArgument`] for any argument that is not
    /// a known flag, and [`ConfigError::InvalidTimeout`] if the timeout
    /// variable is not a number.
    pub fn from_sources<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        for arg in args {
            config.mode = match arg.as_str() {
                "--keys" => Mode::Keys,
                "-V" | "--version" => Mode::Version,
                "-h" | "--help" => Mode::Help,
                _ => return Err(ConfigError::UnknownArgument(arg)),
            };
        }

        config.log_file = env("KILN_LOG")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        if let Some(filter) = env("KILN_LOG_FILTER").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        if let Some(raw) = env("KILN_READ_TIMEOUT_MS") {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.read_timeout = ReadTimeout::from_millis(ms);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_sources(args.iter().map(|a| (*a).to_owned()), |k| env.get(k).cloned())
    }

    #[test]
    fn defaults() {
        assert_eq!(parse(&[], &[]).unwrap(), Config::default());
        let c = Config::default();
        assert_eq!(c.mode, Mode::Edit);
        assert_eq!(c.log_file, None);
        assert_eq!(c.log_filter, "info");
        assert_eq!(c.read_timeout.as_millis(), 100);
    }

    #[test]
    fn flags_select_mode() {
        assert_eq!(parse(&["--keys"], &[]).unwrap().mode, Mode::Keys);
        assert_eq!(parse(&["-V"], &[]).unwrap().mode, Mode::Version);
        assert_eq!(parse(&["--version"], &[]).unwrap().mode, Mode::Version);
        assert_eq!(parse(&["-h"], &[]).unwrap().mode, Mode::Help);
        assert_eq!(parse(&["--help"], &[]).unwrap().mode, Mode::Help);
    }

    #[test]
    fn last_flag_wins() {
        assert_eq!(parse(&["--keys", "--help"], &[]).unwrap().mode, Mode::Help);
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert_eq!(
            parse(&["notes.txt"], &[]),
            Err(ConfigError::UnknownArgument("notes.txt".to_owned()))
        );
    }

    #[test]
    fn log_settings_from_env() {
        let c = parse(&[], &[("KILN_LOG", "/tmp/kiln.log"), ("KILN_LOG_FILTER", "debug")]).unwrap();
        assert_eq!(c.log_file, Some(PathBuf::from("/tmp/kiln.log")));
        assert_eq!(c.log_filter, "debug");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let c = parse(&[], &[("KILN_LOG", ""), ("KILN_LOG_FILTER", "  ")]).unwrap();
        assert_eq!(c.log_file, None);
        assert_eq!(c.log_filter, "info");
    }

    #[test]
    fn read_timeout_from_env() {
        let c = parse(&[], &[("KILN_READ_TIMEOUT_MS", "300")]).unwrap();
        assert_eq!(c.read_timeout.deciseconds(), 3);
    }

    #[test]
    fn bad_read_timeout_is_rejected() {
        assert_eq!(
            parse(&[], &[("KILN_READ_TIMEOUT_MS", "fast")]),
            Err(ConfigError::InvalidTimeout("fast".to_owned()))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::UnknownArgument("-x".to_owned()).to_string(),
            "unrecognized argument '-x'"
        );
    }
}
