//! Configuration for mochi-transcript
//!
//! Settings come from, in increasing priority:
//! - built-in defaults
//! - a TOML file (`--config`, or `mochi/transcript.toml` in the user's
//!   config directory)
//! - environment variables (`MOCHI_TRANSCRIPT_*`)
//! - command-line arguments
//!
//! The merged result is validated before use.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{BackspaceMode, ScreenOptions, DEFAULT_MAX_ROW_WIDTH};

/// Environment variable overriding the wrap width ("0" or "off" disables)
pub const ENV_WRAP: &str = "MOCHI_TRANSCRIPT_WRAP";
/// Environment variable overriding the backspace mode
pub const ENV_BACKSPACE: &str = "MOCHI_TRANSCRIPT_BACKSPACE";

/// CLI arguments for mochi-transcript
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mochi-transcript")]
#[command(author = "Mochi Team")]
#[command(version)]
#[command(
    about = "Turn a raw terminal session capture into a plain-text transcript",
    long_about = None
)]
pub struct CliArgs {
    /// Session capture to read; stdin when absent or "-"
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Write the transcript here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Wrap rows at this many columns, like a terminal of that width
    #[arg(long, value_name = "COLS", conflicts_with = "no_wrap")]
    pub wrap: Option<usize>,

    /// Let rows grow without wrapping, overriding the config file
    #[arg(long)]
    pub no_wrap: bool,

    /// What backspace does to the byte it moves onto
    #[arg(long, value_enum, value_name = "MODE")]
    pub backspace: Option<BackspaceMode>,

    /// Abort when a row would grow wider than this
    #[arg(long, value_name = "BYTES")]
    pub max_row_width: Option<usize>,

    /// Print a JSON snapshot of the buffer instead of text
    #[arg(long)]
    pub json: bool,

    /// Print diagnostic counts on stderr when done
    #[arg(long)]
    pub summary: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log ignored sequences too (-vv for every byte-level event)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Default `tracing` filter directive for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// The input path, or `None` for stdin
    pub fn input_path(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|path| *path != Path::new("-"))
    }
}

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config error in '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal width to emulate; absent means rows grow freely
    pub wrap_width: Option<usize>,

    /// Backspace behavior
    pub backspace: BackspaceMode,

    /// Widest a row may grow
    pub max_row_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wrap_width: None,
            backspace: BackspaceMode::Move,
            max_row_width: DEFAULT_MAX_ROW_WIDTH,
        }
    }
}

impl Config {
    /// Load configuration with full precedence:
    /// CLI args > environment variables > config file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::load_layered(args.config.as_deref())?;
        config.apply_cli_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the config file, then environment variables.
    ///
    /// An explicitly named file must exist and parse. The default file is
    /// optional, and a broken one is logged and skipped.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path).unwrap_or_else(|e| {
                    warn!("Failed to load config from {:?}: {}", path, e);
                    Self::default()
                }),
                _ => Self::default(),
            },
        };

        config.apply_env_vars();
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment variables to config
    fn apply_env_vars(&mut self) {
        if let Ok(val) = env::var(ENV_WRAP) {
            match parse_wrap(&val) {
                Some(wrap) => self.wrap_width = wrap,
                None => warn!("Ignoring {}={:?}: not a column count", ENV_WRAP, val),
            }
        }
        if let Ok(val) = env::var(ENV_BACKSPACE) {
            match val.parse() {
                Ok(mode) => self.backspace = mode,
                Err(e) => warn!("Ignoring {}: {}", ENV_BACKSPACE, e),
            }
        }
    }

    /// Apply CLI arguments to config
    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(wrap) = args.wrap {
            self.wrap_width = Some(wrap);
        }
        if args.no_wrap {
            self.wrap_width = None;
        }
        if let Some(mode) = args.backspace {
            self.backspace = mode;
        }
        if let Some(max) = args.max_row_width {
            self.max_row_width = max;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_row_width == 0 {
            return Err(ConfigError::Invalid {
                field: "max_row_width",
                message: "must be at least 1".to_string(),
            });
        }

        if let Some(wrap) = self.wrap_width {
            if wrap < 2 {
                return Err(ConfigError::Invalid {
                    field: "wrap_width",
                    message: format!("must be at least 2 columns, got {}", wrap),
                });
            }
            if wrap > self.max_row_width {
                return Err(ConfigError::Invalid {
                    field: "wrap_width",
                    message: format!(
                        "{} exceeds max_row_width ({})",
                        wrap, self.max_row_width
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mochi").join("transcript.toml"))
    }

    /// Line buffer options for this configuration
    pub fn screen_options(&self) -> ScreenOptions {
        ScreenOptions {
            wrap_width: self.wrap_width,
            backspace: self.backspace,
            max_row_width: self.max_row_width,
        }
    }
}

/// Parse a wrap width setting: a column count, or "0"/"off"/"none"
fn parse_wrap(value: &str) -> Option<Option<usize>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("off") || value.eq_ignore_ascii_case("none") {
        return Some(None);
    }
    match value.parse::<usize>().ok()? {
        0 => Some(None),
        cols => Some(Some(cols)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.wrap_width, None);
        assert_eq!(config.backspace, BackspaceMode::Move);
        assert_eq!(config.max_row_width, DEFAULT_MAX_ROW_WIDTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_toml_parsing() {
        let toml_str = r#"
            wrap_width = 80
            backspace = "erase"
        "#;

        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.wrap_width, Some(80));
        assert_eq!(config.backspace, BackspaceMode::Erase);
        // Unset fields keep their defaults
        assert_eq!(config.max_row_width, DEFAULT_MAX_ROW_WIDTH);
    }

    #[test]
    fn test_config_toml_rejects_bad_mode() {
        assert!(Config::from_toml("backspace = \"wipe\"").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.wrap_width = Some(1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "wrap_width",
                ..
            })
        ));

        config.wrap_width = Some(100);
        config.max_row_width = 50;
        assert!(config.validate().is_err());

        config.wrap_width = None;
        config.max_row_width = 0;
        assert!(config.validate().is_err());

        config.max_row_width = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config {
            wrap_width: Some(80),
            ..Config::default()
        };

        let args = CliArgs {
            backspace: Some(BackspaceMode::Erase),
            max_row_width: Some(4096),
            no_wrap: true,
            ..CliArgs::default()
        };
        config.apply_cli_args(&args);

        assert_eq!(config.wrap_width, None);
        assert_eq!(config.backspace, BackspaceMode::Erase);
        assert_eq!(config.max_row_width, 4096);
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::try_parse_from([
            "mochi-transcript",
            "session.log",
            "--wrap",
            "132",
            "--backspace",
            "erase",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.input_path(), Some(Path::new("session.log")));
        assert_eq!(args.wrap, Some(132));
        assert_eq!(args.backspace, Some(BackspaceMode::Erase));
        assert_eq!(args.log_filter(), "trace");

        let args = CliArgs::try_parse_from(["mochi-transcript", "-", "-q"]).unwrap();
        assert_eq!(args.input_path(), None);
        assert_eq!(args.log_filter(), "error");

        assert!(CliArgs::try_parse_from(["mochi-transcript", "--wrap", "80", "--no-wrap"]).is_err());
    }

    #[test]
    fn test_parse_wrap() {
        assert_eq!(parse_wrap("80"), Some(Some(80)));
        assert_eq!(parse_wrap(" 0 "), Some(None));
        assert_eq!(parse_wrap("OFF"), Some(None));
        assert_eq!(parse_wrap("wide"), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.toml");
        fs::write(&path, "wrap_width = 40\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.wrap_width, Some(40));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load_from_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        fs::write(&path, "wrap_width = \"wide\"\n").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn test_screen_options() {
        let config = Config {
            wrap_width: Some(72),
            backspace: BackspaceMode::Erase,
            max_row_width: 1000,
        };
        let options = config.screen_options();
        assert_eq!(options.wrap_width, Some(72));
        assert_eq!(options.backspace, BackspaceMode::Erase);
        assert_eq!(options.max_row_width, 1000);
    }
}
