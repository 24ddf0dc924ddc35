use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::sink::{set_global_sink, DiagnosticSink, LogSink, StderrSink, TracingSink, WriterSink};

/// Selects the sink from `stderr`, `log`, `tracing` or `file`.
pub const ENV_SINK: &str = "TIMELOG_SINK";
/// Directory for the `file` sink.
pub const ENV_DIR: &str = "TIMELOG_DIR";
/// File name (prefix, when rotating) for the `file` sink.
pub const ENV_FILE: &str = "TIMELOG_FILE";
/// `never`, `hourly` or `daily`.
pub const ENV_ROTATION: &str = "TIMELOG_ROTATION";
/// `true`/`false`/`1`/`0`: exit the process after a fatal record.
pub const ENV_EXIT_ON_FATAL: &str = "TIMELOG_EXIT_ON_FATAL";

const DEFAULT_FILE_NAME: &str = "timelog.log";

/// How often the `file` sink starts a new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

impl FromStr for Rotation {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Rotation::Never),
            "hourly" => Ok(Rotation::Hourly),
            "daily" => Ok(Rotation::Daily),
            _ => Err(ConfigError::UnknownRotation(value.to_owned())),
        }
    }
}

/// Where records go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SinkTarget {
    /// One line per record line on standard error
    #[default]
    Stderr,
    /// The `log` facade, for hosts with a `log` backend such as `log4rs`
    Log,
    /// `tracing` events; installs a `fmt` subscriber if none is set
    Tracing,
    /// Plain-text file, optionally rotated
    File {
        directory: PathBuf,
        file_name: String,
        rotation: Rotation,
    },
}

/// Instrumentation settings.
///
/// # Examples
///
/// ```
/// use timelog::{Config, SinkTarget};
///
/// let config = Config::from_lookup(|key| match key {
///     "TIMELOG_SINK" => Some("log".to_string()),
///     _ => None,
/// })
/// .unwrap();
/// assert_eq!(config.target, SinkTarget::Log);
/// assert!(config.exit_on_fatal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub target: SinkTarget,
    /// Terminate the process after a fatal record has been written
    pub exit_on_fatal: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: SinkTarget::Stderr,
            exit_on_fatal: true,
        }
    }
}

impl Config {
    /// Reads the `TIMELOG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source; unset keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(value) = lookup(ENV_EXIT_ON_FATAL) {
            config.exit_on_fatal = parse_flag(ENV_EXIT_ON_FATAL, &value)?;
        }

        let sink = lookup(ENV_SINK).unwrap_or_else(|| "stderr".to_owned());
        config.target = match sink.trim().to_ascii_lowercase().as_str() {
            "stderr" => SinkTarget::Stderr,
            "log" => SinkTarget::Log,
            "tracing" => SinkTarget::Tracing,
            "file" => {
                let directory = lookup(ENV_DIR)
                    .map(PathBuf::from)
                    .ok_or(ConfigError::MissingDirectory)?;
                let file_name = lookup(ENV_FILE).unwrap_or_else(|| DEFAULT_FILE_NAME.to_owned());
                let rotation = match lookup(ENV_ROTATION) {
                    Some(value) => value.parse()?,
                    None => Rotation::Never,
                };
                SinkTarget::File { directory, file_name, rotation }
            }
            _ => return Err(ConfigError::UnknownSink(sink)),
        };

        Ok(config)
    }

    /// Creates the sink described by this config.
    ///
    /// Fails only for the `file` target, when the directory or file cannot
    /// be created.
    pub fn build_sink(&self) -> Result<Arc<dyn DiagnosticSink>, ConfigError> {
        let sink: Arc<dyn DiagnosticSink> = match &self.target {
            SinkTarget::Stderr => Arc::new(StderrSink::new().exit_on_fatal(self.exit_on_fatal)),
            SinkTarget::Log => Arc::new(LogSink::new().exit_on_fatal(self.exit_on_fatal)),
            SinkTarget::Tracing => Arc::new(TracingSink::new().exit_on_fatal(self.exit_on_fatal)),
            SinkTarget::File { directory, file_name, rotation } => {
                let rotation = match rotation {
                    Rotation::Never => rolling::Rotation::NEVER,
                    Rotation::Hourly => rolling::Rotation::HOURLY,
                    Rotation::Daily => rolling::Rotation::DAILY,
                };
                let appender = RollingFileAppender::builder()
                    .rotation(rotation)
                    .filename_prefix(file_name)
                    .build(directory)?;
                Arc::new(WriterSink::new(appender).exit_on_fatal(self.exit_on_fatal))
            }
        };
        Ok(sink)
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value: value.to_owned() }),
    }
}

/// Installs the sink described by `config` for the whole process.
///
/// For [`SinkTarget::Tracing`] a `tracing-subscriber` `fmt` subscriber
/// filtered by `RUST_LOG` is installed, unless the host already set one.
pub fn init(config: &Config) -> Result<(), ConfigError> {
    let sink = config.build_sink()?;
    if config.target == SinkTarget::Tracing {
        // the host's subscriber wins if one is already installed
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }
    set_global_sink(sink);
    Ok(())
}

/// [`init`] with [`Config::from_env`].
pub fn init_from_env() -> Result<(), ConfigError> {
    init(&Config::from_env()?)
}
