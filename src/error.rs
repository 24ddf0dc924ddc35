use std::any::Any;

use thiserror::Error;

use crate::record::Severity;

/// Why a wrapped call or scope fell back to its sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The callable failed with a description: an `Err` value, or a panic
    /// carrying a message.
    #[error("{0}")]
    Recoverable(String),
    /// The callable panicked with a payload that carries no text.
    #[error("Unknown exception")]
    Unrecognized,
}

impl CallError {
    /// Classifies a payload caught by `catch_unwind`.
    ///
    /// `panic!("...")` produces a `&'static str` or a `String` payload; both are
    /// recoverable. Anything passed to `std::panic::panic_any` is not.
    ///
    /// # Examples
    ///
    /// ```
    /// use timelog::CallError;
    ///
    /// let payload = std::panic::catch_unwind(|| panic!("index {} out of range", 7)).unwrap_err();
    /// assert_eq!(
    ///     CallError::from_panic(payload),
    ///     CallError::Recoverable("index 7 out of range".into())
    /// );
    ///
    /// let payload = std::panic::catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
    /// assert_eq!(CallError::from_panic(payload), CallError::Unrecognized);
    /// ```
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<String>() {
            Ok(message) => CallError::Recoverable(*message),
            Err(payload) => match payload.downcast_ref::<&'static str>() {
                Some(message) => CallError::Recoverable((*message).to_owned()),
                None => CallError::Unrecognized,
            },
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CallError::Recoverable(_) => Severity::Failure,
            CallError::Unrecognized => Severity::Fatal,
        }
    }
}

/// Invalid instrumentation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown sink `{0}` (expected stderr, log, tracing or file)")]
    UnknownSink(String),
    #[error("unknown rotation `{0}` (expected never, hourly or daily)")]
    UnknownRotation(String),
    #[error("invalid value `{value}` for {name} (expected true, false, 1 or 0)")]
    InvalidFlag { name: &'static str, value: String },
    #[error("the file sink needs a directory (set TIMELOG_DIR)")]
    MissingDirectory,
    #[error("cannot open the log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
}
