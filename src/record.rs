use std::fmt;

use chrono::{DateTime, Local};

use crate::clock::format_timestamp;
use crate::metadata::CallMetadata;

/// Severity class of a diagnostic record.
///
/// The numeric values follow the classic `None=0, Debug=1 .. Fatal=4`
/// error-class numbering so they can be handed to hosts that speak it.
/// The instrumentation itself only ever emits `Debug`, `Failure` and `Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    /// Call entry and successful completion.
    Debug = 1,
    /// Reserved for hosts; never emitted by the wrappers.
    Warning = 2,
    /// A recoverable error or an invalid argument.
    Failure = 3,
    /// An error that could not be classified.
    Fatal = 4,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "Debug",
            Severity::Warning => "Warning",
            Severity::Failure => "Failure",
            Severity::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error number attached to every record.
///
/// Mirrors the error-number table of the diagnostic facilities this crate
/// is meant to feed, so a host can forward `(severity, code, message)`
/// triples unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    None = 0,
    AppDefined = 1,
    OutOfMemory = 2,
    FileIo = 3,
    OpenFailed = 4,
    IllegalArg = 5,
    NotSupported = 6,
    AssertionFailed = 7,
    NoWriteAccess = 8,
    UserInterrupt = 9,
    ObjectNull = 10,
    HttpResponse = 11,
    AwsBucketNotFound = 12,
    AwsObjectNotFound = 13,
    AwsAccessDenied = 14,
    AwsInvalidCredentials = 15,
    AwsSignatureDoesNotMatch = 16,
}

/// What produced a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind {
    /// A wrapped call or an instrumented scope was entered.
    Entry,
    /// A wrapped call returned normally after `elapsed_ms`.
    Finished { elapsed_ms: f64 },
    /// A recoverable error was contained.
    Failure { description: String },
    /// An unrecognized error was contained.
    Fatal,
    /// An argument guard rejected `argument`.
    InvalidArgument { argument: String },
}

/// A single diagnostic record, ready to be written by a sink.
///
/// `message` holds the fully rendered text and may span several lines; a
/// sink must write all of them before the next record starts.
#[derive(Debug, Clone)]
pub struct Record {
    /// Local wall-clock time the record was created
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub code: ErrorCode,
    pub kind: RecordKind,
    /// Display name of the call, scope or guarded operation
    pub call: String,
    pub file: &'static str,
    pub line: u32,
    /// Rendered text, one or more lines without trailing newline
    pub message: String,
}

impl Record {
    /// Entry record for a wrapped call or a scope.
    ///
    /// Two lines: the timestamped call with its argument text, then the
    /// source location.
    pub fn entry(metadata: &CallMetadata) -> Self {
        let timestamp = Local::now();
        let message = format!(
            "[{}] {}({})\n    at {}:{}",
            format_timestamp(&timestamp),
            metadata.display_name(),
            metadata.argument_text(),
            metadata.source_file(),
            metadata.source_line(),
        );
        Self::build(
            timestamp,
            Severity::Debug,
            ErrorCode::None,
            RecordKind::Entry,
            metadata,
            message,
        )
    }

    pub fn finished(metadata: &CallMetadata, elapsed_ms: f64) -> Self {
        let message = format!("[Finished] {} {:.6} ms", metadata.display_name(), elapsed_ms);
        Self::build(
            Local::now(),
            Severity::Debug,
            ErrorCode::None,
            RecordKind::Finished { elapsed_ms },
            metadata,
            message,
        )
    }

    pub fn failure(metadata: &CallMetadata, description: &str) -> Self {
        let message = format!(
            "[Failure] {} ({}): {}: {}",
            metadata.source_file(),
            metadata.source_line(),
            metadata.display_name(),
            description,
        );
        Self::build(
            Local::now(),
            Severity::Failure,
            ErrorCode::AppDefined,
            RecordKind::Failure { description: description.to_owned() },
            metadata,
            message,
        )
    }

    pub fn fatal(metadata: &CallMetadata) -> Self {
        let message = format!(
            "[Fatal] {} ({}): {}: Unknown exception",
            metadata.source_file(),
            metadata.source_line(),
            metadata.display_name(),
        );
        Self::build(
            Local::now(),
            Severity::Fatal,
            ErrorCode::AppDefined,
            RecordKind::Fatal,
            metadata,
            message,
        )
    }

    /// Record for an argument rejected by a guard.
    pub fn invalid_argument(
        operation: &str,
        argument: &str,
        file: &'static str,
        line: u32,
    ) -> Self {
        Record {
            timestamp: Local::now(),
            severity: Severity::Failure,
            code: ErrorCode::IllegalArg,
            kind: RecordKind::InvalidArgument { argument: argument.to_owned() },
            call: operation.to_owned(),
            file,
            line,
            message: format!(
                "[Failure] {} ({}): {}: argument `{}` is invalid",
                file, line, operation, argument
            ),
        }
    }

    fn build(
        timestamp: DateTime<Local>,
        severity: Severity,
        code: ErrorCode,
        kind: RecordKind,
        metadata: &CallMetadata,
        message: String,
    ) -> Self {
        Record {
            timestamp,
            severity,
            code,
            kind,
            call: metadata.display_name().to_owned(),
            file: metadata.source_file(),
            line: metadata.source_line(),
            message,
        }
    }

    /// Lines of the rendered message, in write order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.message.lines()
    }

    /// Timestamp rendered the way entry records show it.
    pub fn timestamp_text(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
