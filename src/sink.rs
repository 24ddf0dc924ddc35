//! Destinations for diagnostic records.
//!
//! Every record produced by a wrapper, guard or scope goes through [`emit`],
//! which picks the sink for the current thread and writes the record while
//! holding a process-wide lock. The lock is held for exactly one record, so
//! the lines of concurrent records never interleave, and it is never held
//! while a wrapped call runs.
//!
//! # Sink selection
//!
//! 1. A sink installed for the current thread with [`with_sink`]
//! 2. Otherwise the process-wide sink, set with [`set_global_sink`]
//! 3. Otherwise a [`StderrSink`], created on first use

use std::cell::RefCell;
use std::io::{self, Write};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::{Mutex, RwLock};

use crate::record::{Record, Severity};

/// Receives fully rendered records.
///
/// Implementations must not call back into [`emit`]: the emit lock is held
/// while `write` runs.
///
/// # Usage
///
/// ```
/// # use timelog::{DiagnosticSink, Record};
/// # use std::io;
/// // Counts failures, drops everything else
/// struct FailureCounter(std::sync::atomic::AtomicUsize);
///
/// impl DiagnosticSink for FailureCounter {
///     fn write(&self, record: &Record) -> io::Result<()> {
///         if record.severity >= timelog::Severity::Failure {
///             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait DiagnosticSink: Send + Sync {
    /// Writes every line of `record`.
    fn write(&self, record: &Record) -> io::Result<()>;

    /// Whether the process should exit right after a `Fatal` record has been
    /// written.
    fn exits_on_fatal(&self) -> bool {
        false
    }
}

/// Writes each record line to standard error, newline-terminated.
///
/// This is the sink used when nothing else is configured. By default it
/// terminates the process with status 1 after writing a `Fatal` record.
#[derive(Debug, Clone, Copy)]
pub struct StderrSink {
    exit_on_fatal: bool,
}

impl StderrSink {
    pub const fn new() -> Self {
        Self { exit_on_fatal: true }
    }

    pub const fn exit_on_fatal(self, exit: bool) -> Self {
        Self { exit_on_fatal: exit }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for StderrSink {
    fn write(&self, record: &Record) -> io::Result<()> {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        for line in record.lines() {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }

    fn exits_on_fatal(&self) -> bool {
        self.exit_on_fatal
    }
}

/// Writes each record line to an arbitrary writer.
///
/// Lines are written one `writeln!` at a time and flushed after every record.
/// Works with files, in-memory buffers and `tracing-appender` rolling files.
///
/// # Examples
///
/// ```
/// use timelog::{call_site, Record, WriterSink, DiagnosticSink};
///
/// let sink = WriterSink::new(Vec::new());
/// sink.write(&Record::fatal(&call_site!("load"))).unwrap();
/// let text = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(text.ends_with("load: Unknown exception\n"));
/// ```
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    exit_on_fatal: bool,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            exit_on_fatal: false,
        }
    }

    pub fn exit_on_fatal(mut self, exit: bool) -> Self {
        self.exit_on_fatal = exit;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn write(&self, record: &Record) -> io::Result<()> {
        let mut writer = self.writer.lock();
        for line in record.lines() {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }

    fn exits_on_fatal(&self) -> bool {
        self.exit_on_fatal
    }
}

/// Keeps every record in memory.
///
/// Handy for hosts that want to inspect what happened after a batch of calls,
/// and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Record>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records collected so far.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Removes and returns the collected records.
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn write(&self, record: &Record) -> io::Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Forwards records to the `log` facade.
///
/// `Debug` maps to `log::Level::Debug`, `Warning` to `Warn`, `Failure` and
/// `Fatal` to `Error`. The record text becomes the log message. The logger is
/// flushed after every `Fatal` record.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    target: &'static str,
    exit_on_fatal: bool,
}

impl LogSink {
    pub const fn new() -> Self {
        Self::with_target("timelog")
    }

    pub const fn with_target(target: &'static str) -> Self {
        Self {
            target,
            exit_on_fatal: false,
        }
    }

    pub const fn exit_on_fatal(self, exit: bool) -> Self {
        Self {
            target: self.target,
            exit_on_fatal: exit,
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for LogSink {
    fn write(&self, record: &Record) -> io::Result<()> {
        let level = match record.severity {
            Severity::Debug => log::Level::Debug,
            Severity::Warning => log::Level::Warn,
            Severity::Failure | Severity::Fatal => log::Level::Error,
        };
        log::log!(target: self.target, level, "{}", record.message);
        if record.severity == Severity::Fatal {
            log::logger().flush();
        }
        Ok(())
    }

    fn exits_on_fatal(&self) -> bool {
        self.exit_on_fatal
    }
}

/// Forwards records to `tracing` as events with target `timelog`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink {
    exit_on_fatal: bool,
}

impl TracingSink {
    pub const fn new() -> Self {
        Self { exit_on_fatal: false }
    }

    pub const fn exit_on_fatal(self, exit: bool) -> Self {
        Self { exit_on_fatal: exit }
    }
}

impl DiagnosticSink for TracingSink {
    fn write(&self, record: &Record) -> io::Result<()> {
        match record.severity {
            Severity::Debug => {
                tracing::debug!(target: "timelog", call = %record.call, "{}", record.message)
            }
            Severity::Warning => {
                tracing::warn!(target: "timelog", call = %record.call, "{}", record.message)
            }
            Severity::Failure | Severity::Fatal => tracing::error!(
                target: "timelog",
                call = %record.call,
                severity = %record.severity,
                code = ?record.code,
                "{}",
                record.message
            ),
        }
        Ok(())
    }

    fn exits_on_fatal(&self) -> bool {
        self.exit_on_fatal
    }
}

lazy_static! {
    /// Process-wide sink, created on first use and replaced by `set_global_sink`.
    static ref GLOBAL_SINK: RwLock<Arc<dyn DiagnosticSink>> =
        RwLock::new(Arc::new(StderrSink::new()));

    /// Serializes record writes across all threads and sinks.
    ///
    /// Held for the duration of one `DiagnosticSink::write`, never across a
    /// wrapped call.
    static ref EMIT_LOCK: Mutex<()> = Mutex::new(());
}

thread_local! {
    static SCOPED_SINK: RefCell<Option<Arc<dyn DiagnosticSink>>> = RefCell::new(None);
}

/// Installs `sink` for the whole process and returns the previous one.
///
/// Threads inside [`with_sink`] keep their scoped sink.
pub fn set_global_sink(sink: Arc<dyn DiagnosticSink>) -> Arc<dyn DiagnosticSink> {
    std::mem::replace(&mut *GLOBAL_SINK.write(), sink)
}

/// The sink records from the current thread go to.
pub fn current_sink() -> Arc<dyn DiagnosticSink> {
    SCOPED_SINK
        .with(|scoped| scoped.borrow().clone())
        .unwrap_or_else(|| GLOBAL_SINK.read().clone())
}

/// Runs `f` with `sink` receiving every record emitted on this thread.
///
/// The previous sink is restored when `f` returns or unwinds. Calls nest.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use timelog::{trace_call, with_sink, MemorySink};
///
/// fn double(x: i32) -> i32 {
///     x * 2
/// }
///
/// let sink = Arc::new(MemorySink::new());
/// let value = with_sink(sink.clone(), || trace_call!(double, 21));
/// assert_eq!(value, 42);
/// # #[cfg(feature = "instrument")]
/// assert_eq!(sink.len(), 2);
/// ```
pub fn with_sink<R>(sink: Arc<dyn DiagnosticSink>, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<Arc<dyn DiagnosticSink>>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            SCOPED_SINK.with(|scoped| *scoped.borrow_mut() = previous);
        }
    }

    let previous = SCOPED_SINK.with(|scoped| scoped.borrow_mut().replace(sink));
    let _restore = Restore(previous);
    f()
}

/// Writes one record to the current sink.
///
/// Sink I/O errors are dropped: a failing log destination must never change
/// the outcome of the instrumented call. If the record is `Fatal` and the
/// sink asks for it, the process exits with status 1 once the record is out
/// and the lock released.
pub fn emit(record: Record) {
    let sink = current_sink();
    {
        let _serialized = EMIT_LOCK.lock();
        let _ = sink.write(&record);
    }
    if record.severity == Severity::Fatal && sink.exits_on_fatal() {
        std::process::exit(1);
    }
}
