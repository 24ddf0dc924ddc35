use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::CallError;
use crate::metadata::CallMetadata;
use crate::record::Record;
use crate::sink::emit;
use crate::wrapper::report;

/// Result type of an [`instrumented!`](crate::instrumented) block body.
pub type ScopeResult<T> = anyhow::Result<T>;

/// An instrumented code region that has been entered but not yet run.
///
/// Unlike [`Traced`](crate::Traced), a scope wraps inline code rather than a
/// callable value, does not capture argument text and does not measure
/// duration. Its lifecycle is enforced by ownership:
///
/// 1. [`Scope::enter`] emits the entry record
/// 2. [`Scope::run`] or [`Scope::contain`] consumes the scope and runs the body
/// 3. The body either returns normally, or fails and the scope returns the
///    caller's fallback after logging the failure
///
/// Scopes nest like ordinary blocks: an inner scope always finishes before
/// control returns to the outer one.
///
/// # Examples
///
/// ```
/// use timelog::{call_site, Scope};
///
/// let parsed = Scope::enter(call_site!("parse_port")).run(0u16, || "80a".parse::<u16>());
/// assert_eq!(parsed, 0);
/// ```
#[must_use = "a scope does nothing until it is run"]
#[derive(Debug)]
pub struct Scope {
    metadata: CallMetadata,
}

impl Scope {
    /// Emits the entry record and returns the entered scope.
    pub fn enter(metadata: CallMetadata) -> Self {
        emit(Record::entry(&metadata));
        Self { metadata }
    }

    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    /// Runs a body that reports failure through `Result`.
    ///
    /// `Ok(v)` is returned as is, with no further record. `Err(e)` and
    /// message-carrying panics emit a failure record, other panics a fatal
    /// one; in all failure cases `fallback` is returned. Errors are rendered
    /// with `{:#}`, so an `anyhow` error logs its whole context chain.
    pub fn run<R, E: Display>(self, fallback: R, body: impl FnOnce() -> Result<R, E>) -> R {
        let outcome = match catch_unwind(AssertUnwindSafe(body)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(CallError::Recoverable(format!("{:#}", error))),
            Err(payload) => Err(CallError::from_panic(payload)),
        };
        self.finish(outcome, fallback)
    }

    /// Runs a body with no error channel; only panics are contained.
    ///
    /// # Examples
    ///
    /// ```
    /// use timelog::{call_site, Scope};
    ///
    /// let values = vec![10, 20, 30];
    /// let index = 5;
    /// let picked = Scope::enter(call_site!("pick")).contain(-1, || values[index]);
    /// assert_eq!(picked, -1);
    /// ```
    pub fn contain<R>(self, fallback: R, body: impl FnOnce() -> R) -> R {
        let outcome = catch_unwind(AssertUnwindSafe(body)).map_err(CallError::from_panic);
        self.finish(outcome, fallback)
    }

    fn finish<R>(self, outcome: Result<R, CallError>, fallback: R) -> R {
        match outcome {
            Ok(value) => value,
            Err(error) => {
                report(&self.metadata, &error);
                fallback
            }
        }
    }
}

/// Instruments an inline block inside the current function.
///
/// `instrumented!(fallback, { ...; Ok(value) })` logs entry under the
/// enclosing function's name and evaluates the block as a
/// [`ScopeResult`](crate::ScopeResult). Use `?` to bail out with an error and
/// `return Ok(..)` to leave the region early; both stay inside the block.
/// Errors and panics are logged and turned into `fallback`.
///
/// With the `instrument` feature disabled the block runs unlogged and an
/// error panics with its message.
///
/// # Examples
///
/// ```
/// use timelog::instrumented;
///
/// struct IntVec(Vec<i32>);
///
/// impl IntVec {
///     fn get(&self, index: usize) -> i32 {
///         instrumented!(i32::MIN, {
///             if index == 0 {
///                 return Ok(self.0[0]);
///             }
///             let value = self
///                 .0
///                 .get(index)
///                 .ok_or_else(|| anyhow::anyhow!("index {} out of range", index))?;
///             Ok(*value)
///         })
///     }
/// }
///
/// let iv = IntVec(vec![1, 2, 3]);
/// assert_eq!(iv.get(2), 3);
/// # #[cfg(feature = "instrument")]
/// assert_eq!(iv.get(7), i32::MIN);
/// ```
#[cfg(feature = "instrument")]
#[macro_export]
macro_rules! instrumented {
    ($fallback:expr, $body:block) => {
        $crate::Scope::enter($crate::call_site!($crate::function_name!()))
            .run($fallback, || -> $crate::ScopeResult<_> { $body })
    };
}

#[cfg(not(feature = "instrument"))]
#[macro_export]
macro_rules! instrumented {
    ($fallback:expr, $body:block) => {
        match (|| -> $crate::ScopeResult<_> { $body })() {
            ::core::result::Result::Ok(value) => value,
            ::core::result::Result::Err(error) => ::core::panic!("{:#}", error),
        }
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::record::{RecordKind, Severity};
    use crate::sink::{with_sink, MemorySink};

    #[cfg(feature = "instrument")]
    fn lookup(table: &[(&str, u32)], key: &str) -> u32 {
        crate::instrumented!(u32::MIN, {
            let (_, value) = table
                .iter()
                .find(|(name, _)| *name == key)
                .ok_or_else(|| anyhow::anyhow!("no entry for {}", key))?;
            Ok(*value)
        })
    }

    #[cfg(feature = "instrument")]
    #[test]
    fn test_normal_exit_has_only_entry_record() {
        let sink = Arc::new(MemorySink::new());
        let value = with_sink(sink.clone(), || lookup(&[("a", 1), ("b", 2)], "b"));
        assert_eq!(value, 2);
        let records = sink.take();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::Entry);
        assert_eq!(records[0].call, "lookup");
    }

    #[cfg(feature = "instrument")]
    #[test]
    fn test_error_exit_returns_fallback() {
        let sink = Arc::new(MemorySink::new());
        let value = with_sink(sink.clone(), || lookup(&[("a", 1)], "z"));
        assert_eq!(value, u32::MIN);
        let records = sink.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].kind, RecordKind::Failure { description: "no entry for z".into() });
    }

    #[test]
    fn test_unrecognized_panic_in_scope_is_fatal() {
        let sink = Arc::new(MemorySink::new());
        let value = with_sink(sink.clone(), || {
            Scope::enter(crate::call_site!("odd"))
                .contain("fallback", || std::panic::panic_any(3.5f32))
        });
        assert_eq!(value, "fallback");
        let records = sink.take();
        assert_eq!(records[1].severity, Severity::Fatal);
    }

    #[test]
    fn test_nested_scopes_complete_independently() {
        let sink = Arc::new(MemorySink::new());
        let value = with_sink(sink.clone(), || {
            Scope::enter(crate::call_site!("outer")).run(0, || {
                let inner = Scope::enter(crate::call_site!("inner"))
                    .run(5, || Err::<i32, _>("inner broke"));
                Ok::<_, String>(inner * 2)
            })
        });
        assert_eq!(value, 10);
        let calls: Vec<_> = sink.take().into_iter().map(|record| record.call).collect();
        assert_eq!(calls, vec!["outer", "inner", "inner"]);
    }
}
