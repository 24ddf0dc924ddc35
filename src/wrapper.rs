use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::clock::Stopwatch;
use crate::error::CallError;
use crate::invoke::{Bound, Invoke};
use crate::metadata::CallMetadata;
use crate::record::Record;
use crate::sentinel::Sentinel;
use crate::sink::emit;

/// Instrumented wrapper around a callable.
///
/// Each call through a `Traced`:
///
/// 1. Emits an entry record with the call's name, argument text and location
/// 2. Starts a stopwatch
/// 3. Runs the callable inside a panic boundary
/// 4. On success, emits the elapsed time and returns the result unchanged
/// 5. On a recoverable error (an `Err`, or a panic with a message), emits a
///    failure record and returns the return type's [`Sentinel`]
/// 6. On an unrecognized panic payload, emits a fatal record and returns the
///    sentinel as well
///
/// Errors never propagate past the wrapper. Callers that need to tell an
/// invalid-input sentinel from an error sentinel have to look at the log.
///
/// Wrappers are meant to be built and invoked in the same expression, usually
/// through [`trace_call!`](crate::trace_call) or
/// [`trace_method!`](crate::trace_method).
///
/// # Examples
///
/// ```
/// use timelog::{call_site, Traced};
///
/// fn get(values: Vec<i32>, index: usize) -> i32 {
///     values[index]
/// }
///
/// let values = vec![1, 2, 3, 4, 5];
/// let mut traced = Traced::new(get, call_site!("get", values, 2));
/// assert_eq!(traced.call((values.clone(), 2)), 3);
/// ```
pub struct Traced<C> {
    callable: C,
    metadata: CallMetadata,
}

impl<C> Traced<C> {
    pub fn new(callable: C, metadata: CallMetadata) -> Self {
        Self { callable, metadata }
    }

    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    /// Invokes the callable with `args`, containing any panic.
    pub fn call<Args>(&mut self, args: Args) -> C::Output
    where
        C: Invoke<Args>,
        C::Output: Sentinel,
    {
        self.run(args, Ok)
    }

    /// Invokes a callable that reports failure through `Result`.
    ///
    /// `Err(e)` is logged with `e`'s alternate `Display` text (`{:#}`) and
    /// replaced by `R::sentinel()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use timelog::{call_site, Traced};
    ///
    /// let mut parse = Traced::new(|text: &str| text.parse::<u16>(), call_site!("parse"));
    /// assert_eq!(parse.try_call(("8080",)), 8080);
    /// assert_eq!(parse.try_call(("http",)), u16::MIN);
    /// ```
    pub fn try_call<Args, R, E>(&mut self, args: Args) -> R
    where
        C: Invoke<Args, Output = Result<R, E>>,
        R: Sentinel,
        E: Display,
    {
        self.run(args, |output| {
            output.map_err(|error| CallError::Recoverable(format!("{:#}", error)))
        })
    }

    fn run<Args, R>(
        &mut self,
        args: Args,
        classify: impl FnOnce(C::Output) -> Result<R, CallError>,
    ) -> R
    where
        C: Invoke<Args>,
        R: Sentinel,
    {
        emit(Record::entry(&self.metadata));
        let stopwatch = Stopwatch::start();

        let callable = &mut self.callable;
        let outcome = match catch_unwind(AssertUnwindSafe(move || callable.invoke(args))) {
            Ok(output) => classify(output),
            Err(payload) => Err(CallError::from_panic(payload)),
        };

        match outcome {
            Ok(value) => {
                emit(Record::finished(&self.metadata, stopwatch.elapsed_ms()));
                value
            }
            Err(error) => {
                report(&self.metadata, &error);
                R::sentinel()
            }
        }
    }
}

/// Wraps a free function or closure.
pub fn traced<C>(callable: C, metadata: CallMetadata) -> Traced<C> {
    Traced::new(callable, metadata)
}

/// Wraps a method bound to `receiver`.
///
/// `receiver` is `&T` for `&self` methods and `&mut T` for `&mut self`
/// methods; the wrapper borrows it for its own lifetime only.
///
/// # Examples
///
/// ```
/// use timelog::{bind, call_site};
///
/// let mut names: Vec<String> = Vec::new();
/// bind(&mut names, Vec::push, call_site!("push")).call(("ada".to_string(),));
/// assert_eq!(names.len(), 1);
/// ```
pub fn bind<Recv, M>(receiver: Recv, method: M, metadata: CallMetadata) -> Traced<Bound<Recv, M>> {
    Traced::new(Bound::new(receiver, method), metadata)
}

/// Emits the failure or fatal record for `error`.
pub(crate) fn report(metadata: &CallMetadata, error: &CallError) {
    match error {
        CallError::Recoverable(description) => emit(Record::failure(metadata, description)),
        CallError::Unrecognized => emit(Record::fatal(metadata)),
    }
}

/// Calls a function through a [`Traced`](crate::Traced) wrapper.
///
/// `trace_call!(f, a, b)` logs entry and duration of `f(a, b)` and returns
/// the result, or the return type's sentinel if `f` panics. The display name
/// is the text of `f`, the argument text the text of the arguments.
///
/// With the `instrument` feature disabled this is exactly `f(a, b)`.
///
/// # Examples
///
/// ```
/// use timelog::trace_call;
///
/// fn get(values: Vec<i32>, index: usize) -> i32 {
///     values[index]
/// }
///
/// let values = vec![1, 2, 3, 4, 5];
/// assert_eq!(trace_call!(get, values.clone(), 2), 3);
/// # #[cfg(feature = "instrument")]
/// assert_eq!(trace_call!(get, values.clone(), 7), i32::MIN);
/// ```
///
/// Arguments are handed over as a tuple, so they must already have the
/// parameter types: pass `&v[..]` rather than `&v` to a `&[T]` parameter.
#[cfg(feature = "instrument")]
#[macro_export]
macro_rules! trace_call {
    ($func:expr $(, $arg:expr)* $(,)?) => {
        $crate::Traced::new($func, $crate::call_site!(::core::stringify!($func) $(, $arg)*))
            .call(($($arg,)*))
    };
}

#[cfg(not(feature = "instrument"))]
#[macro_export]
macro_rules! trace_call {
    ($func:expr $(, $arg:expr)* $(,)?) => {
        ($func)($($arg),*)
    };
}

/// Like [`trace_call!`](crate::trace_call) for functions returning `Result`.
///
/// `Ok(v)` yields `v`; `Err(e)` is logged and yields the sentinel of `v`'s
/// type. With the `instrument` feature disabled, `Err(e)` panics with `e`'s
/// text instead.
#[cfg(feature = "instrument")]
#[macro_export]
macro_rules! try_trace_call {
    ($func:expr $(, $arg:expr)* $(,)?) => {
        $crate::Traced::new($func, $crate::call_site!(::core::stringify!($func) $(, $arg)*))
            .try_call(($($arg,)*))
    };
}

#[cfg(not(feature = "instrument"))]
#[macro_export]
macro_rules! try_trace_call {
    ($func:expr $(, $arg:expr)* $(,)?) => {
        match ($func)($($arg),*) {
            ::core::result::Result::Ok(value) => value,
            ::core::result::Result::Err(error) => ::core::panic!("{}", error),
        }
    };
}

/// Calls a method on a receiver through a [`Traced`](crate::Traced) wrapper.
///
/// The receiver is passed as `&value` or `&mut value`, matching the method's
/// `self` parameter.
///
/// # Examples
///
/// ```
/// use timelog::trace_method;
///
/// struct IntVec(Vec<i32>);
///
/// impl IntVec {
///     fn init(&mut self, values: Vec<i32>) {
///         self.0 = values;
///     }
///
///     fn get(&self, index: usize) -> i32 {
///         self.0[index]
///     }
/// }
///
/// let mut iv = IntVec(Vec::new());
/// trace_method!(&mut iv, IntVec::init, vec![1, 2, 3]);
/// assert_eq!(trace_method!(&iv, IntVec::get, 1), 2);
/// ```
#[cfg(feature = "instrument")]
#[macro_export]
macro_rules! trace_method {
    ($receiver:expr, $method:expr $(, $arg:expr)* $(,)?) => {
        $crate::bind($receiver, $method, $crate::call_site!(::core::stringify!($method) $(, $arg)*))
            .call(($($arg,)*))
    };
}

#[cfg(not(feature = "instrument"))]
#[macro_export]
macro_rules! trace_method {
    ($receiver:expr, $method:expr $(, $arg:expr)* $(,)?) => {
        ($method)($receiver $(, $arg)*)
    };
}

/// Like [`trace_method!`](crate::trace_method) for methods returning `Result`.
#[cfg(feature = "instrument")]
#[macro_export]
macro_rules! try_trace_method {
    ($receiver:expr, $method:expr $(, $arg:expr)* $(,)?) => {
        $crate::bind($receiver, $method, $crate::call_site!(::core::stringify!($method) $(, $arg)*))
            .try_call(($($arg,)*))
    };
}

#[cfg(not(feature = "instrument"))]
#[macro_export]
macro_rules! try_trace_method {
    ($receiver:expr, $method:expr $(, $arg:expr)* $(,)?) => {
        match ($method)($receiver $(, $arg)*) {
            ::core::result::Result::Ok(value) => value,
            ::core::result::Result::Err(error) => ::core::panic!("{}", error),
        }
    };
}


#[cfg(all(test, not(feature = "instrument")))]
mod passthrough_tests {
    use std::num::ParseIntError;
    use std::panic::catch_unwind;
    use std::sync::Arc;

    use anyhow::Context;

    use crate::sink::{with_sink, MemorySink};

    fn get(values: Vec<i32>, index: usize) -> i32 {
        values[index]
    }

    fn parse(text: &str) -> Result<u16, ParseIntError> {
        text.parse()
    }

    fn port(text: &str) -> u16 {
        crate::instrumented!(0, { Ok(text.parse::<u16>().context("parse port")?) })
    }

    struct Counter {
        hits: u32,
    }

    impl Counter {
        fn bump(&mut self, by: u32) -> u32 {
            self.hits += by;
            self.hits
        }

        fn checked(&self, limit: u32) -> Result<u32, String> {
            if self.hits > limit {
                Err(format!("{} hits over the limit of {}", self.hits, limit))
            } else {
                Ok(self.hits)
            }
        }
    }

    fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
        match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(_) => String::new(),
        }
    }

    #[test]
    fn test_macros_are_direct_calls() {
        let sink = Arc::new(MemorySink::new());
        let values = vec![1, 2, 3];
        let mut counter = Counter { hits: 0 };

        with_sink(sink.clone(), || {
            assert_eq!(crate::trace_call!(get, values.clone(), 1), get(values.clone(), 1));
            assert_eq!(crate::try_trace_call!(parse, "80"), 80);
            assert_eq!(crate::trace_method!(&mut counter, Counter::bump, 3), 3);
            assert_eq!(crate::try_trace_method!(&counter, Counter::checked, 10), 3);
            assert_eq!(port("8080"), 8080);
        });

        assert_eq!(counter.hits, 3);
        assert!(sink.is_empty(), "nothing is logged without instrumentation");
    }

    #[test]
    fn test_panics_propagate() {
        let values = vec![1, 2, 3];
        let result = catch_unwind(|| crate::trace_call!(get, values.clone(), 7));
        assert!(result.is_err(), "no sentinel substitution without instrumentation");
    }

    #[test]
    fn test_err_becomes_panic_with_error_text() {
        let payload = catch_unwind(|| crate::try_trace_call!(parse, "http")).unwrap_err();
        assert_eq!(panic_text(payload), "invalid digit found in string");

        let payload = catch_unwind(|| port("http")).unwrap_err();
        assert_eq!(panic_text(payload), "parse port: invalid digit found in string");
    }
}
