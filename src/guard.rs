use std::ops::ControlFlow;

use crate::record::Record;
use crate::sentinel::Sentinel;
use crate::sink::emit;

/// Where a guarded argument was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardContext<'a> {
    /// Name of the operation whose argument is checked
    pub operation: &'a str,
    /// Source text of the argument
    pub argument: &'a str,
    pub file: &'static str,
    pub line: u32,
}

impl<'a> GuardContext<'a> {
    pub fn new(operation: &'a str, argument: &'a str, file: &'static str, line: u32) -> Self {
        Self { operation, argument, file, line }
    }
}

/// Checks one argument against its type's sentinel.
///
/// Returns `Continue(())` for a valid value. For a value equal to the
/// sentinel, emits a single failure record naming the argument and the
/// operation, and returns `Break(fallback)` so the caller can return it.
///
/// Integer arguments equal to their type's `MIN` are reported as invalid even
/// when the caller meant them.
///
/// # Examples
///
/// ```
/// use std::ops::ControlFlow;
/// use timelog::{guard, GuardContext};
///
/// fn area(width: i32, height: i32) -> i32 {
///     for (value, name) in [(width, "width"), (height, "height")] {
///         let context = GuardContext::new("area", name, file!(), line!());
///         if let ControlFlow::Break(fallback) = guard(&value, &context, -1) {
///             return fallback;
///         }
///     }
///     width * height
/// }
///
/// assert_eq!(area(3, 4), 12);
/// assert_eq!(area(3, i32::MIN), -1);
/// ```
pub fn guard<T: Sentinel, F>(value: &T, context: &GuardContext<'_>, fallback: F) -> ControlFlow<F> {
    if value.is_sentinel() {
        emit(Record::invalid_argument(
            context.operation,
            context.argument,
            context.file,
            context.line,
        ));
        ControlFlow::Break(fallback)
    } else {
        ControlFlow::Continue(())
    }
}

/// Returns early from the enclosing function if any argument is invalid.
///
/// Arguments are checked in order; the first one equal to its type's
/// sentinel is logged and ends the function, the rest are not checked.
///
/// - `guard_args!(a, b)` returns `()` from a unit function
/// - `guard_args!(a, b => fallback)` returns `fallback`
/// - `guard_args!(op = "name"; a, b => fallback)` overrides the operation
///   name, which otherwise is the enclosing function's
///
/// # Examples
///
/// ```
/// use timelog::guard_args;
///
/// fn ratio(numerator: f64, denominator: f64) -> f64 {
///     guard_args!(numerator, denominator => 0.0);
///     numerator / denominator
/// }
///
/// assert_eq!(ratio(1.0, 4.0), 0.25);
/// assert_eq!(ratio(f64::NAN, 4.0), 0.0);
/// ```
#[macro_export]
macro_rules! guard_args {
    (op = $op:expr; $($arg:expr),+ => $fallback:expr) => {
        $(
            if $crate::guard(
                &$arg,
                &$crate::GuardContext::new(
                    $op,
                    ::core::stringify!($arg),
                    ::core::file!(),
                    ::core::line!(),
                ),
                (),
            )
            .is_break()
            {
                return $fallback;
            }
        )+
    };
    (op = $op:expr; $($arg:expr),+ $(,)?) => {
        $crate::guard_args!(op = $op; $($arg),+ => ())
    };
    ($($arg:expr),+ => $fallback:expr) => {
        $crate::guard_args!(op = $crate::function_name!(); $($arg),+ => $fallback)
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::guard_args!(op = $crate::function_name!(); $($arg),+ => ())
    };
}
