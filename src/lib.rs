//! # timelog
//!
//! Drop-in call tracing for debugging: wrap any function or method call and get
//!
//! * **Entry records**: timestamp, call name, argument text and source location
//! * **Timing**: wall-clock duration of every successful call, in milliseconds
//! * **Error containment**: panics and `Err` results become a type-appropriate
//!   sentinel value instead of unwinding through the caller
//! * **Argument guards**: early return when an argument equals its type's sentinel
//!
//! The call site keeps its own error-handling style; all diagnostic detail goes
//! to a [`DiagnosticSink`].
//!
//! ## Main Components
//!
//! * [`Sentinel`]: per-type "invalid" value (`MIN` for integers, NaN for floats,
//!   `None` for options, `Default` otherwise)
//! * [`Traced`]: the invocation wrapper, for free functions and bound methods of
//!   any arity
//! * [`guard_args!`]: argument validation with early return
//! * [`Scope`] / [`instrumented!`]: instrumentation for inline code regions
//! * [`sink`]: where records go, and the lock that keeps them whole
//! * [`config`]: environment-driven sink selection
//!
//! ## Quick Start
//!
//! ```
//! use timelog::{trace_call, trace_method};
//!
//! fn get(values: Vec<i32>, index: usize) -> i32 {
//!     values[index]
//! }
//!
//! struct IntVec(Vec<i32>);
//!
//! impl IntVec {
//!     fn init(&mut self, values: Vec<i32>) {
//!         self.0 = values;
//!     }
//!
//!     fn get(&self, index: usize) -> i32 {
//!         self.0[index]
//!     }
//! }
//!
//! let values = vec![1, 2, 3, 4, 5];
//! let a = trace_call!(get, values.clone(), 2);
//! assert_eq!(a, 3);
//!
//! let mut iv = IntVec(Vec::new());
//! trace_method!(&mut iv, IntVec::init, values);
//! # #[cfg(feature = "instrument")]
//! # {
//! let d = trace_method!(&iv, IntVec::get, 7);
//! assert_eq!(d, i32::MIN); // out of range: logged, sentinel returned
//! # }
//! ```
//!
//! ## Feature flags
//!
//! * `instrument` (default): the macros wrap calls. Without it they expand to
//!   plain calls, with no logging and no error containment.

pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod invoke;
pub mod metadata;
pub mod record;
pub mod scope;
pub mod sentinel;
pub mod sink;
pub mod wrapper;

pub use config::{init, init_from_env, Config, Rotation, SinkTarget};
pub use error::{CallError, ConfigError};
pub use guard::{guard, GuardContext};
pub use invoke::{Bound, Invoke};
pub use metadata::CallMetadata;
pub use record::{ErrorCode, Record, RecordKind, Severity};
pub use scope::{Scope, ScopeResult};
pub use sentinel::Sentinel;
pub use sink::{
    current_sink, emit, set_global_sink, with_sink, DiagnosticSink, LogSink, MemorySink, StderrSink,
    TracingSink, WriterSink,
};
pub use wrapper::{bind, traced, Traced};
