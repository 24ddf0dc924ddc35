/// Static description of a wrapped call site.
///
/// Captured once where a wrapper or scope is built and never modified
/// afterwards. Usually produced by [`call_site!`](crate::call_site), which
/// fills in the source location and stringifies the argument expressions.
///
/// # Examples
///
/// ```
/// use timelog::CallMetadata;
///
/// let meta = CallMetadata::new("get", file!(), line!(), "vec, 2");
/// assert_eq!(meta.display_name(), "get");
/// assert_eq!(meta.argument_text(), "vec, 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMetadata {
    display_name: String,
    source_file: &'static str,
    source_line: u32,
    argument_text: String,
}

impl CallMetadata {
    pub fn new(
        display_name: impl Into<String>,
        source_file: &'static str,
        source_line: u32,
        argument_text: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            source_file,
            source_line,
            argument_text: argument_text.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn source_file(&self) -> &'static str {
        self.source_file
    }

    pub fn source_line(&self) -> u32 {
        self.source_line
    }

    /// Source text of the arguments, empty for scopes and nullary calls.
    pub fn argument_text(&self) -> &str {
        &self.argument_text
    }
}

/// Builds a [`CallMetadata`](crate::CallMetadata) for the current source location.
///
/// The first argument is the display name; any further expressions are
/// stringified (not evaluated) into the argument text.
///
/// # Examples
///
/// ```
/// use timelog::call_site;
///
/// let index = 2;
/// let meta = call_site!("get", index + 1);
/// assert_eq!(meta.argument_text(), "index + 1");
/// assert_eq!(meta.source_file(), file!());
/// ```
#[macro_export]
macro_rules! call_site {
    ($name:expr $(,)?) => {
        $crate::CallMetadata::new($name, ::core::file!(), ::core::line!(), "")
    };
    ($name:expr, $($arg:expr),+ $(,)?) => {
        $crate::CallMetadata::new(
            $name,
            ::core::file!(),
            ::core::line!(),
            ::core::stringify!($($arg),+),
        )
    };
}

/// Name of the enclosing function, without its module path.
///
/// Closures are skipped, so inside `fn load() { move || function_name!() }`
/// the result is still `"load"`.
///
/// # Examples
///
/// ```
/// fn resize() -> &'static str {
///     timelog::function_name!()
/// }
///
/// assert_eq!(resize(), "resize");
/// ```
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        $crate::metadata::trim_function_path(__type_name_of(__here))
    }};
}

#[doc(hidden)]
pub fn trim_function_path(path: &'static str) -> &'static str {
    let path = path.strip_suffix("::__here").unwrap_or(path);
    path.rsplit("::")
        .find(|segment| *segment != "{{closure}}")
        .unwrap_or(path)
}
