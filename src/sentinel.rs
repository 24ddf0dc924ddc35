use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::ffi::OsString;
use std::hash::{BuildHasher, Hash};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::record::{ErrorCode, Severity};

/// Type-directed "invalid value" selection.
///
/// Every type that can be returned through a wrapped call, or checked by an
/// argument guard, has one deterministic sentinel. Wrappers return it when the
/// wrapped call fails; guards treat an argument equal to it as invalid.
///
/// | Type                              | Sentinel                |
/// |-----------------------------------|-------------------------|
/// | `Option<T>`, raw pointers         | `None` / null           |
/// | `bool`                            | `false`                 |
/// | integers of every width           | `MIN`                   |
/// | `f32`, `f64`                      | quiet NaN               |
/// | `&str`, `&[T]`                    | empty                   |
/// | [`Severity`]                      | `Severity::Failure`     |
/// | [`ErrorCode`]                     | `ErrorCode::AppDefined` |
/// | anything else                     | `Default::default()`    |
///
/// Note that `i32::MIN` (and the other integer minimums) are legitimate values
/// too; a guard cannot tell an intentional `MIN` from an invalid one.
///
/// # Examples
///
/// ```
/// use timelog::Sentinel;
///
/// assert_eq!(i32::sentinel(), i32::MIN);
/// assert!(f64::sentinel().is_nan());
/// assert_eq!(Option::<&str>::sentinel(), None);
/// assert!(String::new().is_sentinel());
/// assert!(!42u8.is_sentinel());
/// ```
pub trait Sentinel: Sized {
    /// The invalid value for this type. Never allocates, never fails.
    fn sentinel() -> Self;

    /// Whether `self` is this type's sentinel.
    fn is_sentinel(&self) -> bool;
}

macro_rules! impl_sentinel_min {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sentinel for $ty {
                #[inline(always)]
                fn sentinel() -> Self {
                    <$ty>::MIN
                }

                #[inline(always)]
                fn is_sentinel(&self) -> bool {
                    *self == <$ty>::MIN
                }
            }
        )*
    };
}

impl_sentinel_min!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_sentinel_nan {
    ($($ty:ty),*) => {
        $(
            impl Sentinel for $ty {
                #[inline(always)]
                fn sentinel() -> Self {
                    <$ty>::NAN
                }

                // NaN never compares equal to itself
                #[inline(always)]
                fn is_sentinel(&self) -> bool {
                    self.is_nan()
                }
            }
        )*
    };
}

impl_sentinel_nan!(f32, f64);

impl Sentinel for bool {
    #[inline(always)]
    fn sentinel() -> Self {
        false
    }

    #[inline(always)]
    fn is_sentinel(&self) -> bool {
        !*self
    }
}

impl<T> Sentinel for Option<T> {
    #[inline(always)]
    fn sentinel() -> Self {
        None
    }

    #[inline(always)]
    fn is_sentinel(&self) -> bool {
        self.is_none()
    }
}

impl<T> Sentinel for *const T {
    fn sentinel() -> Self {
        std::ptr::null()
    }

    fn is_sentinel(&self) -> bool {
        self.is_null()
    }
}

impl<T> Sentinel for *mut T {
    fn sentinel() -> Self {
        std::ptr::null_mut()
    }

    fn is_sentinel(&self) -> bool {
        self.is_null()
    }
}

impl Sentinel for Severity {
    fn sentinel() -> Self {
        Severity::Failure
    }

    fn is_sentinel(&self) -> bool {
        *self == Severity::Failure
    }
}

impl Sentinel for ErrorCode {
    fn sentinel() -> Self {
        ErrorCode::AppDefined
    }

    fn is_sentinel(&self) -> bool {
        *self == ErrorCode::AppDefined
    }
}

/// Implements [`Sentinel`] for types whose sentinel is their `Default` value.
///
/// The type must implement `Default` and `PartialEq`. Use this for your own
/// return types so they can flow through wrapped calls.
///
/// # Examples
///
/// ```
/// use timelog::{impl_sentinel_default, Sentinel};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Pixel {
///     r: u8,
///     g: u8,
///     b: u8,
/// }
///
/// impl_sentinel_default!(Pixel);
///
/// assert_eq!(Pixel::sentinel(), Pixel::default());
/// ```
#[macro_export]
macro_rules! impl_sentinel_default {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Sentinel for $ty {
                fn sentinel() -> Self {
                    <$ty as ::core::default::Default>::default()
                }

                fn is_sentinel(&self) -> bool {
                    *self == <$ty as ::core::default::Default>::default()
                }
            }
        )+
    };
}

impl_sentinel_default!((), char, String, Duration, PathBuf, OsString);

impl<'a> Sentinel for &'a str {
    fn sentinel() -> Self {
        ""
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

impl<'a, T> Sentinel for &'a [T] {
    fn sentinel() -> Self {
        &[]
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! impl_sentinel_pointer {
    ($($ptr:ident),+) => {
        $(
            impl<T: ?Sized> Sentinel for $ptr<T>
            where
                $ptr<T>: Default + PartialEq,
            {
                fn sentinel() -> Self {
                    $ptr::default()
                }

                fn is_sentinel(&self) -> bool {
                    *self == $ptr::default()
                }
            }
        )+
    };
}

impl_sentinel_pointer!(Box, Rc, Arc);

impl<'a, B> Sentinel for Cow<'a, B>
where
    B: ?Sized + ToOwned,
    Cow<'a, B>: Default + PartialEq,
{
    fn sentinel() -> Self {
        Cow::default()
    }

    fn is_sentinel(&self) -> bool {
        *self == Cow::default()
    }
}

// std only implements `Default` for arrays up to 32 elements
impl<T: Default + PartialEq, const N: usize> Sentinel for [T; N] {
    fn sentinel() -> Self {
        std::array::from_fn(|_| T::default())
    }

    fn is_sentinel(&self) -> bool {
        let empty = T::default();
        self.iter().all(|item| *item == empty)
    }
}

impl<T> Sentinel for Vec<T> {
    fn sentinel() -> Self {
        Vec::new()
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Sentinel for VecDeque<T> {
    fn sentinel() -> Self {
        VecDeque::new()
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Sentinel for BTreeMap<K, V> {
    fn sentinel() -> Self {
        BTreeMap::new()
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Sentinel for BTreeSet<T> {
    fn sentinel() -> Self {
        BTreeSet::new()
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> Sentinel for HashMap<K, V, S> {
    fn sentinel() -> Self {
        HashMap::default()
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Eq + Hash, S: BuildHasher + Default> Sentinel for HashSet<T, S> {
    fn sentinel() -> Self {
        HashSet::default()
    }

    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! impl_sentinel_tuple {
    ($($name:ident),+) => {
        impl<$($name: Default + PartialEq),+> Sentinel for ($($name,)+) {
            fn sentinel() -> Self {
                Default::default()
            }

            fn is_sentinel(&self) -> bool {
                *self == Self::default()
            }
        }
    };
}

impl_sentinel_tuple!(A);
impl_sentinel_tuple!(A, B);
impl_sentinel_tuple!(A, B, C);
impl_sentinel_tuple!(A, B, C, D);
impl_sentinel_tuple!(A, B, C, D, E);
impl_sentinel_tuple!(A, B, C, D, E, F);
