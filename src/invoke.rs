/// Uniform invocation over callables of any arity.
///
/// `Invoke<(A, B, ..)>` is implemented for every `FnMut(A, B, ..) -> R` and
/// for methods bound to a receiver with [`Bound`], so a wrapper can call
/// either kind with a single argument tuple. Arities 0 through 12 are
/// covered.
///
/// # Examples
///
/// ```
/// use timelog::Invoke;
///
/// fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// let mut callable = add;
/// assert_eq!(callable.invoke((2, 3)), 5);
/// ```
pub trait Invoke<Args> {
    type Output;

    fn invoke(&mut self, args: Args) -> Self::Output;
}

/// A method paired with the receiver it will be applied to.
///
/// `Recv` is either `&T` (for `&self` methods) or `&mut T` (for `&mut self`
/// methods). The binding borrows the receiver and never outlives it.
///
/// # Examples
///
/// ```
/// use timelog::{Bound, Invoke};
///
/// let mut items = vec![1, 2];
/// Bound::new(&mut items, Vec::push).invoke((3,));
/// assert_eq!(Bound::new(&items, Vec::len).invoke(()), 3);
/// ```
pub struct Bound<Recv, M> {
    receiver: Recv,
    method: M,
}

impl<Recv, M> Bound<Recv, M> {
    pub fn new(receiver: Recv, method: M) -> Self {
        Self { receiver, method }
    }
}

macro_rules! impl_invoke {
    (@impl $($arg:ident),*) => {
        #[allow(non_snake_case)]
        impl<Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Func
        where
            Func: FnMut($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke(&mut self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self)($($arg),*)
            }
        }

        #[allow(non_snake_case)]
        impl<'r, Recv, Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Bound<&'r Recv, Func>
        where
            Func: FnMut(&Recv, $($arg),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke(&mut self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self.method)(self.receiver, $($arg),*)
            }
        }

        #[allow(non_snake_case)]
        impl<'r, Recv, Func, Ret, $($arg,)*> Invoke<($($arg,)*)> for Bound<&'r mut Recv, Func>
        where
            Func: FnMut(&mut Recv, $($arg),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke(&mut self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self.method)(&mut *self.receiver, $($arg),*)
            }
        }
    };
    () => {
        impl_invoke!(@impl);
    };
    ($head:ident $(, $tail:ident)*) => {
        impl_invoke!(@impl $head $(, $tail)*);
        impl_invoke!($($tail),*);
    };
}

impl_invoke!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);
