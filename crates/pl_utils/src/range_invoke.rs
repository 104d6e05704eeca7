/// Invokes the target macro once for every prefix of an `index: Name` list.
///
/// Used to implement traits for closures and tuples of increasing arity.
/// Every generated list keeps a trailing comma.
///
/// # Example
///
/// ```
/// trait Arity {
///     const N: usize;
/// }
///
/// macro_rules! impl_arity {
///     ([$($index:tt : $name:ident,)*]) => {
///         impl<$($name,)*> Arity for ($($name,)*) {
///             const N: usize = 0 $(+ { let _ = $index; 1 })*;
///         }
///     };
/// }
///
/// pl_utils::range_invoke!(impl_arity, [0: P0, 1: P1, 2: P2]);
///
/// assert_eq!(<()>::N, 0);
/// assert_eq!(<(u8, i8, bool)>::N, 3);
/// ```
///
/// expands to
///
/// ```ignore
/// impl_arity!([]);
/// impl_arity!([0: P0,]);
/// impl_arity!([0: P0, 1: P1,]);
/// impl_arity!([0: P0, 1: P1, 2: P2,]);
/// ```
#[macro_export]
macro_rules! range_invoke {
    ($macro:ident, [$($index:tt : $name:ident),* $(,)?]) => {
        $crate::range_invoke!(@prefix $macro, [], [$($index : $name),*]);
    };
    (@prefix $macro:ident, [$($done:tt)*], []) => {
        $macro!([$($done)*]);
    };
    (@prefix $macro:ident, [$($done:tt)*], [$index:tt : $name:ident $(, $rest_index:tt : $rest_name:ident)*]) => {
        $macro!([$($done)*]);
        $crate::range_invoke!(@prefix $macro, [$($done)* $index : $name,], [$($rest_index : $rest_name),*]);
    };
}
