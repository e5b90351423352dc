//! Invalid-sentinel values for frontier items
//!
//! Dead frontier slots (filtered out, self-loops, predicate-false) hold the
//! sentinel instead of being physically removed. Consumers must treat it as
//! absent, never as vertex or edge zero.

/// Types with a distinguished "invalid" value
pub trait Invalid: Copy + PartialEq + Send + Sync + 'static {
    /// The sentinel value
    const INVALID: Self;

    /// True unless `self` is the sentinel
    #[inline]
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_invalid_max {
    ($($t:ty),*) => {
        $(
            impl Invalid for $t {
                const INVALID: Self = <$t>::MAX;
            }
        )*
    };
}

impl_invalid_max!(u16, u32, u64, usize, i32, i64);
