/// Implements a basic `Debug` trait for types using their type name.
///
/// Used for values that wrap closures or trait objects, where the internal
/// structure has nothing useful to print.
#[macro_export]
macro_rules! impl_debug {
    ($ty:ty) => {
        impl core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(core::any::type_name::<Self>())
            }
        }
    };
}
