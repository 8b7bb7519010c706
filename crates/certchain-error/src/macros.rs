// Error handling macros
// Provides macros for simplified precondition checks

/// Return early with an error if a condition is not satisfied
///
/// ```
/// use certchain_error::{ensure, RegistryError, RegistryResult};
///
/// fn positive(cost: u64) -> RegistryResult<u64> {
///     ensure!(cost > 0, RegistryError::InvalidAmount("cost must be positive".into()));
///     Ok(cost)
/// }
///
/// assert!(positive(0).is_err());
/// assert_eq!(positive(3), Ok(3));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error:expr) => {
        if !($cond) {
            return Err($error.into());
        }
    };
}
