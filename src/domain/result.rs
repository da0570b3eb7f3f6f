//! Result type alias for the relay

use super::errors::RelayError;

/// Result type alias for relay operations
///
/// # Examples
///
/// ```
/// use aep_relay::domain::result::Result;
/// use aep_relay::domain::errors::RelayError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(RelayError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RelayError>;
