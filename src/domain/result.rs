//! Result type alias for linkage
//!
//! This module provides a convenient Result type alias that uses
//! [`LinkageError`] as the error type.

use super::errors::LinkageError;

/// Result type alias for linkage operations
///
/// # Examples
///
/// ```
/// use linkage::domain::result::Result;
/// use linkage::domain::errors::LinkageError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(LinkageError::DataQuality("PatientID missing".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, LinkageError>;
