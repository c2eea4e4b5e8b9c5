//! Result type aliases

use crate::error::SdError;

/// Standard Result type for Stratdash operations
pub type SdResult<T> = Result<T, SdError>;
