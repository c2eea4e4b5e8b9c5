//! Service Result type

use sd_core::error::{SdError, ValidationErrors};
use std::fmt;

/// Outcome of a service command
///
/// A failure always carries field-keyed errors; lookups that found nothing
/// and permission denials are folded into base errors so callers render
/// every failure the same way.
#[derive(Debug)]
pub struct ServiceResult<T> {
    result: Option<T>,
    errors: ValidationErrors,
    message: Option<String>,
}

impl<T> ServiceResult<T> {
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            errors: ValidationErrors::new(),
            message: None,
        }
    }

    pub fn success_with_message(result: T, message: impl Into<String>) -> Self {
        Self::success(result).with_message(message)
    }

    pub fn failure(errors: ValidationErrors) -> Self {
        Self {
            result: None,
            errors,
            message: None,
        }
    }

    /// Create a failed service result with a single field error
    pub fn failure_with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::failure(errors)
    }

    pub fn failure_with_base_error(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        Self::failure(errors)
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_none()
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.full_messages()
    }

    /// Convert into a plain `Result`
    pub fn into_result(self) -> Result<T, SdError> {
        match self.result {
            Some(value) => Ok(value),
            None => Err(SdError::Validation(self.errors)),
        }
    }

    pub fn map<U, F>(self, f: F) -> ServiceResult<U>
    where
        F: FnOnce(T) -> U,
    {
        ServiceResult {
            result: self.result.map(f),
            errors: self.errors,
            message: self.message,
        }
    }

    pub fn and_then<U, F>(self, f: F) -> ServiceResult<U>
    where
        F: FnOnce(T) -> ServiceResult<U>,
    {
        match self.result {
            Some(value) => f(value),
            None => ServiceResult::failure(self.errors),
        }
    }
}

impl<T> From<Result<T, ValidationErrors>> for ServiceResult<T> {
    fn from(result: Result<T, ValidationErrors>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(errors) => ServiceResult::failure(errors),
        }
    }
}

impl<T> From<SdError> for ServiceResult<T> {
    fn from(err: SdError) -> Self {
        match err {
            SdError::Validation(errors) => ServiceResult::failure(errors),
            SdError::Contract(err) => ServiceResult::failure(err.into()),
            other => ServiceResult::failure_with_base_error(other.to_string()),
        }
    }
}

impl<T> From<Result<T, SdError>> for ServiceResult<T> {
    fn from(result: Result<T, SdError>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(err) => err.into(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for ServiceResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Some(result) => write!(f, "Success: {}", result),
            None => write!(f, "Failure: {}", self.errors.full_messages().join(", ")),
        }
    }
}
