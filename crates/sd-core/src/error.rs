//! Core error types for Stratdash
//!
//! Shared by the contract layer, the audit log and the strategy service.

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all Stratdash operations
#[derive(Error, Debug)]
pub enum SdError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    #[error("Audit log error: {0}")]
    Audit(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conflict: {message}")]
    Conflict { message: String },
}

impl SdError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        SdError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SdError::NotFound { .. } => "not_found",
            SdError::Forbidden { .. } => "forbidden",
            SdError::Validation(_) => "validation_failed",
            SdError::Contract(_) => "contract_violated",
            SdError::Audit(_) => "audit_error",
            SdError::Internal(_) => "internal_error",
            SdError::Config(_) => "configuration_error",
            SdError::Conflict { .. } => "conflict",
        }
    }
}

/// Validation errors collection, keyed by field
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn has_base_errors(&self) -> bool {
        !self.base_errors.is_empty()
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    /// `Ok(())` when empty, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

/// Contract validation error
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Attribute {attribute} is invalid: {message}")]
    AttributeInvalid { attribute: String, message: String },

    #[error("Base contract error: {message}")]
    Base { message: String },

    #[error("Multiple contract errors")]
    Multiple { errors: ValidationErrors },
}

impl From<ContractError> for ValidationErrors {
    fn from(err: ContractError) -> Self {
        let mut errors = ValidationErrors::new();
        match err {
            ContractError::AttributeInvalid { attribute, message } => {
                errors.add(attribute, message);
            }
            ContractError::Base { message } => {
                errors.add_base(message);
            }
            ContractError::Multiple { errors: e } => {
                return e;
            }
        }
        errors
    }
}
