//! # sd-contracts
//!
//! Contract validation for Stratdash.
//!
//! Contracts run before a command touches state. Each one checks that the
//! acting user holds the required permission and that the submitted entity is
//! well formed, collecting every problem into field-keyed [`ValidationErrors`].
//!
//! [`ValidationErrors`]: sd_core::error::ValidationErrors

pub mod action_plans;
pub mod base;
pub mod deletion;
pub mod export;
pub mod kpis;
pub mod okrs;

pub use base::*;
