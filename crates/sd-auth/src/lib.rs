//! # sd-auth
//!
//! Authorization for Stratdash.
//!
//! Authentication is handled by an external identity provider. This crate
//! answers one question: may this user perform this action on this module?
//!
//! ## Features
//!
//! - Role directory holding roles, groups and business units
//! - Permission resolution through direct, group and business unit roles
//! - Per-user permission overrides
//! - `CurrentUser` context consumed by contracts

pub mod directory;
pub mod permissions;

pub use directory::{check_permission, RoleDirectory};
pub use permissions::CurrentUser;
