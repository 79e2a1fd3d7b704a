//! Store Ratings Core - Shared types library.
//!
//! This crate provides common types used across all store ratings components:
//! - `api` - The JSON REST service
//! - `cli` - Command-line tools for migrations and bootstrapping admins
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no HTTP. Every entry point that accepts user input (the
//! API handlers and the CLI) validates through the functions in
//! [`validation`], so the password and profile policy is defined exactly once.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, and rating scores
//! - [`validation`] - Field-level validation policy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, ValidationErrors};
