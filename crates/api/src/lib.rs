//! Store Ratings API library.
//!
//! This crate provides the JSON REST service as a library, allowing it to be
//! tested and reused by the CLI.
//!
//! # Layers
//!
//! - [`routes`] - Thin axum handlers: extract, authorize, call a service
//! - [`services`] - Business rules (auth, access control, ratings, admin)
//! - [`db`] - Repositories over `PostgreSQL`, one per table
//! - [`models`] - Domain structs returned by repositories and serialized to JSON
//!
//! Every protected handler authorizes through [`middleware::Authorized`]
//! before its other extractors run, and every error leaves through
//! [`error::AppError`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
