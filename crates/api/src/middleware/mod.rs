//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. CORS
//!
//! Authentication is not a layer: each protected handler takes
//! [`Authorized`] as its first extractor after `State`.

pub mod auth;
pub mod request_id;

pub use auth::{Authorized, Caller};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
