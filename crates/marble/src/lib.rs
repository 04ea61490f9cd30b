//! World Labs Marble HTTP client library.
//!
//! Provides the REST client for the vendor endpoints (media upload,
//! world generation, operation status, world metadata), the request
//! payload builder, and an explicit parser for the vendor's response
//! shapes. Targets the `/marble/v1` API with `WLT-Api-Key` auth.

pub mod api;
pub mod payload;
pub mod schema;
