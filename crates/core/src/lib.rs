//! Domain types and pure logic shared by every tourforge crate.
//!
//! Nothing in here performs network I/O. The vendor client lives in
//! `tourforge-marble` and the job workflow in `tourforge-pipeline`.

pub mod azimuth;
pub mod config;
pub mod error;
pub mod job;
pub mod media;
pub mod prompt;
pub mod request;
pub mod types;
