//! `tourforge` -- generate a 3D property tour from the command line.

pub mod args;
pub mod error;
pub mod progress;
