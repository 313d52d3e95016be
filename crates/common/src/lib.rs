//! Shared building blocks for the workspace: logging setup and small
//! response types reused by the HTTP surface.

pub mod types;
pub mod utils;
