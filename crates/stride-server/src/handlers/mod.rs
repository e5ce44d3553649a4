//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod export;
pub mod projection;

// Re-export all handlers for use in router
pub use export::*;
pub use projection::*;
