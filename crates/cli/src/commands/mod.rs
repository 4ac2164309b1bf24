//! CLI command implementations.

pub mod cookie;
pub mod guest;
pub mod liked;
