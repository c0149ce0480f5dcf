//! CLI command implementations.

pub mod controls;
pub mod evaluate;
pub mod profile;
pub mod validate;
