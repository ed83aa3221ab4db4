//! Utility modules.

pub mod literal;
