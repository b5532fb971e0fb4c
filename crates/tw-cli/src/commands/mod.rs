//! Command implementations

pub(crate) mod common;
pub mod down;
pub mod plan;
pub mod up;
