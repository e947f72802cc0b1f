//! Low-level helpers shared across the workspace.

pub mod utf8;

pub use crate::utf8::Utf8Accumulator;
