//! Cross-cutting utilities.

pub mod error;
