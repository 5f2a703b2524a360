//! Core types for aisqlite.

pub mod error;

pub use error::{DatabaseError, Result};
