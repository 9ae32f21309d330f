//! Core type definitions used across the SDK workspace.

pub mod id;
pub mod record;

pub use id::ModelId;
pub use record::{Properties, Record};
