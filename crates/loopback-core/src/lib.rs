//! # loopback-core
//!
//! Core crate for the LoopBack client SDK. Contains the unified error
//! system, configuration schemas, model identifiers, the property-bag
//! record, REST route templates, and the transport and repository traits.
//!
//! This crate has **no** internal dependencies on other SDK crates.

pub mod config;
pub mod contract;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
