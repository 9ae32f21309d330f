//! # loopback-rest
//!
//! HTTP transport for the LoopBack SDK. [`RestAdapter`] implements the
//! core [`Adapter`](loopback_core::traits::Adapter) trait on top of
//! `reqwest`: JSON calls, multipart uploads, and streamed downloads.

pub mod adapter;
pub mod error;

pub use adapter::RestAdapter;
