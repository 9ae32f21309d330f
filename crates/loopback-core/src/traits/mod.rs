//! Core traits defined in `loopback-core` and implemented by other crates.

pub mod adapter;
pub mod persistable;
pub mod repository;
pub mod transferable;

pub use adapter::{Adapter, ByteSource, ByteStream, RestRequest, UploadRequest};
pub use persistable::Persistable;
pub use repository::Repository;
pub use transferable::FileTransferable;
