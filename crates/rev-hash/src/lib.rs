//! Object identity for the revr revision resolver.
//!
//! This crate provides the core `ObjectId` type (a 20-byte SHA-1), hex
//! encoding/decoding, and hash computation for object content.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use oid::{ObjectId, HEX_LEN};
