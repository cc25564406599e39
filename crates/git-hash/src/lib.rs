//! Hash computation and object identity for the git object model.
//!
//! This crate provides the core `ObjectId` type, hash computation, hex
//! encoding/decoding, and the `OidMap` collection used to index objects by
//! hash while a packfile is being resolved.

mod error;
pub mod hex;
mod algorithm;
mod oid;
pub mod hasher;
pub mod collections;

pub use algorithm::HashAlgorithm;
pub use error::HashError;
pub use oid::ObjectId;
