//! Shared foundational types used across the phd toolchain.
//!
//! This crate provides core types including interned identifiers, content
//! hashing, and common result types shared by the parser, elaborator, and
//! emitter crates.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, PhdResult};
