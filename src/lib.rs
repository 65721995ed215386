//! Growable array built on raw uninitialized storage.
//!
//! Two layers: [`RawStorage`] owns a block of uninitialized memory sized for
//! a fixed element capacity and knows nothing about object lifetimes, while
//! [`Vector`] owns a block plus a count of live leading slots and implements
//! growth, insertion and removal on top of it. Every allocating operation is
//! fallible and returns [`AllocError`]; operations that run element code are
//! panic-safe as documented on each of them.

#[macro_use]
mod logging;
mod raw;
mod vector;

pub use raw::{AllocError, RawStorage};
pub use vector::Vector;

#[cfg(test)]
pub mod dropflag;
