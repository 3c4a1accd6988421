//! # Tourguide Resume
//!
//! The persistence adapter: remembers `{mode, stepIndex}` across a full page
//! reload caused by a cross-page step.
//!
//! ## Contract
//!
//! - two plain-string entries, one for the mode and one for the index
//! - both present means "resumable"
//! - written on every index change, read once at start, removed at stop

pub mod adapter;
pub mod store;

pub use adapter::{ResumeKeys, ResumeState, ResumeStore};
pub use store::{FileKeyValueStore, MemoryKeyValueStore};
