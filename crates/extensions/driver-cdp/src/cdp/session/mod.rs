//! CDP page session for interacting with a single tab.

mod core;
mod dom;
mod js;
mod navigation;

pub use self::core::PageSession;
