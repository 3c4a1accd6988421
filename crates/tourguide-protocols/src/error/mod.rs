//! Error types for the tourguide protocol layer.

mod page;
mod protocol;
mod store;

pub use page::*;
pub use protocol::*;
pub use store::*;
