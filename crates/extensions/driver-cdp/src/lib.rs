//! # Tourguide CDP Driver
//!
//! Runs playback against a real Chrome tab over the Chrome DevTools
//! Protocol.
//!
//! - [`CdpClient`] / [`PageSession`] - connection and per-tab command channel
//! - [`CdpPage`] - every page effect seam, plus the page event stream
//! - [`LocalStorageStore`] - resume state in the page's `localStorage`

pub mod cdp;
mod page;
mod scripts;
mod storage;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use page::CdpPage;
pub use scripts::BINDING;
pub use storage::LocalStorageStore;
