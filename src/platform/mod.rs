//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (`Date.now()` on web, system clock natively)
//! - Storage (LocalStorage on web, files natively)

pub mod storage;
pub mod time;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use time::{Clock, SteppingClock, SystemClock, iso_timestamp};
