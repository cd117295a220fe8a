//! Live host: runs the engine inside a Chromium page over CDP.

mod shared;
mod worker;

pub use shared::{TimeoutConfig, to_dom_error};
pub use worker::{ChromiumDocument, ChromiumWatch, ChromiumWorker, WaitStrategy};
