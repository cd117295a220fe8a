mod chromium;

pub use chromium::{ChromiumDocument, ChromiumWatch, ChromiumWorker, WaitStrategy};
