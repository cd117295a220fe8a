mod document;
mod wait;
mod watch;
mod worker;

pub use document::ChromiumDocument;
pub use wait::WaitStrategy;
pub use watch::ChromiumWatch;
pub use worker::ChromiumWorker;
