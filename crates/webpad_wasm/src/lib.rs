//! Browser bridge for the WebPad core.

pub mod api;
pub mod console;
pub mod session;

pub use session::{PageDownload, PlaygroundSession};
