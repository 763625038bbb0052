//! Text-file upload that becomes a diary entry. The request is validated and
//! answered right away; analysis and storage continue on a background task
//! whose progress can be polled.

pub mod handlers;
pub mod progress;
pub mod validate;

pub use progress::{spawn_sweeper, UploadTracker};
