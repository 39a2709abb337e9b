//! Async service around an [`IndexSession`](crate::session::IndexSession):
//! rebuild queue, edit debouncing and superseded-request tracking.

mod debounce;
mod queue;
mod requests;
#[allow(clippy::module_inception)]
mod service;


pub use debounce::Debouncer;
pub use queue::{RebuildJob, RebuildQueue};
pub use requests::{RequestId, RequestTracker};
pub use service::IndexService;
