pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod inflight;
pub mod sync;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use dispatcher::{CommandDispatcher, HttpDispatcher};
pub use endpoints::BackendUrl;
pub use error::{RemoteError, Result};
pub use sync::FileSyncClient;
pub use workspace::{FileWorkspace, LoadTicket};
