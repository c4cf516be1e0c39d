pub mod error;
pub mod keys;
pub mod line_editor;
pub mod session;
pub mod surface;
pub mod viewport;

pub use error::{Result, TerminalError};
pub use session::{DispatchReceiver, SessionOptions, TerminalSession};
pub use surface::{StdoutSurface, Surface, Transcript, TranscriptSurface, ViewportSize};
pub use viewport::{LifecycleState, ViewportController};
