pub mod command;
pub mod execution;
pub mod file;
pub mod project;

pub use command::*;
pub use execution::*;
pub use file::*;
pub use project::*;
