mod command_runner;
mod source_reader;
mod version_control;

pub use command_runner::{CommandOutput, CommandRunner};
pub use source_reader::SourceReader;
pub use version_control::VersionControl;
