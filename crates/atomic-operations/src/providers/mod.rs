mod command;
mod git;
mod source;

pub use command::ShellCommandRunner;
pub use git::Git2VersionControl;
pub use source::FileSystemSourceReader;
