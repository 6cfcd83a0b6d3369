pub mod error;
pub mod path;
mod status;
pub mod types;

pub use error::*;
pub use types::*;
