pub mod error;
pub mod output;

pub use error::*;
pub use output::*;
