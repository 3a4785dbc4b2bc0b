pub mod error;
pub mod flatten;
pub mod logging;
pub mod naming;
pub mod plan;
pub mod table;
pub mod tree;
pub mod walk;

pub use error::{Result, ToolError};
