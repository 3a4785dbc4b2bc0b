//! Core library for the include-flattener command line application.
//!
//! The library turns an `include`/`src` source tree into a single flat
//! directory. Work happens in two phases: [`plan::plan`] walks both roots and
//! builds the include replacement table without writing anything, and
//! [`plan::apply`] writes the rewritten files once the caller confirms. File
//! naming lives in [`flattener::naming`], traversal in [`flattener::walk`],
//! the include rewrite table in [`flattener::table`], and the executor in
//! [`flattener::flatten`].

pub mod flattener;

pub use flattener::{
    Result, ToolError, error, flatten, logging, naming, plan, table, tree, walk,
};
