//! Plan-then-apply orchestration over a target's `include` and `src` roots.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::flattener::error::{Collision, Failure, Result, ToolError};
use crate::flattener::flatten::{FlattenReport, find_collisions, flatten_tree};
use crate::flattener::table::{ReplacementTable, build_table};
use crate::flattener::tree::TreeView;
use crate::flattener::walk::{WalkReport, walk};

/// Name of the header root inside the target directory.
pub const INCLUDE_DIR: &str = "include";
/// Name of the source root inside the target directory.
pub const SRC_DIR: &str = "src";

/// Everything discovered about a target before anything is written.
#[derive(Debug, Serialize)]
pub struct Plan {
    pub target: PathBuf,
    pub output: PathBuf,
    pub include: WalkReport,
    pub src: WalkReport,
    pub table: ReplacementTable,
    pub collisions: Vec<Collision>,
}

impl Plan {
    pub fn include_tree(&self) -> TreeView<'_> {
        TreeView::new(&self.include)
    }

    pub fn src_tree(&self) -> TreeView<'_> {
        TreeView::new(&self.src)
    }

    /// Directories or entries the walks had to skip.
    pub fn walk_failures(&self) -> impl Iterator<Item = &Failure> {
        self.include.failures.iter().chain(&self.src.failures)
    }
}

/// Result of [`apply`].
#[derive(Debug)]
pub struct ApplyReport {
    pub flatten: FlattenReport,
    /// Number of walk failures carried over from the plan.
    pub walk_failures: usize,
}

impl ApplyReport {
    pub fn failure_count(&self) -> usize {
        self.flatten.failures.len() + self.walk_failures
    }
}

/// Validates the target layout, walks both roots and builds the replacement
/// table. Nothing is written.
#[instrument(
    level = "info",
    skip_all,
    fields(target = %target.display(), output = %output.display())
)]
pub fn plan(target: &Path, output: &Path) -> Result<Plan> {
    let (include_root, src_root) = validate_layout(target, output)?;

    let include = walk(&include_root);
    let src = walk(&src_root);
    let table = build_table(&include);
    let collisions = find_collisions([&include, &src]);
    if !collisions.is_empty() {
        warn!(count = collisions.len(), "flat name collisions detected");
    }
    info!(
        include_files = include.file_count(),
        src_files = src.file_count(),
        entries = table.len(),
        "plan ready"
    );

    Ok(Plan {
        target: target.to_path_buf(),
        output: output.to_path_buf(),
        include,
        src,
        table,
        collisions,
    })
}

/// Flattens `include` then `src` into the output directory of `plan`.
///
/// Refuses to write anything unless `confirmed` is set and the plan has no
/// collisions. Per-file failures do not stop the run and are returned in the
/// report.
#[instrument(level = "info", skip_all, fields(output = %plan.output.display()))]
pub fn apply(plan: &Plan, confirmed: bool) -> Result<ApplyReport> {
    if !confirmed {
        return Err(ToolError::NotConfirmed);
    }
    if !plan.collisions.is_empty() {
        return Err(ToolError::Collisions(plan.collisions.clone()));
    }

    let mut flatten = flatten_tree(&plan.include, &plan.table, &plan.output);
    flatten.merge(flatten_tree(&plan.src, &plan.table, &plan.output));
    info!(
        written = flatten.written.len(),
        replacements = flatten.replacement_count(),
        "apply finished"
    );

    Ok(ApplyReport {
        flatten,
        walk_failures: plan.walk_failures().count(),
    })
}

fn validate_layout(target: &Path, output: &Path) -> Result<(PathBuf, PathBuf)> {
    if !target.is_dir() {
        return Err(ToolError::MissingTarget(target.to_path_buf()));
    }
    let include_root = target.join(INCLUDE_DIR);
    if !include_root.is_dir() {
        return Err(ToolError::MissingLayoutDir {
            target: target.to_path_buf(),
            name: INCLUDE_DIR,
        });
    }
    let src_root = target.join(SRC_DIR);
    if !src_root.is_dir() {
        return Err(ToolError::MissingLayoutDir {
            target: target.to_path_buf(),
            name: SRC_DIR,
        });
    }
    if !output.is_dir() {
        return Err(ToolError::MissingOutput(output.to_path_buf()));
    }
    Ok((include_root, src_root))
}
