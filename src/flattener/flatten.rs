//! Writes rewritten copies of walked files into the flat output directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::flattener::error::{Collision, Failure, Result, ToolError};
use crate::flattener::naming::flat_file_name;
use crate::flattener::table::ReplacementTable;
use crate::flattener::walk::WalkReport;

/// A file copied into the flat output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Number of include literals rewritten in this file.
    pub replacements: usize,
}

/// Outcome of flattening one or more trees.
#[derive(Debug, Default)]
pub struct FlattenReport {
    pub written: Vec<WrittenFile>,
    pub failures: Vec<Failure>,
}

impl FlattenReport {
    pub fn merge(&mut self, other: FlattenReport) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }

    pub fn replacement_count(&self) -> usize {
        self.written.iter().map(|file| file.replacements).sum()
    }
}

/// Writes a rewritten copy of every file of `tree` into `out_dir`.
///
/// Content is handled as raw bytes, whatever its encoding. Existing files in
/// `out_dir` with the same flat name are overwritten. A file that cannot be
/// read or written is recorded in the report and skipped.
#[instrument(
    level = "info",
    skip_all,
    fields(root = %tree.root.display(), out_dir = %out_dir.display())
)]
pub fn flatten_tree(
    tree: &WalkReport,
    table: &ReplacementTable,
    out_dir: &Path,
) -> FlattenReport {
    let mut report = FlattenReport::default();

    for listing in &tree.listings {
        for (source, file_name) in listing.file_paths() {
            let destination = out_dir.join(flat_file_name(&listing.segments, file_name));
            match flatten_file(&source, &destination, table) {
                Ok(replacements) => {
                    debug!(
                        source = %source.display(),
                        destination = %destination.display(),
                        replacements,
                        "flattened"
                    );
                    report.written.push(WrittenFile {
                        source,
                        destination,
                        replacements,
                    });
                }
                Err(error) => {
                    warn!(%error, "skipping file");
                    report.failures.push(Failure::new(source, error));
                }
            }
        }
    }

    info!(
        written = report.written.len(),
        failed = report.failures.len(),
        "tree flattened"
    );
    report
}

fn flatten_file(input: &Path, output: &Path, table: &ReplacementTable) -> Result<usize> {
    let content = fs::read(input).map_err(|source| ToolError::FileRead {
        path: input.to_path_buf(),
        source,
    })?;
    let rewrite = table.rewrite(&content);
    if output.exists() {
        debug!(output = %output.display(), "overwriting existing output");
    }
    fs::write(output, rewrite.bytes).map_err(|source| ToolError::FileWrite {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(rewrite.replacements)
}

/// Groups the files of all `trees` by flat name and returns every name
/// claimed by more than one source, sorted by name.
pub fn find_collisions<'a>(trees: impl IntoIterator<Item = &'a WalkReport>) -> Vec<Collision> {
    let mut claims: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for tree in trees {
        for listing in &tree.listings {
            for (source, file_name) in listing.file_paths() {
                claims
                    .entry(flat_file_name(&listing.segments, file_name))
                    .or_default()
                    .push(source);
            }
        }
    }

    claims
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(flat_name, sources)| Collision { flat_name, sources })
        .collect()
}
