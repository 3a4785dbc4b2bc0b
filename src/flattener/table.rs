//! The include replacement table and the literal rewrite it drives.

use std::fmt;

use bstr::ByteSlice;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::flattener::naming::{new_literal, old_literal};
use crate::flattener::walk::WalkReport;

/// Width the old literal column is padded to when the table is printed.
pub const OLD_LITERAL_WIDTH: usize = 50;

/// Maps a nested include target onto its flat replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementEntry {
    /// Bracketed nested form, e.g. `<foo/bar.h>`.
    pub old_literal: String,
    /// Quoted flat form, e.g. `"foo_bar.h"`.
    pub new_literal: String,
}

/// Ordered replacement entries derived from the `include` tree.
///
/// Rewriting is plain substring replacement over raw bytes, so files in any
/// ASCII-compatible encoding pass through untouched apart from the matched
/// literals. It does not parse include directives, so a matching literal
/// inside a comment or a string literal is rewritten as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReplacementTable {
    entries: Vec<ReplacementEntry>,
}

/// Content produced by [`ReplacementTable::rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub bytes: Vec<u8>,
    pub replacements: usize,
}

impl ReplacementTable {
    pub fn entries(&self) -> &[ReplacementEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces every occurrence of every old literal, entry by entry in
    /// table order.
    pub fn rewrite(&self, content: &[u8]) -> Rewrite {
        let mut bytes = content.to_vec();
        let mut replacements = 0;
        for entry in &self.entries {
            let hits = bytes.find_iter(&entry.old_literal).count();
            if hits > 0 {
                bytes = bytes.replace(&entry.old_literal, &entry.new_literal);
                replacements += hits;
            }
        }
        Rewrite {
            bytes,
            replacements,
        }
    }
}

impl FromIterator<ReplacementEntry> for ReplacementTable {
    fn from_iter<I: IntoIterator<Item = ReplacementEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ReplacementTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{:<width$} --->    {}",
                entry.old_literal,
                entry.new_literal,
                width = OLD_LITERAL_WIDTH
            )?;
        }
        Ok(())
    }
}

/// Builds one entry per file of the walked `include` tree, in walk order.
///
/// Branches the walk could not read contribute nothing; entries from their
/// siblings are kept.
#[instrument(level = "debug", skip_all, fields(root = %include.root.display()))]
pub fn build_table(include: &WalkReport) -> ReplacementTable {
    let table: ReplacementTable = include
        .listings
        .iter()
        .flat_map(|listing| {
            listing.files.iter().map(|file_name| ReplacementEntry {
                old_literal: old_literal(&listing.segments, file_name),
                new_literal: new_literal(&listing.segments, file_name),
            })
        })
        .collect();
    debug!(entries = table.len(), "replacement table built");
    table
}
