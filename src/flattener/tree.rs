use std::fmt;

use crate::flattener::walk::WalkReport;

/// Indented listing of a walked tree, for operator review only.
///
/// ```text
/// |config.h
/// /foo
///   |bar.h
///   /baz
///     |qux.h
/// ```
pub struct TreeView<'a> {
    report: &'a WalkReport,
}

impl<'a> TreeView<'a> {
    pub fn new(report: &'a WalkReport) -> Self {
        Self { report }
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for listing in &self.report.listings {
            let Some(name) = listing.segments.last() else {
                for file in &listing.files {
                    writeln!(f, "|{file}")?;
                }
                continue;
            };
            let indent = "  ".repeat(listing.depth() - 1);
            writeln!(f, "{indent}/{name}")?;
            for file in &listing.files {
                writeln!(f, "{indent}  |{file}")?;
            }
        }
        for failure in &self.report.failures {
            writeln!(f, "!{}", failure.error)?;
        }
        Ok(())
    }
}
