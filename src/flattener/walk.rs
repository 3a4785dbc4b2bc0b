//! Iterative directory traversal. Symlinked files count as files and
//! symlinked directories are followed, with cycles reported and cut.

use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::flattener::error::{Failure, Result, ToolError};

/// One directory visited by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirListing {
    pub path: PathBuf,
    /// Directory names leading from the walk root to `path`.
    pub segments: Vec<String>,
    /// Names of the regular files directly inside `path`, sorted.
    pub files: Vec<String>,
}

impl DirListing {
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Full path of each listed file.
    pub fn file_paths(&self) -> impl Iterator<Item = (PathBuf, &str)> + '_ {
        self.files
            .iter()
            .map(|name| (self.path.join(name), name.as_str()))
    }
}

/// Everything found below one root.
#[derive(Debug, Serialize)]
pub struct WalkReport {
    pub root: PathBuf,
    /// Visited directories in depth-first pre-order, the root first.
    pub listings: Vec<DirListing>,
    pub failures: Vec<Failure>,
}

impl WalkReport {
    pub fn file_count(&self) -> usize {
        self.listings.iter().map(|listing| listing.files.len()).sum()
    }
}

enum EntryKind {
    File,
    Dir,
    LinkedDir,
    Skip,
}

struct Pending {
    dir: PathBuf,
    segments: Vec<String>,
    /// Canonical directories a followed symlink was entered from.
    link_trail: Vec<PathBuf>,
}

/// Walks `root` depth first using an explicit stack.
///
/// Entries are visited in name order. A directory that cannot be listed is
/// recorded as a failure and its branch is dropped; the walk goes on with the
/// remaining branches. Directory symlinks are followed unless they lead back
/// to a directory already on the current path.
#[instrument(level = "debug", skip_all, fields(root = %root.display()))]
pub fn walk(root: &Path) -> WalkReport {
    let mut report = WalkReport {
        root: root.to_path_buf(),
        listings: Vec::new(),
        failures: Vec::new(),
    };
    let mut pending = vec![Pending {
        dir: root.to_path_buf(),
        segments: Vec::new(),
        link_trail: Vec::new(),
    }];

    while let Some(Pending {
        dir,
        segments,
        link_trail,
    }) = pending.pop()
    {
        let entries = match read_sorted(&dir) {
            Ok(entries) => entries,
            Err(source) => {
                let error = ToolError::DirectoryRead {
                    path: dir.clone(),
                    source,
                };
                warn!(%error, "skipping directory");
                report.failures.push(Failure::new(dir, error));
                continue;
            }
        };

        let mut files = Vec::new();
        let mut subdirs: Vec<(String, Vec<PathBuf>)> = Vec::new();
        for entry in entries {
            let path = entry.path();
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => {
                    let error = ToolError::NonUtf8Name(path.clone());
                    warn!(%error, "skipping entry");
                    report.failures.push(Failure::new(path, error));
                    continue;
                }
            };
            let outcome = match classify(&entry) {
                Ok(EntryKind::File) => {
                    files.push(name);
                    Ok(())
                }
                Ok(EntryKind::Dir) => {
                    subdirs.push((name, link_trail.clone()));
                    Ok(())
                }
                Ok(EntryKind::LinkedDir) => follow_link(&dir, &path, &link_trail)
                    .map(|trail| subdirs.push((name, trail))),
                Ok(EntryKind::Skip) => {
                    debug!(path = %path.display(), "not a file or directory");
                    Ok(())
                }
                Err(source) => Err(ToolError::FileRead {
                    path: path.clone(),
                    source,
                }),
            };
            if let Err(error) = outcome {
                warn!(%error, "skipping entry");
                report.failures.push(Failure::new(path, error));
            }
        }

        // Reversed so the first subdirectory is popped first.
        for (name, trail) in subdirs.iter().rev() {
            let mut child = segments.clone();
            child.push(name.clone());
            pending.push(Pending {
                dir: dir.join(name),
                segments: child,
                link_trail: trail.clone(),
            });
        }

        debug!(dir = %dir.display(), files = files.len(), subdirs = subdirs.len(), "listed");
        report.listings.push(DirListing {
            path: dir,
            segments,
            files,
        });
    }

    report
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}

fn classify(entry: &DirEntry) -> std::io::Result<EntryKind> {
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
        return Ok(EntryKind::Dir);
    }
    if file_type.is_file() {
        return Ok(EntryKind::File);
    }
    if file_type.is_symlink() {
        let target = fs::metadata(entry.path())?;
        if target.is_file() {
            return Ok(EntryKind::File);
        }
        if target.is_dir() {
            return Ok(EntryKind::LinkedDir);
        }
    }
    Ok(EntryKind::Skip)
}

/// Returns the trail to carry below `link`, or a cycle error when the link
/// resolves to an ancestor of a directory on the current path.
fn follow_link(dir: &Path, link: &Path, trail: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let target = fs::canonicalize(link).map_err(|source| ToolError::DirectoryRead {
        path: link.to_path_buf(),
        source,
    })?;
    let here = fs::canonicalize(dir).map_err(|source| ToolError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    if trail.iter().chain([&here]).any(|seen| seen.starts_with(&target)) {
        return Err(ToolError::SymlinkCycle {
            path: link.to_path_buf(),
            target,
        });
    }
    debug!(link = %link.display(), target = %target.display(), "following directory symlink");
    let mut next = trail.to_vec();
    next.push(here);
    Ok(next)
}
