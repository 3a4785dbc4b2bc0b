//! Derivation of flat file names and the two include literal forms.
//!
//! A file at `include/foo/baz/qux.h` has the segments `["foo", "baz"]` and is
//! flattened to `foo_baz_qux.h`. Names that already contain `_` are not
//! escaped, so two different paths may collapse onto the same flat name; see
//! [`crate::flatten::find_collisions`].

/// Separator placed between segments in a flat name.
pub const FLAT_SEPARATOR: &str = "_";
/// Separator placed between segments in a nested include literal.
pub const NESTED_SEPARATOR: &str = "/";

/// Joins `segments` and `base_name` with `_` and appends `ext` unchanged.
pub fn flat_name(segments: &[String], base_name: &str, ext: &str) -> String {
    if segments.is_empty() {
        return format!("{base_name}{ext}");
    }
    let prefix = segments.join(FLAT_SEPARATOR);
    format!("{prefix}{FLAT_SEPARATOR}{base_name}{ext}")
}

/// Splits a file name into its base name and extension. The extension starts
/// at the last `.` and keeps it; a name without a dot has no extension.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) => file_name.split_at(index),
        None => (file_name, ""),
    }
}

/// Flat name of `file_name` found below `segments`.
pub fn flat_file_name(segments: &[String], file_name: &str) -> String {
    let (base_name, ext) = split_file_name(file_name);
    flat_name(segments, base_name, ext)
}

/// The bracketed include form, e.g. `<foo/bar.h>`.
pub fn old_literal(segments: &[String], file_name: &str) -> String {
    if segments.is_empty() {
        return format!("<{file_name}>");
    }
    let relative = segments.join(NESTED_SEPARATOR);
    format!("<{relative}{NESTED_SEPARATOR}{file_name}>")
}

/// The quoted flat include form, e.g. `"foo_bar.h"`.
pub fn new_literal(segments: &[String], file_name: &str) -> String {
    format!("\"{}\"", flat_file_name(segments, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn split_keeps_the_dot_on_the_extension() {
        assert_eq!(split_file_name("bar.h"), ("bar", ".h"));
        assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_file_name("Makefile"), ("Makefile", ""));
        assert_eq!(split_file_name(".clang-format"), ("", ".clang-format"));
    }

    #[test]
    fn flat_file_name_reassembles_the_original_name() {
        let path = segments(&["net", "tcp"]);
        for name in ["socket.hpp", "README", ".hidden", "a.b.c"] {
            assert_eq!(flat_file_name(&path, name), format!("net_tcp_{name}"));
        }
    }

    #[test]
    fn root_level_files_keep_their_name() {
        assert_eq!(flat_name(&[], "config", ".h"), "config.h");
        assert_eq!(old_literal(&[], "config.h"), "<config.h>");
        assert_eq!(new_literal(&[], "config.h"), "\"config.h\"");
    }
}
