//! Candidate artifact names for collision-free uploads
//!
//! The worker never overwrites an existing artifact. Instead it probes
//! `file.exe`, `file-1.exe`, `file-2.exe`, ... and takes the first free key.
//! This module only enumerates the candidates; probing is up to the caller.

use std::path::is_separator;

/// Default number of suffixed alternatives tried before giving up
pub const DEFAULT_MAX_SUFFIX: i64 = 10;

/// Split `path` into `(stem, extension)` where the extension keeps its dot.
///
/// Only the final path component is considered, and leading dots of that
/// component never start an extension (`.mozconfig` has none).
fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path
        .char_indices()
        .filter(|(_, c)| is_separator(*c))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    let name = &path[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();

    match name[leading_dots..].rfind('.') {
        Some(dot) => path.split_at(name_start + leading_dots + dot),
        None => (path, ""),
    }
}

/// Candidate names for `path`, original first.
///
/// A negative `max_suffix` yields the original path alone; otherwise the
/// result holds `max_suffix + 1` distinct names in increasing suffix order.
pub fn possible_names(path: &str, max_suffix: i64) -> Vec<String> {
    if max_suffix < 0 {
        return vec![path.to_string()];
    }

    let (stem, ext) = split_extension(path);
    std::iter::once(path.to_string())
        .chain((1..=max_suffix).map(|n| format!("{stem}-{n}{ext}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn as_set(names: Vec<String>) -> HashSet<String> {
        names.into_iter().collect()
    }

    #[test]
    fn test_possible_names() {
        let names = possible_names("/Users/tester/file.exe", 2);
        let expected: HashSet<String> = [
            "/Users/tester/file.exe",
            "/Users/tester/file-1.exe",
            "/Users/tester/file-2.exe",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(as_set(names), expected);
    }

    #[test]
    fn test_possible_names_ordering() {
        assert_eq!(
            possible_names("dir/file.exe", 3),
            vec!["dir/file.exe", "dir/file-1.exe", "dir/file-2.exe", "dir/file-3.exe"]
        );
    }

    #[test]
    fn test_possible_names_negative() {
        assert_eq!(possible_names("file.exe", -1), vec!["file.exe"]);
        assert_eq!(possible_names("file.exe", -50), vec!["file.exe"]);
    }

    #[test]
    fn test_possible_names_zero() {
        assert_eq!(possible_names("file.exe", 0), vec!["file.exe"]);
    }

    #[test]
    fn test_counts_and_distinctness() {
        for n in 0..25 {
            let names = possible_names("a/b/update.complete.mar", n);
            assert_eq!(names.len(), n as usize + 1);
            assert_eq!(as_set(names).len(), n as usize + 1);
        }
    }

    #[test]
    fn test_only_last_extension_is_split() {
        assert_eq!(
            possible_names("firefox.tar.bz2", 1),
            vec!["firefox.tar.bz2", "firefox.tar-1.bz2"]
        );
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(possible_names("bin/firefox", 1), vec!["bin/firefox", "bin/firefox-1"]);
    }

    #[test]
    fn test_dot_in_directory_is_not_extension() {
        assert_eq!(
            possible_names("releases/v1.0/firefox", 1),
            vec!["releases/v1.0/firefox", "releases/v1.0/firefox-1"]
        );
    }

    #[test]
    fn test_hidden_file() {
        assert_eq!(possible_names("home/.mozconfig", 1), vec!["home/.mozconfig", "home/.mozconfig-1"]);
        assert_eq!(possible_names(".config.json", 1), vec![".config.json", ".config-1.json"]);
    }
}
