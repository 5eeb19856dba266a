use std::borrow::Borrow;
use std::path::MAIN_SEPARATOR;

use derive_more::{Deref, DerefMut, Display, From, IntoIterator};

/// Ordered path segments relative to some tree root.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Deref, DerefMut, Display, From, IntoIterator,
)]
#[display("{}", _0.join("/"))]
pub struct SegmentPath(Vec<String>);

impl SegmentPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new path with `name` appended.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Drops the first segment, used to rebase a source path onto the target root.
    pub fn without_first(&self) -> Self {
        Self(self.0.iter().skip(1).cloned().collect())
    }

    /// True if any strict prefix of this path is accepted by `is_handled`.
    pub fn has_strict_prefix(&self, mut is_handled: impl FnMut(&[String]) -> bool) -> bool {
        (0..self.0.len()).any(|len| is_handled(&self.0[..len]))
    }
}

impl Borrow<[String]> for SegmentPath {
    fn borrow(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for SegmentPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// How paths of one tree are split into segments and composed back.
///
/// Live walks always use the platform separator; replayed listings may have
/// been captured on another platform and carry their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStyle {
    separator: char,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::native()
    }
}

impl PathStyle {
    pub fn native() -> Self {
        Self {
            separator: MAIN_SEPARATOR,
        }
    }

    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Returns the part of `path` below `root`, or `None` if `path` is not `root`
    /// itself or one of its descendants.
    ///
    /// The match is component-aware: `/data/photos` does not own `/data/photos2`.
    pub fn strip_root<'a>(&self, root: &str, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(root)?;
        if rest.is_empty() {
            return Some(rest);
        }
        if root.is_empty() || root.ends_with(self.separator) {
            return Some(rest.trim_start_matches(self.separator));
        }
        rest.strip_prefix(self.separator)
            .map(|rest| rest.trim_start_matches(self.separator))
    }

    /// Splits a root-relative path into segments, dropping empty ones.
    pub fn split(&self, relative: &str) -> SegmentPath {
        relative
            .split(self.separator)
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Composes an absolute path from a root and relative segments.
    pub fn join<S: AsRef<str>>(&self, root: &str, segments: &[S]) -> String {
        let mut path = root.to_string();
        for segment in segments {
            if !path.is_empty() && !path.ends_with(self.separator) {
                path.push(self.separator);
            }
            path.push_str(segment.as_ref());
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/data/photos", "/data/photos", Some(""))]
    #[case("/data/photos", "/data/photos/a/b", Some("a/b"))]
    #[case("/data/photos/", "/data/photos/a", Some("a"))]
    #[case("/data/photos", "/data/photos2/a", None)]
    #[case("/data/photos", "/other/a", None)]
    #[case("/data/photos", "/data/photos//a", Some("a"))]
    fn strip_root_is_component_aware(
        #[case] root: &str,
        #[case] path: &str,
        #[case] expected: Option<&str>,
    ) {
        let style = PathStyle::with_separator('/');
        assert_eq!(style.strip_root(root, path), expected);
    }

    #[test]
    fn split_drops_empty_segments() {
        let style = PathStyle::with_separator('\\');
        let segments = style.split("a\\\\b\\c\\");
        assert_eq!(segments, SegmentPath::from_iter(["a", "b", "c"]));
        assert!(style.split("").is_empty());
    }

    #[test]
    fn join_does_not_double_separators() {
        let style = PathStyle::with_separator('/');
        assert_eq!(style.join("/root", &["a", "b"]), "/root/a/b");
        assert_eq!(style.join("/root/", &["a"]), "/root/a");
        assert_eq!(style.join::<&str>("/root", &[]), "/root");
        assert_eq!(style.join("", &["a", "b"]), "a/b");
    }

    #[test]
    fn join_handles_drive_relative_roots() {
        let style = PathStyle::with_separator('\\');
        assert_eq!(
            style.join("I:files\\photos", &["2020", "img.jpg"]),
            "I:files\\photos\\2020\\img.jpg"
        );
    }

    #[test]
    fn strict_prefix_excludes_the_path_itself() {
        let path = SegmentPath::from_iter(["a", "b"]);
        assert!(path.has_strict_prefix(|prefix| prefix == ["a".to_string()]));
        assert!(!path.has_strict_prefix(|prefix| prefix == ["a".to_string(), "b".to_string()]));
        assert!(path.has_strict_prefix(|prefix| prefix.is_empty()));
    }

    #[test]
    fn display_joins_with_slashes() {
        let path = SegmentPath::from_iter(["a", "b c"]);
        assert_eq!(path.to_string(), "a/b c");
        assert_eq!(path.without_first().to_string(), "b c");
        assert_eq!(SegmentPath::new().child("x").to_string(), "x");
    }
}
