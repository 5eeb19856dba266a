use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

type RawEntry = (String, Vec<String>, Vec<String>);

/// One directory as reported by a walker.
///
/// Serialized as a `[path, [subdirectories...], [files...]]` triple so cached
/// listings stay readable and compatible with plain `os.walk`-style dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct ListingEntry {
    pub path: String,
    /// Informational only, the tree is shaped by the paths of later entries.
    pub subdirectories: Vec<String>,
    pub files: Vec<String>,
}

impl ListingEntry {
    pub fn new<S: Into<String>>(
        path: impl Into<String>,
        subdirectories: impl IntoIterator<Item = S>,
        files: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            path: path.into(),
            subdirectories: subdirectories.into_iter().map(Into::into).collect(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RawEntry> for ListingEntry {
    fn from((path, subdirectories, files): RawEntry) -> Self {
        Self {
            path,
            subdirectories,
            files,
        }
    }
}

impl From<ListingEntry> for RawEntry {
    fn from(entry: ListingEntry) -> Self {
        (entry.path, entry.subdirectories, entry.files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_a_triple() {
        let entry = ListingEntry::new("/root/a", ["b"], ["x", "y"]);
        let json = serde_json::to_string(&entry).expect("serializable");
        assert_eq!(json, r#"["/root/a",["b"],["x","y"]]"#);
    }

    #[test]
    fn deserializes_a_cached_walk_dump() {
        let json = r#"[["I:files\\photos", ["2020"], []], ["I:files\\photos\\2020", [], ["a.jpg"]]]"#;
        let entries: Vec<ListingEntry> = serde_json::from_str(json).expect("valid listing");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].path, "I:files\\photos\\2020");
        assert_eq!(entries[1].files, vec!["a.jpg".to_string()]);
        assert!(entries[1].subdirectories.is_empty());
    }
}
