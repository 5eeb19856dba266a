use derive_more::Display;

use crate::diff::{Classification, DiffEntry};
use crate::tree::Tree;

/// A single copy operation. Directory copies are recursive, file copies put
/// one file into an existing target directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{source} -> {destination}{}", if *recursive { " (recursive)" } else { "" })]
pub struct CopyCommand {
    pub source: String,
    pub destination: String,
    pub recursive: bool,
}

/// Turns diff entries into copy commands with absolute paths on both sides.
pub struct CommandGenerator<'a> {
    source: &'a Tree,
    target: &'a Tree,
}

impl<'a> CommandGenerator<'a> {
    pub fn new(source: &'a Tree, target: &'a Tree) -> Self {
        Self { source, target }
    }

    pub fn generate(&self, entries: &[DiffEntry]) -> Vec<CopyCommand> {
        entries
            .iter()
            .flat_map(|entry| self.commands_for(entry))
            .collect()
    }

    fn commands_for(&self, entry: &DiffEntry) -> Vec<CopyCommand> {
        let destination = self.target.absolute_path(&entry.target_segments);
        match &entry.classification {
            Classification::Missing => vec![CopyCommand {
                source: self.source.absolute_path(&entry.source_segments),
                destination,
                recursive: true,
            }],
            Classification::Present { only_in_source, .. } => only_in_source
                .iter()
                .map(|file| CopyCommand {
                    source: self
                        .source
                        .absolute_path(&entry.source_segments.child(file.as_str())),
                    destination: destination.clone(),
                    recursive: false,
                })
                .collect(),
        }
    }
}
