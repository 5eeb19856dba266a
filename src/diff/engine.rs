use std::collections::HashSet;

use tracing::{debug, info};

use crate::tree::{SegmentPath, Tree, TreeNode};

/// Outcome for one source directory that was not covered by an ancestor's
/// recursive copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The directory does not exist on the target at all.
    Missing,
    /// The directory exists on the target; the file sets may still differ.
    Present {
        only_in_source: Vec<String>,
        only_in_target: Vec<String>,
    },
}

impl Classification {
    /// Directory exists on both sides with the same files.
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            Classification::Present { only_in_source, only_in_target }
                if only_in_source.is_empty() && only_in_target.is_empty()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// Path relative to the source root.
    pub source_segments: SegmentPath,
    /// Path relative to the target root, used both for lookups and subsumption.
    pub target_segments: SegmentPath,
    pub classification: Classification,
}

/// A target directory holds files the source does not have. Never turned into
/// a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlyInTargetObservation {
    pub segments: SegmentPath,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// One entry per visited, non-subsumed source directory, in source pre-order.
    pub entries: Vec<DiffEntry>,
    pub observations: Vec<OnlyInTargetObservation>,
    /// Source directories skipped because an ancestor is copied recursively.
    pub subsumed: usize,
}

/// Compares a source tree against a target tree.
///
/// The walk must be pre-order: a missing directory is recorded before any of
/// its descendants are visited, which is what lets the descendants be skipped.
pub struct DiffEngine<'a> {
    source: &'a Tree,
    target: &'a Tree,
    skip_root_prefix: bool,
}

impl<'a> DiffEngine<'a> {
    /// With `skip_root_prefix` the source root's own name is dropped from
    /// every path, so source paths address the target root directly. Without
    /// it, the last component of the source root becomes the first segment
    /// and paths land one level deeper on the target.
    pub fn new(source: &'a Tree, target: &'a Tree, skip_root_prefix: bool) -> Self {
        Self {
            source,
            target,
            skip_root_prefix,
        }
    }

    pub fn run(&self) -> DiffReport {
        let mut report = DiffReport::default();
        let mut handled: HashSet<SegmentPath> = HashSet::new();

        let root_segment = self.source.root_segment();

        for (ancestors, node) in self.source.iter() {
            let source_segments = ancestors.child(node.name()).without_first();
            let target_segments = if self.skip_root_prefix {
                source_segments.clone()
            } else {
                std::iter::once(root_segment.clone())
                    .chain(source_segments.iter().cloned())
                    .collect()
            };

            if target_segments.has_strict_prefix(|prefix| handled.contains(prefix)) {
                debug!("Path {} is already being copied", target_segments);
                report.subsumed += 1;
                continue;
            }

            let classification = match self.target.resolve(&target_segments) {
                None => {
                    info!("Path {} does not exist on the target", target_segments);
                    handled.insert(target_segments.clone());
                    Classification::Missing
                }
                Some(target_node) => {
                    let classification = Self::compare_files(node, target_node);
                    if let Classification::Present {
                        only_in_source,
                        only_in_target,
                    } = &classification
                    {
                        if !only_in_source.is_empty() || !only_in_target.is_empty() {
                            info!(
                                "Path {}: {} files only in source, {} files only in target",
                                target_segments,
                                only_in_source.len(),
                                only_in_target.len()
                            );
                        }
                        if !only_in_target.is_empty() {
                            report.observations.push(OnlyInTargetObservation {
                                segments: target_segments.clone(),
                                files: only_in_target.clone(),
                            });
                        }
                    }
                    classification
                }
            };

            report.entries.push(DiffEntry {
                source_segments,
                target_segments,
                classification,
            });
        }

        report
    }

    fn compare_files(source: &TreeNode, target: &TreeNode) -> Classification {
        Classification::Present {
            only_in_source: source
                .files()
                .difference(target.files())
                .cloned()
                .collect(),
            only_in_target: target
                .files()
                .difference(source.files())
                .cloned()
                .collect(),
        }
    }
}
