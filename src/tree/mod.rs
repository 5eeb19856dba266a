//! In-memory directory trees built from listings.
//!
//! A [`Tree`] owns its nodes outright and is immutable once the
//! [`TreeBuilder`] has finished with it.

mod builder;
mod node;
mod segments;

pub use builder::{TreeBuildError, TreeBuilder};
pub use node::{Tree, TreeNode};
pub use segments::{PathStyle, SegmentPath};
