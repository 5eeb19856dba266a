//! Directory listings: the walker interface, its live and replayed
//! implementations, and cached listing files.

mod entry;
mod file;
mod walker;

pub use entry::ListingEntry;
pub use file::{ListingFile, ListingFileError, ListingFormat};
pub use walker::{ListEntries, ListingError, LiveWalker, ReplayWalker};
