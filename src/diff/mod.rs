mod engine;

pub use engine::{Classification, DiffEngine, DiffEntry, DiffReport};
