#[allow(clippy::module_inception)]
mod executor;

pub use executor::{ExecutionError, ExecutorCreationError, TreeBuildExecutor, TreeSource};
