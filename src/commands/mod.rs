//! Copy commands: generation from a diff, rendering for the copy tool, and
//! the sinks that consume them.

mod generator;
mod render;
mod sink;

pub use generator::{CommandGenerator, CopyCommand};
pub use render::CommandRenderer;
pub use sink::{ExecuteSink, PrintSink, ScriptSink, SinkError, SinkKind, drain};
