use std::io::{Stdout, Write};
use std::path::PathBuf;
use std::process::Stdio;

use clap::ValueEnum;
use colored::Colorize;
use compio::{fs, io::compat::AsyncStream, process::Command};
use futures::{AsyncBufReadExt, AsyncRead, StreamExt, io::BufReader};
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::commands::{CommandRenderer, CopyCommand};

const PRINT_HEADER: &str = "Copy these commands to a .bat file or execute them manually:";

/// Where generated copy commands end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SinkKind {
    /// Print one command per line to stdout
    #[default]
    Print,
    /// Write the commands to a script file
    Script,
    /// Run the copy tool for every command
    Execute,
}

/// Consumer of the ordered copy commands.
pub trait CommandSink {
    async fn accept(&mut self, command: &CopyCommand) -> Result<(), SinkError>;

    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Feeds every command to `sink` in order, then lets it finish.
pub async fn drain<S: CommandSink>(mut sink: S, commands: &[CopyCommand]) -> Result<(), SinkError> {
    for command in commands {
        sink.accept(command).await?;
    }
    sink.finish().await
}

/// Prints a header followed by one rendered command per line.
///
/// The header is written lazily with the first command, so a run with nothing
/// to copy prints nothing at all.
pub struct PrintSink<W = Stdout> {
    out: W,
    renderer: CommandRenderer,
    color: bool,
    header_written: bool,
}

impl PrintSink<Stdout> {
    pub fn stdout(renderer: CommandRenderer) -> Self {
        let color = supports_color::on(supports_color::Stream::Stdout).is_some();
        Self::new(std::io::stdout(), renderer, color)
    }
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W, renderer: CommandRenderer, color: bool) -> Self {
        Self {
            out,
            renderer,
            color,
            header_written: false,
        }
    }

    fn write_header(&mut self) -> Result<(), SinkError> {
        let header = if self.color {
            PRINT_HEADER.bold().to_string()
        } else {
            PRINT_HEADER.to_string()
        };
        writeln!(self.out, "{header}\n").context(PrintSnafu)?;
        self.header_written = true;
        Ok(())
    }
}

impl<W: Write> CommandSink for PrintSink<W> {
    async fn accept(&mut self, command: &CopyCommand) -> Result<(), SinkError> {
        if !self.header_written {
            self.write_header()?;
        }
        writeln!(self.out, "{}", self.renderer.render(command)).context(PrintSnafu)
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.out.flush().context(PrintSnafu)
    }
}

/// Collects rendered commands and writes them to a script file at the end.
pub struct ScriptSink {
    path: PathBuf,
    renderer: CommandRenderer,
    lines: Vec<String>,
}

impl ScriptSink {
    pub fn new(path: impl Into<PathBuf>, renderer: CommandRenderer) -> Self {
        Self {
            path: path.into(),
            renderer,
            lines: Vec::new(),
        }
    }
}

impl CommandSink for ScriptSink {
    async fn accept(&mut self, command: &CopyCommand) -> Result<(), SinkError> {
        self.lines.push(self.renderer.render(command));
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        let mut contents = self.lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(&self.path, contents.into_bytes())
            .await
            .0
            .context(ScriptSnafu {
                file_path: self.path.display().to_string(),
            })?;
        info!(
            "Wrote {} commands to {}",
            self.lines.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Runs the copy tool directly, one command at a time, stopping at the first
/// failure.
pub struct ExecuteSink {
    renderer: CommandRenderer,
    completed: usize,
}

impl ExecuteSink {
    pub fn new(renderer: CommandRenderer) -> Self {
        Self {
            renderer,
            completed: 0,
        }
    }

    /// Creates the command with piped output; no shell is involved, so
    /// arguments are passed unquoted.
    fn create_command(tokens: &[String]) -> Option<Command> {
        let (program, args) = tokens.split_first()?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());
        Some(cmd)
    }
}

impl CommandSink for ExecuteSink {
    async fn accept(&mut self, command: &CopyCommand) -> Result<(), SinkError> {
        let rendered = self.renderer.render(command);
        let Some(mut cmd) = Self::create_command(&self.renderer.tokens(command)) else {
            return Ok(());
        };

        info!("Copying {}", command);
        debug!("Running {}", rendered);
        let mut child = cmd.spawn().context(SpawnSnafu {
            command: rendered.clone(),
        })?;

        let stdout = child.stdout.take().map(AsyncStream::new);
        let stderr = child.stderr.take().map(AsyncStream::new);
        let (status, (), ()) = futures::join!(
            child.wait(),
            forward_lines(stdout, "stdout"),
            forward_lines(stderr, "stderr"),
        );
        let status = status.context(WaitSnafu {
            command: rendered.clone(),
        })?;

        ensure!(
            status.success(),
            UnsuccessfulCopySnafu {
                command: rendered,
                status: status.code().unwrap_or(-1),
            }
        );
        self.completed += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        info!("Completed {} copy commands", self.completed);
        Ok(())
    }
}

/// Logs every non-empty line the copy tool writes.
async fn forward_lines<R: AsyncRead + Unpin>(stream: Option<R>, label: &str) {
    let Some(stream) = stream else {
        return;
    };
    let mut lines = BufReader::new(stream).lines();

    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => {
                if !line.trim().is_empty() {
                    info!("[{}] {}", label, line.trim());
                }
            }
            Err(e) => {
                debug!("Error reading {} of the copy tool: {}", label, e);
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SinkError {
    #[snafu(display("Failed to print copy commands"))]
    PrintError { source: std::io::Error },
    #[snafu(display("Failed to write the copy script: {}", file_path))]
    ScriptError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to spawn copy command '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for copy command '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Copy command '{}' failed with exit code {}", command, status))]
    UnsuccessfulCopy { command: String, status: i32 },
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::CopyToolConfig;

    fn copy(source: &str, destination: &str, recursive: bool) -> CopyCommand {
        CopyCommand {
            source: source.to_string(),
            destination: destination.to_string(),
            recursive,
        }
    }

    fn tool(executable: &str) -> CopyToolConfig {
        CopyToolConfig {
            executable: executable.to_string(),
            recursive_flags: vec!["-r".to_string()],
            common_flags: Vec::new(),
            source_flag: String::new(),
            destination_flag: String::new(),
        }
    }

    #[compio::test]
    async fn print_sink_writes_header_then_one_line_per_command() {
        let mut out = Vec::new();
        let sink = PrintSink::new(&mut out, CommandRenderer::new(tool("cp")), false);

        drain(sink, &[copy("/a", "/b", true), copy("/a/my file", "/b", false)])
            .await
            .expect("printing succeeds");

        let printed = String::from_utf8(out).expect("utf-8 output");
        assert_eq!(
            printed,
            format!("{PRINT_HEADER}\n\ncp -r /a /b\ncp \"/a/my file\" /b\n")
        );
    }

    #[compio::test]
    async fn print_sink_stays_silent_without_commands() {
        let mut out = Vec::new();
        let sink = PrintSink::new(&mut out, CommandRenderer::new(tool("cp")), false);

        drain(sink, &[]).await.expect("printing succeeds");

        assert!(out.is_empty());
    }

    #[compio::test]
    async fn script_sink_writes_every_command() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("sync.bat");
        let sink = ScriptSink::new(&path, CommandRenderer::new(CopyToolConfig::default()));

        drain(sink, &[copy("Z:photos\\a", "I:photos\\a", true)])
            .await
            .expect("script is written");

        let script = std::fs::read_to_string(&path).expect("script exists");
        assert_eq!(script.lines().count(), 1);
        assert!(script.contains("--recursive"));
        assert!(script.ends_with("-s Z:photos\\a -d I:photos\\a\n"));
    }

    #[compio::test]
    async fn script_sink_reports_unwritable_paths() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("missing-dir").join("sync.bat");
        let sink = ScriptSink::new(&path, CommandRenderer::new(CopyToolConfig::default()));

        let result = drain(sink, &[copy("/a", "/b", true)]).await;

        assert!(matches!(result, Err(SinkError::ScriptError { .. })));
    }

    #[cfg(target_family = "unix")]
    #[compio::test]
    async fn execute_sink_copies_with_the_configured_tool() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let source = dir.path().join("source");
        let destination = dir.path().join("destination");
        std::fs::create_dir_all(&source).expect("Failed to create dirs");
        std::fs::write(source.join("file.txt"), "payload").expect("Failed to write file");

        let command = copy(
            &source.to_string_lossy(),
            &destination.to_string_lossy(),
            true,
        );
        drain(ExecuteSink::new(CommandRenderer::new(tool("cp"))), &[command])
            .await
            .expect("cp succeeds");

        let copied = std::fs::read_to_string(destination.join("file.txt")).expect("copied");
        assert_eq!(copied, "payload");
    }

    #[cfg(target_family = "unix")]
    #[compio::test]
    async fn execute_sink_stops_on_failing_copy() {
        let result = drain(
            ExecuteSink::new(CommandRenderer::new(tool("false"))),
            &[copy("/a", "/b", false)],
        )
        .await;

        assert!(matches!(
            result,
            Err(SinkError::UnsuccessfulCopy { status: 1, .. })
        ));
    }

    #[compio::test]
    async fn execute_sink_reports_missing_tool() {
        let result = drain(
            ExecuteSink::new(CommandRenderer::new(tool("arcsync-no-such-copy-tool"))),
            &[copy("/a", "/b", false)],
        )
        .await;

        assert!(matches!(result, Err(SinkError::SpawnError { .. })));
    }
}
