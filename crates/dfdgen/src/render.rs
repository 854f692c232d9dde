//! Invocation of the external diagram renderer.
//!
//! A [`Renderer`] turns diagram source into an [`Artifact`] of one
//! [`OutputFormat`]. [`ToolRenderer`] is the production implementation: it
//! writes the source to a temporary file, runs
//!
//! ```text
//! <program> <args...> -o <output> -f <format> --no-graph-title <input>
//! ```
//!
//! and waits for the process to finish. The input file is removed before
//! `render` returns, on every path. The output lives in a private temporary
//! directory owned by the returned [`Artifact`] and is deleted when the
//! artifact is dropped.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, trace};
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;

use dfdgen_core::OutputFormat;

use crate::config::RendererConfig;

/// Errors from a single renderer invocation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer ran and exited with a non-zero status.
    ///
    /// `diagnostic` is the renderer's error stream, unmodified.
    #[error("{diagnostic}")]
    Failed {
        diagnostic: String,
        code: Option<i32>,
    },

    #[error("Renderer exited successfully but produced no {format} output")]
    MissingOutput { format: OutputFormat },

    #[error("Renderer `{}` could not be started: {source}", .program.display())]
    ToolUnavailable { program: PathBuf, source: io::Error },

    #[error("Renderer `{}` did not finish within {after:?}", .program.display())]
    TimedOut { program: PathBuf, after: Duration },

    #[error("I/O error while preparing render: {0}")]
    Io(#[from] io::Error),
}

impl RenderError {
    /// Whether the error points at the deployment rather than the input.
    ///
    /// Operational errors cannot be fixed by editing the diagram source.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Failed { .. } | Self::MissingOutput { .. })
    }
}

/// A rendered file on disk.
///
/// The file is deleted, together with its directory, when the artifact is
/// dropped.
#[derive(Debug)]
pub struct Artifact {
    format: OutputFormat,
    path: PathBuf,
    _dir: TempDir,
}

impl Artifact {
    /// Wraps a file inside `dir`, taking ownership of the directory.
    pub fn new(dir: TempDir, path: PathBuf, format: OutputFormat) -> Self {
        Self {
            format,
            path,
            _dir: dir,
        }
    }

    /// Writes `bytes` into a fresh temporary directory as an artifact.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be created.
    pub fn from_bytes(bytes: &[u8], format: OutputFormat) -> io::Result<Self> {
        let dir = temp_dir()?;
        let path = output_path(dir.path(), format);
        fs::write(&path, bytes)?;
        Ok(Self::new(dir, path, format))
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the artifact contents.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// Something that can render diagram source into an artifact.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders `source` into `format`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when no artifact was produced. No output
    /// path is exposed in that case.
    async fn render(&self, source: &str, format: OutputFormat) -> Result<Artifact, RenderError>;
}

/// Renders by running the external `data-flow-diagram` style tool.
#[derive(Debug, Clone)]
pub struct ToolRenderer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolRenderer {
    /// Creates a renderer running `program` with no extra arguments and no timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Creates a renderer from the `[renderer]` configuration section.
    pub fn from_config(config: &RendererConfig) -> Self {
        Self {
            program: config.program().clone(),
            args: config.args().to_vec(),
            timeout: config.timeout(),
        }
    }

    /// Sets arguments placed before the standard flags.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the time after which the renderer process is killed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, input: &Path, output: &Path, format: OutputFormat) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-o")
            .arg(output)
            .arg("-f")
            .arg(format.as_str())
            .arg("--no-graph-title")
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Renderer for ToolRenderer {
    async fn render(&self, source: &str, format: OutputFormat) -> Result<Artifact, RenderError> {
        let mut input = tempfile::Builder::new()
            .prefix("dfdgen-")
            .suffix(".txt")
            .tempfile()?;
        input.write_all(source.as_bytes())?;
        input.flush()?;

        let dir = temp_dir()?;
        let output_file = output_path(dir.path(), format);

        debug!(
            program = self.program.display().to_string(),
            format = format.as_str();
            "Invoking renderer"
        );

        let child = self
            .command(input.path(), &output_file, format)
            .spawn()
            .map_err(|source| RenderError::ToolUnavailable {
                program: self.program.clone(),
                source,
            })?;

        let output = match self.timeout {
            Some(after) => tokio::time::timeout(after, child.wait_with_output())
                .await
                .map_err(|_| RenderError::TimedOut {
                    program: self.program.clone(),
                    after,
                })??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let code = output.status.code();
            debug!(code:?; "Renderer exited with failure");
            return Err(RenderError::Failed {
                diagnostic: String::from_utf8_lossy(&output.stderr).into_owned(),
                code,
            });
        }

        if !output_file.is_file() {
            return Err(RenderError::MissingOutput { format });
        }

        trace!(path = output_file.display().to_string(); "Renderer produced artifact");
        Ok(Artifact::new(dir, output_file, format))
    }
}

fn temp_dir() -> io::Result<TempDir> {
    tempfile::Builder::new().prefix("dfdgen-").tempdir()
}

fn output_path(dir: &Path, format: OutputFormat) -> PathBuf {
    dir.join(format!("diagram.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_shape() {
        let renderer = ToolRenderer::new("data-flow-diagram").with_args(["--verbose"]);
        let cmd = renderer.command(Path::new("/tmp/in.txt"), Path::new("/tmp/out.svg"), OutputFormat::Svg);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "data-flow-diagram");
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "--verbose",
                "-o",
                "/tmp/out.svg",
                "-f",
                "svg",
                "--no-graph-title",
                "/tmp/in.txt"
            ]
        );
    }

    #[test]
    fn test_artifact_deleted_on_drop() {
        let artifact = Artifact::from_bytes(b"<svg/>", OutputFormat::Svg).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.is_file());
        assert_eq!(path.extension().unwrap(), "svg");

        drop(artifact);
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_artifact_read() {
        let artifact = Artifact::from_bytes(b"%PDF-1.4", OutputFormat::Pdf).unwrap();
        assert_eq!(artifact.read().await.unwrap(), b"%PDF-1.4");
        assert_eq!(artifact.format(), OutputFormat::Pdf);
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_unavailable() {
        let renderer = ToolRenderer::new("/nonexistent/dfdgen/data-flow-diagram");
        let err = renderer.render("A -> B", OutputFormat::Svg).await.unwrap_err();

        assert!(matches!(err, RenderError::ToolUnavailable { .. }));
        assert!(err.is_operational());
    }

    #[test]
    fn test_failed_displays_diagnostic_verbatim() {
        let err = RenderError::Failed {
            diagnostic: "syntax error on line 2\n".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "syntax error on line 2\n");
        assert!(!err.is_operational());
    }
}
