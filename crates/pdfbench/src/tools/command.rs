//! Subprocess-based extraction tools
//!
//! A [`CommandTool`] runs one external process per document. The argument
//! template may reference `{input}`, `{output_dir}` and `{stem}`; the text is
//! read either from standard output or from the first file with a given
//! extension that the process leaves in its scratch directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::{CommandToolConfig, OutputCapture};
use crate::tool::ExtractionTool;
use crate::types::{Extraction, PdfDocument, ToolKind};
use crate::{PdfBenchError, Result};

/// Longest stderr excerpt kept in an error message.
const MAX_STDERR_CHARS: usize = 2000;

/// Extraction tool backed by an external executable
#[derive(Debug, Clone)]
pub struct CommandTool {
    name: String,
    command: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
    capture: OutputCapture,
}

impl CommandTool {
    /// Create a new command tool
    ///
    /// # Arguments
    /// * `name` - Tool name (e.g., "pdftotext")
    /// * `command` - Executable name or path
    /// * `args` - Argument template
    /// * `capture` - Where the extracted text ends up
    pub fn new(
        name: impl Into<String>,
        command: impl Into<PathBuf>,
        args: Vec<String>,
        capture: OutputCapture,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            env: Vec::new(),
            capture,
        }
    }

    /// Add an environment variable for the child process
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Build from a `[[custom_tools]]` entry
    pub fn from_config(config: &CommandToolConfig) -> Self {
        let mut env: Vec<(String, String)> = config.env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        env.sort();

        Self {
            name: config.name.clone(),
            command: PathBuf::from(&config.command),
            args: config.args.clone(),
            env,
            capture: config.capture.clone(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Expand the argument template for one document.
    ///
    /// When no argument mentions `{input}`, the document path is appended.
    /// The child runs inside `scratch_dir`, so the input path is made absolute.
    fn render_args(&self, document: &PdfDocument, scratch_dir: &Path) -> Vec<String> {
        let input_path = std::path::absolute(&document.path).unwrap_or_else(|_| document.path.clone());
        let input = input_path.to_string_lossy();
        let output_dir = scratch_dir.to_string_lossy();
        let stem = document.stem();

        let mut rendered: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output_dir}", &output_dir)
                    .replace("{stem}", &stem)
            })
            .collect();

        if !self.args.iter().any(|arg| arg.contains("{input}")) {
            rendered.push(input.into_owned());
        }

        rendered
    }

    /// Execute the extraction subprocess, returning its stdout
    async fn execute_subprocess(&self, document: &PdfDocument, scratch_dir: &Path) -> Result<String> {
        let args = self.render_args(document, scratch_dir);

        let mut cmd = Command::new(&self.command);
        cmd.args(&args);
        cmd.current_dir(scratch_dir);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(tool = %self.name, command = %self.command.display(), ?args, "Spawning extraction subprocess");

        let child = cmd.spawn().map_err(|e| {
            PdfBenchError::tool_failed(
                &self.name,
                format!("Failed to spawn '{}': {}", self.command.display(), e),
            )
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PdfBenchError::tool_failed(&self.name, format!("Failed to wait for subprocess: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(PdfBenchError::tool_failed(
                &self.name,
                format!("exited with status {}: {}", code, truncate(stderr.trim(), MAX_STDERR_CHARS)),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn read_output_file(&self, scratch_dir: &Path, extension: &str) -> Result<String> {
        let extension = extension.trim_start_matches('.');
        let dir = scratch_dir.to_path_buf();
        let wanted = extension.to_string();

        let found = tokio::task::spawn_blocking(move || find_files_with_extension(&dir, &wanted))
            .await
            .map_err(|e| PdfBenchError::Other(format!("Output scan task failed: {}", e)))??;

        let Some(first) = found.into_iter().next() else {
            return Err(PdfBenchError::tool_failed(
                &self.name,
                format!("No .{} output found in {}", extension, scratch_dir.display()),
            ));
        };

        let bytes = tokio::fs::read(&first).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl ExtractionTool for CommandTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Subprocess
    }

    async fn setup(&self) -> Result<()> {
        which::which(&self.command).map_err(|e| {
            PdfBenchError::MissingDependency(format!("Command '{}' not found: {}", self.command.display(), e))
        })?;

        Ok(())
    }

    async fn extract(&self, document: &PdfDocument, scratch_dir: &Path) -> Result<Extraction> {
        let stdout = self.execute_subprocess(document, scratch_dir).await?;

        let text = match &self.capture {
            OutputCapture::Stdout => stdout,
            OutputCapture::File { extension } => self.read_output_file(scratch_dir, extension).await?,
        };

        Ok(Extraction::new(text))
    }
}

/// Files under `dir` (recursively) with the given extension, sorted by path.
fn find_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
            {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
