//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// One input file with its preceding arguments.
#[derive(Debug, Clone)]
struct FfmpegInput {
    /// Arguments placed before this input's `-i`
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands with multiple inputs and a filter graph.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<FfmpegInput>,
    filter_complex: Option<String>,
    maps: Vec<String>,
    output_args: Vec<String>,
    output: PathBuf,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            filter_complex: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input file. Returns the input's index for stream references.
    pub fn input(&mut self, path: impl AsRef<Path>) -> usize {
        self.input_with_args(path, Vec::<String>::new())
    }

    /// Add an input file with arguments placed before its `-i`.
    pub fn input_with_args<I, S>(&mut self, path: impl AsRef<Path>, args: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(FfmpegInput {
            args: args.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self.inputs.len() - 1
    }

    /// Set the filter graph.
    pub fn filter_complex(&mut self, graph: impl Into<String>) -> &mut Self {
        self.filter_complex = Some(graph.into());
        self
    }

    /// Map an output stream label (e.g. `[vout]` or `0:a`).
    pub fn map(&mut self, stream: impl Into<String>) -> &mut Self {
        self.maps.push(stream.into());
        self
    }

    /// Add output arguments (after all inputs).
    pub fn output_args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set log level.
    pub fn log_level(&mut self, level: impl Into<String>) -> &mut Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.clone());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        if let Some(ref graph) = self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }

        for map in &self.maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with timeout and cancellation.
pub struct FfmpegRunner {
    cancel_rx: Option<watch::Receiver<bool>>,
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self {
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr_pipe = child.stderr.take();
        let stderr_handle = tokio::spawn(async move {
            use tokio::io::AsyncReadExt;
            let mut buf = String::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_string(&mut buf).await;
            }
            buf
        });

        let result = self.wait_for_completion(&mut child).await;
        let stderr = stderr_handle.await.unwrap_or_default();

        let status = result?;
        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(truncate_stderr(&stderr)),
                status.code(),
            ))
        }
    }

    /// Wait for the child with cancellation and timeout applied.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<std::process::ExitStatus> {
        let mut cancel_rx = self.cancel_rx.clone();

        let wait = async {
            if let Some(ref mut rx) = cancel_rx {
                tokio::select! {
                    status = child.wait() => status.map(Some),
                    changed = rx.changed() => {
                        if changed.is_ok() && *rx.borrow() {
                            Ok(None)
                        } else {
                            child.wait().await.map(Some)
                        }
                    }
                }
            } else {
                child.wait().await.map(Some)
            }
        };

        let status = if let Some(timeout_secs) = self.timeout_secs {
            match tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), wait).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        "FFmpeg timed out after {} seconds, killing process",
                        timeout_secs
                    );
                    let _ = child.kill().await;
                    return Err(MediaError::Timeout(timeout_secs));
                }
            }
        } else {
            wait.await?
        };

        match status {
            Some(status) => Ok(status),
            None => {
                info!("FFmpeg cancelled, killing process");
                let _ = child.kill().await;
                Err(MediaError::Cancelled)
            }
        }
    }
}

/// Keep only the tail of FFmpeg's stderr for error reporting.
fn truncate_stderr(stderr: &str) -> String {
    const MAX_LINES: usize = 20;
    let lines: Vec<&str> = stderr.lines().collect();
    if lines.len() <= MAX_LINES {
        stderr.trim().to_string()
    } else {
        lines[lines.len() - MAX_LINES..].join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_ordering() {
        let mut cmd = FfmpegCommand::new("/tmp/out.mp4");
        let bg = cmd.input("/tmp/bg.mp4");
        let logo = cmd.input_with_args("/tmp/logo.png", ["-loop", "1"]);
        cmd.filter_complex("[0:v][1:v]overlay[vout]")
            .map("[vout]")
            .output_args(["-t", "10"]);

        assert_eq!(bg, 0);
        assert_eq!(logo, 1);

        let args = cmd.build_args();
        let joined = args.join(" ");
        assert!(joined.starts_with("-y -v error"));
        assert!(joined.contains("-i /tmp/bg.mp4 -loop 1 -i /tmp/logo.png"));
        assert!(joined.contains("-filter_complex [0:v][1:v]overlay[vout]"));
        assert!(joined.contains("-map [vout]"));
        assert!(joined.ends_with("-t 10 /tmp/out.mp4"));
    }

    #[test]
    fn test_truncate_stderr_keeps_tail() {
        let long: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let out = truncate_stderr(&long);
        assert!(out.contains("line 49"));
        assert!(!out.contains("line 0\n"));
    }
}
