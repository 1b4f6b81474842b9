use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::config::Config;

#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("{tool} not found in PATH; install it or set its path in the config file")]
    NotFound { tool: String },

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Builder for a blocking external tool invocation.
///
/// ```no_run
/// let output = ToolCommand::new("ffmpeg")
///     .arg("-version")
///     .execute()?;
/// println!("{}", output.stdout);
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Runs the command to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit status is a [`ToolError::Failed`] carrying stderr.
    pub fn execute(&self) -> Result<ToolOutput, ToolError> {
        let tool = self.tool_name();
        log::debug!(
            "Running {} {}",
            self.program.display(),
            self.args
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        let output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool,
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}

/// Resolves `name` to an executable: the configured path when given,
/// otherwise a `PATH` lookup.
pub fn locate(name: &str, configured: Option<&Path>) -> Result<PathBuf, ToolError> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        log::warn!(
            "Configured {name} path {} does not exist, searching PATH",
            path.display()
        );
    }

    which::which(name).map_err(|_| ToolError::NotFound {
        tool: name.to_string(),
    })
}

/// External tools used around the codec.
#[derive(Debug, Clone, Default)]
pub struct Tools {
    ffmpeg: Option<PathBuf>,
    yt_dlp: Option<PathBuf>,
}

impl Tools {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            yt_dlp: config.yt_dlp.clone(),
        }
    }

    pub fn ffmpeg(&self) -> Result<PathBuf, ToolError> {
        locate("ffmpeg", self.ffmpeg.as_deref())
    }

    pub fn yt_dlp(&self) -> Result<PathBuf, ToolError> {
        locate("yt-dlp", self.yt_dlp.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn execute_echo() -> Result<(), ToolError> {
        let out = ToolCommand::new("echo").arg("hello").execute()?;
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "hello");
        Ok(())
    }

    #[test]
    fn execute_nonexistent_tool() {
        let result = ToolCommand::new("nonexistent_tool_xyz_12345").execute();
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_status() {
        let result = ToolCommand::new("sh")
            .args(["-c", "echo broken >&2; exit 3"])
            .execute();

        match result {
            Err(ToolError::Failed { tool, stderr, .. }) => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn locate_prefers_configured_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, b"")?;

        assert_eq!(locate("ffmpeg", Some(&fake))?, fake);
        assert!(matches!(
            locate("nonexistent_tool_xyz_12345", Some(&dir.path().join("missing"))),
            Err(ToolError::NotFound { .. })
        ));
        Ok(())
    }
}
