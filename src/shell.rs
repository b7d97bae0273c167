//! Running downloaded scripts.
//!
//! Everything fetched from the raw endpoint is handed to a shell as-is: no
//! signature, no checksum pinning, no sandbox. That is what the tool is for,
//! so the capability lives here and nowhere else. Anything that wants to run
//! remote code has to go through an [`UntrustedScript`] and a
//! [`ScriptExecutor`].

use crate::catalog::ProgramName;
use crate::error::{EndgetError, Result};
use crate::logger::Logger;
use crate::progress::{CHUNK_SIZE, OutputProgress};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// How long output may keep trickling in after the script itself exited.
/// Anything still holding the pipe past this (a backgrounded daemon) is cut off.
pub const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// A script body exactly as the server sent it, byte for byte.
#[derive(Debug, Clone)]
pub struct UntrustedScript {
    url: String,
    body: Vec<u8>,
    content_length: Option<u64>,
}

impl UntrustedScript {
    pub fn new(url: impl Into<String>, body: impl Into<Vec<u8>>, content_length: Option<u64>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            content_length,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw bytes. Not necessarily UTF-8; the shell gets them unchanged.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as a shell argument.
    #[cfg(unix)]
    fn as_arg(&self) -> OsString {
        use std::os::unix::ffi::OsStrExt;
        std::ffi::OsStr::from_bytes(&self.body).to_os_string()
    }

    /// Non-unix command lines are UTF-16, so invalid bytes cannot survive anyway.
    #[cfg(not(unix))]
    fn as_arg(&self) -> OsString {
        OsString::from(String::from_utf8_lossy(&self.body).into_owned())
    }

    /// Content-Length the server declared for the download, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Hex SHA-256 of the body, for display only.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.body);
        format!("{:x}", hasher.finalize())
    }
}

/// How the subprocess output reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// stdout/stderr inherited from this process.
    Inherit,
    /// stdout piped through a progress display.
    Progress,
}

/// Runs a remote script. Implementations execute arbitrary code.
pub trait ScriptExecutor {
    fn execute(
        &self,
        program: &ProgramName,
        script: &UntrustedScript,
        mode: OutputMode,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Hands scripts to `<shell> -c <body>`.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    fn command(&self, script: &UntrustedScript) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(script.as_arg()).stdin(Stdio::inherit());
        cmd
    }

    async fn run_inherit(&self, script: &UntrustedScript) -> io::Result<ExitStatus> {
        self.command(script)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
    }

    async fn run_with_progress(&self, script: &UntrustedScript) -> io::Result<ExitStatus> {
        let mut child = self
            .command(script)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("subprocess stdout was not captured"))?;

        let progress = OutputProgress::new(script.content_length());
        if !progress.is_determinate() {
            debug!("no Content-Length for {}, progress is indeterminate", script.url());
        }
        let mut drainer = tokio::spawn(drain(stdout, progress.clone()));

        // The exit status is the only thing that decides the outcome. The
        // drainer gets a short grace period for trailing output, but a child
        // the script left running may hold the pipe open forever.
        let status = child.wait().await;

        let cut_off = match tokio::time::timeout(DRAIN_GRACE, &mut drainer).await {
            Ok(Ok(Ok(bytes))) => {
                debug!("read {} bytes of script output", bytes);
                false
            }
            Ok(Ok(Err(e))) => {
                warn!("error reading script output: {}", e);
                false
            }
            Ok(Err(e)) => {
                warn!("output reader stopped: {}", e);
                false
            }
            Err(_) => {
                drainer.abort();
                true
            }
        };
        progress.finish();

        if cut_off {
            Logger::warn("Script exited but a process it started still holds its output. Not waiting for it.");
        }

        status
    }
}

impl ScriptExecutor for ShellExecutor {
    async fn execute(
        &self,
        program: &ProgramName,
        script: &UntrustedScript,
        mode: OutputMode,
    ) -> Result<()> {
        debug!("running {} bytes via {} -c ({:?})", script.body().len(), self.shell, mode);

        let status = match mode {
            OutputMode::Inherit => self.run_inherit(script).await,
            OutputMode::Progress => self.run_with_progress(script).await,
        }
        .map_err(|e| EndgetError::Execution {
            program: program.to_string(),
            reason: format!("could not start {}: {}", self.shell, e),
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(EndgetError::Execution {
                program: program.to_string(),
                reason: describe_failure(status),
            })
        }
    }
}

fn describe_failure(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by a signal".to_string(),
    }
}

/// Reads `reader` to the end in fixed-size chunks, feeding each to `progress`.
async fn drain<R>(mut reader: R, progress: OutputProgress) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        progress.observe(&buf[..n]);
    }
    Ok(progress.bytes_read())
}
