//! Invocation bridge: run the external inventory tool and capture its stdout.
//!
//! The tool reports results only by printing to a shared output channel. The
//! bridge points that channel at a private buffer for the length of one call
//! and puts the previous target back afterwards. Calls are serialized: only one
//! invocation may hold the channel at a time.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::config::Settings;
use crate::error::GovmResult;

type Target = Box<dyn Write + Send>;

/// Process-wide output channel the tool writes its results to.
pub struct OutputChannel {
    target: Mutex<Target>,
}

impl OutputChannel {
    pub fn new(target: impl Write + Send + 'static) -> Self {
        Self {
            target: Mutex::new(Box::new(target)),
        }
    }

    /// Channel backed by the host process's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        let mut target = self.lock();
        target.write_all(buf)?;
        target.flush()
    }

    /// Point the channel at `sink` until the returned guard is dropped.
    pub fn redirect(&self, sink: impl Write + Send + 'static) -> Redirect<'_> {
        let previous = std::mem::replace(&mut *self.lock(), Box::new(sink));
        Redirect {
            channel: self,
            previous: Some(previous),
        }
    }

    // A panic while writing leaves the target usable; recover from poisoning.
    fn lock(&self) -> MutexGuard<'_, Target> {
        self.target.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for OutputChannel {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Restores the channel's previous target on drop.
#[must_use = "dropping the guard restores the channel immediately"]
pub struct Redirect<'a> {
    channel: &'a OutputChannel,
    previous: Option<Target>,
}

impl Drop for Redirect<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.channel.lock() = previous;
        }
    }
}

/// In-memory sink shared between the bridge and the redirected channel.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.lock().unwrap_or_else(|e| e.into_inner()));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An external command that prints its results to an [`OutputChannel`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Run with `args`, writing results to `stdout`; returns the exit status.
    async fn run(&self, args: &[String], stdout: &OutputChannel) -> io::Result<i32>;
}

/// The `govc` command-line client, run as a child process.
#[derive(Debug, Clone)]
pub struct GovcTool {
    program: PathBuf,
    env: Vec<(String, String)>,
}

impl GovcTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            env: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.govc_bin.clone()).with_env(settings.govc_env())
    }

    pub fn with_env<K, V>(mut self, env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

#[async_trait]
impl Tool for GovcTool {
    async fn run(&self, args: &[String], stdout: &OutputChannel) -> io::Result<i32> {
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        stdout.write_all(&output.stdout)?;

        if !output.stderr.is_empty() {
            tracing::warn!(
                program = %self.program.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "tool wrote to stderr"
            );
        }

        // Terminated by a signal: no exit code.
        Ok(output.status.code().unwrap_or(-1))
    }
}

/// Outcome of one bridge call. A non-zero `exit_code` means `output` is
/// diagnostic text rather than data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedInvocation {
    pub output: String,
    pub exit_code: i32,
}

impl CapturedInvocation {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Serializes tool invocations over one shared output channel.
pub struct InvocationBridge {
    tool: Arc<dyn Tool>,
    channel: Arc<OutputChannel>,
    turn: tokio::sync::Mutex<()>,
}

impl InvocationBridge {
    pub fn new(tool: Arc<dyn Tool>, channel: Arc<OutputChannel>) -> Self {
        Self {
            tool,
            channel,
            turn: tokio::sync::Mutex::new(()),
        }
    }

    pub fn channel(&self) -> &Arc<OutputChannel> {
        &self.channel
    }

    /// Run the tool and return everything it printed plus its exit status.
    ///
    /// A non-zero status is returned, not raised. Failing to run the tool at
    /// all is an I/O error. The channel is restored on every exit path,
    /// including cancellation of the returned future.
    pub async fn invoke(&self, args: &[String]) -> GovmResult<CapturedInvocation> {
        let _turn = self.turn.lock().await;

        let capture = Capture::default();
        let redirect = self.channel.redirect(capture.clone());
        let status = self.tool.run(args, &self.channel).await;
        drop(redirect);

        let exit_code = status?;
        let output = capture.take();
        tracing::debug!(?args, exit_code, bytes = output.len(), "tool invocation finished");

        Ok(CapturedInvocation { output, exit_code })
    }
}
