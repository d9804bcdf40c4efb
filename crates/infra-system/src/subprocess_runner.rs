// Subprocess runner implementation
// reason: tokio::process for async pipes and waits, nix for process-group signals
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use penman_core::application::constants::{OUTPUT_DRAIN_TIMEOUT, TERMINATION_GRACE_PERIOD};
use penman_core::domain::sanitize::{
    build_environment, sanitize, sanitize_args, sanitize_env, sanitize_path, Environment,
};
use penman_core::domain::{filter_stderr, InvocationError, InvocationRequest, Outcome};
use penman_core::port::{FileProbe, ProcessRunner};
use penman_core::EngineConfig;

use crate::deadline::{DeadlineTask, Termination, TerminationLatch};

/// Subprocess runner
///
/// Owns each child for the duration of one `execute` call: spawn, stdin
/// streaming, concurrent stdout/stderr capture, deadline enforcement and
/// classification. Calls share no mutable state.
pub struct SubprocessRunner {
    probe: Arc<dyn FileProbe>,
    environment: Environment,
    termination_grace: Duration,
    drain_timeout: Duration,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `probe` - Existence check for the executable
    /// * `environment` - Complete child environment (sanitized again here)
    ///
    /// # Example
    /// ```ignore
    /// let env = build_environment(&std::env::vars_os().collect(), &extra_dirs, home);
    /// let runner = SubprocessRunner::new(Arc::new(StdFileProbe), env);
    /// ```
    pub fn new(probe: Arc<dyn FileProbe>, environment: Environment) -> Self {
        Self {
            probe,
            environment: sanitize_env(&environment),
            termination_grace: TERMINATION_GRACE_PERIOD,
            drain_timeout: OUTPUT_DRAIN_TIMEOUT,
        }
    }

    /// Runner inheriting this process's environment, augmented per `config`
    pub fn from_config(config: &EngineConfig, probe: Arc<dyn FileProbe>) -> Self {
        let caller_env: Environment = std::env::vars_os().collect();
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let environment = build_environment(&caller_env, &config.extra_path_dirs, home.as_deref());

        Self::new(probe, environment)
            .with_termination_grace(config.termination_grace())
            .with_drain_timeout(config.drain_timeout())
    }

    pub fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace = grace;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Spawn, supervise and classify one sanitized invocation
    async fn run(
        &self,
        executable: PathBuf,
        args: Vec<String>,
        input: Option<String>,
        timeout: Duration,
    ) -> Outcome {
        let mut command = Command::new(&executable);
        command
            .args(&args)
            .env_clear()
            .envs(&self.environment)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so termination also reaches grandchildren
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|e| InvocationError::ExecutionFailed {
                details: e.to_string(),
            })?;
        // Process group id, taken while the leader is alive
        let group = child.id();

        let stdout = PipeCapture::spawn(child.stdout.take());
        let stderr = PipeCapture::spawn(child.stderr.take());
        let writer = match (input, child.stdin.take()) {
            (Some(text), Some(stdin)) => Some(tokio::spawn(write_input(stdin, text))),
            _ => None,
        };

        let latch = Arc::new(TerminationLatch::new());
        let (deadline, mut expired) = DeadlineTask::start(timeout, latch.clone());

        let status = tokio::select! {
            status = child.wait() => status,
            Ok(()) = &mut expired => {
                warn!(
                    pid = ?child.id(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Deadline reached, terminating process group"
                );
                self.terminate(&mut child).await
            }
        };
        deadline.cancel();
        let termination = latch.settle();

        // Child is gone: abandon any unfinished stdin write, closing the pipe
        if let Some(writer) = writer {
            writer.abort();
        }

        let (stdout, stderr) = tokio::join!(
            stdout.finish(self.drain_timeout),
            stderr.finish(self.drain_timeout)
        );

        // A member still holding a pipe keeps the group id reserved
        if stdout.held_open || stderr.held_open {
            if let Some(group) = group {
                kill_stragglers(group);
            }
        }

        classify(termination, status, stdout.text, &stderr.text)
    }

    /// SIGTERM the group, then SIGKILL after the grace period
    async fn terminate(&self, child: &mut Child) -> io::Result<ExitStatus> {
        signal_group(child, GroupSignal::Terminate);

        match tokio::time::timeout(self.termination_grace, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(
                    pid = ?child.id(),
                    grace_ms = self.termination_grace.as_millis() as u64,
                    "Process ignored SIGTERM, sending SIGKILL"
                );
                signal_group(child, GroupSignal::Kill);
                child.wait().await
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn execute(&self, request: InvocationRequest) -> Outcome {
        let executable = sanitize_path(&request.executable_path);
        let args = sanitize_args(&request.arguments);
        let input = request.input.as_deref().map(sanitize);

        if !self.probe.is_file(&executable) {
            info!(executable = %executable.display(), "Binary not found, nothing spawned");
            return Err(InvocationError::BinaryNotFound { path: executable });
        }

        info!(
            executable = %executable.display(),
            arg_count = args.len(),
            has_input = input.is_some(),
            timeout_ms = request.timeout.as_millis() as u64,
            "Starting invocation"
        );
        let started = Instant::now();

        let outcome = self.run(executable, args, input, request.timeout).await;

        let result = match &outcome {
            Ok(_) => "success".to_string(),
            Err(e) => e.kind().to_string(),
        };
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            result = %result,
            "Invocation finished"
        );

        outcome
    }
}

/// Decide the outcome from what ended the process and what it printed
///
/// Precedence: our deadline, then zero exit with output, then zero exit
/// without output, then everything else.
fn classify(
    termination: Termination,
    status: io::Result<ExitStatus>,
    stdout: String,
    stderr: &str,
) -> Outcome {
    if termination == Termination::Deadline {
        return Err(InvocationError::TimedOut);
    }

    let status = status.map_err(|e| InvocationError::ExecutionFailed {
        details: e.to_string(),
    })?;
    let details = filter_stderr(stderr);

    if status.success() {
        if stdout.is_empty() {
            Err(InvocationError::EmptyOutput { details })
        } else {
            Ok(stdout)
        }
    } else {
        let details = if details.is_empty() {
            describe_exit(&status)
        } else {
            details
        };
        Err(InvocationError::ExecutionFailed { details })
    }
}

fn describe_exit(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("Exit code {}", code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("Terminated by signal {}", signal);
        }
    }
    status.to_string()
}

/// Write all input, then close stdin. A child that exits without reading
/// yields a broken pipe, which is expected.
async fn write_input(mut stdin: ChildStdin, input: String) {
    if let Err(e) = stdin.write_all(input.as_bytes()).await {
        debug!(error = %e, "Stdin write stopped early");
        return;
    }
    if let Err(e) = stdin.shutdown().await {
        debug!(error = %e, "Stdin close failed");
    }
}

/// What one pipe yielded by the end of the drain
struct Drained {
    text: String,
    /// EOF never arrived: another process still holds the write end
    held_open: bool,
}

/// Background reader for one output pipe
///
/// Bytes land in a shared buffer as they arrive so a drain timeout keeps
/// everything read so far.
struct PipeCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl PipeCapture {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let handle = pipe.map(|mut pipe| {
            let buffer = buffer.clone();
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => {
                            buffer
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .extend_from_slice(&chunk[..n]);
                        }
                        Err(e) => {
                            debug!(error = %e, "Pipe read failed");
                            break;
                        }
                    }
                }
            })
        });
        Self { buffer, handle }
    }

    /// Wait up to `limit` for EOF, then decode and trim what was captured
    async fn finish(mut self, limit: Duration) -> Drained {
        let mut held_open = false;
        if let Some(mut handle) = self.handle.take() {
            if tokio::time::timeout(limit, &mut handle).await.is_err() {
                debug!(limit_ms = limit.as_millis() as u64, "Pipe still open after exit, giving up");
                handle.abort();
                held_open = true;
            }
        }
        let bytes = std::mem::take(
            &mut *self
                .buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        Drained {
            text: String::from_utf8_lossy(&bytes).trim().to_string(),
            held_open,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum GroupSignal {
    Terminate,
    Kill,
}

/// Signal the child's process group
///
/// `Child::id` is `None` once tokio has reaped the child, so a recycled pid
/// is never signalled.
#[cfg(unix)]
fn signal_group(child: &mut Child, signal: GroupSignal) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };
    let sig = match signal {
        GroupSignal::Terminate => Signal::SIGTERM,
        GroupSignal::Kill => Signal::SIGKILL,
    };
    if let Err(e) = killpg(Pid::from_raw(pid as i32), sig) {
        debug!(pid = %pid, signal = ?sig, error = %e, "killpg failed, signalling child directly");
        if matches!(signal, GroupSignal::Kill) {
            let _ = child.start_kill();
        }
    }
}

#[cfg(not(unix))]
fn signal_group(child: &mut Child, _signal: GroupSignal) {
    // No graceful signal off Unix: both steps kill
    let _ = child.start_kill();
}

/// SIGKILL what is left of a group whose leader has been reaped
#[cfg(unix)]
fn kill_stragglers(group: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(group as i32), Signal::SIGKILL) {
        Ok(()) => debug!(pgid = %group, "Killed group members left holding output pipes"),
        Err(e) => debug!(pgid = %group, error = %e, "No group members left to kill"),
    }
}

#[cfg(not(unix))]
fn kill_stragglers(_group: u32) {}
