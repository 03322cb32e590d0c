//! Shallow repository cloning through the `git` command-line client.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::HarvestError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something that can materialize a remote repository at a local path.
///
/// The orchestrator only talks to this trait, so tests can substitute a
/// fetcher that never touches the network.
pub trait RepoFetcher {
    /// Populate `dest` with a checkout of `url`.
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), HarvestError>;
}

/// Locate the `git` executable on PATH.
pub fn find_git() -> Result<PathBuf, HarvestError> {
    which::which("git").map_err(|_| HarvestError::GitNotFound)
}

/// Depth-1 clones with a hard deadline.
#[derive(Clone, Debug)]
pub struct GitFetcher {
    program: PathBuf,
    timeout: Duration,
}

impl GitFetcher {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, url: &str, dest: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["clone", "--depth", "1", "--quiet", url])
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // Own process group, so a timeout can take down the transport helpers
        // git forks along with git itself.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

impl RepoFetcher for GitFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), HarvestError> {
        info!(url, dest = %dest.display(), "cloning");

        let mut child = self
            .command(url, dest)
            .spawn()
            .map_err(|source| HarvestError::CloneFailed {
                url: url.to_string(),
                message: format!("failed to start git: {source}"),
            })?;

        // Drain stderr on a separate thread so a chatty child can't block on
        // a full pipe while we wait for it.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        let status = wait_with_deadline(&mut child, self.timeout);
        // After a timeout the pipe may still be held open by a stray
        // descendant; the reader thread is left to finish on its own.
        let stderr = match (&status, stderr_reader) {
            (Ok(Some(_)), Some(handle)) => handle.join().unwrap_or_default(),
            _ => String::new(),
        };

        match status {
            Ok(Some(status)) if status.success() => {
                debug!(url, "clone finished");
                Ok(())
            }
            Ok(Some(status)) => Err(HarvestError::CloneFailed {
                url: url.to_string(),
                message: describe_failure(status, &stderr),
            }),
            Ok(None) => Err(HarvestError::CloneTimedOut {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
            Err(source) => Err(HarvestError::CloneFailed {
                url: url.to_string(),
                message: format!("failed waiting for git: {source}"),
            }),
        }
    }
}

/// Wait for `child` until `timeout` elapses. Returns `Ok(None)` after killing
/// a child that overran its deadline. The child is reaped on every path.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(err) => {
                terminate(child);
                return Err(err);
            }
        }
        if start.elapsed() >= timeout {
            terminate(child);
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child together with everything in its process group.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let _ = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn describe_failure(status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    match (status.code(), stderr.is_empty()) {
        (Some(code), true) => format!("git exited with status {code}"),
        (Some(code), false) => format!("git exited with status {code}: {stderr}"),
        (None, true) => "git was terminated by a signal".to_string(),
        (None, false) => format!("git was terminated by a signal: {stderr}"),
    }
}
