//! # Process control seam and its Unix implementation.
//!
//! [`ProcessControl`] is the supervisor's entire view of child processes:
//! spawn one, collect the pids of any that have terminated, send one a
//! termination signal. [`OsProcessControl`] implements it with `nix`
//! (fork/exec, `waitpid(WNOHANG)`, `SIGTERM`).
//!
//! ## Rules
//! - `spawn` passes the module's channel key (stringified) as the single
//!   program argument; the parent returns immediately with the child's pid.
//! - `reap_nonblocking` must be safe to call from the child-death listener:
//!   it loops on `waitpid(WNOHANG)` until no more terminated children are
//!   pending, and never blocks.
//! - All methods are synchronous; none of them touches the module registry.

use std::path::Path;

use crate::error::ProcessError;

/// OS process identifier as the supervisor tracks it.
pub type Pid = i32;

/// Spawn/reap/signal contract for module processes.
///
/// Production uses [`OsProcessControl`]; tests inject a fake so policy and
/// relay behavior can be exercised without forking.
pub trait ProcessControl: Send + Sync + 'static {
    /// Spawns `path` with the stringified `channel_key` as its sole argument.
    ///
    /// Returns the child's pid without waiting for it. A failure means no
    /// child exists; the caller must not register a pid for the module.
    fn spawn(&self, path: &Path, channel_key: i64) -> Result<Pid, ProcessError>;

    /// Collects the pids of all children that have terminated since the last
    /// call. Never blocks; returns an empty vec when nothing has died.
    fn reap_nonblocking(&self) -> Vec<Pid>;

    /// Asks the OS to terminate `pid` (SIGTERM on Unix).
    fn terminate(&self, pid: Pid) -> Result<(), ProcessError>;
}

#[cfg(unix)]
pub use unix::OsProcessControl;

#[cfg(unix)]
mod unix {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    use nix::sys::signal::{kill, Signal};
    use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
    use nix::unistd::{execv, fork, ForkResult};

    use super::{Pid, ProcessControl};
    use crate::error::ProcessError;

    /// `nix`-backed process control (fork/exec, non-blocking wait, SIGTERM).
    #[derive(Default)]
    pub struct OsProcessControl;

    impl OsProcessControl {
        pub fn new() -> Self {
            Self
        }
    }

    impl ProcessControl for OsProcessControl {
        fn spawn(&self, path: &Path, channel_key: i64) -> Result<Pid, ProcessError> {
            let spawn_err = |reason: String| ProcessError::Spawn {
                path: path.display().to_string(),
                reason,
            };

            // Build argv before forking; no allocation between fork and exec.
            let exe = CString::new(path.as_os_str().as_bytes())
                .map_err(|e| spawn_err(e.to_string()))?;
            let key = CString::new(channel_key.to_string())
                .map_err(|e| spawn_err(e.to_string()))?;

            match unsafe { fork() } {
                Ok(ForkResult::Parent { child }) => Ok(child.as_raw()),
                Ok(ForkResult::Child) => {
                    let _ = execv(&exe, &[exe.as_c_str(), key.as_c_str()]);
                    // exec failed; leave without running parent atexit handlers
                    unsafe { nix::libc::_exit(127) }
                }
                Err(errno) => Err(spawn_err(errno.to_string())),
            }
        }

        fn reap_nonblocking(&self) -> Vec<Pid> {
            let mut dead = Vec::new();
            loop {
                match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
                    Ok(WaitStatus::Exited(pid, _)) => dead.push(pid.as_raw()),
                    Ok(WaitStatus::Signaled(pid, _, _)) => dead.push(pid.as_raw()),
                    // StillAlive: children exist but none terminated.
                    // Err: no children left (ECHILD) or interrupted.
                    Ok(_) | Err(_) => break,
                }
            }
            dead
        }

        fn terminate(&self, pid: Pid) -> Result<(), ProcessError> {
            kill(nix::unistd::Pid::from_raw(pid), Signal::SIGTERM).map_err(|errno| {
                ProcessError::Signal {
                    pid,
                    reason: errno.to_string(),
                }
            })
        }
    }
}
