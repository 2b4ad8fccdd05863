//! Test doubles shared across unit tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;

use crate::error::ProcessError;
use crate::os::{Pid, ProcessControl};

/// In-memory [`ProcessControl`]: monotonic pids, recorded spawns and
/// terminations, switchable spawn failure. Never forks.
pub(crate) struct FakeProc {
    next_pid: AtomicI32,
    fail_spawns: AtomicBool,
    spawned: Mutex<Vec<(PathBuf, i64)>>,
    terminated: Mutex<Vec<Pid>>,
}

impl FakeProc {
    pub(crate) fn new(first_pid: Pid) -> Self {
        Self {
            next_pid: AtomicI32::new(first_pid),
            fail_spawns: AtomicBool::new(false),
            spawned: Mutex::new(Vec::new()),
            terminated: Mutex::new(Vec::new()),
        }
    }

    /// Makes subsequent `spawn` calls fail.
    pub(crate) fn set_fail(&self, fail: bool) {
        self.fail_spawns.store(fail, Ordering::SeqCst);
    }

    /// Everything spawned so far, as (path, channel_key) pairs.
    pub(crate) fn spawned(&self) -> Vec<(PathBuf, i64)> {
        self.spawned.lock().unwrap().clone()
    }

    /// Pids terminate() was called with, in order.
    pub(crate) fn terminated(&self) -> Vec<Pid> {
        self.terminated.lock().unwrap().clone()
    }
}

impl ProcessControl for FakeProc {
    fn spawn(&self, path: &Path, channel_key: i64) -> Result<Pid, ProcessError> {
        if self.fail_spawns.load(Ordering::SeqCst) {
            return Err(ProcessError::Spawn {
                path: path.display().to_string(),
                reason: "injected failure".to_string(),
            });
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.spawned
            .lock()
            .unwrap()
            .push((path.to_path_buf(), channel_key));
        Ok(pid)
    }

    fn reap_nonblocking(&self) -> Vec<Pid> {
        Vec::new()
    }

    fn terminate(&self, pid: Pid) -> Result<(), ProcessError> {
        self.terminated.lock().unwrap().push(pid);
        Ok(())
    }
}
