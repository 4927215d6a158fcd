// Author: Dustin Pilgrim
// License: MIT

use std::ffi::{CString, OsStr, OsString};
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};

use wayback_core::{Result, WaybackError};

/// Fails unless `path` is a regular file we are allowed to execute.
pub fn check_executable(path: &Path) -> Result<()> {
    let not_executable = || WaybackError::NotExecutable {
        path: path.to_path_buf(),
    };

    if !path.is_file() {
        return Err(not_executable());
    }

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| not_executable())?;

    // SAFETY: c_path is a valid NUL-terminated string that outlives the call.
    if unsafe { libc::access(c_path.as_ptr(), libc::X_OK) } == -1 {
        return Err(not_executable());
    }

    Ok(())
}

/// Exit code to propagate for a child's status (128 + signal when killed).
pub fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

/// A process to start, and which of our descriptors it gets to keep.
#[derive(Debug, Clone)]
pub struct Launch {
    program: PathBuf,
    args: Vec<OsString>,
    inherit: Vec<RawFd>,
    close: Vec<RawFd>,
    env: Vec<(OsString, Option<OsString>)>,
}

impl Launch {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            inherit: Vec::new(),
            close: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Keep `fd` open across exec, under the same number.
    pub fn inherit_fd(mut self, fd: &impl AsRawFd) -> Self {
        self.inherit.push(fd.as_raw_fd());
        self
    }

    /// Close `fd` in the child before exec. The parent's copy is untouched.
    pub fn close_fd(mut self, fd: RawFd) -> Self {
        self.close.push(fd);
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env.push((
            key.as_ref().to_os_string(),
            Some(value.as_ref().to_os_string()),
        ));
        self
    }

    pub fn env_remove(mut self, key: impl AsRef<OsStr>) -> Self {
        self.env.push((key.as_ref().to_os_string(), None));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn spawn(&self) -> Result<ProcessHandle> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            match value {
                Some(v) => cmd.env(key, v),
                None => cmd.env_remove(key),
            };
        }

        let close = self.close.clone();
        let inherit = self.inherit.clone();

        // SAFETY: child_setup only calls async-signal-safe libc functions and
        // does not allocate.
        unsafe {
            cmd.pre_exec(move || child_setup(&close, &inherit));
        }

        let child = cmd.spawn().map_err(|source| WaybackError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        Ok(ProcessHandle {
            child,
            program: self.program.clone(),
        })
    }
}

// Runs in the child between fork and exec.
fn child_setup(close: &[RawFd], inherit: &[RawFd]) -> io::Result<()> {
    for &fd in close {
        // SAFETY: fd belongs to the forked child's copy of the table.
        unsafe {
            libc::close(fd);
        }
    }

    for &fd in inherit {
        // SAFETY: F_GETFD/F_SETFD only touch the descriptor flags.
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFD);
            if flags == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::fcntl(fd, libc::F_SETFD, flags & !libc::FD_CLOEXEC) == -1 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    Ok(())
}

/// A started child process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    program: PathBuf,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Blocks until the process has exited.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        self.child.wait().map_err(|source| WaybackError::Wait {
            pid: self.child.id(),
            source,
        })
    }
}
