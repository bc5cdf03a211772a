use anyhow::{anyhow, Result};
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

use crate::line::{Redirect, Stream};

// A redirection with everything the child needs already allocated,
// so that applying it after fork is nothing but open/dup2/close.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResolvedRedirect {
    stream: Stream,
    path: CString,
    failure: Vec<u8>,
}

impl ResolvedRedirect {
    // Background jobs that asked for a redirection without naming a file
    // get the null device, so they never read from or write to the terminal.
    pub fn resolve(redirect: &Redirect, background: bool, null_device: &Path) -> Result<Self> {
        let path = match (redirect.path(), background) {
            (Some(path), _) => CString::new(path)?,
            (None, true) => CString::new(null_device.as_os_str().as_bytes())?,
            (None, false) => {
                return Err(anyhow!(
                    "{} redirection without a file name in a foreground command",
                    redirect.stream()
                ))
            }
        };

        let failure = format!(
            "cannot open {} for {}\n",
            path.to_string_lossy(),
            redirect.stream()
        )
        .into_bytes();

        Ok(ResolvedRedirect {
            stream: redirect.stream(),
            path,
            failure,
        })
    }

    pub fn failure_message(&self) -> &[u8] {
        &self.failure
    }

    // Replaces stdin or stdout of the calling process.  Only meant to run
    // in a freshly forked child.
    pub fn apply(&self) -> nix::Result<()> {
        let (flags, mode, target) = match self.stream {
            Stream::Input => (OFlag::O_RDONLY, Mode::empty(), libc::STDIN_FILENO),
            Stream::Output => (
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
                Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH,
                libc::STDOUT_FILENO,
            ),
        };

        let fd = open(self.path.as_c_str(), flags, mode)?;
        replace_fd(fd, target)
    }
}

fn replace_fd(src: RawFd, dst: RawFd) -> nix::Result<()> {
    if src != dst {
        dup2(src, dst)?;
        close(src)?;
    }

    Ok(())
}
