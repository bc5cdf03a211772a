// Turns a parsed command line into a running process: fork, set up the
// child (signals, then redirections, then exec), and in the parent either
// wait for it or hand its pid back as a background job.

use anyhow::{anyhow, Result};
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{fork, write, ForkResult, Pid};
use tracing::debug;

use std::ffi::CString;
use std::io::{self, Write};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

use crate::errors::ShellError;
use crate::line::Line;
use crate::shell::state::EndState;

pub mod reaper;
pub mod redirect;
pub mod signal;

use redirect::ResolvedRedirect;
use signal::Role;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Foreground(EndState),
    Background(Pid),
}

// Everything the child needs, allocated before fork.
#[derive(Debug)]
pub struct Launch {
    program: CString,
    argv: Vec<CString>,
    role: Role,
    redirects: Vec<ResolvedRedirect>,
    not_found: Vec<u8>,
}

impl Launch {
    pub fn new(line: &Line, null_device: &Path) -> Result<Launch> {
        let argv = line
            .argv()
            .into_iter()
            .map(CString::new)
            .collect::<Result<Vec<_>, _>>()?;

        let program = argv
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("launch: Empty argument vector."))?;

        // stdin is rewired before stdout
        let redirects = [line.input(), line.output()]
            .into_iter()
            .flatten()
            .map(|r| ResolvedRedirect::resolve(r, line.is_background(), null_device))
            .collect::<Result<Vec<_>>>()?;

        let not_found = format!("{}: no such file or directory\n", line.command()).into_bytes();

        Ok(Launch {
            program,
            argv,
            role: Role::for_child(line.is_background()),
            redirects,
            not_found,
        })
    }

    pub fn launch(&self) -> Result<Outcome> {
        // Anything still buffered would otherwise be written twice
        io::stdout().flush()?;
        io::stderr().flush()?;

        // NULL-terminated, as execvp(3) expects; borrows from self.argv
        let argv_ptrs: Vec<*const c_char> = self
            .argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();

        match unsafe { fork() } {
            Ok(ForkResult::Child) => self.exec_child(&argv_ptrs),
            Ok(ForkResult::Parent { child }) => {
                debug!(
                    "launch: pid:{} argv:{:?} role:{:?} redirects:{:?}",
                    child, self.argv, self.role, self.redirects
                );

                match self.role {
                    Role::Background => Ok(Outcome::Background(child)),
                    Role::Foreground | Role::Shell => {
                        wait_foreground(child).map(Outcome::Foreground)
                    }
                }
            }
            Err(errno) => Err(ShellError::Fork(errno).into()),
        }
    }

    // Runs between fork and exec: no allocation, no locks, no logging.
    // Every failure ends the child with status 1 and never returns to
    // the interpreter loop.
    fn exec_child(&self, argv_ptrs: &[*const c_char]) -> ! {
        if self.role.apply().is_err() {
            child_exit(b"cannot set signal disposition\n");
        }

        for redirect in &self.redirects {
            if redirect.apply().is_err() {
                child_exit(redirect.failure_message());
            }
        }

        unsafe { libc::execvp(self.program.as_ptr(), argv_ptrs.as_ptr()) };

        child_exit(&self.not_found)
    }
}

fn child_exit(message: &[u8]) -> ! {
    let _ = write(libc::STDERR_FILENO, message);

    unsafe { libc::_exit(1) }
}

// Blocks until `pid` terminates.  Nothing else happens meanwhile.
pub fn wait_foreground(pid: Pid) -> Result<EndState> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(end_state) = EndState::from_wait_status(status) {
                    debug!("foreground pid {}: {}", pid, end_state);
                    return Ok(end_state);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
