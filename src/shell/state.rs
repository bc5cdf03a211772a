use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

use std::collections::BTreeSet;
use std::fmt;
use std::mem;

/// How the most recent foreground command ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EndState {
    /// No foreground command has run yet.
    Unset,
    Exited(i32),
    Signaled(i32),
}

impl EndState {
    pub fn success() -> Self {
        EndState::Exited(0)
    }

    pub fn failure() -> Self {
        EndState::Exited(1)
    }

    // `None` for stops, continues and anything else that is not the end
    // of the process.
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(EndState::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(EndState::Signaled(signal as i32)),
            _ => None,
        }
    }

    pub fn is_signaled(&self) -> bool {
        matches!(self, EndState::Signaled(_))
    }
}

impl fmt::Display for EndState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndState::Unset => write!(f, "NULL"),
            EndState::Exited(code) => write!(f, "exit value {}", code),
            EndState::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

pub struct State {
    // Set by foreground commands and by `cd`; read and reset by `status`.
    end_state: EndState,

    // Background pids that have not been reaped yet.
    pub jobs: BTreeSet<Pid>,

    exit_requested: bool,
}

impl State {
    pub fn new() -> Self {
        State {
            end_state: EndState::Unset,
            jobs: BTreeSet::new(),
            exit_requested: false,
        }
    }

    pub fn set_end_state(&mut self, end_state: EndState) {
        self.end_state = end_state;
    }

    // Returns the current record and leaves a success in its place.
    pub fn take_end_state(&mut self) -> EndState {
        mem::replace(&mut self.end_state, EndState::success())
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}
